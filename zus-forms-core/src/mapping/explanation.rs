//! Victim's explanation form; flat widget names, long dates, TAK/NIE answers

use super::FieldMappingEntry as E;
use crate::dates::DateStyle;
use crate::model::SobrietyTest;

const TEXT_FIELDS: [(&str, &str); 20] = [
    ("imieNazwisko", "imieNazwisko"),
    ("miejsceUrodzenia", "miejsceUrodzenia"),
    ("adresZamieszkania", "adresZamieszkania"),
    ("zatrudnienie", "zatrudnienie"),
    ("dokumentTozsamosci", "dokumentTozsamosci"),
    ("miejsceWypadku", "miejsceWypadku"),
    ("godzinaWypadku", "godzinaWypadku"),
    ("planowanaGodzinaRozpoczeciaPracy", "planowanaGodzinaRozpoczeciaPracy"),
    ("planowanaGodzinaZakonczeniaPracy", "planowanaGodzinaZakonczeniaPracy"),
    ("rodzajCzynnosciPrzedWypadkiem", "czynnosciPrzedWypadkiem"),
    ("opisOkolicznosciWypadku", "opisOkolicznosciWypadku"),
    ("nazwaTypUrzadzenia", "nazwaTypUrzadzenia"),
    ("czyUrzadzenieSprawneIUzytkowanePrawidlowo", "czyUrzadzenieSprawne"),
    ("rodzajZabezpieczen", "rodzajZabezpieczen"),
    ("stosowaneSrodkiZmniejszajaceRyzyko", "stosowaneSrodkiRyzyko"),
    ("organyISzczegoly", "organyKontroli"),
    ("nazwaPlacowkiZdrowia", "placowkaZdrowia"),
    ("okresIMiejsceHospitalizacji", "hospitalizacja"),
    ("rozpoznanyUraz", "rozpoznanyUraz"),
    ("niezdolnoscDoPracy", "niezdolnoscDoPracy"),
];

const DATE_FIELDS: [(&str, &str); 4] = [
    ("dataUrodzenia", "dataUrodzenia"),
    ("dataProdukcjiUrzadzenia", "dataProdukcjiUrzadzenia"),
    ("pierwszaPomocData", "pierwszaPomocData"),
    ("dataPodpisania", "dataPodpisania"),
];

const YES_NO_FIELDS: [(&str, &str); 12] = [
    ("czyWypadekPodczasObslugiMaszyn", "obslugaMaszynTakNie"),
    ("czyBylyZabezpieczenia", "zabezpieczeniaTakNie"),
    ("czySrodkiWlasciweISprawne", "zabezpieczeniaSprawnosc"),
    ("czyAsekuracja", "asekuracjaTakNie"),
    ("czyObowiazekPracyPrzezDwieOsoby", "obowiazekDwieOsoby"),
    ("czyPrzestrzeganoZasadBHP", "bhpPrzestrzeganie"),
    ("czyPosiadamPrzygotowanieZawodowe", "przygotowanieZawodowe"),
    ("czyOdbylemSzkolenieBHP", "szkolenieBhp"),
    ("czyPosiadamOceneRyzykaZawodowego", "ocenaRyzyka"),
    ("czyWStanieNietrzezwosci", "stanNietrzezwosci"),
    ("czyOrganyPodejmowalyCzynnosci", "organyPanstwowe"),
    ("czyNaZwolnieniuWLacuWypadku", "zwolnienieLekarskie"),
];

pub(super) fn entries() -> Vec<E> {
    let mut out: Vec<E> = TEXT_FIELDS
        .iter()
        .map(|(path, widget)| E::direct(*path, *widget))
        .collect();

    // The accident date appears in the heading and in section 1
    out.push(E::date(
        "dataWypadku",
        vec!["dataWypadkuGlowne".to_string(), "dataWypadku".to_string()],
        DateStyle::Long,
    ));
    out.extend(
        DATE_FIELDS
            .iter()
            .map(|(path, widget)| E::date(*path, vec![widget.to_string()], DateStyle::Long)),
    );

    out.extend(YES_NO_FIELDS.iter().map(|(path, widget)| E::yes_no(*path, *widget)));

    out.push(E::qualifier(
        "stanTrzezwosciBadany",
        "stanNietrzezwosci",
        SobrietyTest::ALL
            .iter()
            .map(|test| (test.code(), test.label()))
            .collect(),
    ));

    out
}

#[cfg(test)]
mod tests {
    use crate::flatten::flatten;
    use crate::mapping::{FieldMappingTable, WidgetValue};
    use serde_json::json;

    fn text(s: &str) -> Option<WidgetValue> {
        Some(WidgetValue::Text(s.to_string()))
    }

    #[test]
    fn test_resolve_explanation() {
        let flat = flatten(&json!({
            "imieNazwisko": "Jan Kowalski",
            "dataWypadku": "2024-03-10",
            "rodzajCzynnosciPrzedWypadkiem": "Przenoszenie palet",
            "czyAsekuracja": true,
            "czyWStanieNietrzezwosci": false,
            "stanTrzezwosciBadany": "badany_przez_policje",
            "dataPodpisania": "10/03/2024"
        }));
        let resolved = FieldMappingTable::explanation().resolve(&flat);

        assert_eq!(resolved.get("imieNazwisko").cloned(), text("Jan Kowalski"));
        assert_eq!(resolved.get("dataWypadkuGlowne").cloned(), text("10.03.2024"));
        assert_eq!(resolved.get("dataWypadku").cloned(), text("10.03.2024"));
        assert_eq!(
            resolved.get("czynnosciPrzedWypadkiem").cloned(),
            text("Przenoszenie palet")
        );
        assert_eq!(resolved.get("asekuracjaTakNie").cloned(), text("TAK"));
        assert_eq!(
            resolved.get("stanNietrzezwosci").cloned(),
            text("NIE (badany przez policję)")
        );
        assert_eq!(resolved.get("dataPodpisania").cloned(), text("10/03/2024"));
    }
}
