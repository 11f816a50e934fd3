//! The two supported input shapes

use super::SchemaNode;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PESEL: Regex = Regex::new(r"^\d{11}$").unwrap();
    static ref POSTAL_CODE: Regex = Regex::new(r"^\d{2}-\d{3}$").unwrap();
}

/// Maximum number of witnesses the notification form has room for
pub const MAX_WITNESSES: usize = 3;

pub const CORRESPONDENCE_METHODS: [&str; 4] = [
    "adres",
    "poste_restante",
    "skrytka_pocztowa",
    "przegrodka_pocztowa",
];

pub const RESPONSE_METHODS: [&str; 3] = [
    "w_placowce_ZUS",
    "poczta_na_adres_wskazany_we_wniosku",
    "na_koncie_PUE_ZUS",
];

pub const SOBRIETY_TESTS: [&str; 3] = [
    "badany_przez_policje",
    "badany_podczas_pierwszej_pomocy",
    "nie_badany",
];

fn identity_document() -> SchemaNode {
    SchemaNode::object()
        .with("rodzaj", SchemaNode::string())
        .with("seriaINumer", SchemaNode::string())
        .depends("rodzaj", &["seriaINumer"])
        .depends("seriaINumer", &["rodzaj"])
}

/// Street-level fields shared by every address block
fn street_address(domestic: bool) -> SchemaNode {
    let postal = if domestic {
        SchemaNode::string().matching(&POSTAL_CODE)
    } else {
        SchemaNode::string()
    };
    SchemaNode::object()
        .with("ulica", SchemaNode::string())
        .with("numerDomu", SchemaNode::string())
        .with("numerLokalu", SchemaNode::string())
        .with("kodPocztowy", postal)
        .with("miejscowosc", SchemaNode::string())
}

fn address_with_country() -> SchemaNode {
    street_address(false).with("nazwaPanstwa", SchemaNode::string())
}

fn domestic_address() -> SchemaNode {
    street_address(true)
}

fn address_with_phone() -> SchemaNode {
    street_address(true).with("numerTelefonu", SchemaNode::string())
}

fn correspondence_address() -> SchemaNode {
    SchemaNode::object()
        .with(
            "sposobKorespondencji",
            SchemaNode::one_of(&CORRESPONDENCE_METHODS),
        )
        .with("ulica", SchemaNode::string())
        .with("numerDomu", SchemaNode::string())
        .with("numerLokalu", SchemaNode::string())
        .with("kodPocztowy", SchemaNode::string())
        .with("miejscowosc", SchemaNode::string())
        .with("nazwaPanstwa", SchemaNode::string())
}

fn injured_person() -> SchemaNode {
    SchemaNode::object()
        .with("pesel", SchemaNode::string().matching(&PESEL))
        .with("dokumentTozsamosci", identity_document())
        .with("imie", SchemaNode::string().min_length(1))
        .with("nazwisko", SchemaNode::string().min_length(1))
        .with("dataUrodzenia", SchemaNode::date())
        .with("miejsceUrodzenia", SchemaNode::string())
        .with("numerTelefonu", SchemaNode::string())
        .require(&["imie", "nazwisko"])
}

fn reporter() -> SchemaNode {
    SchemaNode::object()
        .with("jestPoszkodowanym", SchemaNode::boolean())
        .with("pesel", SchemaNode::string().matching(&PESEL))
        .with("dokumentTozsamosci", identity_document())
        .with("imie", SchemaNode::string())
        .with("nazwisko", SchemaNode::string())
        .with("dataUrodzenia", SchemaNode::date())
        .with("numerTelefonu", SchemaNode::string())
}

fn accident() -> SchemaNode {
    SchemaNode::object()
        .with("dataWypadku", SchemaNode::date())
        .with("godzinaWypadku", SchemaNode::time())
        .with("miejsceWypadku", SchemaNode::string().min_length(1))
        .with("planowanaGodzinaRozpoczeciaPracy", SchemaNode::time())
        .with("planowanaGodzinaZakonczeniaPracy", SchemaNode::time())
        .with("rodzajDoznanychUrazow", SchemaNode::string())
        .with("opisOkolicznosciMiejscaIPrzyczyn", SchemaNode::string().min_length(1))
        .with("pierwszaPomocUdzielona", SchemaNode::boolean())
        .with("placowkaUdzielajacaPierwszejPomocy", SchemaNode::string())
        .with("organProwadzacyPostepowanie", SchemaNode::string())
        .with("wypadekPodczasObslugiMaszynLubUrzadzen", SchemaNode::boolean())
        .with("opisStanuMaszynyIUzytkowania", SchemaNode::string())
        .with("maszynaPosiadaAtestLubDeklaracjeZgodnosci", SchemaNode::boolean())
        .with("maszynaWpisanaDoEwidencjiSrodkowTrwalych", SchemaNode::boolean())
        .require(&["dataWypadku", "miejsceWypadku", "opisOkolicznosciMiejscaIPrzyczyn"])
        .depends(
            "opisStanuMaszynyIUzytkowania",
            &["wypadekPodczasObslugiMaszynLubUrzadzen"],
        )
        .depends(
            "placowkaUdzielajacaPierwszejPomocy",
            &["pierwszaPomocUdzielona"],
        )
}

fn witness() -> SchemaNode {
    SchemaNode::object()
        .with("imie", SchemaNode::string())
        .with("nazwisko", SchemaNode::string())
        .with("adres", address_with_country())
}

fn attachments() -> SchemaNode {
    SchemaNode::object()
        .with(
            "kartaInformacyjnaLubZaswiadczeniePierwszejPomocy",
            SchemaNode::boolean(),
        )
        .with("postanowienieProkuratury", SchemaNode::boolean())
        .with("dokumentyDotyczaceZgonu", SchemaNode::boolean())
        .with(
            "dokumentyPotwierdzajacePrawoDoKartyWypadkuDlaInnejOsoby",
            SchemaNode::boolean(),
        )
        .with("inneDokumentyOpis", SchemaNode::string())
}

/// Accident notification (ZUS EWYP)
pub fn notification() -> SchemaNode {
    SchemaNode::object()
        .with("daneOsobyPoszkodowanej", injured_person())
        .with("adresZamieszkaniaOsobyPoszkodowanej", address_with_country())
        .with(
            "adresOstatniegoMiejscaZamieszkaniaWPolsceLubPobytuPoszkodowanego",
            domestic_address(),
        )
        .with("adresDoKorespondencjiOsobyPoszkodowanej", correspondence_address())
        .with(
            "adresMiejscaProwadzeniaPozarolniczejDzialalnosci",
            address_with_phone(),
        )
        .with("adresSprawowaniaOpiekiNadDzieckiemDoLat3", address_with_phone())
        .with("daneOsobyKtoraZawiadamia", reporter())
        .with("adresZamieszkaniaOsobyKtoraZawiadamia", address_with_country())
        .with(
            "adresOstatniegoMiejscaZamieszkaniaWPolsceLubPobytuOsobyKtoraZawiadamia",
            domestic_address(),
        )
        .with("adresDoKorespondencjiOsobyKtoraZawiadamia", correspondence_address())
        .with("informacjaOWypadku", accident())
        .with(
            "daneSwiadkowWypadku",
            SchemaNode::array_of(witness()).max_items(MAX_WITNESSES),
        )
        .with("zalaczniki", attachments())
        .with(
            "dokumentyDoDostarczeniaPozniej",
            SchemaNode::object()
                .with("dataDo", SchemaNode::date())
                .with("listaDokumentow", SchemaNode::array_of(SchemaNode::string())),
        )
        .with("sposobOdbioruOdpowiedzi", SchemaNode::one_of(&RESPONSE_METHODS))
        .with(
            "oswiadczenie",
            SchemaNode::object()
                .with("dataZlozenia", SchemaNode::date())
                .with("podpis", SchemaNode::string()),
        )
        .require(&[
            "daneOsobyPoszkodowanej",
            "adresZamieszkaniaOsobyPoszkodowanej",
            "informacjaOWypadku",
        ])
        .depends(
            "daneOsobyKtoraZawiadamia",
            &["adresZamieszkaniaOsobyKtoraZawiadamia"],
        )
}

/// Victim's explanation ("Wyjaśnienia poszkodowanego")
pub fn explanation() -> SchemaNode {
    SchemaNode::object()
        .with("imieNazwisko", SchemaNode::string().min_length(1))
        .with("dataUrodzenia", SchemaNode::date())
        .with("miejsceUrodzenia", SchemaNode::string())
        .with("adresZamieszkania", SchemaNode::string())
        .with("zatrudnienie", SchemaNode::string())
        .with("dokumentTozsamosci", SchemaNode::string())
        .with("dataWypadku", SchemaNode::date())
        .with("miejsceWypadku", SchemaNode::string().min_length(1))
        .with("godzinaWypadku", SchemaNode::time())
        .with("planowanaGodzinaRozpoczeciaPracy", SchemaNode::time())
        .with("planowanaGodzinaZakonczeniaPracy", SchemaNode::time())
        .with("rodzajCzynnosciPrzedWypadkiem", SchemaNode::string())
        .with("opisOkolicznosciWypadku", SchemaNode::string().min_length(1))
        .with("czyWypadekPodczasObslugiMaszyn", SchemaNode::boolean())
        .with("nazwaTypUrzadzenia", SchemaNode::string())
        .with("dataProdukcjiUrzadzenia", SchemaNode::date())
        .with("czyUrzadzenieSprawneIUzytkowanePrawidlowo", SchemaNode::string())
        .with("czyBylyZabezpieczenia", SchemaNode::boolean())
        .with("rodzajZabezpieczen", SchemaNode::string())
        .with("czySrodkiWlasciweISprawne", SchemaNode::boolean())
        .with("czyAsekuracja", SchemaNode::boolean())
        .with("czyObowiazekPracyPrzezDwieOsoby", SchemaNode::boolean())
        .with("czyPrzestrzeganoZasadBHP", SchemaNode::boolean())
        .with("czyPosiadamPrzygotowanieZawodowe", SchemaNode::boolean())
        .with("czyOdbylemSzkolenieBHP", SchemaNode::boolean())
        .with("czyPosiadamOceneRyzykaZawodowego", SchemaNode::boolean())
        .with("stosowaneSrodkiZmniejszajaceRyzyko", SchemaNode::string())
        .with("czyWStanieNietrzezwosci", SchemaNode::boolean())
        .with("stanTrzezwosciBadany", SchemaNode::one_of(&SOBRIETY_TESTS))
        .with("czyOrganyPodejmowalyCzynnosci", SchemaNode::boolean())
        .with("organyISzczegoly", SchemaNode::string())
        .with("pierwszaPomocData", SchemaNode::date())
        .with("nazwaPlacowkiZdrowia", SchemaNode::string())
        .with("okresIMiejsceHospitalizacji", SchemaNode::string())
        .with("rozpoznanyUraz", SchemaNode::string())
        .with("niezdolnoscDoPracy", SchemaNode::string())
        .with("czyNaZwolnieniuWLacuWypadku", SchemaNode::boolean())
        .with("dataPodpisania", SchemaNode::date())
        .require(&[
            "imieNazwisko",
            "dataWypadku",
            "miejsceWypadku",
            "opisOkolicznosciWypadku",
        ])
        .depends("stanTrzezwosciBadany", &["czyWStanieNietrzezwosci"])
        .depends("nazwaTypUrzadzenia", &["czyWypadekPodczasObslugiMaszyn"])
}

#[cfg(test)]
mod tests {
    use crate::model::{CorrespondenceMethod, ResponseMethod, SobrietyTest};
    use crate::schema::FormSchema;
    use serde_json::json;

    fn minimal_notification() -> serde_json::Value {
        json!({
            "daneOsobyPoszkodowanej": {"imie": "Jan", "nazwisko": "Kowalski", "dataUrodzenia": "1990-01-15"},
            "adresZamieszkaniaOsobyPoszkodowanej": {"miejscowosc": "Warszawa"},
            "informacjaOWypadku": {
                "dataWypadku": "2024-03-10",
                "miejsceWypadku": "Warszawa",
                "opisOkolicznosciMiejscaIPrzyczyn": "Upadek na śliskiej podłodze"
            }
        })
    }

    #[test]
    fn test_minimal_notification_is_valid() {
        let report = FormSchema::notification().validate(&minimal_notification());
        assert!(report.success, "{:?}", report.errors);
    }

    #[test]
    fn test_enum_lists_match_model() {
        for code in super::CORRESPONDENCE_METHODS {
            serde_json::from_value::<CorrespondenceMethod>(json!(code)).unwrap();
        }
        for code in super::RESPONSE_METHODS {
            serde_json::from_value::<ResponseMethod>(json!(code)).unwrap();
        }
        for code in super::SOBRIETY_TESTS {
            assert!(SobrietyTest::from_code(code).is_some());
        }
    }

    #[test]
    fn test_pesel_and_postal_code_patterns() {
        let mut doc = minimal_notification();
        doc["daneOsobyPoszkodowanej"]["pesel"] = json!("9001151234");
        doc["adresOstatniegoMiejscaZamieszkaniaWPolsceLubPobytuPoszkodowanego"] =
            json!({"kodPocztowy": "00950"});

        let report = FormSchema::notification().validate(&doc);
        let paths: Vec<_> = report.errors.iter().map(|e| e.dotted_path()).collect();
        assert_eq!(
            paths,
            vec![
                "daneOsobyPoszkodowanej.pesel",
                "adresOstatniegoMiejscaZamieszkaniaWPolsceLubPobytuPoszkodowanego.kodPocztowy"
            ]
        );
    }

    #[test]
    fn test_foreign_postal_code_is_accepted() {
        let mut doc = minimal_notification();
        doc["adresZamieszkaniaOsobyPoszkodowanej"]["kodPocztowy"] = json!("10115");
        assert!(FormSchema::notification().validate(&doc).success);
    }

    #[test]
    fn test_reporter_requires_home_address() {
        let mut doc = minimal_notification();
        doc["daneOsobyKtoraZawiadamia"] = json!({"imie": "Anna"});
        let report = FormSchema::notification().validate(&doc);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0].dotted_path(),
            "adresZamieszkaniaOsobyKtoraZawiadamia"
        );
    }

    #[test]
    fn test_identity_document_parts_require_each_other() {
        let mut doc = minimal_notification();
        doc["daneOsobyPoszkodowanej"]["dokumentTozsamosci"] = json!({"rodzaj": "paszport"});
        let report = FormSchema::notification().validate(&doc);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0].dotted_path(),
            "daneOsobyPoszkodowanej.dokumentTozsamosci.seriaINumer"
        );
    }

    #[test]
    fn test_too_many_witnesses() {
        let mut doc = minimal_notification();
        doc["daneSwiadkowWypadku"] = json!([{}, {}, {}, {}]);
        let report = FormSchema::notification().validate(&doc);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].dotted_path(), "daneSwiadkowWypadku");
    }

    #[test]
    fn test_explanation_sobriety_depends_on_flag() {
        let report = FormSchema::explanation().validate(&json!({
            "imieNazwisko": "Jan Kowalski",
            "dataWypadku": "2024-03-10",
            "miejsceWypadku": "Warszawa",
            "opisOkolicznosciWypadku": "Upadek",
            "stanTrzezwosciBadany": "nie_badany"
        }));
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].dotted_path(), "czyWStanieNietrzezwosci");
    }
}
