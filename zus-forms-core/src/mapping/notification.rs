//! ZUS EWYP notification: six pages of `topmostSubform[0].PageN[0]` widgets

use super::{FieldMappingEntry as E, Section};
use crate::dates::DateStyle;

/// Witness blocks on page 5. The third block uses differently named widgets.
const WITNESS_SLOTS: [(&str, usize); 3] = [("", 0), ("", 1), ("2", 0)];

/// Page 6 lines for documents delivered later
const DEFERRED_DOCUMENT_LINES: usize = 8;

fn w(page: u8, name: &str) -> String {
    format!("topmostSubform[0].Page{page}[0].{name}")
}

fn compact_date(path: &str, widget: String) -> E {
    E::date(path, vec![widget], DateStyle::Compact)
}

/// Street address block sharing one widget suffix, e.g. `Ulica2A[0]`
fn address(prefix: &str, page: u8, suffix: &str, index: usize, out: &mut Vec<E>) {
    for (key, widget) in [
        ("ulica", "Ulica"),
        ("numerDomu", "Numerdomu"),
        ("numerLokalu", "Numerlokalu"),
        ("kodPocztowy", "Kodpocztowy"),
        ("miejscowosc", "Poczta"),
    ] {
        out.push(E::direct(
            format!("{prefix}.{key}"),
            w(page, &format!("{widget}{suffix}[{index}]")),
        ));
    }
}

fn correspondence_method(prefix: &str, page: u8, section: Section) -> E {
    E::enum_choice(
        format!("{prefix}.sposobKorespondencji"),
        section,
        vec![
            ("adres", w(page, "adres[0]")),
            ("poste_restante", w(page, "posterestante[0]")),
            ("skrytka_pocztowa", w(page, "skrytkapocztowa[0]")),
            ("przegrodka_pocztowa", w(page, "przegrodkapocztowa[0]")),
        ],
    )
}

pub(super) fn entries() -> Vec<E> {
    let mut out = Vec::new();

    // Page 1: injured person
    let person = "daneOsobyPoszkodowanej";
    out.push(E::direct(format!("{person}.pesel"), w(1, "PESEL[0]")));
    out.push(E::composite(
        format!("{person}.dokumentTozsamosci"),
        w(1, "Rodzajseriainumerdokumentu[0]"),
    ));
    out.push(E::direct(format!("{person}.imie"), w(1, "Imię[0]")));
    out.push(E::direct(format!("{person}.nazwisko"), w(1, "Nazwisko[0]")));
    out.push(compact_date(&format!("{person}.dataUrodzenia"), w(1, "Dataurodzenia[0]")));
    out.push(E::direct(format!("{person}.miejsceUrodzenia"), w(1, "Miejsceurodzenia[0]")));
    out.push(E::direct(format!("{person}.numerTelefonu"), w(1, "Numertelefonu[0]")));

    address("adresZamieszkaniaOsobyPoszkodowanej", 1, "", 0, &mut out);
    out.push(E::direct(
        "adresZamieszkaniaOsobyPoszkodowanej.nazwaPanstwa",
        w(1, "Nazwapaństwa[0]"),
    ));
    address(
        "adresOstatniegoMiejscaZamieszkaniaWPolsceLubPobytuPoszkodowanego",
        1,
        "2A",
        0,
        &mut out,
    );

    // Page 2: correspondence, business address, reporter
    let correspondence = "adresDoKorespondencjiOsobyPoszkodowanej";
    address(correspondence, 2, "", 0, &mut out);
    out.push(E::direct(
        format!("{correspondence}.nazwaPanstwa"),
        w(2, "Nazwapaństwa2[0]"),
    ));
    out.push(correspondence_method(correspondence, 2, Section::InjuredPerson));

    let business = "adresMiejscaProwadzeniaPozarolniczejDzialalnosci";
    address(business, 2, "2", 0, &mut out);
    out.push(E::direct(
        format!("{business}.numerTelefonu"),
        w(2, "Numertelefonu2[0]"),
    ));

    let reporter = "daneOsobyKtoraZawiadamia";
    out.push(E::direct(format!("{reporter}.pesel"), w(2, "PESEL[0]")));
    out.push(E::composite(
        format!("{reporter}.dokumentTozsamosci"),
        w(2, "Rodzajseriainumerdokumentu[0]"),
    ));
    out.push(E::direct(format!("{reporter}.imie"), w(2, "Imię[0]")));
    out.push(E::direct(format!("{reporter}.nazwisko"), w(2, "Nazwisko[0]")));
    address("adresZamieszkaniaOsobyKtoraZawiadamia", 2, "2", 1, &mut out);

    // Page 3: accident time and place, childcare address, reporter addresses
    let accident = "informacjaOWypadku";
    out.push(compact_date(&format!("{accident}.dataWypadku"), w(3, "Datawyp[0]")));
    out.push(E::direct(format!("{accident}.godzinaWypadku"), w(3, "Godzina[0]")));
    out.push(E::direct(format!("{accident}.miejsceWypadku"), w(3, "Miejscewyp[0]")));
    out.push(E::direct(
        format!("{accident}.planowanaGodzinaRozpoczeciaPracy"),
        w(3, "Godzina3A[0]"),
    ));
    out.push(E::direct(
        format!("{accident}.planowanaGodzinaZakonczeniaPracy"),
        w(3, "Godzina3B[0]"),
    ));

    let childcare = "adresSprawowaniaOpiekiNadDzieckiemDoLat3";
    address(childcare, 3, "3", 0, &mut out);
    // The template has a single phone box on page 3 for both blocks
    out.push(E::direct(format!("{childcare}.numerTelefonu"), w(3, "Numertelefonu3[0]")).shared(0));
    out.push(compact_date(&format!("{reporter}.dataUrodzenia"), w(3, "Dataurodzenia[0]")));
    out.push(E::direct(format!("{reporter}.numerTelefonu"), w(3, "Numertelefonu3[0]")).shared(1));

    address(
        "adresOstatniegoMiejscaZamieszkaniaWPolsceLubPobytuOsobyKtoraZawiadamia",
        3,
        "2",
        0,
        &mut out,
    );
    let reporter_correspondence = "adresDoKorespondencjiOsobyKtoraZawiadamia";
    address(reporter_correspondence, 3, "2A", 0, &mut out);
    out.push(E::direct(
        format!("{reporter_correspondence}.nazwaPanstwa"),
        w(3, "Nazwapaństwa2[0]"),
    ));
    out.push(correspondence_method(reporter_correspondence, 3, Section::Reporter));

    // Page 4: accident details
    for (key, widget) in [
        ("rodzajDoznanychUrazow", "Tekst4[0]"),
        ("opisOkolicznosciMiejscaIPrzyczyn", "Tekst5[0]"),
        ("placowkaUdzielajacaPierwszejPomocy", "Tekst6[0]"),
        ("organProwadzacyPostepowanie", "Tekst7[0]"),
        ("opisStanuMaszynyIUzytkowania", "Tekst8[0]"),
    ] {
        out.push(E::direct(format!("{accident}.{key}"), w(4, widget)));
    }
    for (key, number) in [
        ("pierwszaPomocUdzielona", 6),
        ("wypadekPodczasObslugiMaszynLubUrzadzen", 8),
        ("maszynaPosiadaAtestLubDeklaracjeZgodnosci", 9),
        ("maszynaWpisanaDoEwidencjiSrodkowTrwalych", 10),
    ] {
        out.push(E::boolean_pair(
            format!("{accident}.{key}"),
            w(4, &format!("TAK{number}[0]")),
            w(4, &format!("NIE{number}[0]")),
        ));
    }

    // Page 5: witnesses
    for (slot, (suffix, index)) in WITNESS_SLOTS.iter().enumerate() {
        let prefix = format!("daneSwiadkowWypadku.{slot}");
        out.push(E::direct(
            format!("{prefix}.imie"),
            w(5, &format!("Imię{suffix}[{index}]")),
        ));
        out.push(E::direct(
            format!("{prefix}.nazwisko"),
            w(5, &format!("Nazwisko{suffix}[{index}]")),
        ));
        address(&format!("{prefix}.adres"), 5, suffix, *index, &mut out);
        out.push(E::direct(
            format!("{prefix}.adres.nazwaPanstwa"),
            w(5, &format!("Nazwapaństwa{suffix}[{index}]")),
        ));
    }

    // Pages 5 and 6: attachments
    for (key, widget) in [
        ("kartaInformacyjnaLubZaswiadczeniePierwszejPomocy", w(5, "ZaznaczX1[0]")),
        ("postanowienieProkuratury", w(5, "ZaznaczX2[0]")),
        ("dokumentyDotyczaceZgonu", w(5, "ZaznaczX3[0]")),
        (
            "dokumentyPotwierdzajacePrawoDoKartyWypadkuDlaInnejOsoby",
            w(6, "ZaznaczX4[0]"),
        ),
    ] {
        out.push(E::checkbox(format!("zalaczniki.{key}"), widget));
    }
    out.push(E::direct("zalaczniki.inneDokumentyOpis", w(6, "Inne[0]")));

    // Page 6: deferred documents, response method, declaration
    let deferred = "dokumentyDoDostarczeniaPozniej";
    out.push(compact_date(&format!("{deferred}.dataDo"), w(6, "Data[0]")));
    for line in 0..DEFERRED_DOCUMENT_LINES {
        out.push(E::direct(
            format!("{deferred}.listaDokumentow.{line}"),
            w(6, &format!("Inne{}[0]", line + 1)),
        ));
    }

    out.push(E::enum_choice(
        "sposobOdbioruOdpowiedzi",
        Section::Response,
        vec![
            ("w_placowce_ZUS", w(6, "wplacowce[0]")),
            ("poczta_na_adres_wskazany_we_wniosku", w(6, "poczta[0]")),
            ("na_koncie_PUE_ZUS", w(6, "PUE[0]")),
        ],
    ));
    out.push(compact_date("oswiadczenie.dataZlozenia", w(6, "Data[1]")));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;
    use crate::mapping::{FieldMappingTable, Transform, WidgetValue};
    use serde_json::json;

    #[test]
    fn test_witness_widgets() {
        let table = FieldMappingTable::notification();
        let first = table.entry("daneSwiadkowWypadku.0.adres.miejscowosc").unwrap();
        assert_eq!(first.widgets, vec![w(5, "Poczta[0]")]);
        let second = table.entry("daneSwiadkowWypadku.1.imie").unwrap();
        assert_eq!(second.widgets, vec![w(5, "Imię[1]")]);
        let third = table.entry("daneSwiadkowWypadku.2.adres.nazwaPanstwa").unwrap();
        assert_eq!(third.widgets, vec![w(5, "Nazwapaństwa2[0]")]);
        assert!(table.entry("daneSwiadkowWypadku.3.imie").is_none());
    }

    #[test]
    fn test_enum_sections_are_explicit() {
        let table = FieldMappingTable::notification();
        let sections: Vec<_> = table
            .entries()
            .iter()
            .filter_map(|e| match &e.transform {
                Transform::EnumChoice { section, .. } => Some((e.path.as_str(), *section)),
                _ => None,
            })
            .collect();
        assert_eq!(
            sections,
            vec![
                (
                    "adresDoKorespondencjiOsobyPoszkodowanej.sposobKorespondencji",
                    Section::InjuredPerson
                ),
                (
                    "adresDoKorespondencjiOsobyKtoraZawiadamia.sposobKorespondencji",
                    Section::Reporter
                ),
                ("sposobOdbioruOdpowiedzi", Section::Response),
            ]
        );
    }

    #[test]
    fn test_resolve_sample_notification() {
        let flat = flatten(&json!({
            "daneOsobyPoszkodowanej": {
                "imie": "Jan",
                "nazwisko": "Kowalski",
                "dataUrodzenia": "1990-01-15",
                "dokumentTozsamosci": {"rodzaj": "dowód osobisty", "seriaINumer": "ABC123456"}
            },
            "adresDoKorespondencjiOsobyKtoraZawiadamia": {"sposobKorespondencji": "poste_restante"},
            "informacjaOWypadku": {"pierwszaPomocUdzielona": false},
            "daneOsobyKtoraZawiadamia": {"numerTelefonu": "600100200"},
            "adresSprawowaniaOpiekiNadDzieckiemDoLat3": {"numerTelefonu": "700100200"},
            "dokumentyDoDostarczeniaPozniej": {"listaDokumentow": ["zaświadczenie", "opinia"]}
        }));
        let resolved = FieldMappingTable::notification().resolve(&flat);

        let text = |name: &str| resolved.get(&w(1, name)).cloned();
        assert_eq!(text("Dataurodzenia[0]"), Some(WidgetValue::Text("15-01-90".into())));
        assert_eq!(
            text("Rodzajseriainumerdokumentu[0]"),
            Some(WidgetValue::Text("dowód osobisty ABC123456".into()))
        );
        assert_eq!(resolved.get(&w(3, "posterestante[0]")), Some(&WidgetValue::Checked));
        assert_eq!(resolved.get(&w(2, "posterestante[0]")), None);
        assert_eq!(resolved.get(&w(4, "NIE6[0]")), Some(&WidgetValue::Checked));
        assert_eq!(resolved.get(&w(4, "TAK6[0]")), None);
        assert_eq!(
            resolved.get(&w(3, "Numertelefonu3[0]")),
            Some(&WidgetValue::Text("600100200".into()))
        );
        assert_eq!(
            resolved.get(&w(6, "Inne2[0]")),
            Some(&WidgetValue::Text("opinia".into()))
        );
    }
}
