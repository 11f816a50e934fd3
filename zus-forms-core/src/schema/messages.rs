//! Translation of validator messages into Polish
//!
//! Messages are matched by shape. Anything that is not recognized is
//! returned unchanged so no error is ever hidden.

use super::PathSegment;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref REQUIRED: Regex = Regex::new(r"^'(?P<key>.+)' is a required property$").unwrap();
    static ref WRONG_TYPE: Regex =
        Regex::new(r"^(?P<value>.+) is not of type '(?P<kind>\w+)'$").unwrap();
    static ref NOT_IN_ENUM: Regex =
        Regex::new(r"^(?P<value>.+) is not one of \[(?P<allowed>.*)\]$").unwrap();
    static ref NO_MATCH: Regex = Regex::new(r"^(?P<value>.+) does not match '.+'$").unwrap();
    static ref BAD_FORMAT: Regex =
        Regex::new(r"^(?P<value>.+) is not a '(?P<format>date|time)'$").unwrap();

    /// Display names of schema keys
    static ref FIELD_NAMES: HashMap<&'static str, &'static str> = {
        let mut names = HashMap::new();

        // Sections
        names.insert("daneOsobyPoszkodowanej", "Dane osoby poszkodowanej");
        names.insert("adresZamieszkaniaOsobyPoszkodowanej", "Adres zamieszkania osoby poszkodowanej");
        names.insert(
            "adresOstatniegoMiejscaZamieszkaniaWPolsceLubPobytuPoszkodowanego",
            "Adres ostatniego miejsca zamieszkania w Polsce osoby poszkodowanej",
        );
        names.insert("adresDoKorespondencjiOsobyPoszkodowanej", "Adres do korespondencji osoby poszkodowanej");
        names.insert(
            "adresMiejscaProwadzeniaPozarolniczejDzialalnosci",
            "Adres miejsca prowadzenia działalności",
        );
        names.insert(
            "adresSprawowaniaOpiekiNadDzieckiemDoLat3",
            "Adres sprawowania opieki nad dzieckiem do lat 3",
        );
        names.insert("daneOsobyKtoraZawiadamia", "Dane osoby zawiadamiającej");
        names.insert("adresZamieszkaniaOsobyKtoraZawiadamia", "Adres zamieszkania osoby zawiadamiającej");
        names.insert(
            "adresOstatniegoMiejscaZamieszkaniaWPolsceLubPobytuOsobyKtoraZawiadamia",
            "Adres ostatniego miejsca zamieszkania w Polsce osoby zawiadamiającej",
        );
        names.insert("adresDoKorespondencjiOsobyKtoraZawiadamia", "Adres do korespondencji osoby zawiadamiającej");
        names.insert("informacjaOWypadku", "Informacja o wypadku");
        names.insert("daneSwiadkowWypadku", "Świadek");
        names.insert("zalaczniki", "Załączniki");
        names.insert("dokumentyDoDostarczeniaPozniej", "Dokumenty do dostarczenia później");
        names.insert("sposobOdbioruOdpowiedzi", "Sposób odbioru odpowiedzi");
        names.insert("oswiadczenie", "Oświadczenie");

        // Personal data and addresses
        names.insert("pesel", "PESEL");
        names.insert("dokumentTozsamosci", "Dokument tożsamości");
        names.insert("rodzaj", "Rodzaj dokumentu");
        names.insert("seriaINumer", "Seria i numer dokumentu");
        names.insert("imie", "Imię");
        names.insert("nazwisko", "Nazwisko");
        names.insert("dataUrodzenia", "Data urodzenia");
        names.insert("miejsceUrodzenia", "Miejsce urodzenia");
        names.insert("numerTelefonu", "Numer telefonu");
        names.insert("jestPoszkodowanym", "Zawiadamiający jest poszkodowanym");
        names.insert("ulica", "Ulica");
        names.insert("numerDomu", "Numer domu");
        names.insert("numerLokalu", "Numer lokalu");
        names.insert("kodPocztowy", "Kod pocztowy");
        names.insert("miejscowosc", "Miejscowość");
        names.insert("nazwaPanstwa", "Nazwa państwa");
        names.insert("sposobKorespondencji", "Sposób korespondencji");
        names.insert("adres", "Adres");

        // Accident
        names.insert("dataWypadku", "Data wypadku");
        names.insert("godzinaWypadku", "Godzina wypadku");
        names.insert("miejsceWypadku", "Miejsce wypadku");
        names.insert("planowanaGodzinaRozpoczeciaPracy", "Planowana godzina rozpoczęcia pracy");
        names.insert("planowanaGodzinaZakonczeniaPracy", "Planowana godzina zakończenia pracy");
        names.insert("rodzajDoznanychUrazow", "Rodzaj doznanych urazów");
        names.insert("opisOkolicznosciMiejscaIPrzyczyn", "Opis okoliczności, miejsca i przyczyn wypadku");
        names.insert("pierwszaPomocUdzielona", "Udzielono pierwszej pomocy");
        names.insert("placowkaUdzielajacaPierwszejPomocy", "Placówka udzielająca pierwszej pomocy");
        names.insert("organProwadzacyPostepowanie", "Organ prowadzący postępowanie");
        names.insert("wypadekPodczasObslugiMaszynLubUrzadzen", "Wypadek podczas obsługi maszyn lub urządzeń");
        names.insert("opisStanuMaszynyIUzytkowania", "Opis stanu maszyny i sposobu użytkowania");
        names.insert("maszynaPosiadaAtestLubDeklaracjeZgodnosci", "Maszyna posiada atest lub deklarację zgodności");
        names.insert("maszynaWpisanaDoEwidencjiSrodkowTrwalych", "Maszyna wpisana do ewidencji środków trwałych");

        // Attachments and declaration
        names.insert(
            "kartaInformacyjnaLubZaswiadczeniePierwszejPomocy",
            "Karta informacyjna lub zaświadczenie o udzieleniu pierwszej pomocy",
        );
        names.insert("postanowienieProkuratury", "Postanowienie prokuratury");
        names.insert("dokumentyDotyczaceZgonu", "Dokumenty dotyczące zgonu");
        names.insert(
            "dokumentyPotwierdzajacePrawoDoKartyWypadkuDlaInnejOsoby",
            "Dokumenty potwierdzające prawo do karty wypadku dla innej osoby",
        );
        names.insert("inneDokumentyOpis", "Inne dokumenty");
        names.insert("dataDo", "Termin dostarczenia dokumentów");
        names.insert("listaDokumentow", "Lista dokumentów");
        names.insert("dataZlozenia", "Data złożenia");
        names.insert("podpis", "Podpis");

        // Victim's explanation
        names.insert("imieNazwisko", "Imię i nazwisko");
        names.insert("adresZamieszkania", "Adres zamieszkania");
        names.insert("zatrudnienie", "Zatrudnienie");
        names.insert("rodzajCzynnosciPrzedWypadkiem", "Rodzaj czynności przed wypadkiem");
        names.insert("opisOkolicznosciWypadku", "Opis okoliczności wypadku");
        names.insert("czyWypadekPodczasObslugiMaszyn", "Wypadek podczas obsługi maszyn");
        names.insert("nazwaTypUrzadzenia", "Nazwa i typ urządzenia");
        names.insert("dataProdukcjiUrzadzenia", "Data produkcji urządzenia");
        names.insert(
            "czyUrzadzenieSprawneIUzytkowanePrawidlowo",
            "Sprawność i sposób użytkowania urządzenia",
        );
        names.insert("czyBylyZabezpieczenia", "Stosowano zabezpieczenia");
        names.insert("rodzajZabezpieczen", "Rodzaj zabezpieczeń");
        names.insert("czySrodkiWlasciweISprawne", "Zabezpieczenia właściwe i sprawne");
        names.insert("czyAsekuracja", "Asekuracja");
        names.insert("czyObowiazekPracyPrzezDwieOsoby", "Obowiązek pracy przez dwie osoby");
        names.insert("czyPrzestrzeganoZasadBHP", "Przestrzeganie zasad BHP");
        names.insert("czyPosiadamPrzygotowanieZawodowe", "Przygotowanie zawodowe");
        names.insert("czyOdbylemSzkolenieBHP", "Szkolenie BHP");
        names.insert("czyPosiadamOceneRyzykaZawodowego", "Ocena ryzyka zawodowego");
        names.insert("stosowaneSrodkiZmniejszajaceRyzyko", "Środki zmniejszające ryzyko");
        names.insert("czyWStanieNietrzezwosci", "Stan nietrzeźwości");
        names.insert("stanTrzezwosciBadany", "Badanie stanu trzeźwości");
        names.insert("czyOrganyPodejmowalyCzynnosci", "Czynności organów państwowych");
        names.insert("organyISzczegoly", "Organy i szczegóły czynności");
        names.insert("pierwszaPomocData", "Data udzielenia pierwszej pomocy");
        names.insert("nazwaPlacowkiZdrowia", "Placówka służby zdrowia");
        names.insert("okresIMiejsceHospitalizacji", "Okres i miejsce hospitalizacji");
        names.insert("rozpoznanyUraz", "Rozpoznany uraz");
        names.insert("niezdolnoscDoPracy", "Niezdolność do pracy");
        names.insert("czyNaZwolnieniuWLacuWypadku", "Zwolnienie lekarskie w dniu wypadku");
        names.insert("dataPodpisania", "Data podpisania");

        names
    };
}

/// Display name of a single schema key; unknown keys are returned as is
pub fn field_label(key: &str) -> &str {
    FIELD_NAMES.get(key).copied().unwrap_or(key)
}

/// Display name of the field at `path`, qualified by its section for nested
/// paths, e.g. `Imię (Świadek 2)`
pub fn human_field_name(path: &[PathSegment]) -> String {
    let keys: Vec<&str> = path
        .iter()
        .filter_map(|segment| match segment {
            PathSegment::Key(key) => Some(key.as_str()),
            PathSegment::Index(_) => None,
        })
        .collect();

    let Some(last) = keys.last() else {
        return "Dokument".to_string();
    };
    let name = field_label(last);
    if keys.len() < 2 {
        return name.to_string();
    }

    let mut section = field_label(keys[0]).to_string();
    if let Some(PathSegment::Index(index)) = path.get(1) {
        section.push_str(&format!(" {}", index + 1));
    }
    format!("{name} ({section})")
}

fn type_description(kind: &str) -> Option<&'static str> {
    Some(match kind {
        "string" => "tekstem",
        "boolean" => "wartością tak/nie",
        "integer" => "liczbą całkowitą",
        "object" => "zestawem pól",
        "array" => "listą",
        _ => return None,
    })
}

fn format_hint(path: &[PathSegment]) -> &'static str {
    match path.last() {
        Some(PathSegment::Key(key)) if key == "pesel" => " PESEL składa się z 11 cyfr.",
        Some(PathSegment::Key(key)) if key == "kodPocztowy" => " Oczekiwano formatu 00-000.",
        _ => "",
    }
}

/// Translate a raw validator message. Returns the message and the human
/// field name; unrecognized messages are passed through untouched.
pub fn humanize(path: &[PathSegment], raw: &str) -> (String, String) {
    let name = human_field_name(path);

    let message = if REQUIRED.is_match(raw) {
        format!("Pole \"{name}\" jest wymagane.")
    } else if let Some(caps) = WRONG_TYPE.captures(raw) {
        match type_description(&caps["kind"]) {
            Some(expected) => format!("Pole \"{name}\" musi być {expected}."),
            None => raw.to_string(),
        }
    } else if let Some(caps) = NOT_IN_ENUM.captures(raw) {
        format!(
            "Pole \"{name}\" ma niedozwoloną wartość {}. Dozwolone wartości: {}.",
            &caps["value"], &caps["allowed"]
        )
    } else if let Some(caps) = BAD_FORMAT.captures(raw) {
        match &caps["format"] {
            "date" => format!("Pole \"{name}\" musi zawierać poprawną datę w formacie RRRR-MM-DD."),
            _ => format!("Pole \"{name}\" musi zawierać godzinę w formacie GG:MM."),
        }
    } else if NO_MATCH.is_match(raw) {
        format!("Pole \"{name}\" ma nieprawidłowy format.{}", format_hint(path))
    } else {
        raw.to_string()
    };

    (message, name)
}
