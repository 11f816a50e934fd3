//! Test Corpus Management
//!
//! Sample input documents with the outcome each one is expected to produce.

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use zus_forms::SchemaVariant;

/// Categories of test documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TestCategory {
    /// Required fields only
    Minimal,
    /// Most optional blocks present
    Complete,
    /// Extraction output with annotations and nulls
    Annotated,
    /// Documents the validator must reject
    Invalid,
}

/// Expected behavior when validating a test document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExpectedBehavior {
    Valid,
    /// Rejected with errors at exactly these dotted paths
    Invalid { error_paths: Vec<String> },
}

/// A document with its expected outcome
#[derive(Debug, Clone, Serialize)]
pub struct TestDocument {
    pub name: &'static str,
    pub description: &'static str,
    pub variant: SchemaVariant,
    pub category: TestCategory,
    pub data: Value,
    pub expected: ExpectedBehavior,
}

impl TestDocument {
    pub fn is_valid(&self) -> bool {
        self.expected == ExpectedBehavior::Valid
    }
}

/// Test corpus containing all sample documents
pub struct TestCorpus {
    documents: HashMap<TestCategory, Vec<TestDocument>>,
}

impl TestCorpus {
    /// Corpus of the built-in samples
    pub fn builtin() -> Self {
        let mut corpus = Self {
            documents: HashMap::new(),
        };
        for document in builtin_documents() {
            corpus
                .documents
                .entry(document.category)
                .or_default()
                .push(document);
        }
        corpus
    }

    pub fn by_category(&self, category: TestCategory) -> &[TestDocument] {
        self.documents
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn all(&self) -> impl Iterator<Item = &TestDocument> {
        self.documents.values().flatten()
    }

    pub fn get(&self, name: &str) -> Option<&TestDocument> {
        self.all().find(|d| d.name == name)
    }

    pub fn len(&self) -> usize {
        self.documents.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Notification with the required fields only
pub fn minimal_notification() -> Value {
    json!({
        "daneOsobyPoszkodowanej": {
            "imie": "Jan",
            "nazwisko": "Kowalski",
            "dataUrodzenia": "1990-01-15"
        },
        "adresZamieszkaniaOsobyPoszkodowanej": {"miejscowosc": "Warszawa"},
        "informacjaOWypadku": {
            "dataWypadku": "2024-03-10",
            "miejsceWypadku": "Warszawa",
            "opisOkolicznosciMiejscaIPrzyczyn": "Upadek na śliskiej podłodze"
        }
    })
}

/// Notification with most optional blocks filled in
pub fn complete_notification() -> Value {
    json!({
        "daneOsobyPoszkodowanej": {
            "pesel": "90011512345",
            "dokumentTozsamosci": {"rodzaj": "dowód osobisty", "seriaINumer": "ABC123456"},
            "imie": "Jan",
            "nazwisko": "Kowalski",
            "dataUrodzenia": "1990-01-15",
            "miejsceUrodzenia": "Radom",
            "numerTelefonu": "600100200"
        },
        "adresZamieszkaniaOsobyPoszkodowanej": {
            "ulica": "Marszałkowska",
            "numerDomu": "10",
            "numerLokalu": "4",
            "kodPocztowy": "00-001",
            "miejscowosc": "Warszawa",
            "nazwaPanstwa": "Polska"
        },
        "adresDoKorespondencjiOsobyPoszkodowanej": {
            "sposobKorespondencji": "adres",
            "ulica": "Prosta",
            "numerDomu": "2",
            "kodPocztowy": "00-850",
            "miejscowosc": "Warszawa"
        },
        "adresMiejscaProwadzeniaPozarolniczejDzialalnosci": {
            "ulica": "Przemysłowa",
            "numerDomu": "7",
            "kodPocztowy": "02-232",
            "miejscowosc": "Warszawa",
            "numerTelefonu": "221234567"
        },
        "daneOsobyKtoraZawiadamia": {
            "jestPoszkodowanym": false,
            "imie": "Anna",
            "nazwisko": "Kowalska",
            "dataUrodzenia": "1992-06-30",
            "numerTelefonu": "600300400"
        },
        "adresZamieszkaniaOsobyKtoraZawiadamia": {
            "ulica": "Marszałkowska",
            "numerDomu": "10",
            "kodPocztowy": "00-001",
            "miejscowosc": "Warszawa"
        },
        "informacjaOWypadku": {
            "dataWypadku": "2024-03-10",
            "godzinaWypadku": "08:45",
            "miejsceWypadku": "Hala magazynowa, ul. Przemysłowa 7",
            "planowanaGodzinaRozpoczeciaPracy": "07:00",
            "planowanaGodzinaZakonczeniaPracy": "15:00",
            "rodzajDoznanychUrazow": "Złamanie nadgarstka",
            "opisOkolicznosciMiejscaIPrzyczyn": "Poślizgnięcie na rozlanym oleju podczas przenoszenia palety",
            "pierwszaPomocUdzielona": true,
            "placowkaUdzielajacaPierwszejPomocy": "SOR Szpital Bielański",
            "wypadekPodczasObslugiMaszynLubUrzadzen": false
        },
        "daneSwiadkowWypadku": [
            {"imie": "Piotr", "nazwisko": "Nowak", "adres": {"miejscowosc": "Łódź"}},
            {"imie": "Ewa", "nazwisko": "Wiśniewska", "adres": {"ulica": "Leśna", "miejscowosc": "Piaseczno"}}
        ],
        "zalaczniki": {
            "kartaInformacyjnaLubZaswiadczeniePierwszejPomocy": true,
            "postanowienieProkuratury": false
        },
        "dokumentyDoDostarczeniaPozniej": {
            "dataDo": "2024-04-10",
            "listaDokumentow": ["zaświadczenie lekarskie", "opinia BHP"]
        },
        "sposobOdbioruOdpowiedzi": "na_koncie_PUE_ZUS",
        "oswiadczenie": {"dataZlozenia": "2024-03-12", "podpis": "Jan Kowalski"}
    })
}

/// Explanation with the required fields only
pub fn minimal_explanation() -> Value {
    json!({
        "imieNazwisko": "Jan Kowalski",
        "dataWypadku": "2024-03-10",
        "miejsceWypadku": "Hala magazynowa",
        "opisOkolicznosciWypadku": "Upadek na śliskiej podłodze"
    })
}

/// Explanation answering the yes/no questions
pub fn complete_explanation() -> Value {
    json!({
        "imieNazwisko": "Jan Kowalski",
        "dataUrodzenia": "1990-01-15",
        "miejsceUrodzenia": "Radom",
        "adresZamieszkania": "ul. Marszałkowska 10/4, 00-001 Warszawa",
        "zatrudnienie": "Magazynier, Firma Logistyczna Sp. z o.o.",
        "dataWypadku": "2024-03-10",
        "miejsceWypadku": "Hala magazynowa",
        "godzinaWypadku": "08:45",
        "planowanaGodzinaRozpoczeciaPracy": "07:00",
        "planowanaGodzinaZakonczeniaPracy": "15:00",
        "rodzajCzynnosciPrzedWypadkiem": "Przenoszenie palet",
        "opisOkolicznosciWypadku": "Poślizgnąłem się na rozlanym oleju",
        "czyWypadekPodczasObslugiMaszyn": false,
        "czyBylyZabezpieczenia": true,
        "rodzajZabezpieczen": "Obuwie ochronne",
        "czySrodkiWlasciweISprawne": true,
        "czyPrzestrzeganoZasadBHP": true,
        "czyOdbylemSzkolenieBHP": true,
        "czyWStanieNietrzezwosci": false,
        "stanTrzezwosciBadany": "nie_badany",
        "pierwszaPomocData": "2024-03-10",
        "nazwaPlacowkiZdrowia": "SOR Szpital Bielański",
        "rozpoznanyUraz": "Złamanie nadgarstka",
        "czyNaZwolnieniuWLacuWypadku": false,
        "dataPodpisania": "2024-03-12"
    })
}

/// Notification as returned by document extraction: annotated values and
/// explicit nulls
pub fn annotated_notification() -> Value {
    json!({
        "daneOsobyPoszkodowanej": {
            "imie": {"value": "Jan", "parsed": true, "confidence": 0.97},
            "nazwisko": {"value": "Kowalski", "parsed": true},
            "pesel": null,
            "dataUrodzenia": {"value": "1990-01-15", "parsed": true}
        },
        "adresZamieszkaniaOsobyPoszkodowanej": {"miejscowosc": "Warszawa", "ulica": null},
        "informacjaOWypadku": {
            "dataWypadku": "2024-03-10",
            "godzinaWypadku": null,
            "miejsceWypadku": {"value": "Warszawa", "parsed": true},
            "opisOkolicznosciMiejscaIPrzyczyn": "Upadek na śliskiej podłodze"
        },
        "daneSwiadkowWypadku": [null, {"imie": "Piotr", "nazwisko": null}]
    })
}

fn without(mut data: Value, parent: &str, key: &str) -> Value {
    if let Some(map) = data.get_mut(parent).and_then(Value::as_object_mut) {
        map.remove(key);
    }
    data
}

fn with(mut data: Value, parent: &str, key: &str, value: Value) -> Value {
    if let Some(map) = data.get_mut(parent).and_then(Value::as_object_mut) {
        map.insert(key.to_string(), value);
    }
    data
}

fn builtin_documents() -> Vec<TestDocument> {
    let invalid = |paths: &[&str]| ExpectedBehavior::Invalid {
        error_paths: paths.iter().map(|p| p.to_string()).collect(),
    };

    let mut explanation_without_name = minimal_explanation();
    if let Some(map) = explanation_without_name.as_object_mut() {
        map.remove("imieNazwisko");
    }
    let mut sobriety_without_question = minimal_explanation();
    if let Some(map) = sobriety_without_question.as_object_mut() {
        map.insert("stanTrzezwosciBadany".to_string(), json!("badany_przez_policje"));
    }

    vec![
        TestDocument {
            name: "notification_minimal",
            description: "Required fields only",
            variant: SchemaVariant::Notification,
            category: TestCategory::Minimal,
            data: minimal_notification(),
            expected: ExpectedBehavior::Valid,
        },
        TestDocument {
            name: "explanation_minimal",
            description: "Required fields only",
            variant: SchemaVariant::Explanation,
            category: TestCategory::Minimal,
            data: minimal_explanation(),
            expected: ExpectedBehavior::Valid,
        },
        TestDocument {
            name: "notification_complete",
            description: "Reporter, witnesses, attachments and deferred documents",
            variant: SchemaVariant::Notification,
            category: TestCategory::Complete,
            data: complete_notification(),
            expected: ExpectedBehavior::Valid,
        },
        TestDocument {
            name: "explanation_complete",
            description: "Yes/no answers and the sobriety test",
            variant: SchemaVariant::Explanation,
            category: TestCategory::Complete,
            data: complete_explanation(),
            expected: ExpectedBehavior::Valid,
        },
        TestDocument {
            name: "notification_annotated",
            description: "Extraction wrappers and explicit nulls",
            variant: SchemaVariant::Notification,
            category: TestCategory::Annotated,
            data: annotated_notification(),
            expected: ExpectedBehavior::Valid,
        },
        TestDocument {
            name: "notification_missing_place",
            description: "Place of accident omitted",
            variant: SchemaVariant::Notification,
            category: TestCategory::Invalid,
            data: without(minimal_notification(), "informacjaOWypadku", "miejsceWypadku"),
            expected: invalid(&["informacjaOWypadku.miejsceWypadku"]),
        },
        TestDocument {
            name: "notification_bad_pesel",
            description: "PESEL with ten digits",
            variant: SchemaVariant::Notification,
            category: TestCategory::Invalid,
            data: with(
                minimal_notification(),
                "daneOsobyPoszkodowanej",
                "pesel",
                json!("9001151234"),
            ),
            expected: invalid(&["daneOsobyPoszkodowanej.pesel"]),
        },
        TestDocument {
            name: "notification_bad_date",
            description: "Calendar date that does not exist",
            variant: SchemaVariant::Notification,
            category: TestCategory::Invalid,
            data: with(
                minimal_notification(),
                "informacjaOWypadku",
                "dataWypadku",
                json!("2024-02-30"),
            ),
            expected: invalid(&["informacjaOWypadku.dataWypadku"]),
        },
        TestDocument {
            name: "notification_bad_time",
            description: "Hour outside the 24 hour clock",
            variant: SchemaVariant::Notification,
            category: TestCategory::Invalid,
            data: with(
                minimal_notification(),
                "informacjaOWypadku",
                "godzinaWypadku",
                json!("25:10"),
            ),
            expected: invalid(&["informacjaOWypadku.godzinaWypadku"]),
        },
        TestDocument {
            name: "explanation_missing_name",
            description: "Victim name omitted",
            variant: SchemaVariant::Explanation,
            category: TestCategory::Invalid,
            data: explanation_without_name,
            expected: invalid(&["imieNazwisko"]),
        },
        TestDocument {
            name: "explanation_sobriety_without_question",
            description: "Sobriety test given without the sobriety answer",
            variant: SchemaVariant::Explanation,
            category: TestCategory::Invalid,
            data: sobriety_without_question,
            expected: invalid(&["czyWStanieNietrzezwosci"]),
        },
    ]
}
