//! Victim's explanation ("Wyjaśnienia poszkodowanego") record

use serde::{Deserialize, Serialize};

/// Whether and by whom sobriety was tested after the accident
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SobrietyTest {
    #[serde(rename = "badany_przez_policje")]
    ByPolice,
    #[serde(rename = "badany_podczas_pierwszej_pomocy")]
    DuringFirstAid,
    #[serde(rename = "nie_badany")]
    NotTested,
}

impl SobrietyTest {
    pub const ALL: [SobrietyTest; 3] = [
        SobrietyTest::ByPolice,
        SobrietyTest::DuringFirstAid,
        SobrietyTest::NotTested,
    ];

    /// Wire value used in JSON input
    pub fn code(self) -> &'static str {
        match self {
            SobrietyTest::ByPolice => "badany_przez_policje",
            SobrietyTest::DuringFirstAid => "badany_podczas_pierwszej_pomocy",
            SobrietyTest::NotTested => "nie_badany",
        }
    }

    /// Label printed on the form
    pub fn label(self) -> &'static str {
        match self {
            SobrietyTest::ByPolice => "badany przez policję",
            SobrietyTest::DuringFirstAid => "badany podczas udzielania pierwszej pomocy",
            SobrietyTest::NotTested => "nie badany",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }
}

/// Flat record of the explanation form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VictimExplanation {
    #[serde(rename = "imieNazwisko")]
    pub full_name: String,
    #[serde(rename = "dataUrodzenia")]
    pub birth_date: Option<String>,
    #[serde(rename = "miejsceUrodzenia")]
    pub birth_place: Option<String>,
    #[serde(rename = "adresZamieszkania")]
    pub address: Option<String>,
    #[serde(rename = "zatrudnienie")]
    pub employment: Option<String>,
    #[serde(rename = "dokumentTozsamosci")]
    pub identity_document: Option<String>,

    #[serde(rename = "dataWypadku")]
    pub accident_date: String,
    #[serde(rename = "miejsceWypadku")]
    pub accident_place: String,
    #[serde(rename = "godzinaWypadku")]
    pub accident_time: Option<String>,
    #[serde(rename = "planowanaGodzinaRozpoczeciaPracy")]
    pub planned_work_start: Option<String>,
    #[serde(rename = "planowanaGodzinaZakonczeniaPracy")]
    pub planned_work_end: Option<String>,
    #[serde(rename = "rodzajCzynnosciPrzedWypadkiem")]
    pub activities_before_accident: Option<String>,
    #[serde(rename = "opisOkolicznosciWypadku")]
    pub circumstances: String,

    #[serde(rename = "czyWypadekPodczasObslugiMaszyn")]
    pub during_machine_operation: Option<bool>,
    #[serde(rename = "nazwaTypUrzadzenia")]
    pub machine_name: Option<String>,
    #[serde(rename = "dataProdukcjiUrzadzenia")]
    pub machine_production_date: Option<String>,
    #[serde(rename = "czyUrzadzenieSprawneIUzytkowanePrawidlowo")]
    pub machine_condition: Option<String>,

    #[serde(rename = "czyBylyZabezpieczenia")]
    pub safety_equipment_used: Option<bool>,
    #[serde(rename = "rodzajZabezpieczen")]
    pub safety_equipment: Option<String>,
    #[serde(rename = "czySrodkiWlasciweISprawne")]
    pub safety_equipment_adequate: Option<bool>,
    #[serde(rename = "czyAsekuracja")]
    pub belayed: Option<bool>,
    #[serde(rename = "czyObowiazekPracyPrzezDwieOsoby")]
    pub two_person_rule: Option<bool>,
    #[serde(rename = "czyPrzestrzeganoZasadBHP")]
    pub safety_rules_followed: Option<bool>,
    #[serde(rename = "czyPosiadamPrzygotowanieZawodowe")]
    pub professionally_trained: Option<bool>,
    #[serde(rename = "czyOdbylemSzkolenieBHP")]
    pub safety_training_completed: Option<bool>,
    #[serde(rename = "czyPosiadamOceneRyzykaZawodowego")]
    pub has_risk_assessment: Option<bool>,
    #[serde(rename = "stosowaneSrodkiZmniejszajaceRyzyko")]
    pub risk_measures: Option<String>,

    #[serde(rename = "czyWStanieNietrzezwosci")]
    pub intoxicated: Option<bool>,
    #[serde(rename = "stanTrzezwosciBadany")]
    pub sobriety_test: Option<SobrietyTest>,

    #[serde(rename = "czyOrganyPodejmowalyCzynnosci")]
    pub authorities_involved: Option<bool>,
    #[serde(rename = "organyISzczegoly")]
    pub authorities_details: Option<String>,

    #[serde(rename = "pierwszaPomocData")]
    pub first_aid_date: Option<String>,
    #[serde(rename = "nazwaPlacowkiZdrowia")]
    pub health_facility: Option<String>,
    #[serde(rename = "okresIMiejsceHospitalizacji")]
    pub hospitalization: Option<String>,
    #[serde(rename = "rozpoznanyUraz")]
    pub diagnosed_injury: Option<String>,
    #[serde(rename = "niezdolnoscDoPracy")]
    pub incapacity: Option<String>,
    #[serde(rename = "czyNaZwolnieniuWLacuWypadku")]
    pub on_sick_leave: Option<bool>,

    #[serde(rename = "dataPodpisania")]
    pub signed_on: Option<String>,
}
