//! ZUS EWYP accident notification record

use serde::{Deserialize, Serialize};

/// Identity document: kind (e.g. "dowód osobisty") plus series and number
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityDocument {
    #[serde(rename = "rodzaj")]
    pub kind: Option<String>,
    #[serde(rename = "seriaINumer")]
    pub series_and_number: Option<String>,
}

impl IdentityDocument {
    /// Kind and number joined by a space, as printed on the forms
    pub fn display(&self) -> Option<String> {
        let joined = format!(
            "{} {}",
            self.kind.as_deref().unwrap_or(""),
            self.series_and_number.as_deref().unwrap_or("")
        );
        let trimmed = joined.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

/// Address that may be abroad
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(rename = "ulica")]
    pub street: Option<String>,
    #[serde(rename = "numerDomu")]
    pub house_number: Option<String>,
    #[serde(rename = "numerLokalu")]
    pub apartment_number: Option<String>,
    #[serde(rename = "kodPocztowy")]
    pub postal_code: Option<String>,
    #[serde(rename = "miejscowosc")]
    pub city: Option<String>,
    #[serde(rename = "nazwaPanstwa")]
    pub country: Option<String>,
}

impl Address {
    /// Single-line rendering: "street house/apartment, postal city, country"
    pub fn one_line(&self) -> Option<String> {
        let mut street = self.street.clone().unwrap_or_default();
        if let Some(house) = &self.house_number {
            if !street.is_empty() {
                street.push(' ');
            }
            street.push_str(house);
            if let Some(apartment) = &self.apartment_number {
                street.push('/');
                street.push_str(apartment);
            }
        }
        let locality = [self.postal_code.as_deref(), self.city.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");

        let parts: Vec<&str> = [Some(street.as_str()), Some(locality.as_str()), self.country.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

/// Address in Poland (no country field)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomesticAddress {
    #[serde(rename = "ulica")]
    pub street: Option<String>,
    #[serde(rename = "numerDomu")]
    pub house_number: Option<String>,
    #[serde(rename = "numerLokalu")]
    pub apartment_number: Option<String>,
    #[serde(rename = "kodPocztowy")]
    pub postal_code: Option<String>,
    #[serde(rename = "miejscowosc")]
    pub city: Option<String>,
}

/// Domestic address with a contact phone number
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhoneAddress {
    #[serde(rename = "ulica")]
    pub street: Option<String>,
    #[serde(rename = "numerDomu")]
    pub house_number: Option<String>,
    #[serde(rename = "numerLokalu")]
    pub apartment_number: Option<String>,
    #[serde(rename = "kodPocztowy")]
    pub postal_code: Option<String>,
    #[serde(rename = "miejscowosc")]
    pub city: Option<String>,
    #[serde(rename = "numerTelefonu")]
    pub phone: Option<String>,
}

/// How correspondence should be delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrespondenceMethod {
    #[serde(rename = "adres")]
    Address,
    #[serde(rename = "poste_restante")]
    PosteRestante,
    #[serde(rename = "skrytka_pocztowa")]
    PostOfficeBox,
    #[serde(rename = "przegrodka_pocztowa")]
    PostOfficeCompartment,
}

/// Correspondence address with its delivery method
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrespondenceAddress {
    #[serde(rename = "sposobKorespondencji")]
    pub method: Option<CorrespondenceMethod>,
    #[serde(rename = "ulica")]
    pub street: Option<String>,
    #[serde(rename = "numerDomu")]
    pub house_number: Option<String>,
    #[serde(rename = "numerLokalu")]
    pub apartment_number: Option<String>,
    #[serde(rename = "kodPocztowy")]
    pub postal_code: Option<String>,
    #[serde(rename = "miejscowosc")]
    pub city: Option<String>,
    #[serde(rename = "nazwaPanstwa")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InjuredPerson {
    pub pesel: Option<String>,
    #[serde(rename = "dokumentTozsamosci")]
    pub identity_document: Option<IdentityDocument>,
    #[serde(rename = "imie")]
    pub first_name: String,
    #[serde(rename = "nazwisko")]
    pub last_name: String,
    #[serde(rename = "dataUrodzenia")]
    pub birth_date: Option<String>,
    #[serde(rename = "miejsceUrodzenia")]
    pub birth_place: Option<String>,
    #[serde(rename = "numerTelefonu")]
    pub phone: Option<String>,
}

/// Person filing the notification when it is not the injured person
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reporter {
    #[serde(rename = "jestPoszkodowanym")]
    pub is_injured_person: Option<bool>,
    pub pesel: Option<String>,
    #[serde(rename = "dokumentTozsamosci")]
    pub identity_document: Option<IdentityDocument>,
    #[serde(rename = "imie")]
    pub first_name: Option<String>,
    #[serde(rename = "nazwisko")]
    pub last_name: Option<String>,
    #[serde(rename = "dataUrodzenia")]
    pub birth_date: Option<String>,
    #[serde(rename = "numerTelefonu")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccidentInfo {
    #[serde(rename = "dataWypadku")]
    pub date: String,
    #[serde(rename = "godzinaWypadku")]
    pub time: Option<String>,
    #[serde(rename = "miejsceWypadku")]
    pub place: String,
    #[serde(rename = "planowanaGodzinaRozpoczeciaPracy")]
    pub planned_work_start: Option<String>,
    #[serde(rename = "planowanaGodzinaZakonczeniaPracy")]
    pub planned_work_end: Option<String>,
    #[serde(rename = "rodzajDoznanychUrazow")]
    pub injuries: Option<String>,
    #[serde(rename = "opisOkolicznosciMiejscaIPrzyczyn")]
    pub circumstances: String,
    #[serde(rename = "pierwszaPomocUdzielona")]
    pub first_aid_given: Option<bool>,
    #[serde(rename = "placowkaUdzielajacaPierwszejPomocy")]
    pub first_aid_facility: Option<String>,
    #[serde(rename = "organProwadzacyPostepowanie")]
    pub investigating_authority: Option<String>,
    #[serde(rename = "wypadekPodczasObslugiMaszynLubUrzadzen")]
    pub during_machine_operation: Option<bool>,
    #[serde(rename = "opisStanuMaszynyIUzytkowania")]
    pub machine_condition: Option<String>,
    #[serde(rename = "maszynaPosiadaAtestLubDeklaracjeZgodnosci")]
    pub machine_certified: Option<bool>,
    #[serde(rename = "maszynaWpisanaDoEwidencjiSrodkowTrwalych")]
    pub machine_registered_as_asset: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Witness {
    #[serde(rename = "imie")]
    pub first_name: Option<String>,
    #[serde(rename = "nazwisko")]
    pub last_name: Option<String>,
    #[serde(rename = "adres")]
    pub address: Option<Address>,
}

impl Witness {
    /// "First Last, address" as printed on the accident card
    pub fn summary(&self) -> Option<String> {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        let address = self.address.as_ref().and_then(Address::one_line);
        match (name.is_empty(), address) {
            (true, None) => None,
            (true, Some(address)) => Some(address),
            (false, None) => Some(name),
            (false, Some(address)) => Some(format!("{name}, {address}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachments {
    #[serde(rename = "kartaInformacyjnaLubZaswiadczeniePierwszejPomocy")]
    pub first_aid_record: Option<bool>,
    #[serde(rename = "postanowienieProkuratury")]
    pub prosecutor_decision: Option<bool>,
    #[serde(rename = "dokumentyDotyczaceZgonu")]
    pub death_documents: Option<bool>,
    #[serde(rename = "dokumentyPotwierdzajacePrawoDoKartyWypadkuDlaInnejOsoby")]
    pub third_party_card_entitlement: Option<bool>,
    #[serde(rename = "inneDokumentyOpis")]
    pub other_documents: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeferredDocuments {
    #[serde(rename = "dataDo")]
    pub deadline: Option<String>,
    #[serde(rename = "listaDokumentow")]
    pub documents: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    #[serde(rename = "dataZlozenia")]
    pub submitted_on: Option<String>,
    #[serde(rename = "podpis")]
    pub signature: Option<String>,
}

/// How the applicant wants to receive the answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseMethod {
    #[serde(rename = "w_placowce_ZUS")]
    AtZusOffice,
    #[serde(rename = "poczta_na_adres_wskazany_we_wniosku")]
    ByPost,
    #[serde(rename = "na_koncie_PUE_ZUS")]
    PueAccount,
}

/// Accident notification (druk ZUS EWYP)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccidentNotification {
    #[serde(rename = "daneOsobyPoszkodowanej")]
    pub injured_person: InjuredPerson,
    #[serde(rename = "adresZamieszkaniaOsobyPoszkodowanej")]
    pub injured_person_address: Address,
    #[serde(rename = "adresOstatniegoMiejscaZamieszkaniaWPolsceLubPobytuPoszkodowanego")]
    pub injured_person_last_domestic_address: Option<DomesticAddress>,
    #[serde(rename = "adresDoKorespondencjiOsobyPoszkodowanej")]
    pub injured_person_correspondence: Option<CorrespondenceAddress>,
    #[serde(rename = "adresMiejscaProwadzeniaPozarolniczejDzialalnosci")]
    pub business_address: Option<PhoneAddress>,
    #[serde(rename = "adresSprawowaniaOpiekiNadDzieckiemDoLat3")]
    pub childcare_address: Option<PhoneAddress>,

    #[serde(rename = "daneOsobyKtoraZawiadamia")]
    pub reporter: Option<Reporter>,
    #[serde(rename = "adresZamieszkaniaOsobyKtoraZawiadamia")]
    pub reporter_address: Option<Address>,
    #[serde(rename = "adresOstatniegoMiejscaZamieszkaniaWPolsceLubPobytuOsobyKtoraZawiadamia")]
    pub reporter_last_domestic_address: Option<DomesticAddress>,
    #[serde(rename = "adresDoKorespondencjiOsobyKtoraZawiadamia")]
    pub reporter_correspondence: Option<CorrespondenceAddress>,

    #[serde(rename = "informacjaOWypadku")]
    pub accident: AccidentInfo,

    #[serde(rename = "daneSwiadkowWypadku")]
    pub witnesses: Option<Vec<Witness>>,

    #[serde(rename = "zalaczniki")]
    pub attachments: Option<Attachments>,
    #[serde(rename = "dokumentyDoDostarczeniaPozniej")]
    pub deferred_documents: Option<DeferredDocuments>,

    #[serde(rename = "sposobOdbioruOdpowiedzi")]
    pub response_method: Option<ResponseMethod>,
    #[serde(rename = "oswiadczenie")]
    pub declaration: Option<Declaration>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_document_display() {
        let doc = IdentityDocument {
            kind: Some("dowód osobisty".to_string()),
            series_and_number: Some("ABC123456".to_string()),
        };
        assert_eq!(doc.display().as_deref(), Some("dowód osobisty ABC123456"));

        let only_number = IdentityDocument {
            kind: None,
            series_and_number: Some("XY1".to_string()),
        };
        assert_eq!(only_number.display().as_deref(), Some("XY1"));
        assert_eq!(IdentityDocument::default().display(), None);
    }

    #[test]
    fn test_address_one_line() {
        let address = Address {
            street: Some("Marszałkowska".to_string()),
            house_number: Some("10".to_string()),
            apartment_number: Some("4".to_string()),
            postal_code: Some("00-001".to_string()),
            city: Some("Warszawa".to_string()),
            country: None,
        };
        assert_eq!(
            address.one_line().as_deref(),
            Some("Marszałkowska 10/4, 00-001 Warszawa")
        );
        assert_eq!(Address::default().one_line(), None);
    }

    #[test]
    fn test_deserialize_polish_wire_names() {
        let value = json!({
            "daneOsobyPoszkodowanej": {"imie": "Jan", "nazwisko": "Kowalski"},
            "adresZamieszkaniaOsobyPoszkodowanej": {"miejscowosc": "Kraków"},
            "informacjaOWypadku": {
                "dataWypadku": "2024-03-10",
                "miejsceWypadku": "Warszawa",
                "opisOkolicznosciMiejscaIPrzyczyn": "Upadek"
            },
            "adresDoKorespondencjiOsobyPoszkodowanej": {"sposobKorespondencji": "poste_restante"},
            "sposobOdbioruOdpowiedzi": "na_koncie_PUE_ZUS"
        });

        let doc: AccidentNotification = serde_json::from_value(value).unwrap();
        assert_eq!(doc.injured_person.first_name, "Jan");
        assert_eq!(doc.injured_person_address.city.as_deref(), Some("Kraków"));
        assert_eq!(
            doc.injured_person_correspondence.and_then(|c| c.method),
            Some(CorrespondenceMethod::PosteRestante)
        );
        assert_eq!(doc.response_method, Some(ResponseMethod::PueAccount));
    }

    #[test]
    fn test_witness_summary() {
        let witness = Witness {
            first_name: Some("Anna".to_string()),
            last_name: Some("Nowak".to_string()),
            address: Some(Address {
                city: Some("Łódź".to_string()),
                ..Address::default()
            }),
        };
        assert_eq!(witness.summary().as_deref(), Some("Anna Nowak, Łódź"));
        assert_eq!(Witness::default().summary(), None);
    }
}
