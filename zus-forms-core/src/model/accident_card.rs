//! Accident card ("Karta wypadku") proposal
//!
//! Every field is named after the widget it fills. [`AccidentCard::entries`]
//! lists the widgets with their values so the renderer never needs to look
//! fields up by name.

use crate::dates::DateStyle;
use crate::model::AccidentNotification;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccidentCard {
    // Payer (employer)
    #[serde(rename = "PAYERNAME")]
    pub payer_name: Option<String>,
    #[serde(rename = "PAYERADDRESS")]
    pub payer_address: Option<String>,
    #[serde(rename = "PAYERNIP")]
    pub payer_nip: Option<String>,
    #[serde(rename = "PAYERREGON")]
    pub payer_regon: Option<String>,
    #[serde(rename = "PAYERPESEL")]
    pub payer_pesel: Option<String>,
    #[serde(rename = "PAYERDOCUMENTTYPE")]
    pub payer_document_type: Option<String>,
    #[serde(rename = "PAYERDOCUMENTTYPESERIES")]
    pub payer_document_series: Option<String>,
    #[serde(rename = "PAYERDOCUMENTTYPENUMBER")]
    pub payer_document_number: Option<String>,

    // Victim
    #[serde(rename = "VICTIMNAME")]
    pub victim_name: Option<String>,
    #[serde(rename = "VICTIMPESEL")]
    pub victim_pesel: Option<String>,
    #[serde(rename = "VICTIMDOCUMENTTYPE")]
    pub victim_document_type: Option<String>,
    #[serde(rename = "VICTIMDOCUMENTTYPESERIES")]
    pub victim_document_series: Option<String>,
    #[serde(rename = "VICTIMDOCUMENTTYPENUMBER")]
    pub victim_document_number: Option<String>,
    #[serde(rename = "VICTIMDATEPLACEBIRTH")]
    pub victim_birth: Option<String>,
    #[serde(rename = "VICTIMADDRESS")]
    pub victim_address: Option<String>,
    #[serde(rename = "INSURANCETITLE")]
    pub insurance_title: Option<String>,

    // Accident
    #[serde(rename = "REPORTDATEREPORTERNAME")]
    pub report_date_and_reporter: Option<String>,
    #[serde(rename = "CIRCUMSTANCESINFORMATION")]
    pub circumstances: Option<String>,
    #[serde(rename = "WITNESS1")]
    pub witness1: Option<String>,
    #[serde(rename = "WITNESS2")]
    pub witness2: Option<String>,
    #[serde(rename = "ACCIDENTIS")]
    pub classification: Option<String>,
    #[serde(rename = "VICTIMFAULT")]
    pub victim_fault: Option<String>,
    #[serde(rename = "VICTIMDRUNK")]
    pub victim_drunk: Option<String>,

    // Other
    #[serde(rename = "VICTIMSFAMILYMEMBERNAME")]
    pub family_member_name: Option<String>,
    #[serde(rename = "VICTIMSFAMILYMEMBERDATE")]
    pub family_member_date: Option<String>,
    #[serde(rename = "CARDDATE")]
    pub card_date: Option<String>,
    #[serde(rename = "CARDISSUER")]
    pub card_issuer: Option<String>,
    #[serde(rename = "CARDISSUERNAME")]
    pub card_issuer_name: Option<String>,
    #[serde(rename = "DIFFICULTIES")]
    pub difficulties: Option<String>,
    #[serde(rename = "RECEIVEDDATE")]
    pub received_date: Option<String>,
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn set_if_missing(slot: &mut Option<String>, value: Option<String>) {
    if !present(slot) {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            *slot = Some(value);
        }
    }
}

/// Split a Polish document number into series (leading letters) and number
fn split_series(series_and_number: &str) -> (Option<String>, Option<String>) {
    let compact: String = series_and_number.split_whitespace().collect();
    let split_at = compact
        .char_indices()
        .find(|(_, c)| !c.is_alphabetic())
        .map(|(i, _)| i)
        .unwrap_or(compact.len());
    let (series, number) = compact.split_at(split_at);
    let wrap = |s: &str| (!s.is_empty()).then(|| s.to_string());
    match (wrap(series), wrap(number)) {
        // Letters only: keep it as the number rather than guess
        (Some(series), None) => (None, Some(series)),
        other => other,
    }
}

fn long_date(raw: &str) -> String {
    DateStyle::Long
        .reformat(raw)
        .unwrap_or_else(|| raw.to_string())
}

impl AccidentCard {
    /// Widget names in page order
    pub const WIDGETS: [&'static str; 30] = [
        "PAYERNAME",
        "PAYERADDRESS",
        "PAYERNIP",
        "PAYERREGON",
        "PAYERPESEL",
        "PAYERDOCUMENTTYPE",
        "PAYERDOCUMENTTYPESERIES",
        "PAYERDOCUMENTTYPENUMBER",
        "VICTIMNAME",
        "VICTIMPESEL",
        "VICTIMDOCUMENTTYPE",
        "VICTIMDOCUMENTTYPESERIES",
        "VICTIMDOCUMENTTYPENUMBER",
        "VICTIMDATEPLACEBIRTH",
        "VICTIMADDRESS",
        "INSURANCETITLE",
        "REPORTDATEREPORTERNAME",
        "CIRCUMSTANCESINFORMATION",
        "WITNESS1",
        "WITNESS2",
        "ACCIDENTIS",
        "VICTIMFAULT",
        "VICTIMDRUNK",
        "VICTIMSFAMILYMEMBERNAME",
        "VICTIMSFAMILYMEMBERDATE",
        "CARDDATE",
        "CARDISSUER",
        "CARDISSUERNAME",
        "DIFFICULTIES",
        "RECEIVEDDATE",
    ];

    /// Every widget with its current value, in page order
    pub fn entries(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("PAYERNAME", self.payer_name.as_deref()),
            ("PAYERADDRESS", self.payer_address.as_deref()),
            ("PAYERNIP", self.payer_nip.as_deref()),
            ("PAYERREGON", self.payer_regon.as_deref()),
            ("PAYERPESEL", self.payer_pesel.as_deref()),
            ("PAYERDOCUMENTTYPE", self.payer_document_type.as_deref()),
            ("PAYERDOCUMENTTYPESERIES", self.payer_document_series.as_deref()),
            ("PAYERDOCUMENTTYPENUMBER", self.payer_document_number.as_deref()),
            ("VICTIMNAME", self.victim_name.as_deref()),
            ("VICTIMPESEL", self.victim_pesel.as_deref()),
            ("VICTIMDOCUMENTTYPE", self.victim_document_type.as_deref()),
            ("VICTIMDOCUMENTTYPESERIES", self.victim_document_series.as_deref()),
            ("VICTIMDOCUMENTTYPENUMBER", self.victim_document_number.as_deref()),
            ("VICTIMDATEPLACEBIRTH", self.victim_birth.as_deref()),
            ("VICTIMADDRESS", self.victim_address.as_deref()),
            ("INSURANCETITLE", self.insurance_title.as_deref()),
            ("REPORTDATEREPORTERNAME", self.report_date_and_reporter.as_deref()),
            ("CIRCUMSTANCESINFORMATION", self.circumstances.as_deref()),
            ("WITNESS1", self.witness1.as_deref()),
            ("WITNESS2", self.witness2.as_deref()),
            ("ACCIDENTIS", self.classification.as_deref()),
            ("VICTIMFAULT", self.victim_fault.as_deref()),
            ("VICTIMDRUNK", self.victim_drunk.as_deref()),
            ("VICTIMSFAMILYMEMBERNAME", self.family_member_name.as_deref()),
            ("VICTIMSFAMILYMEMBERDATE", self.family_member_date.as_deref()),
            ("CARDDATE", self.card_date.as_deref()),
            ("CARDISSUER", self.card_issuer.as_deref()),
            ("CARDISSUERNAME", self.card_issuer_name.as_deref()),
            ("DIFFICULTIES", self.difficulties.as_deref()),
            ("RECEIVEDDATE", self.received_date.as_deref()),
        ]
    }

    /// Non-empty values keyed by widget name, ready for hard flatten
    pub fn value_map(&self) -> BTreeMap<String, String> {
        self.entries()
            .into_iter()
            .filter_map(|(name, value)| {
                value
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect()
    }

    /// Fill the victim PESEL from the case identifier and the card and
    /// receipt dates with `today` when they are missing
    pub fn with_defaults(mut self, case_id: Option<&str>, today: NaiveDate) -> Self {
        set_if_missing(&mut self.victim_pesel, case_id.map(str::to_string));
        let today = DateStyle::Long.format(today);
        set_if_missing(&mut self.card_date, Some(today.clone()));
        set_if_missing(&mut self.received_date, Some(today));
        self
    }

    /// Derive victim and accident data from a notification. Existing values
    /// are never overwritten.
    pub fn prefill_from(mut self, notification: &AccidentNotification) -> Self {
        let person = &notification.injured_person;
        let name = format!("{} {}", person.first_name.trim(), person.last_name.trim());
        set_if_missing(&mut self.victim_name, Some(name.trim().to_string()));
        set_if_missing(&mut self.victim_pesel, person.pesel.clone());

        if let Some(document) = &person.identity_document {
            set_if_missing(&mut self.victim_document_type, document.kind.clone());
            if let Some(raw) = &document.series_and_number {
                let (series, number) = split_series(raw);
                set_if_missing(&mut self.victim_document_series, series);
                set_if_missing(&mut self.victim_document_number, number);
            }
        }

        let birth = [
            person.birth_date.as_deref().map(long_date),
            person.birth_place.clone(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ");
        set_if_missing(&mut self.victim_birth, Some(birth));
        set_if_missing(
            &mut self.victim_address,
            notification.injured_person_address.one_line(),
        );

        let accident = &notification.accident;
        let mut circumstances = String::new();
        if !accident.date.is_empty() {
            circumstances.push_str(&long_date(&accident.date));
            if let Some(time) = accident.time.as_deref().filter(|t| !t.is_empty()) {
                circumstances.push_str(", godz. ");
                circumstances.push_str(time);
            }
            circumstances.push_str(", ");
        }
        if !accident.place.is_empty() {
            circumstances.push_str(&accident.place);
            circumstances.push_str(". ");
        }
        circumstances.push_str(accident.circumstances.trim());
        set_if_missing(&mut self.circumstances, Some(circumstances.trim().to_string()));

        let mut witnesses = notification
            .witnesses
            .iter()
            .flatten()
            .filter_map(|w| w.summary());
        set_if_missing(&mut self.witness1, witnesses.next());
        set_if_missing(&mut self.witness2, witnesses.next());

        let reporter_name = notification
            .reporter
            .as_ref()
            .filter(|r| r.is_injured_person != Some(true))
            .map(|r| {
                [r.first_name.as_deref(), r.last_name.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.victim_name.clone());
        let submitted = notification
            .declaration
            .as_ref()
            .and_then(|d| d.submitted_on.as_deref())
            .map(long_date);
        let report = [submitted, reporter_name]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ");
        set_if_missing(&mut self.report_date_and_reporter, Some(report));

        self
    }
}
