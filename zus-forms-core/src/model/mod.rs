//! Typed records for the supported documents
//!
//! Input arrives as untrusted JSON and is validated against a
//! [`crate::schema::FormSchema`]; once validation succeeds the data can be
//! read through these records instead of string-keyed maps.

mod accident_card;
mod explanation;
mod notification;

pub use accident_card::AccidentCard;
pub use explanation::{SobrietyTest, VictimExplanation};
pub use notification::{
    AccidentInfo, AccidentNotification, Address, Attachments, CorrespondenceAddress,
    CorrespondenceMethod, Declaration, DeferredDocuments, DomesticAddress, IdentityDocument,
    InjuredPerson, PhoneAddress, Reporter, ResponseMethod, Witness,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two input shapes accepted by the validator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVariant {
    /// ZUS EWYP accident notification
    Notification,
    /// Victim's explanation ("Wyjaśnienia poszkodowanego")
    Explanation,
}

impl SchemaVariant {
    pub fn document_kind(self) -> DocumentKind {
        match self {
            SchemaVariant::Notification => DocumentKind::Notification,
            SchemaVariant::Explanation => DocumentKind::Explanation,
        }
    }
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVariant::Notification => f.write_str("notification"),
            SchemaVariant::Explanation => f.write_str("explanation"),
        }
    }
}

/// Every PDF document the pipeline can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Notification,
    Explanation,
    AccidentCard,
}

impl DocumentKind {
    /// Prefix used when naming generated files
    pub fn file_prefix(self) -> &'static str {
        match self {
            DocumentKind::Notification => "EWYP",
            DocumentKind::Explanation => "WYJASNIENIA",
            DocumentKind::AccidentCard => "Karta_Wypadku_Proposal",
        }
    }
}

/// A validated document in its typed form
#[derive(Debug, Clone, PartialEq)]
pub enum FormDocument {
    Notification(Box<AccidentNotification>),
    Explanation(Box<VictimExplanation>),
}

impl FormDocument {
    pub fn variant(&self) -> SchemaVariant {
        match self {
            FormDocument::Notification(_) => SchemaVariant::Notification,
            FormDocument::Explanation(_) => SchemaVariant::Explanation,
        }
    }

    /// Name of the injured person, used for log lines and summaries
    pub fn injured_person_name(&self) -> String {
        match self {
            FormDocument::Notification(doc) => format!(
                "{} {}",
                doc.injured_person.first_name, doc.injured_person.last_name
            ),
            FormDocument::Explanation(doc) => doc.full_name.clone(),
        }
    }

    /// Accident date as submitted (ISO format)
    pub fn accident_date(&self) -> &str {
        match self {
            FormDocument::Notification(doc) => &doc.accident.date,
            FormDocument::Explanation(doc) => &doc.accident_date,
        }
    }
}
