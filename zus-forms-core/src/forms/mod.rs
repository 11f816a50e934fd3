//! Interactive form access (ISO 32000-1 §12.7)
//!
//! Widget discovery, soft fill and synthetic template construction.

mod acro_form;
mod filler;
pub mod scaffold;

pub use acro_form::{
    collect_widgets, decode_text_string, encode_text_string, find_widgets, FieldFlags, FieldType,
    WidgetInfo,
};
pub use filler::{fill, read_widgets, FillReport};
pub use scaffold::{scaffold_accident_card, scaffold_for_table, TemplateBuilder};

pub(crate) use acro_form::{page_annotations, remove_acro_form, resolve, resolve_dict};
pub(crate) use filler::{apply_value, open_template, save_document};
