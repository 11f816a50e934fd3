//! Hard flatten rendering
//!
//! Field values are drawn as page content inside the widget rectangles,
//! then the interactive form is removed.

mod flattener;
mod fonts;
pub mod metrics;
mod textbox;

pub use flattener::{
    fill_and_flatten, normalize_widget_name, FlattenOptions, FlattenReport, RenderedField,
};
pub use fonts::{EmbeddedFont, FontSource};
pub use textbox::{fit_text, layout, wrap, TextLayout};
