//! Preview output for canonical documents and page assignments.

mod json;
mod text;

pub use json::{to_json, JsonFormat};
pub use text::{table_to_text, to_text};
