//! Game catalog data model, title normalization, and snapshot I/O.
//!
//! This crate has no file-system access of its own: it turns catalog entries
//! into snapshot text and back. Discovery and export live in `romshelf-lib`.

pub mod title;
pub mod types;
pub mod yaml;

pub use title::clean_title;
pub use types::*;
pub use yaml::{format_timestamp, from_text, to_text, to_text_at, YamlError};
