//! Core types shared by every romshelf crate: platform identity and
//! classification, device path helpers, and the pipeline error taxonomy.

pub mod error;
pub mod path;
pub mod platform;

pub use error::{FsOperation, RomError};
pub use platform::{infer_platform, normalize_extension, Platform, PlatformParseError};
