//! # WE-DJ Common Library
//!
//! Shared code for the WE-DJ crates:
//! - Song model and musical keys
//! - Display label decoding for backend filenames
//! - Configuration loading
//! - Event types (MixEvent enum) and EventBus

pub mod config;
pub mod error;
pub mod events;
pub mod key;
pub mod labels;
pub mod song;

pub use error::{Error, Result};
pub use key::{Accidental, Mode, MusicalKey};
pub use song::Song;
