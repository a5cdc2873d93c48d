//! English definitions and pronunciation audio from dictionaryapi.dev.

pub mod client;
pub mod types;

pub use client::{DictionaryApi, DictionaryClient, DictionaryError};
pub use types::DictionaryEntry;
