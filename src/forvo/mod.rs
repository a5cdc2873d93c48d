//! Pronunciation recordings from the Forvo API.

pub mod client;
pub mod types;

pub use client::{ForvoClient, ForvoError, PronunciationClient};
pub use types::Pronunciation;
