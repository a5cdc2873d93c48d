use reqwest::Client;
use tracing::{debug, warn};

use super::types::{DictionaryEntry, Entry, ErrorBody};
use crate::http::encode_segment;

const API_BASE: &str = "https://api.dictionaryapi.dev/api/v2/entries/en";

#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("No dictionary entry for '{0}'")]
    NotFound(String),

    #[error("Dictionary API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Dictionary network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Abstraction for English definition lookups.
/// Implemented by `DictionaryApi` for production; stub implementations used in tests.
pub trait DictionaryClient {
    async fn define(&self, word: &str) -> Result<DictionaryEntry, DictionaryError>;
}

/// Client for the free dictionaryapi.dev English dictionary.
#[derive(Clone)]
pub struct DictionaryApi {
    http: Client,
    base_url: String,
}

impl DictionaryApi {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            base_url: API_BASE.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
        }
    }
}

impl DictionaryClient for DictionaryApi {
    async fn define(&self, word: &str) -> Result<DictionaryEntry, DictionaryError> {
        let url = format!("{}/{}", self.base_url, encode_segment(word));
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(word, "dictionary has no entry");
            return Err(DictionaryError::NotFound(word.to_string()));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.message.or(body.title))
                .unwrap_or_else(|| {
                    let end = text.floor_char_boundary(200);
                    format!("HTTP {status}: {}", &text[..end])
                });
            warn!(status = %status, "dictionary API error");
            return Err(DictionaryError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let entries: Vec<Entry> = response.json().await?;
        let entry = entries
            .first()
            .map(summarize_entry)
            .ok_or_else(|| DictionaryError::NotFound(word.to_string()))?;

        debug!(
            word,
            definitions = entry.definitions.len(),
            has_audio = entry.audio_url.is_some(),
            "dictionary lookup complete"
        );
        Ok(entry)
    }
}

fn summarize_entry(entry: &Entry) -> DictionaryEntry {
    let audio_url = entry
        .phonetics
        .iter()
        .filter_map(|p| p.audio.as_deref())
        .map(str::trim)
        .find(|a| !a.is_empty())
        .map(absolutize_audio_url);

    let phonetic = entry
        .phonetic
        .as_deref()
        .into_iter()
        .chain(entry.phonetics.iter().filter_map(|p| p.text.as_deref()))
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_string);

    let definitions = entry
        .meanings
        .iter()
        .flat_map(|m| {
            let part = m.part_of_speech.as_deref().unwrap_or("").trim();
            m.definitions
                .iter()
                .filter_map(move |d| render_definition(part, &d.definition, d.example.as_deref()))
        })
        .collect();

    DictionaryEntry {
        phonetic,
        audio_url,
        definitions,
    }
}

/// `[noun] a building for living in (e.g. a small house)`
fn render_definition(part: &str, definition: &str, example: Option<&str>) -> Option<String> {
    let definition = definition.trim();
    if definition.is_empty() {
        return None;
    }
    let mut out = if part.is_empty() {
        definition.to_string()
    } else {
        format!("[{part}] {definition}")
    };
    if let Some(example) = example.map(str::trim).filter(|e| !e.is_empty()) {
        out.push_str(&format!(" (e.g. {example})"));
    }
    Some(out)
}

/// Older entries carry protocol-relative audio links (`//ssl.gstatic.com/...`).
fn absolutize_audio_url(raw: &str) -> String {
    if raw.starts_with("//") {
        format!("https:{raw}")
    } else {
        raw.to_string()
    }
}
