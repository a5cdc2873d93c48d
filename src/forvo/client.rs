use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::types::{Item, Pronunciation, PronunciationsResponse};
use crate::http::encode_segment;
use crate::lang::LangCode;

const API_BASE: &str = "https://apifree.forvo.com";
const MAX_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);

#[derive(Debug, thiserror::Error)]
pub enum ForvoError {
    #[error("FORVO_API_KEY not set. Get one at https://api.forvo.com/")]
    ApiKeyNotSet,

    #[error("Forvo API rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("Forvo rejected the API key: {0}")]
    Unauthorized(String),

    #[error("Forvo API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Forvo network error: {0}")]
    Network(reqwest::Error),
}

/// Abstraction for pronunciation lookups.
/// Implemented by `ForvoClient` for production; mock implementations used in tests.
pub trait PronunciationClient {
    async fn pronounce(
        &self,
        word: &str,
        lang: &LangCode,
    ) -> Result<Option<Pronunciation>, ForvoError>;
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Debug, Clone)]
pub struct ForvoClient {
    http: Client,
    api_key: ApiKey,
    base_url: String,
    initial_backoff: Duration,
}

impl ForvoClient {
    /// Builds a client from the configured key; a missing or blank key is an error.
    pub fn new(http: Client, api_key: Option<&str>) -> Result<Self, ForvoError> {
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ForvoError::ApiKeyNotSet)?;
        Ok(Self {
            http,
            api_key: ApiKey(api_key.to_string()),
            base_url: API_BASE.to_string(),
            initial_backoff: INITIAL_BACKOFF,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            http,
            api_key: ApiKey(api_key.to_string()),
            base_url: base_url.to_string(),
            initial_backoff: Duration::from_millis(2),
        }
    }

    async fn fetch_pronunciations(
        &self,
        word: &str,
        lang: &LangCode,
    ) -> Result<PronunciationsResponse, ForvoError> {
        let url = format!(
            "{}/key/{}/format/json/action/word-pronunciations/word/{}/language/{}/order/rate-desc",
            self.base_url,
            encode_segment(&self.api_key.0),
            encode_segment(word),
            lang
        );

        debug_assert!(
            url.starts_with("https://") || cfg!(test),
            "API key must only be sent over HTTPS"
        );

        // The key is part of the URL, so transport errors are stripped of it.
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ForvoError::Network(e.without_url()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Forvo API rate limited");
            return Err(ForvoError::RateLimited);
        }

        let text = response
            .text()
            .await
            .map_err(|e| ForvoError::Network(e.without_url()))?;

        if !status.is_success() {
            let message = error_message(&text)
                .unwrap_or_else(|| format!("HTTP {status}: {}", snippet(&text)));
            let err = match status.as_u16() {
                401 | 403 => ForvoError::Unauthorized(message),
                code => ForvoError::Api { code, message },
            };
            warn!(error = %err, "Forvo API error");
            return Err(err);
        }

        // Forvo reports some failures (daily limit, wrong domain) as a 200 with a string array.
        if let Some(message) = error_message(&text) {
            warn!(%message, "Forvo API error in 200 response");
            return Err(ForvoError::Api {
                code: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| ForvoError::Api {
            code: status.as_u16(),
            message: format!("unexpected response body: {e}"),
        })
    }
}

impl PronunciationClient for ForvoClient {
    async fn pronounce(
        &self,
        word: &str,
        lang: &LangCode,
    ) -> Result<Option<Pronunciation>, ForvoError> {
        let mut last_err = None;
        for attempt in 0..MAX_ATTEMPTS {
            match self.fetch_pronunciations(word, lang).await {
                Ok(response) => {
                    let total = response.attributes.as_ref().and_then(|a| a.total);
                    let best = best_pronunciation(&response.items, lang);
                    debug!(word, lang = %lang, total, found = best.is_some(), "forvo lookup complete");
                    return Ok(best);
                }
                Err(e) if is_retriable(&e) => {
                    last_err = Some(e);
                    if attempt + 1 < MAX_ATTEMPTS {
                        let delay = jittered_backoff(self.initial_backoff, attempt);
                        debug!(
                            attempt = attempt + 1,
                            delay_ms = delay.as_millis() as u64,
                            "retrying after transient error"
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or(ForvoError::RateLimited))
    }
}

fn is_retriable(e: &ForvoError) -> bool {
    matches!(
        e,
        ForvoError::RateLimited
            | ForvoError::Api {
                code: 500..=599,
                ..
            }
    )
}

/// Equal jitter backoff: base/2 + rand(0, base/2).
fn jittered_backoff(initial: Duration, attempt: u32) -> Duration {
    let base = initial.as_millis() as u64 * 2u64.pow(attempt);
    let half = base / 2;
    Duration::from_millis(half + fastrand::u64(..half.max(1)))
}

/// Highest rated recording with an mp3, restricted to `lang` when items carry a code.
fn best_pronunciation(items: &[Item], lang: &LangCode) -> Option<Pronunciation> {
    items
        .iter()
        .filter(|item| {
            item.code
                .as_deref()
                .is_none_or(|code| code.eq_ignore_ascii_case(lang.as_str()))
        })
        .filter_map(|item| {
            let mp3 = item.pathmp3.as_deref().map(str::trim).filter(|p| !p.is_empty())?;
            Some((item, mp3))
        })
        .max_by_key(|(item, _)| (item.rate, item.num_votes))
        .map(|(item, mp3)| Pronunciation {
            word: item.word.clone(),
            code: item.code.clone(),
            username: item.username.clone(),
            country: item.country.clone(),
            mp3_url: mp3.to_string(),
            rate: item.rate,
            votes: item.num_votes,
        })
}

fn error_message(text: &str) -> Option<String> {
    let messages: Vec<String> = serde_json::from_str(text).ok()?;
    let joined = messages.join("; ");
    if joined.trim().is_empty() { None } else { Some(joined) }
}

fn snippet(text: &str) -> &str {
    &text[..text.floor_char_boundary(200)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(code: Option<&str>, mp3: Option<&str>, rate: i64, votes: i64) -> Item {
        Item {
            word: "hus".into(),
            code: code.map(str::to_string),
            username: Some("speaker".into()),
            country: Some("Sweden".into()),
            pathmp3: mp3.map(str::to_string),
            rate,
            num_votes: votes,
        }
    }

    fn sv() -> LangCode {
        LangCode::parse("sv").unwrap()
    }

    #[test]
    fn picks_highest_rated_recording() {
        let items = vec![
            item(Some("sv"), Some("https://a/low.mp3"), 1, 10),
            item(Some("sv"), Some("https://a/high.mp3"), 5, 1),
        ];
        let best = best_pronunciation(&items, &sv()).unwrap();
        assert_eq!(best.mp3_url, "https://a/high.mp3");
        assert_eq!(best.rate, 5);
    }

    #[test]
    fn ties_broken_by_votes() {
        let items = vec![
            item(Some("sv"), Some("https://a/few.mp3"), 2, 1),
            item(Some("sv"), Some("https://a/many.mp3"), 2, 7),
        ];
        assert_eq!(
            best_pronunciation(&items, &sv()).unwrap().mp3_url,
            "https://a/many.mp3"
        );
    }

    #[test]
    fn skips_items_without_mp3_or_in_other_languages() {
        let items = vec![
            item(Some("sv"), None, 9, 9),
            item(Some("sv"), Some("  "), 8, 8),
            item(Some("no"), Some("https://a/norwegian.mp3"), 7, 7),
            item(Some("SV"), Some("https://a/ok.mp3"), 0, 0),
        ];
        assert_eq!(
            best_pronunciation(&items, &sv()).unwrap().mp3_url,
            "https://a/ok.mp3"
        );
    }

    #[test]
    fn no_items_yields_none() {
        assert!(best_pronunciation(&[], &sv()).is_none());
    }

    #[test]
    fn missing_or_blank_key_is_not_set() {
        assert!(matches!(
            ForvoClient::new(Client::new(), None),
            Err(ForvoError::ApiKeyNotSet)
        ));
        assert!(matches!(
            ForvoClient::new(Client::new(), Some("  ")),
            Err(ForvoError::ApiKeyNotSet)
        ));
    }

    #[test]
    fn api_key_not_set_names_env_var() {
        assert!(ForvoError::ApiKeyNotSet.to_string().contains("FORVO_API_KEY"));
    }

    #[test]
    fn debug_output_redacts_key() {
        let client = ForvoClient::new(Client::new(), Some("super-secret")).unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn error_message_joins_string_array() {
        assert_eq!(
            error_message(r#"["Limit/day reached."]"#).as_deref(),
            Some("Limit/day reached.")
        );
        assert!(error_message(r#"{"items": []}"#).is_none());
        assert!(error_message("[]").is_none());
    }

    #[test]
    fn backoff_stays_within_equal_jitter_bounds() {
        for attempt in 0..3 {
            let delay = jittered_backoff(Duration::from_millis(100), attempt);
            let base = 100 * 2u64.pow(attempt);
            let ms = delay.as_millis() as u64;
            assert!(ms >= base / 2 && ms < base, "attempt {attempt}: {ms}ms");
        }
    }
}
