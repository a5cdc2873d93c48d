//! One vocabulary capture: resolve the language, gather glosses and audio,
//! pronounce, append to the deck, and sync.

mod report;

use std::path::PathBuf;

use reqwest::Client;
use tracing::{info, warn};

pub use report::{format_detection, format_report};

use crate::audio::{self, Playback};
use crate::config::Config;
use crate::deck::{self, Card, DeckError};
use crate::dictionary::{DictionaryApi, DictionaryClient, DictionaryError};
use crate::forvo::{ForvoClient, ForvoError, Pronunciation, PronunciationClient};
use crate::git::{self, GitRepo, SyncOutcome};
use crate::lang::{self, Detection, Lang, LangCode};
use crate::translate::{TransShell, Translator};

/// translate-shell target for the Chinese column.
const CHINESE_TARGET: &str = "zh-CN";

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("nothing to look up: the term is empty")]
    EmptyTerm,

    #[error(transparent)]
    Deck(#[from] DeckError),
}

#[derive(Debug, Clone)]
pub struct CaptureRequest {
    pub term: String,
    pub lang: Lang,
    pub audio: bool,
    pub git: bool,
}

/// Everything gathered for one term before anything is written.
#[derive(Debug, Clone)]
pub struct Lookup {
    pub term: String,
    pub lang: LangCode,
    pub detection: Option<Detection>,
    pub english: String,
    pub chinese: String,
    pub phonetic: Option<String>,
    pub audio_url: Option<String>,
    pub pronunciation: Option<Pronunciation>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitStatus {
    Disabled,
    Synced(SyncOutcome),
    Failed,
}

#[derive(Debug)]
pub struct Report {
    pub lookup: Lookup,
    pub deck_file: PathBuf,
    pub row: String,
    pub playback: Playback,
    pub git: GitStatus,
    pub repo_dir: PathBuf,
}

/// The lookup backends. Production wiring is `Services::from_config`; tests plug in stubs.
pub struct Services<D, P, T> {
    pub dictionary: D,
    pub pronunciations: Option<P>,
    pub translator: T,
}

impl Services<DictionaryApi, ForvoClient, TransShell> {
    pub fn from_config(config: &Config, http: Client) -> Self {
        let pronunciations = ForvoClient::new(http.clone(), config.forvo_api_key.as_deref())
            .inspect_err(|e| warn!("Forvo client not available: {e}"))
            .ok();
        Self {
            dictionary: DictionaryApi::new(http),
            pronunciations,
            translator: TransShell::new(config.trans_cmd.clone()),
        }
    }
}

impl<D, P, T> Services<D, P, T>
where
    D: DictionaryClient,
    P: PronunciationClient,
    T: Translator,
{
    pub async fn detect(&self, text: &str) -> Detection {
        lang::detect(text, &self.translator).await
    }

    pub async fn lookup(&self, term: &str, lang: &Lang) -> Result<Lookup, CaptureError> {
        let term = normalize_term(term).ok_or(CaptureError::EmptyTerm)?;

        let (code, detection) = match lang {
            Lang::Code(code) => (code.clone(), None),
            Lang::Auto => {
                let detection = self.detect(&term).await;
                (detection.code.clone(), Some(detection))
            }
        };

        info!(term = %term, lang = %code, "looking up");
        let mut notes = Vec::new();

        let (english, chinese, phonetic, pronunciation) = if code.is(LangCode::EN) {
            let (definition, chinese) = tokio::join!(
                self.dictionary.define(&term),
                self.translate(&code, CHINESE_TARGET, &term)
            );
            let (english, phonetic, dict_audio) = match definition {
                Ok(entry) => (entry.definitions.join(" ; "), entry.phonetic, entry.audio_url),
                Err(e) => {
                    log_dictionary_error(&e);
                    notes.push(e.to_string());
                    (String::new(), None, None)
                }
            };
            let pronunciation = match dict_audio {
                Some(url) => Ok(Some(AudioSource::Dictionary(url))),
                None => self.pronounce(&term, &code).await,
            };
            (Some(english), chinese, phonetic, pronunciation)
        } else if code.is(LangCode::ZH) {
            let (english, pronunciation) = tokio::join!(
                self.translate(&code, "en", &term),
                self.pronounce(&term, &code)
            );
            (english, Some(term.clone()), None, pronunciation)
        } else {
            let (english, chinese, pronunciation) = tokio::join!(
                self.translate(&code, "en", &term),
                self.translate(&code, CHINESE_TARGET, &term),
                self.pronounce(&term, &code)
            );
            (english, chinese, None, pronunciation)
        };

        let english = english.unwrap_or_else(|| {
            notes.push(format!("No English translation from translate-shell ({code}→en)"));
            String::new()
        });
        let chinese = chinese.unwrap_or_else(|| {
            notes.push(format!(
                "No Chinese translation from translate-shell ({code}→{CHINESE_TARGET})"
            ));
            String::new()
        });

        let (audio_url, pronunciation) = match pronunciation {
            Ok(Some(AudioSource::Dictionary(url))) => (Some(url), None),
            Ok(Some(AudioSource::Forvo(p))) => (Some(p.mp3_url.clone()), Some(p)),
            Ok(None) => (None, None),
            Err(note) => {
                notes.push(note);
                (None, None)
            }
        };

        Ok(Lookup {
            term,
            lang: code,
            detection,
            english,
            chinese,
            phonetic,
            audio_url,
            pronunciation,
            notes,
        })
    }

    /// Runs a full capture: lookup, playback, deck append, and git sync.
    pub async fn capture(
        &self,
        config: &Config,
        request: &CaptureRequest,
    ) -> Result<Report, CaptureError> {
        let mut lookup = self.lookup(&request.term, &request.lang).await?;

        let playback = if request.audio {
            let player = audio::pick_player(config.mp3_player.as_deref(), audio::on_path);
            audio::play(
                &lookup.term,
                config.voice_for(&lookup.lang),
                lookup.audio_url.as_deref(),
                player,
            )
            .await
        } else {
            Playback::Disabled
        };

        let deck_file = deck::deck_path(&config.repo_dir, &lookup.lang);
        let card = Card {
            word: lookup.term.clone(),
            english: lookup.english.clone(),
            chinese: lookup.chinese.clone(),
        };
        let row = deck::append(&deck_file, &card)?;
        info!(file = %deck_file.display(), "card saved");

        let git = if request.git && config.git_auto {
            match GitRepo::new(&config.repo_dir)
                .sync(&deck_file, &lookup.term)
                .await
            {
                Ok(outcome) => GitStatus::Synced(outcome),
                Err(e) => {
                    warn!(error = %e, "git sync failed");
                    lookup.notes.push(format!("Git sync failed: {e}"));
                    GitStatus::Failed
                }
            }
        } else {
            GitStatus::Disabled
        };

        Ok(Report {
            lookup,
            deck_file,
            row,
            playback,
            git,
            repo_dir: config.repo_dir.clone(),
        })
    }

    async fn translate(&self, src: &LangCode, dst: &str, term: &str) -> Option<String> {
        self.translator.brief(src.as_str(), dst, term).await
    }

    /// Forvo lookup; a failure comes back as a note for the report.
    async fn pronounce(
        &self,
        term: &str,
        code: &LangCode,
    ) -> Result<Option<AudioSource>, String> {
        let Some(client) = &self.pronunciations else {
            return Err(format!(
                "Pronunciation lookup skipped: {}",
                ForvoError::ApiKeyNotSet
            ));
        };
        match client.pronounce(term, code).await {
            Ok(found) => Ok(found.map(AudioSource::Forvo)),
            Err(e) => {
                warn!(error = %e, "pronunciation lookup failed");
                Err(format!("Pronunciation lookup failed: {e}"))
            }
        }
    }
}

enum AudioSource {
    Dictionary(String),
    Forvo(Pronunciation),
}

/// Joins whitespace runs into single spaces; `None` when nothing is left.
fn normalize_term(term: &str) -> Option<String> {
    let joined = term.split_whitespace().collect::<Vec<_>>().join(" ");
    (!joined.is_empty()).then_some(joined)
}

fn log_dictionary_error(e: &DictionaryError) {
    match e {
        DictionaryError::NotFound(_) => info!(error = %e, "no dictionary entry"),
        _ => warn!(error = %e, "dictionary lookup failed"),
    }
}

/// Hint appended to the report when git sync ran but had nowhere to push.
pub fn remote_hint(report: &Report) -> Option<String> {
    matches!(report.git, GitStatus::Synced(SyncOutcome::CommittedNoRemote))
        .then(|| git::remote_hint(&report.repo_dir))
}
