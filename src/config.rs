use std::collections::HashMap;
use std::path::PathBuf;

use crate::lang::LangCode;

const DEFAULT_TRANS_CMD: &str = "trans";
const DEFAULT_VOICE: &str = "en-us";
const VOICE_PREFIX: &str = "ESPEAK_VOICE_";

/// Runtime configuration resolved from the environment.
///
/// - `VOCAB_REPO`: deck repository directory (default `~/anki-vocab`)
/// - `VOCAB_GIT_AUTO`: `1` commits and pushes each capture (default `1`)
/// - `TRANS_CMD`: translate-shell executable (default `trans`)
/// - `MP3_PLAYER`: preferred audio player
/// - `ESPEAK_VOICE`, `ESPEAK_VOICE_<CODE>`: espeak-ng voices
/// - `FORVO_API_KEY`: enables Forvo pronunciation lookups
#[derive(Debug, Clone)]
pub struct Config {
    pub repo_dir: PathBuf,
    pub git_auto: bool,
    pub trans_cmd: String,
    pub mp3_player: Option<String>,
    pub forvo_api_key: Option<String>,
    default_voice: String,
    voices: HashMap<String, String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        )
    }

    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k, v.trim().to_string()))
            .filter(|(_, v)| !v.is_empty())
            .collect();

        let mut voices: HashMap<String, String> = [("en", "en-us"), ("sv", "sv"), ("zh", "zh")]
            .into_iter()
            .map(|(code, voice)| (code.to_string(), voice.to_string()))
            .collect();
        for (key, value) in &vars {
            if let Some(code) = key.strip_prefix(VOICE_PREFIX)
                && let Ok(code) = LangCode::parse(code)
            {
                voices.insert(code.as_str().to_string(), value.clone());
            }
        }

        let repo_dir = vars
            .get("VOCAB_REPO")
            .map(PathBuf::from)
            .unwrap_or_else(default_repo_dir);

        Self {
            repo_dir,
            git_auto: vars.get("VOCAB_GIT_AUTO").is_none_or(|v| v == "1"),
            trans_cmd: vars
                .get("TRANS_CMD")
                .cloned()
                .unwrap_or_else(|| DEFAULT_TRANS_CMD.to_string()),
            mp3_player: vars.get("MP3_PLAYER").cloned(),
            forvo_api_key: vars.get("FORVO_API_KEY").cloned(),
            default_voice: vars
                .get("ESPEAK_VOICE")
                .cloned()
                .unwrap_or_else(|| DEFAULT_VOICE.to_string()),
            voices,
        }
    }

    /// espeak-ng voice for `lang`, falling back to `ESPEAK_VOICE`.
    pub fn voice_for(&self, lang: &LangCode) -> &str {
        self.voices
            .get(lang.as_str())
            .map(String::as_str)
            .unwrap_or(&self.default_voice)
    }
}

fn default_repo_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("anki-vocab"))
        .unwrap_or_else(|| PathBuf::from("anki-vocab"))
}
