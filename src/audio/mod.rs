//! Pronouncing the captured word: stream a recording or fall back to espeak-ng.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

/// Upper bound for a single playback.
const PLAYBACK_TIMEOUT: Duration = Duration::from_secs(30);

const DEFAULT_PREFERENCE: [Player; 4] = [
    Player::Mpv,
    Player::Ffplay,
    Player::Mpg123,
    Player::EspeakNg,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Player {
    Mpv,
    Ffplay,
    Mpg123,
    EspeakNg,
}

impl Player {
    /// Recognises a player by name or path (`/usr/bin/mpv` → `Mpv`).
    pub fn from_name(name: &str) -> Option<Self> {
        let base = Path::new(name.trim()).file_name()?.to_str()?;
        match base {
            "mpv" => Some(Player::Mpv),
            "ffplay" => Some(Player::Ffplay),
            "mpg123" => Some(Player::Mpg123),
            "espeak-ng" => Some(Player::EspeakNg),
            _ => None,
        }
    }

    pub fn program(self) -> &'static str {
        match self {
            Player::Mpv => "mpv",
            Player::Ffplay => "ffplay",
            Player::Mpg123 => "mpg123",
            Player::EspeakNg => "espeak-ng",
        }
    }

    fn stream_args(self, url: &str) -> Option<Vec<&str>> {
        match self {
            Player::Mpv => Some(vec!["--really-quiet", "--no-video", url]),
            Player::Ffplay => Some(vec!["-autoexit", "-nodisp", "-loglevel", "quiet", url]),
            Player::Mpg123 => Some(vec!["-q", url]),
            Player::EspeakNg => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Playback {
    Disabled,
    Streamed(Player),
    Spoken { voice: String },
    Failed,
}

/// First available player: `preferred` (when recognised) ahead of the default order.
pub fn pick_player(preferred: Option<&str>, is_available: impl Fn(&str) -> bool) -> Option<Player> {
    let preferred = preferred.and_then(|name| {
        let player = Player::from_name(name);
        if player.is_none() {
            debug!(name, "ignoring unrecognised MP3_PLAYER");
        }
        player
    });

    preferred
        .into_iter()
        .chain(DEFAULT_PREFERENCE)
        .find(|p| is_available(p.program()))
}

/// True when an executable called `program` is on `PATH`.
pub fn on_path(program: &str) -> bool {
    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&paths).any(|dir| is_executable(&dir.join(program)))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

/// Only http(s) URLs are handed to a player.
fn streamable_url(raw: &str) -> Option<&str> {
    let parsed = url::Url::parse(raw).ok()?;
    matches!(parsed.scheme(), "http" | "https").then_some(raw)
}

/// Plays `audio_url` with a streaming player when possible, otherwise speaks `word` with espeak-ng.
pub async fn play(
    word: &str,
    voice: &str,
    audio_url: Option<&str>,
    player: Option<Player>,
) -> Playback {
    if let (Some(url), Some(player)) = (audio_url.and_then(streamable_url), player)
        && let Some(args) = player.stream_args(url)
    {
        if run(player.program(), &args).await {
            return Playback::Streamed(player);
        }
        debug!(player = player.program(), "streaming failed, falling back to espeak-ng");
    }

    if run(Player::EspeakNg.program(), &["-v", voice, word]).await {
        Playback::Spoken {
            voice: voice.to_string(),
        }
    } else {
        Playback::Failed
    }
}

async fn run(program: &str, args: &[&str]) -> bool {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    match tokio::time::timeout(PLAYBACK_TIMEOUT, cmd.status()).await {
        Ok(Ok(status)) => {
            debug!(program, %status, "playback finished");
            status.success()
        }
        Ok(Err(e)) => {
            debug!(program, error = %e, "playback could not start");
            false
        }
        Err(_) => {
            debug!(program, "playback timed out");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_accepts_paths() {
        assert_eq!(Player::from_name("/usr/local/bin/mpv"), Some(Player::Mpv));
        assert_eq!(Player::from_name("mpg123"), Some(Player::Mpg123));
        assert_eq!(Player::from_name("vlc"), None);
        assert_eq!(Player::from_name(""), None);
    }

    #[test]
    fn default_order_prefers_mpv() {
        let picked = pick_player(None, |_| true);
        assert_eq!(picked, Some(Player::Mpv));
    }

    #[test]
    fn preferred_player_wins_when_available() {
        let picked = pick_player(Some("mpg123"), |_| true);
        assert_eq!(picked, Some(Player::Mpg123));
    }

    #[test]
    fn unavailable_preferred_player_falls_through() {
        let picked = pick_player(Some("mpg123"), |p| p == "ffplay");
        assert_eq!(picked, Some(Player::Ffplay));
    }

    #[test]
    fn unrecognised_preferred_player_is_skipped() {
        let picked = pick_player(Some("vlc"), |p| p == "espeak-ng");
        assert_eq!(picked, Some(Player::EspeakNg));
    }

    #[test]
    fn nothing_available_yields_none() {
        assert_eq!(pick_player(Some("mpv"), |_| false), None);
    }

    #[test]
    fn stream_args_end_with_url() {
        let url = "https://audio.example/hus.mp3";
        for player in [Player::Mpv, Player::Ffplay, Player::Mpg123] {
            let args = player.stream_args(url).unwrap();
            assert_eq!(args.last(), Some(&url));
        }
        assert!(Player::EspeakNg.stream_args(url).is_none());
    }

    #[test]
    fn only_http_urls_are_streamable() {
        assert!(streamable_url("https://audio.example/a.mp3").is_some());
        assert!(streamable_url("http://audio.example/a.mp3").is_some());
        assert!(streamable_url("file:///etc/passwd").is_none());
        assert!(streamable_url("--script=evil.lua").is_none());
        assert!(streamable_url("").is_none());
    }

    #[test]
    fn on_path_rejects_missing_program() {
        assert!(!on_path("vocab-test-no-such-player"));
    }

    #[cfg(unix)]
    #[test]
    fn on_path_finds_shell() {
        assert!(on_path("sh"));
    }
}
