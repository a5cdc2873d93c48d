use std::path::PathBuf;

use clap::Parser;

use crate::capture::CaptureRequest;
use crate::lang::Lang;

/// Look up a word, pronounce it, and append it to an Anki-ready TSV deck.
#[derive(Debug, Parser)]
#[command(name = "vocab", version)]
pub struct Cli {
    /// Word or phrase to capture; multiple arguments are joined with spaces
    #[arg(required = true, value_name = "TERM")]
    pub term: Vec<String>,

    /// Source language code (en, sv, zh, ...) or `auto`
    #[arg(short, long, default_value = "auto", value_name = "CODE")]
    pub lang: Lang,

    /// Skip playback
    #[arg(long)]
    pub no_audio: bool,

    /// Skip the git commit and push for this run
    #[arg(long)]
    pub no_git: bool,

    /// Deck directory, overriding VOCAB_REPO
    #[arg(long, value_name = "DIR")]
    pub repo: Option<PathBuf>,

    /// Only print the detected language and exit
    #[arg(long)]
    pub detect: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn term(&self) -> String {
        self.term.join(" ")
    }

    pub fn request(&self) -> CaptureRequest {
        CaptureRequest {
            term: self.term(),
            lang: self.lang.clone(),
            audio: !self.no_audio,
            git: !self.no_git,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::LangCode;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_to_auto_with_audio_and_git() {
        let cli = Cli::try_parse_from(["vocab", "hus"]).unwrap();
        let request = cli.request();
        assert_eq!(request.term, "hus");
        assert_eq!(request.lang, Lang::Auto);
        assert!(request.audio);
        assert!(request.git);
        assert!(!cli.detect);
    }

    #[test]
    fn joins_multiword_terms() {
        let cli = Cli::try_parse_from(["vocab", "-l", "sv", "god", "morgon"]).unwrap();
        assert_eq!(cli.term(), "god morgon");
        assert_eq!(cli.lang, Lang::Code(LangCode::parse("sv").unwrap()));
    }

    #[test]
    fn flags_disable_side_effects() {
        let cli = Cli::try_parse_from([
            "vocab",
            "--no-audio",
            "--no-git",
            "--repo",
            "/tmp/decks",
            "house",
        ])
        .unwrap();
        let request = cli.request();
        assert!(!request.audio);
        assert!(!request.git);
        assert_eq!(cli.repo, Some(PathBuf::from("/tmp/decks")));
    }

    #[test]
    fn region_codes_are_normalised() {
        let cli = Cli::try_parse_from(["vocab", "--lang", "zh-CN", "房子"]).unwrap();
        assert_eq!(cli.lang, Lang::Code(LangCode::parse("zh").unwrap()));
    }

    #[test]
    fn rejects_missing_term_and_bad_language() {
        assert!(Cli::try_parse_from(["vocab"]).is_err());
        assert!(Cli::try_parse_from(["vocab", "-l", "e1", "x"]).is_err());
    }
}
