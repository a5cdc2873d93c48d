//! Language codes: parsing, normalisation, and auto-detection.

mod detect;

use std::fmt;
use std::str::FromStr;

pub use detect::{Detection, DetectionSource, detect};

#[derive(Debug, thiserror::Error)]
pub enum LangError {
    #[error("invalid language code '{0}': expected 'auto' or a 2-3 letter code such as 'en' or 'sv'")]
    Invalid(String),
}

/// A normalised language code: lowercase ASCII letters, region suffix dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LangCode(String);

impl LangCode {
    pub const EN: &'static str = "en";
    pub const ZH: &'static str = "zh";

    /// Normalises `zh-CN` / `pt_BR` style codes to their base and validates the result.
    pub fn parse(raw: &str) -> Result<Self, LangError> {
        let lower = raw.trim().to_ascii_lowercase();
        let base = lower.split(['-', '_']).next().unwrap_or_default();

        if !(2..=3).contains(&base.len()) || !base.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(LangError::Invalid(raw.to_string()));
        }
        Ok(Self(base.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is(&self, code: &str) -> bool {
        self.0 == code
    }
}

impl fmt::Display for LangCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source language requested on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Lang {
    #[default]
    Auto,
    Code(LangCode),
}

impl FromStr for Lang {
    type Err = LangError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(Lang::Auto);
        }
        LangCode::parse(s).map(Lang::Code)
    }
}
