use tracing::debug;

use super::LangCode;
use crate::translate::Translator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionSource {
    Whatlang,
    Translator,
    Fallback,
}

impl DetectionSource {
    pub fn label(self) -> &'static str {
        match self {
            DetectionSource::Whatlang => "whatlang",
            DetectionSource::Translator => "translate-shell",
            DetectionSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Detection {
    pub code: LangCode,
    pub source: DetectionSource,
    pub confidence: Option<f64>,
}

/// Resolves the language of `text`.
///
/// A reliable in-process guess wins outright. Otherwise the translator is asked,
/// then an unreliable guess is used, and finally English.
pub async fn detect(text: &str, translator: &impl Translator) -> Detection {
    let guess = detect_local(text);

    if let Some((code, confidence, true)) = &guess {
        debug!(code = %code, confidence, "language detected locally");
        return Detection {
            code: code.clone(),
            source: DetectionSource::Whatlang,
            confidence: Some(*confidence),
        };
    }

    if let Some(code) = translator
        .identify(text)
        .await
        .as_deref()
        .and_then(normalize_identified)
    {
        debug!(code = %code, "language identified by translator");
        return Detection {
            code,
            source: DetectionSource::Translator,
            confidence: None,
        };
    }

    match guess {
        Some((code, confidence, _)) => {
            debug!(code = %code, confidence, "using unreliable local guess");
            Detection {
                code,
                source: DetectionSource::Whatlang,
                confidence: Some(confidence),
            }
        }
        None => Detection {
            code: LangCode(LangCode::EN.to_string()),
            source: DetectionSource::Fallback,
            confidence: None,
        },
    }
}

fn detect_local(text: &str) -> Option<(LangCode, f64, bool)> {
    let info = whatlang::detect(text)?;
    let code = iso639_1(info.lang())?;
    Some((
        LangCode(code.to_string()),
        info.confidence(),
        info.is_reliable(),
    ))
}

/// Maps translator identification output (a code or an English language name) to a code.
pub(crate) fn normalize_identified(raw: &str) -> Option<LangCode> {
    let out = raw.trim().to_lowercase();
    let mapped = match out.as_str() {
        "" => return None,
        "english" => "en",
        "swedish" | "svenska" => "sv",
        "chinese" | "chinese (simplified)" | "chinese (traditional)" => "zh",
        other => other,
    };
    let base: String = mapped
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .chars()
        .take(2)
        .collect();
    LangCode::parse(&base).ok()
}

fn iso639_1(lang: whatlang::Lang) -> Option<&'static str> {
    use whatlang::Lang as W;
    let code = match lang {
        W::Eng => "en",
        W::Swe => "sv",
        W::Cmn => "zh",
        W::Deu => "de",
        W::Fra => "fr",
        W::Spa => "es",
        W::Por => "pt",
        W::Ita => "it",
        W::Nld => "nl",
        W::Dan => "da",
        W::Nob => "nb",
        W::Fin => "fi",
        W::Rus => "ru",
        W::Ukr => "uk",
        W::Pol => "pl",
        W::Ces => "cs",
        W::Slk => "sk",
        W::Hun => "hu",
        W::Ron => "ro",
        W::Tur => "tr",
        W::Ell => "el",
        W::Jpn => "ja",
        W::Kor => "ko",
        W::Ara => "ar",
        W::Heb => "he",
        W::Hin => "hi",
        W::Vie => "vi",
        W::Tha => "th",
        W::Ind => "id",
        W::Cat => "ca",
        W::Epo => "eo",
        W::Lat => "la",
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct StubTranslator {
        identified: Option<String>,
        calls: Mutex<u32>,
    }

    impl StubTranslator {
        fn answering(identified: Option<&str>) -> Self {
            Self {
                identified: identified.map(str::to_string),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    impl Translator for StubTranslator {
        async fn brief(&self, _src: &str, _dst: &str, _text: &str) -> Option<String> {
            None
        }

        async fn identify(&self, _text: &str) -> Option<String> {
            *self.calls.lock().unwrap() += 1;
            self.identified.clone()
        }
    }

    #[test]
    fn normalizes_language_names() {
        assert_eq!(normalize_identified("English").unwrap().as_str(), "en");
        assert_eq!(normalize_identified("svenska\n").unwrap().as_str(), "sv");
        assert_eq!(
            normalize_identified("Chinese (Simplified)").unwrap().as_str(),
            "zh"
        );
    }

    #[test]
    fn normalizes_codes_to_two_letter_base() {
        assert_eq!(normalize_identified("zh-CN").unwrap().as_str(), "zh");
        assert_eq!(normalize_identified("de").unwrap().as_str(), "de");
    }

    #[test]
    fn empty_identification_is_none() {
        assert!(normalize_identified("").is_none());
        assert!(normalize_identified("   \n").is_none());
    }

    #[tokio::test]
    async fn han_script_resolves_to_chinese() {
        let translator = StubTranslator::answering(None);
        let detection = detect("这是一个测试。", &translator).await;
        assert_eq!(detection.code.as_str(), "zh");
        assert_eq!(detection.source, DetectionSource::Whatlang);
    }

    #[tokio::test]
    async fn long_swedish_sentence_resolves_to_swedish() {
        let translator = StubTranslator::answering(None);
        let detection = detect(
            "Livet är bättre än när de var fattiga bönder och arbetade på gården hela dagarna",
            &translator,
        )
        .await;
        assert_eq!(detection.code.as_str(), "sv");
    }

    #[tokio::test]
    async fn undetectable_text_falls_back_to_english() {
        let translator = StubTranslator::answering(None);
        let detection = detect("12345 !!!", &translator).await;
        assert_eq!(detection.code.as_str(), "en");
        assert_eq!(detection.source, DetectionSource::Fallback);
        assert_eq!(translator.calls(), 1);
    }

    #[tokio::test]
    async fn translator_answer_is_used_when_local_guess_is_missing() {
        let translator = StubTranslator::answering(Some("Swedish"));
        let detection = detect("12345", &translator).await;
        assert_eq!(detection.code.as_str(), "sv");
        assert_eq!(detection.source, DetectionSource::Translator);
    }
}
