use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Entry {
    pub phonetic: Option<String>,
    #[serde(default)]
    pub phonetics: Vec<Phonetic>,
    #[serde(default)]
    pub meanings: Vec<Meaning>,
}

#[derive(Debug, Deserialize)]
pub struct Phonetic {
    pub text: Option<String>,
    pub audio: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meaning {
    pub part_of_speech: Option<String>,
    #[serde(default)]
    pub definitions: Vec<Definition>,
}

#[derive(Debug, Deserialize)]
pub struct Definition {
    #[serde(default)]
    pub definition: String,
    pub example: Option<String>,
}

/// Body returned with 404 and other error statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub title: Option<String>,
    pub message: Option<String>,
}

/// What a lookup yields for one headword.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DictionaryEntry {
    pub phonetic: Option<String>,
    pub audio_url: Option<String>,
    pub definitions: Vec<String>,
}
