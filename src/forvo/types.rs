use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PronunciationsResponse {
    pub attributes: Option<Attributes>,
    #[serde(default)]
    pub items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
pub struct Attributes {
    pub total: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub word: String,
    pub code: Option<String>,
    pub username: Option<String>,
    pub country: Option<String>,
    pub pathmp3: Option<String>,
    #[serde(default)]
    pub rate: i64,
    #[serde(default)]
    pub num_votes: i64,
}

/// The pronunciation chosen for a word.
#[derive(Debug, Clone, PartialEq)]
pub struct Pronunciation {
    pub word: String,
    pub code: Option<String>,
    pub username: Option<String>,
    pub country: Option<String>,
    pub mp3_url: String,
    pub rate: i64,
    pub votes: i64,
}
