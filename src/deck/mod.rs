//! Anki-importable TSV decks, one file per source language.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::lang::LangCode;

#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    #[error("cannot create deck directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write deck file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One flashcard: the captured word with its English and Chinese glosses.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub word: String,
    pub english: String,
    pub chinese: String,
}

impl Card {
    /// Renders the card as exactly one three-column TSV row.
    pub fn to_row(&self) -> String {
        format!(
            "{}\t{}\t{}\n",
            sanitize_field(&self.word),
            sanitize_field(&self.english),
            sanitize_field(&self.chinese)
        )
    }
}

pub fn deck_path(repo_dir: &Path, lang: &LangCode) -> PathBuf {
    repo_dir.join(format!("vocab_{lang}.tsv"))
}

/// Appends `card` to the deck at `path`, creating the directory and file when missing.
/// Returns the row as written.
pub fn append(path: &Path, card: &Card) -> Result<String, DeckError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| DeckError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let row = card.to_row();
    let write_err = |source| DeckError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(write_err)?;
    file.write_all(row.as_bytes()).map_err(write_err)?;

    debug!(path = %path.display(), bytes = row.len(), "card appended");
    Ok(row)
}

/// Collapses tabs and line breaks so a field can never add columns or rows.
fn sanitize_field(field: &str) -> String {
    field
        .split(['\t', '\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(word: &str, english: &str, chinese: &str) -> Card {
        Card {
            word: word.into(),
            english: english.into(),
            chinese: chinese.into(),
        }
    }

    #[test]
    fn deck_path_is_per_language() {
        let sv = LangCode::parse("sv").unwrap();
        assert_eq!(
            deck_path(Path::new("/decks"), &sv),
            PathBuf::from("/decks/vocab_sv.tsv")
        );
    }

    #[test]
    fn row_has_three_columns() {
        let row = card("hus", "house", "房子").to_row();
        assert_eq!(row, "hus\thouse\t房子\n");
    }

    #[test]
    fn row_keeps_empty_columns() {
        assert_eq!(card("hus", "", "").to_row(), "hus\t\t\n");
    }

    #[test]
    fn control_characters_cannot_break_the_row() {
        let row = card("a\tb", "line one\nline two\r\n", "x\t\ty").to_row();
        assert_eq!(row, "a b\tline one line two\tx y\n");
        assert_eq!(row.matches('\t').count(), 2);
        assert_eq!(row.matches('\n').count(), 1);
    }

    #[test]
    fn append_creates_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("vocab_sv.tsv");

        let row = append(&path, &card("hus", "house", "房子")).unwrap();

        assert_eq!(row, "hus\thouse\t房子\n");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), row);
    }

    #[test]
    fn append_only_grows_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab_en.tsv");
        std::fs::write(&path, "existing\trow\there\n").unwrap();

        append(&path, &card("house", "[noun] a building", "房子")).unwrap();
        append(&path, &card("home", "[noun] a dwelling", "家")).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "existing\trow\there\nhouse\t[noun] a building\t房子\nhome\t[noun] a dwelling\t家\n"
        );
    }

    #[test]
    fn append_to_unwritable_location_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be.
        let path = dir.path().join("vocab_en.tsv");
        std::fs::create_dir(&path).unwrap();

        let err = append(&path, &card("a", "b", "c")).unwrap_err();
        assert!(matches!(err, DeckError::Write { .. }));
        assert!(err.to_string().contains("vocab_en.tsv"));
    }
}
