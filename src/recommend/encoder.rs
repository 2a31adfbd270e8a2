use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Result of looking a genre up in the codebook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenreEncoding {
    Known(usize),
    /// The genre is not in the codebook, the first class is used instead.
    Fallback(usize),
}

impl GenreEncoding {
    pub fn code(&self) -> usize {
        match self {
            GenreEncoding::Known(code) | GenreEncoding::Fallback(code) => *code,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, GenreEncoding::Fallback(_))
    }
}

/// Frozen bijection between genre labels and `0..K-1`.
///
/// Codes follow the lexicographic order of the labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct GenreCodebook {
    classes: Vec<String>,
    codes: HashMap<String, usize>,
}

pub const FALLBACK_GENRE_CODE: usize = 0;

impl GenreCodebook {
    pub fn fit<I, S>(genres: I) -> GenreCodebook
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let classes: BTreeSet<String> = genres
            .into_iter()
            .map(|g| g.as_ref().to_owned())
            .collect();
        GenreCodebook::from(classes.into_iter().collect::<Vec<_>>())
    }

    pub fn encode(&self, genre: &str) -> GenreEncoding {
        match self.codes.get(genre) {
            Some(code) => GenreEncoding::Known(*code),
            None => GenreEncoding::Fallback(FALLBACK_GENRE_CODE),
        }
    }

    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(|s| s.as_str())
    }

    pub fn genres(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl From<Vec<String>> for GenreCodebook {
    fn from(mut classes: Vec<String>) -> Self {
        classes.sort();
        classes.dedup();
        let codes = classes
            .iter()
            .enumerate()
            .map(|(code, genre)| (genre.clone(), code))
            .collect();
        GenreCodebook { classes, codes }
    }
}

impl From<GenreCodebook> for Vec<String> {
    fn from(codebook: GenreCodebook) -> Self {
        codebook.classes
    }
}
