use super::budget::BudgetBracket;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Named sound preference, bound to a fixed (bass, mid, treble) archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCharacter {
    #[serde(rename = "Bass kuat")]
    BassHeavy,
    #[serde(rename = "Seimbang")]
    Balanced,
    #[serde(rename = "Detail / Jernih")]
    Detailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Archetype {
    pub bass: u8,
    pub mid: u8,
    pub treble: u8,
}

impl SoundCharacter {
    pub const ALL: [SoundCharacter; 3] = [
        SoundCharacter::BassHeavy,
        SoundCharacter::Balanced,
        SoundCharacter::Detailed,
    ];

    pub fn parse(label: &str) -> Option<SoundCharacter> {
        SoundCharacter::ALL
            .into_iter()
            .find(|character| character.label() == label.trim())
    }

    pub fn label(&self) -> &'static str {
        match self {
            SoundCharacter::BassHeavy => "Bass kuat",
            SoundCharacter::Balanced => "Seimbang",
            SoundCharacter::Detailed => "Detail / Jernih",
        }
    }

    pub fn archetype(&self) -> Archetype {
        match self {
            SoundCharacter::BassHeavy => Archetype {
                bass: 5,
                mid: 3,
                treble: 3,
            },
            SoundCharacter::Balanced => Archetype {
                bass: 3,
                mid: 4,
                treble: 3,
            },
            SoundCharacter::Detailed => Archetype {
                bass: 2,
                mid: 3,
                treble: 5,
            },
        }
    }
}

/// A rejected request field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ClientInputError {
    pub field: &'static str,
    pub message: String,
}

impl ClientInputError {
    pub fn missing(field: &'static str) -> Self {
        ClientInputError {
            field,
            message: "Semua field harus diisi!".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserQuery {
    pub budget: BudgetBracket,
    pub genre: String,
    pub sound_character: SoundCharacter,
    pub top_n: usize,
}

pub const DEFAULT_TOP_N: usize = 3;

/// Loosely typed request fields as they arrive from a client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryInput {
    pub budget: Option<String>,
    pub genre: Option<String>,
    pub sound_character: Option<String>,
    pub top_n: Option<usize>,
}

fn required_field(field: &'static str, value: &Option<String>) -> Result<String, ClientInputError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_owned()),
        _ => Err(ClientInputError::missing(field)),
    }
}

impl QueryInput {
    /// Checks the request fields and builds a [`UserQuery`].
    ///
    /// `top_n` defaults to `default_top_n` and must lie in `1..=max_top_n`.
    pub fn validate(
        &self,
        default_top_n: usize,
        max_top_n: usize,
    ) -> Result<UserQuery, ClientInputError> {
        let budget = required_field("budget", &self.budget)?;
        let genre = required_field("genre", &self.genre)?;
        let sound_character = required_field("sound_character", &self.sound_character)?;

        let sound_character =
            SoundCharacter::parse(&sound_character).ok_or_else(|| ClientInputError {
                field: "sound_character",
                message: format!(
                    "Karakter suara '{}' tidak dikenal, pilih salah satu dari: {}",
                    sound_character,
                    SoundCharacter::ALL
                        .iter()
                        .map(|c| c.label())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })?;

        let top_n = self.top_n.unwrap_or(default_top_n);
        if top_n == 0 || top_n > max_top_n {
            return Err(ClientInputError {
                field: "top_n",
                message: format!("top_n harus antara 1 dan {}", max_top_n),
            });
        }

        Ok(UserQuery {
            budget: BudgetBracket::parse(&budget),
            genre,
            sound_character,
            top_n,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_input() -> QueryInput {
        QueryInput {
            budget: Some("< 500k".to_string()),
            genre: Some("Pop".to_string()),
            sound_character: Some("Bass kuat".to_string()),
            top_n: None,
        }
    }

    #[test]
    fn archetypes_are_fixed() {
        assert_eq!(
            SoundCharacter::BassHeavy.archetype(),
            Archetype {
                bass: 5,
                mid: 3,
                treble: 3
            }
        );
        assert_eq!(
            SoundCharacter::Balanced.archetype(),
            Archetype {
                bass: 3,
                mid: 4,
                treble: 3
            }
        );
        assert_eq!(
            SoundCharacter::Detailed.archetype(),
            Archetype {
                bass: 2,
                mid: 3,
                treble: 5
            }
        );
    }

    #[test]
    fn sound_character_labels_round_trip() {
        for character in SoundCharacter::ALL {
            assert_eq!(SoundCharacter::parse(character.label()), Some(character));
            let json = serde_json::to_string(&character).unwrap();
            assert_eq!(json, format!("\"{}\"", character.label()));
        }
        assert_eq!(SoundCharacter::parse("Loud"), None);
    }

    #[test]
    fn valid_input_builds_query() {
        let query = make_input().validate(DEFAULT_TOP_N, 20).unwrap();
        assert_eq!(query.budget, BudgetBracket::Under500k);
        assert_eq!(query.genre, "Pop");
        assert_eq!(query.sound_character, SoundCharacter::BassHeavy);
        assert_eq!(query.top_n, 3);
    }

    #[test]
    fn missing_fields_are_reported_by_name() {
        for field in ["budget", "genre", "sound_character"] {
            let mut input = make_input();
            match field {
                "budget" => input.budget = None,
                "genre" => input.genre = Some("  ".to_string()),
                _ => input.sound_character = None,
            }
            let err = input.validate(DEFAULT_TOP_N, 20).unwrap_err();
            assert_eq!(err.field, field);
        }
    }

    #[test]
    fn unknown_sound_character_is_rejected() {
        let mut input = make_input();
        input.sound_character = Some("Very loud".to_string());
        let err = input.validate(DEFAULT_TOP_N, 20).unwrap_err();
        assert_eq!(err.field, "sound_character");
        assert!(err.message.contains("Very loud"));
    }

    #[test]
    fn unknown_budget_is_permissive() {
        let mut input = make_input();
        input.budget = Some("whatever".to_string());
        let query = input.validate(DEFAULT_TOP_N, 20).unwrap();
        assert_eq!(query.budget, BudgetBracket::Any);
    }

    #[test]
    fn top_n_bounds() {
        let mut input = make_input();
        input.top_n = Some(0);
        assert_eq!(input.validate(DEFAULT_TOP_N, 20).unwrap_err().field, "top_n");
        input.top_n = Some(21);
        assert_eq!(input.validate(DEFAULT_TOP_N, 20).unwrap_err().field, "top_n");
        input.top_n = Some(20);
        assert_eq!(input.validate(DEFAULT_TOP_N, 20).unwrap().top_n, 20);
    }
}
