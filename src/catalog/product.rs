use serde::{Deserialize, Serialize};

/// Frequency-response shape label assigned to a product.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tuning {
    #[serde(rename = "V-Shaped")]
    VShaped,
    Neutral,
    Balanced,
    Bright,
    #[serde(rename = "Neutral-Bright")]
    NeutralBright,
}

impl Tuning {
    pub const ALL: [Tuning; 5] = [
        Tuning::VShaped,
        Tuning::Neutral,
        Tuning::Balanced,
        Tuning::Bright,
        Tuning::NeutralBright,
    ];

    pub fn from_label(label: &str) -> Option<Tuning> {
        Tuning::ALL
            .into_iter()
            .find(|tuning| tuning.label() == label.trim())
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tuning::VShaped => "V-Shaped",
            Tuning::Neutral => "Neutral",
            Tuning::Balanced => "Balanced",
            Tuning::Bright => "Bright",
            Tuning::NeutralBright => "Neutral-Bright",
        }
    }

    /// File name of the frequency-response diagram for this tuning.
    pub fn diagram_file(&self) -> &'static str {
        match self {
            Tuning::VShaped => "V Shape.png",
            Tuning::Neutral => "Neutral.png",
            Tuning::Balanced => "Balanced.png",
            Tuning::Bright => "bright.png",
            Tuning::NeutralBright => "Neutral bright.png",
        }
    }

    /// Diagram for an arbitrary catalog label, unmapped labels use the Neutral one.
    pub fn diagram_for_label(label: &str) -> &'static str {
        Tuning::from_label(label)
            .unwrap_or(Tuning::Neutral)
            .diagram_file()
    }
}

/// One prepared catalog row. All fields needed for matching are present.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub brand: String,
    pub price: u64,
    pub bass: u8,
    pub mid: u8,
    pub treble: u8,
    pub soundstage: u8,
    /// Kept as the catalog wrote it, see [`Tuning::from_label`].
    pub tuning: String,
    pub genre: String,
    #[serde(default)]
    pub driver_type: String,
}

/// A row of the raw catalog table, before validation.
///
/// Every field is optional so that the preparation step can tell a missing
/// field apart from a malformed one.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawProduct {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub price: Option<f64>,
    pub bass: Option<f64>,
    pub mid: Option<f64>,
    pub treble: Option<f64>,
    pub soundstage: Option<f64>,
    pub tuning: Option<String>,
    pub genre: Option<String>,
    pub driver_type: Option<String>,
}
