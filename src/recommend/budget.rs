use crate::catalog::Product;
use serde::Serialize;

/// Price bracket picked by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BudgetBracket {
    Under500k,
    From500kTo1jt,
    From1jtTo2jt,
    Above2jt,
    /// Unrecognized selection, no price filtering.
    Any,
}

/// Closed price interval, `max` of `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    pub min: u64,
    pub max: Option<u64>,
}

impl PriceRange {
    pub fn contains(&self, price: u64) -> bool {
        price >= self.min && self.max.map_or(true, |max| price <= max)
    }
}

impl BudgetBracket {
    pub const SELECTABLE: [BudgetBracket; 4] = [
        BudgetBracket::Under500k,
        BudgetBracket::From500kTo1jt,
        BudgetBracket::From1jtTo2jt,
        BudgetBracket::Above2jt,
    ];

    /// Never fails, unknown labels become [`BudgetBracket::Any`].
    pub fn parse(label: &str) -> BudgetBracket {
        BudgetBracket::SELECTABLE
            .into_iter()
            .find(|bracket| bracket.label() == label.trim())
            .unwrap_or(BudgetBracket::Any)
    }

    pub fn label(&self) -> &'static str {
        match self {
            BudgetBracket::Under500k => "< 500k",
            BudgetBracket::From500kTo1jt => "500k-1jt",
            BudgetBracket::From1jtTo2jt => "1jt-2jt",
            BudgetBracket::Above2jt => "> 2jt",
            BudgetBracket::Any => "any",
        }
    }

    pub fn price_range(&self) -> PriceRange {
        match self {
            BudgetBracket::Under500k => PriceRange {
                min: 0,
                max: Some(500_000),
            },
            BudgetBracket::From500kTo1jt => PriceRange {
                min: 500_000,
                max: Some(1_000_000),
            },
            BudgetBracket::From1jtTo2jt => PriceRange {
                min: 1_000_000,
                max: Some(2_000_000),
            },
            BudgetBracket::Above2jt => PriceRange {
                min: 2_000_000,
                max: None,
            },
            BudgetBracket::Any => PriceRange { min: 0, max: None },
        }
    }

    /// Price coordinate used for the query vector.
    pub fn reference_price(&self) -> u64 {
        match self {
            BudgetBracket::Under500k => 300_000,
            BudgetBracket::From500kTo1jt => 750_000,
            BudgetBracket::From1jtTo2jt => 1_500_000,
            BudgetBracket::Above2jt => 3_000_000,
            BudgetBracket::Any => 750_000,
        }
    }
}

/// Catalog rows that fit a bracket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetSelection {
    /// Catalog positions, in catalog order. Never empty.
    Candidates(Vec<usize>),
    /// No product priced within the bracket.
    Empty,
}

impl BudgetSelection {
    pub fn len(&self) -> usize {
        match self {
            BudgetSelection::Candidates(indices) => indices.len(),
            BudgetSelection::Empty => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, BudgetSelection::Empty)
    }
}

pub fn filter(catalog: &[Product], bracket: BudgetBracket) -> BudgetSelection {
    let range = bracket.price_range();
    let indices: Vec<usize> = catalog
        .iter()
        .enumerate()
        .filter(|(_, product)| range.contains(product.price))
        .map(|(index, _)| index)
        .collect();

    if indices.is_empty() {
        BudgetSelection::Empty
    } else {
        BudgetSelection::Candidates(indices)
    }
}
