use std::fmt;

use serde::{Deserialize, Serialize};

use crate::assessment::model::{Trait, TraitScores};

/// Minimum score for a trait to count as dominant.
pub const DOMINANT_THRESHOLD: u32 = 60;
/// Fallback threshold used when no trait reaches [`DOMINANT_THRESHOLD`].
pub const MODERATE_THRESHOLD: u32 = 55;

/// A one- or two-letter DISC classification such as `D` or `DI`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeKey(String);

impl TypeKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Builds a key from up to two traits, letters sorted alphabetically.
    fn from_traits(traits: &[Trait]) -> Self {
        let mut letters: Vec<char> = traits.iter().map(|t| t.letter()).collect();
        letters.sort_unstable();
        Self(letters.into_iter().collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_combination(&self) -> bool {
        self.0.chars().count() == 2
    }

    /// `DI` -> `ID`. Only meaningful for two-letter keys.
    pub fn reversed(&self) -> Option<TypeKey> {
        self.is_combination()
            .then(|| TypeKey(self.0.chars().rev().collect()))
    }

    /// `DI` -> `D`. Only meaningful for two-letter keys.
    pub fn primary(&self) -> Option<TypeKey> {
        self.is_combination()
            .then(|| TypeKey(self.0.chars().take(1).collect()))
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Traits scoring at least `threshold`, highest first. Ties keep D, I, S, C order.
fn traits_at_or_above(scores: &TraitScores, threshold: u32) -> Vec<Trait> {
    let mut ranked: Vec<(Trait, u32)> = scores
        .entries()
        .into_iter()
        .filter(|(_, score)| *score >= threshold)
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().map(|(t, _)| t).collect()
}

fn key_for(ranked: &[Trait]) -> Option<TypeKey> {
    match ranked {
        [] => None,
        [only] => Some(TypeKey::from_traits(&[*only])),
        [first, second, ..] => Some(TypeKey::from_traits(&[*first, *second])),
    }
}

/// Classifies normalized scores into a DISC type key.
///
/// The two highest traits at or above 60 form the key; failing that, the two highest at or
/// above 55; failing that, the single highest trait (first in D, I, S, C order on ties).
pub fn determine_disc_type(scores: &TraitScores) -> TypeKey {
    if let Some(key) = key_for(&traits_at_or_above(scores, DOMINANT_THRESHOLD)) {
        return key;
    }
    if let Some(key) = key_for(&traits_at_or_above(scores, MODERATE_THRESHOLD)) {
        return key;
    }

    let highest = traits_at_or_above(scores, 0)
        .into_iter()
        .next()
        .unwrap_or(Trait::D);
    TypeKey::from_traits(&[highest])
}
