use serde::{Deserialize, Serialize};

use crate::assessment::classification::TypeKey;
use crate::assessment::model::PersonalityProfile;

/// What to return when no profile matches a type key by any rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileFallback {
    /// Return the first profile in the catalog.
    #[default]
    First,
    /// Return nothing.
    None,
}

/// Which lookup rule produced the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileResolution {
    Exact,
    Reversed,
    PrimaryTrait,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileMatch<'a> {
    pub profile: &'a PersonalityProfile,
    pub resolution: ProfileResolution,
}

fn find<'a>(profiles: &'a [PersonalityProfile], key: &TypeKey) -> Option<&'a PersonalityProfile> {
    profiles.iter().find(|p| p.key == key.as_str())
}

/// Looks up the profile for a type key: exact key, then the reversed two-letter key, then
/// the first letter alone, then the `fallback` policy.
pub fn match_personality_profile<'a>(
    key: &TypeKey,
    profiles: &'a [PersonalityProfile],
    fallback: ProfileFallback,
) -> Option<ProfileMatch<'a>> {
    let hit = |profile, resolution| ProfileMatch {
        profile,
        resolution,
    };

    if let Some(p) = find(profiles, key) {
        return Some(hit(p, ProfileResolution::Exact));
    }
    if let Some(p) = key.reversed().and_then(|k| find(profiles, &k)) {
        return Some(hit(p, ProfileResolution::Reversed));
    }
    if let Some(p) = key.primary().and_then(|k| find(profiles, &k)) {
        return Some(hit(p, ProfileResolution::PrimaryTrait));
    }

    match fallback {
        ProfileFallback::First => profiles
            .first()
            .map(|p| hit(p, ProfileResolution::Fallback)),
        ProfileFallback::None => None,
    }
}
