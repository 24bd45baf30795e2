use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The four DISC factors, in canonical iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Trait {
    D,
    I,
    S,
    C,
}

impl Trait {
    pub const ALL: [Trait; 4] = [Trait::D, Trait::I, Trait::S, Trait::C];

    /// Parses a trait label. Only the single-letter DISC codes are accepted.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "D" => Some(Trait::D),
            "I" => Some(Trait::I),
            "S" => Some(Trait::S),
            "C" => Some(Trait::C),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Trait::D => 'D',
            Trait::I => 'I',
            Trait::S => 'S',
            Trait::C => 'C',
        }
    }
}

impl fmt::Display for Trait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// One value per DISC trait. Every trait is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitScores {
    #[serde(rename = "D")]
    pub d: u32,
    #[serde(rename = "I")]
    pub i: u32,
    #[serde(rename = "S")]
    pub s: u32,
    #[serde(rename = "C")]
    pub c: u32,
}

impl TraitScores {
    pub fn get(&self, t: Trait) -> u32 {
        match t {
            Trait::D => self.d,
            Trait::I => self.i,
            Trait::S => self.s,
            Trait::C => self.c,
        }
    }

    pub fn get_mut(&mut self, t: Trait) -> &mut u32 {
        match t {
            Trait::D => &mut self.d,
            Trait::I => &mut self.i,
            Trait::S => &mut self.s,
            Trait::C => &mut self.c,
        }
    }

    /// Entries in canonical D, I, S, C order.
    pub fn entries(&self) -> [(Trait, u32); 4] {
        Trait::ALL.map(|t| (t, self.get(t)))
    }
}

/// A selectable answer. `trait_label` is kept as free text because reference data may
/// carry labels outside the DISC set; scoring decides what to do with them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub id: i64,
    pub text: String,
    #[serde(rename = "trait")]
    pub trait_label: String,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub order: i32,
    pub text: String,
    #[serde(rename = "trait")]
    pub trait_label: String,
    #[serde(default)]
    pub reverse: bool,
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityProfile {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub key: String,
    pub title: String,
    pub detail: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub recommended_jobs: Vec<String>,
    #[serde(default)]
    pub company_culture: String,
    #[serde(default)]
    pub traits: BTreeMap<String, String>,
}

/// A reference ID as submitted by a client: either a JSON number or a string that
/// should be coerced to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(serde_json::Number),
    Text(String),
}

impl RawId {
    /// Numeric value of the ID, if it has an integral one.
    pub fn as_number(&self) -> Option<i64> {
        match self {
            RawId::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            RawId::Text(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite() && f.fract() == 0.0)
                        .map(|f| f as i64)
                })
            }
        }
    }
}

impl From<i64> for RawId {
    fn from(value: i64) -> Self {
        RawId::Number(value.into())
    }
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Number(n) => write!(f, "{n}"),
            RawId::Text(s) => write!(f, "{s:?}"),
        }
    }
}

/// One submitted response. `answer_text` is only consulted by the legacy
/// text-joined strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAnswer {
    pub question_id: RawId,
    pub answer_id: RawId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_text: Option<String>,
}

impl UserAnswer {
    pub fn new(question_id: i64, answer_id: i64) -> Self {
        Self {
            question_id: question_id.into(),
            answer_id: answer_id.into(),
            answer_text: None,
        }
    }
}
