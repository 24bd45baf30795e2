//! The DISC question bank and personality profiles shipped with the service.

use crate::assessment::error::CatalogError;
use crate::assessment::model::{PersonalityProfile, Question};

const QUESTIONS_JSON: &str = include_str!("../../seeds/questions.json");
const PROFILES_JSON: &str = include_str!("../../seeds/profiles.json");

pub fn questions() -> Result<Vec<Question>, CatalogError> {
    let mut questions: Vec<Question> = serde_json::from_str(QUESTIONS_JSON)?;
    questions.sort_by_key(|q| q.order);
    Ok(questions)
}

pub fn profiles() -> Result<Vec<PersonalityProfile>, CatalogError> {
    Ok(serde_json::from_str(PROFILES_JSON)?)
}
