pub mod assessment;
pub mod matching;
