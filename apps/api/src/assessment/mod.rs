//! DISC personality assessment: scoring, classification and profile lookup.

pub mod catalog;
pub mod classification;
pub mod error;
pub mod handlers;
pub mod legacy;
pub mod model;
pub mod postgres;
pub mod profiles;
pub mod scoring;
pub mod seed;
pub mod strategy;
