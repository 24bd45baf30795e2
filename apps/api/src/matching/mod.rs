//! Candidate/recruiter likes and the match state machine.

pub mod handlers;
pub mod locks;
pub mod model;
pub mod notify;
pub mod postgres;
pub mod service;
pub mod store;
pub mod transitions;
