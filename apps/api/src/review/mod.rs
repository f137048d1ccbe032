//! AI-assisted document review pipeline: sanitize → style directives →
//! generation service → contract parser → follow-up loop.

pub mod engine;
pub mod followup;
pub mod handlers;
pub mod models;
pub mod parser;
pub mod prompts;
pub mod sanitize;
pub mod style;
