//! Timed psychometric self-assessments: word association, situation reaction
//! and the picture perception test, each turned into a structured report.

pub mod analysis;
pub mod capture;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod llm_client;
pub mod reports;
pub mod routes;
pub mod session;
pub mod state;
