//! Turns collected answers into analysis calls and one outcome.
//!
//! Each flow checks its preconditions before any external call, fans out the
//! independent analyses, joins them (first failure aborts the group), and
//! returns either a complete report or a single error. Partial results never
//! escape a flow.

pub mod ppdt;
pub mod situation_reaction;
pub mod word_association;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::analysis::schemas::CharacterSketch;
use crate::analysis::AnalysisCapability;
use crate::catalog::{TestMode, NO_RESPONSE};
use crate::errors::AppError;

pub use ppdt::PpdtResult;
pub use situation_reaction::{SituationReactionResult, SituationResult};
pub use word_association::{WordAnalysis, WordAssociationResult};

/// Number of answers every item-based flow requires.
pub const ITEM_COUNT: usize = 5;

// ────────────────────────────────────────────────────────────────────────────
// Request payloads
// ────────────────────────────────────────────────────────────────────────────

/// A prompt (word or situation) with the candidate's free-text answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemAnswer {
    pub prompt: String,
    pub response: String,
}

impl ItemAnswer {
    pub fn new(prompt: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response: response.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Positive,
    Negative,
    Neutral,
}

/// One character the candidate perceived in the PPDT picture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDescriptor {
    pub gender: Option<Gender>,
    pub mood: Option<Mood>,
}

impl CharacterDescriptor {
    pub fn new(gender: Gender, mood: Mood) -> Self {
        Self {
            gender: Some(gender),
            mood: Some(mood),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.gender.is_some() && self.mood.is_some()
    }

    /// Wire form for the story prompt; unset fields read "unspecified".
    pub fn sketch(&self) -> CharacterSketch {
        let gender = match self.gender {
            Some(Gender::Male) => "male",
            Some(Gender::Female) => "female",
            Some(Gender::Other) => "other",
            None => "unspecified",
        };
        let mood = match self.mood {
            Some(Mood::Positive) => "positive",
            Some(Mood::Negative) => "negative",
            Some(Mood::Neutral) => "neutral",
            None => "unspecified",
        };
        CharacterSketch {
            gender: gender.to_string(),
            mood: mood.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PpdtSubmission {
    #[serde(default)]
    pub image_data_uri: Option<String>,
    pub story: String,
    #[serde(default)]
    pub characters: Vec<CharacterDescriptor>,
}

/// Everything a finished test hands to the requester.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportRequest {
    WordAssociation(Vec<ItemAnswer>),
    SituationReaction(Vec<ItemAnswer>),
    Ppdt(PpdtSubmission),
}

impl ReportRequest {
    pub fn mode(&self) -> TestMode {
        match self {
            ReportRequest::WordAssociation(_) => TestMode::WordAssociation,
            ReportRequest::SituationReaction(_) => TestMode::SituationReaction,
            ReportRequest::Ppdt(_) => TestMode::Ppdt,
        }
    }
}

/// The normalized output of a flow, one shape per test mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", content = "report", rename_all = "kebab-case")]
pub enum AnalysisReport {
    WordAssociation(WordAssociationResult),
    SituationReaction(SituationReactionResult),
    Ppdt(PpdtResult),
}

impl AnalysisReport {
    pub fn mode(&self) -> TestMode {
        match self {
            AnalysisReport::WordAssociation(_) => TestMode::WordAssociation,
            AnalysisReport::SituationReaction(_) => TestMode::SituationReaction,
            AnalysisReport::Ppdt(_) => TestMode::Ppdt,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Answer normalization
// ────────────────────────────────────────────────────────────────────────────

/// True for blank text and for the no-response placeholder.
pub fn is_unanswered(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || trimmed == NO_RESPONSE
}

/// Replaces a blank answer with the no-response placeholder.
pub fn normalize_answer(text: &str) -> String {
    if is_unanswered(text) {
        NO_RESPONSE.to_string()
    } else {
        text.to_string()
    }
}

/// Shared precondition for the item-based flows: exactly five answers, at
/// least one of them real. Returns the answers with blanks normalized.
fn prepare_items(
    answers: Vec<ItemAnswer>,
    singular: &str,
    plural: &str,
) -> Result<Vec<ItemAnswer>, AppError> {
    if answers.len() != ITEM_COUNT {
        return Err(AppError::Validation(format!(
            "Exactly five {plural} are required."
        )));
    }
    if answers.iter().all(|a| is_unanswered(&a.response)) {
        return Err(AppError::InsufficientInput(format!(
            "At least one {singular} is required to generate a report."
        )));
    }
    Ok(answers
        .into_iter()
        .map(|a| ItemAnswer {
            response: normalize_answer(&a.response),
            prompt: a.prompt,
        })
        .collect())
}

// ────────────────────────────────────────────────────────────────────────────
// Requester
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct ReportRequester {
    analyzer: Arc<dyn AnalysisCapability>,
}

impl ReportRequester {
    pub fn new(analyzer: Arc<dyn AnalysisCapability>) -> Self {
        Self { analyzer }
    }

    /// Runs the flow for one finished test. Every failure is caught here and
    /// returned as a single error; nothing is retried.
    pub async fn request(&self, request: ReportRequest) -> Result<AnalysisReport, AppError> {
        let mode = request.mode();
        info!("Generating {mode} report");

        let analyzer = self.analyzer.as_ref();
        let result = match request {
            ReportRequest::WordAssociation(answers) => word_association::run(analyzer, answers)
                .await
                .map(AnalysisReport::WordAssociation),
            ReportRequest::SituationReaction(answers) => {
                situation_reaction::run(analyzer, answers)
                    .await
                    .map(AnalysisReport::SituationReaction)
            }
            ReportRequest::Ppdt(submission) => ppdt::run(analyzer, submission)
                .await
                .map(AnalysisReport::Ppdt),
        };

        match &result {
            Ok(_) => info!("{mode} report generated"),
            Err(AppError::AnalysisFailed(e)) => error!("{mode} analysis failed: {e}"),
            Err(e) => warn!("{mode} report rejected: {e}"),
        }
        result
    }
}
