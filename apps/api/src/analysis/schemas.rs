//! Input records and reply shapes for every analysis kind.
//!
//! Reply field names are camelCase on the wire; every reply is checked with
//! [`Validate`] before it is trusted.

use serde::{Deserialize, Serialize};

/// Shape checks the JSON decoder cannot express.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} must not be empty"))
    } else {
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Word association
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordAssociationInput {
    pub word: String,
    pub sentence: String,
}

/// word-sentiment-report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordAssociationReport {
    pub sentiment: String,
    pub emotion: String,
    pub shortcomings: Vec<String>,
    pub improvements: Vec<String>,
}

impl WordAssociationReport {
    /// Fixed report for a word left unanswered; no model call is made for it.
    pub fn no_response() -> Self {
        Self {
            sentiment: "Neutral".to_string(),
            emotion: "None".to_string(),
            shortcomings: vec!["No response was provided in the given time.".to_string()],
            improvements: vec![
                "Try to provide a response within the time limit to allow for a full analysis."
                    .to_string(),
            ],
        }
    }
}

impl Validate for WordAssociationReport {
    fn validate(&self) -> Result<(), String> {
        require_text("sentiment", &self.sentiment)?;
        require_text("emotion", &self.emotion)
    }
}

/// sentiment-label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentLabel {
    pub sentiment: String,
}

impl Validate for SentimentLabel {
    fn validate(&self) -> Result<(), String> {
        require_text("sentiment", &self.sentiment)
    }
}

/// qualities-list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualitiesList {
    pub qualities: Vec<String>,
}

impl Validate for QualitiesList {
    fn validate(&self) -> Result<(), String> {
        if self.qualities.is_empty() {
            return Err("qualities must contain at least one entry".to_string());
        }
        Ok(())
    }
}

/// personality-insights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityInsights {
    pub insights: String,
}

impl Validate for PersonalityInsights {
    fn validate(&self) -> Result<(), String> {
        require_text("insights", &self.insights)
    }
}

/// Everything the feedback call consumes: the answers plus the three whole-set results.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackInput {
    pub sentences: Vec<String>,
    pub inferred_qualities: String,
    pub sentiment_analysis: String,
    pub personality_insights: String,
}

/// tailored-feedback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailoredFeedback {
    pub tailored_feedback: String,
}

impl Validate for TailoredFeedback {
    fn validate(&self) -> Result<(), String> {
        require_text("tailoredFeedback", &self.tailored_feedback)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Situation reaction
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SituationReactionInput {
    pub situation: String,
    pub reaction: String,
}

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 10;

/// situation-reaction-report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SituationReactionReport {
    pub shortcomings: Vec<String>,
    pub improvements: Vec<String>,
    /// 1 (poor) to 10 (excellent).
    pub rating: u8,
}

impl SituationReactionReport {
    /// Fixed report for a situation left unanswered.
    pub fn no_response() -> Self {
        Self {
            shortcomings: vec!["No response was provided in the given time.".to_string()],
            improvements: vec![
                "Responding within the time limit is crucial for assessment.".to_string(),
            ],
            rating: MIN_RATING,
        }
    }
}

impl Validate for SituationReactionReport {
    fn validate(&self) -> Result<(), String> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(format!(
                "rating {} outside {MIN_RATING}..={MAX_RATING}",
                self.rating
            ));
        }
        Ok(())
    }
}

/// One situation with its reaction and report, as fed to the summary call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SituationAnalysis {
    pub situation: String,
    pub reaction: String,
    pub report: SituationReactionReport,
}

/// situation-summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SituationSummary {
    pub overall_analysis: String,
    pub overall_improvements: String,
}

impl Validate for SituationSummary {
    fn validate(&self) -> Result<(), String> {
        require_text("overallAnalysis", &self.overall_analysis)?;
        require_text("overallImprovements", &self.overall_improvements)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// PPDT
// ────────────────────────────────────────────────────────────────────────────

/// image-analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysis {
    pub analysis: String,
}

impl Validate for ImageAnalysis {
    fn validate(&self) -> Result<(), String> {
        require_text("analysis", &self.analysis)
    }
}

/// A perceived character rendered for the story prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSketch {
    pub gender: String,
    pub mood: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryInput {
    pub story: String,
    pub characters: Vec<CharacterSketch>,
}

/// story-analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryAnalysis {
    pub thematic_analysis: String,
    pub plot_summary: String,
    pub areas_of_concern: Vec<String>,
    pub positive_qualities: Vec<String>,
}

impl Validate for StoryAnalysis {
    fn validate(&self) -> Result<(), String> {
        require_text("thematicAnalysis", &self.thematic_analysis)?;
        require_text("plotSummary", &self.plot_summary)
    }
}
