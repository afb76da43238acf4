//! The seam between the report flows and the model provider.
//!
//! Report flows only see [`AnalysisCapability`]. `LlmAnalyzer` is the production
//! backend; tests inject doubles returning fixed structured data.

pub mod prompts;
pub mod schemas;

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::capture::{parse_data_uri, CaptureError};
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{LlmClient, LlmError};
use schemas::{
    FeedbackInput, ImageAnalysis, PersonalityInsights, QualitiesList, SentimentLabel,
    SituationAnalysis, SituationReactionInput, SituationReactionReport, SituationSummary,
    StoryAnalysis, StoryInput, TailoredFeedback, Validate, WordAssociationInput,
    WordAssociationReport,
};

/// The nine report kinds the capability produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    WordSentiment,
    PersonalityInsights,
    Qualities,
    SentimentLabel,
    TailoredFeedback,
    SituationReaction,
    SituationSummary,
    ImageAnalysis,
    StoryAnalysis,
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportKind::WordSentiment => "word-sentiment-report",
            ReportKind::PersonalityInsights => "personality-insights",
            ReportKind::Qualities => "qualities-list",
            ReportKind::SentimentLabel => "sentiment-label",
            ReportKind::TailoredFeedback => "tailored-feedback",
            ReportKind::SituationReaction => "situation-reaction-report",
            ReportKind::SituationSummary => "situation-summary",
            ReportKind::ImageAnalysis => "image-analysis",
            ReportKind::StoryAnalysis => "story-analysis",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("model call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("reply does not match the expected shape: {0}")]
    Schema(String),

    #[error("image could not be attached: {0}")]
    Image(#[from] CaptureError),
}

/// One operation per report kind. Each takes a bounded structured input and
/// returns a shape-checked result or a failure.
#[async_trait]
pub trait AnalysisCapability: Send + Sync {
    async fn analyze_word(
        &self,
        input: &WordAssociationInput,
    ) -> Result<WordAssociationReport, AnalysisError>;

    async fn analyze_sentiment(&self, sentences: &[String])
        -> Result<SentimentLabel, AnalysisError>;

    async fn infer_qualities(&self, sentences: &[String]) -> Result<QualitiesList, AnalysisError>;

    async fn derive_insights(
        &self,
        sentences: &[String],
    ) -> Result<PersonalityInsights, AnalysisError>;

    async fn tailored_feedback(
        &self,
        input: &FeedbackInput,
    ) -> Result<TailoredFeedback, AnalysisError>;

    async fn analyze_situation(
        &self,
        input: &SituationReactionInput,
    ) -> Result<SituationReactionReport, AnalysisError>;

    async fn summarize_situations(
        &self,
        analyses: &[SituationAnalysis],
    ) -> Result<SituationSummary, AnalysisError>;

    async fn analyze_image(&self, image_data_uri: &str) -> Result<ImageAnalysis, AnalysisError>;

    async fn analyze_story(&self, input: &StoryInput) -> Result<StoryAnalysis, AnalysisError>;
}

/// Production backend: renders a template, asks the model for JSON, checks the shape.
#[derive(Clone)]
pub struct LlmAnalyzer {
    llm: LlmClient,
}

impl LlmAnalyzer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    async fn request<T>(
        &self,
        kind: ReportKind,
        prompt: &str,
        image_data_uri: Option<&str>,
    ) -> Result<T, AnalysisError>
    where
        T: DeserializeOwned + Validate,
    {
        let image = image_data_uri.map(parse_data_uri).transpose()?;
        debug!("Requesting {kind} ({} prompt chars)", prompt.len());

        let reply: T = self
            .llm
            .call_json(prompt, JSON_ONLY_SYSTEM, image.as_ref())
            .await?;
        reply
            .validate()
            .map_err(|e| AnalysisError::Schema(format!("{kind}: {e}")))?;
        Ok(reply)
    }
}

#[async_trait]
impl AnalysisCapability for LlmAnalyzer {
    async fn analyze_word(
        &self,
        input: &WordAssociationInput,
    ) -> Result<WordAssociationReport, AnalysisError> {
        self.request(ReportKind::WordSentiment, &prompts::render_word(input), None)
            .await
    }

    async fn analyze_sentiment(
        &self,
        sentences: &[String],
    ) -> Result<SentimentLabel, AnalysisError> {
        self.request(
            ReportKind::SentimentLabel,
            &prompts::render_sentiment(sentences),
            None,
        )
        .await
    }

    async fn infer_qualities(&self, sentences: &[String]) -> Result<QualitiesList, AnalysisError> {
        self.request(
            ReportKind::Qualities,
            &prompts::render_qualities(sentences),
            None,
        )
        .await
    }

    async fn derive_insights(
        &self,
        sentences: &[String],
    ) -> Result<PersonalityInsights, AnalysisError> {
        self.request(
            ReportKind::PersonalityInsights,
            &prompts::render_insights(sentences),
            None,
        )
        .await
    }

    async fn tailored_feedback(
        &self,
        input: &FeedbackInput,
    ) -> Result<TailoredFeedback, AnalysisError> {
        self.request(
            ReportKind::TailoredFeedback,
            &prompts::render_feedback(input),
            None,
        )
        .await
    }

    async fn analyze_situation(
        &self,
        input: &SituationReactionInput,
    ) -> Result<SituationReactionReport, AnalysisError> {
        self.request(
            ReportKind::SituationReaction,
            &prompts::render_situation(input),
            None,
        )
        .await
    }

    async fn summarize_situations(
        &self,
        analyses: &[SituationAnalysis],
    ) -> Result<SituationSummary, AnalysisError> {
        self.request(
            ReportKind::SituationSummary,
            &prompts::render_summary(analyses),
            None,
        )
        .await
    }

    async fn analyze_image(&self, image_data_uri: &str) -> Result<ImageAnalysis, AnalysisError> {
        self.request(
            ReportKind::ImageAnalysis,
            prompts::IMAGE_TEMPLATE,
            Some(image_data_uri),
        )
        .await
    }

    async fn analyze_story(&self, input: &StoryInput) -> Result<StoryAnalysis, AnalysisError> {
        self.request(
            ReportKind::StoryAnalysis,
            &prompts::render_story(input),
            None,
        )
        .await
    }
}
