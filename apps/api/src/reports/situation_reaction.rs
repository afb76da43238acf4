//! Situation reaction flow: five independent analyses, then one summary over all of them.

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use crate::analysis::schemas::{
    SituationAnalysis, SituationReactionInput, SituationReactionReport,
};
use crate::analysis::AnalysisCapability;
use crate::errors::AppError;
use crate::reports::{is_unanswered, prepare_items, ItemAnswer};

/// Per-situation entry of the final report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SituationResult {
    pub situation: String,
    pub reaction: String,
    pub report: SituationReactionReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SituationReactionResult {
    pub individual_analyses: Vec<SituationResult>,
    pub overall_analysis: String,
    pub overall_improvements: String,
}

pub async fn run(
    analyzer: &dyn AnalysisCapability,
    answers: Vec<ItemAnswer>,
) -> Result<SituationReactionResult, AppError> {
    let answers = prepare_items(answers, "reaction", "reactions")?;

    let reports = try_join_all(answers.iter().map(|answer| async move {
        if is_unanswered(&answer.response) {
            Ok(SituationReactionReport::no_response())
        } else {
            analyzer
                .analyze_situation(&SituationReactionInput {
                    situation: answer.prompt.clone(),
                    reaction: answer.response.clone(),
                })
                .await
        }
    }))
    .await?;

    let analyses: Vec<SituationAnalysis> = answers
        .into_iter()
        .zip(reports)
        .map(|(answer, report)| SituationAnalysis {
            situation: answer.prompt,
            reaction: answer.response,
            report,
        })
        .collect();

    // Fan-in: the summary reads every individual report.
    let summary = analyzer.summarize_situations(&analyses).await?;

    Ok(SituationReactionResult {
        individual_analyses: analyses
            .into_iter()
            .map(|a| SituationResult {
                situation: a.situation,
                reaction: a.reaction,
                report: a.report,
            })
            .collect(),
        overall_analysis: summary.overall_analysis,
        overall_improvements: summary.overall_improvements,
    })
}
