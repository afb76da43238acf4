//! PPDT flow: picture analysis and story analysis, issued together with no dependency.

use serde::{Deserialize, Serialize};

use crate::analysis::schemas::{ImageAnalysis, StoryAnalysis, StoryInput};
use crate::analysis::AnalysisCapability;
use crate::capture::{parse_data_uri, CaptureError};
use crate::catalog::{MAX_CHARACTERS, MIN_CHARACTERS};
use crate::errors::AppError;
use crate::reports::PpdtSubmission;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PpdtResult {
    pub image_analysis: ImageAnalysis,
    pub story_analysis: StoryAnalysis,
}

pub async fn run(
    analyzer: &dyn AnalysisCapability,
    submission: PpdtSubmission,
) -> Result<PpdtResult, AppError> {
    if submission.story.trim().is_empty() {
        return Err(AppError::InsufficientInput(
            "A story is required to generate a report.".to_string(),
        ));
    }

    let image = submission
        .image_data_uri
        .as_deref()
        .ok_or(CaptureError::Missing)?;
    parse_data_uri(image)?;

    if !(MIN_CHARACTERS..=MAX_CHARACTERS).contains(&submission.characters.len()) {
        return Err(AppError::Validation(format!(
            "Between {MIN_CHARACTERS} and {MAX_CHARACTERS} characters must be described."
        )));
    }

    let story = StoryInput {
        story: submission.story.clone(),
        characters: submission.characters.iter().map(|c| c.sketch()).collect(),
    };

    let (image_analysis, story_analysis) = tokio::try_join!(
        analyzer.analyze_image(image),
        analyzer.analyze_story(&story),
    )?;

    Ok(PpdtResult {
        image_analysis,
        story_analysis,
    })
}
