//! Word association flow.
//!
//! Per-word analyses run concurrently with the whole-set chain
//! (sentiment + qualities + insights, then feedback). Feedback consumes the
//! three whole-set results, so it is only issued once all of them resolved.

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use crate::analysis::schemas::{FeedbackInput, WordAssociationInput, WordAssociationReport};
use crate::analysis::{AnalysisCapability, AnalysisError};
use crate::errors::AppError;
use crate::reports::{is_unanswered, prepare_items, ItemAnswer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordAnalysis {
    pub word: String,
    pub sentence: String,
    pub report: WordAssociationReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordAssociationResult {
    /// One entry per word, in item order.
    pub word_analyses: Vec<WordAnalysis>,
    pub qualities: Vec<String>,
    pub sentiment: String,
    pub insights: String,
    pub feedback: String,
}

struct WholeSet {
    qualities: Vec<String>,
    sentiment: String,
    insights: String,
    feedback: String,
}

pub async fn run(
    analyzer: &dyn AnalysisCapability,
    answers: Vec<ItemAnswer>,
) -> Result<WordAssociationResult, AppError> {
    let answers = prepare_items(answers, "sentence", "sentences")?;
    let sentences: Vec<String> = answers.iter().map(|a| a.response.clone()).collect();

    let (reports, whole_set) = tokio::try_join!(
        analyze_each_word(analyzer, &answers),
        analyze_whole_set(analyzer, &sentences),
    )?;

    let word_analyses = answers
        .into_iter()
        .zip(reports)
        .map(|(answer, report)| WordAnalysis {
            word: answer.prompt,
            sentence: answer.response,
            report,
        })
        .collect();

    Ok(WordAssociationResult {
        word_analyses,
        qualities: whole_set.qualities,
        sentiment: whole_set.sentiment,
        insights: whole_set.insights,
        feedback: whole_set.feedback,
    })
}

/// Unanswered words get the fixed report without a model call.
async fn analyze_each_word(
    analyzer: &dyn AnalysisCapability,
    answers: &[ItemAnswer],
) -> Result<Vec<WordAssociationReport>, AnalysisError> {
    try_join_all(answers.iter().map(|answer| async move {
        if is_unanswered(&answer.response) {
            Ok(WordAssociationReport::no_response())
        } else {
            analyzer
                .analyze_word(&WordAssociationInput {
                    word: answer.prompt.clone(),
                    sentence: answer.response.clone(),
                })
                .await
        }
    }))
    .await
}

async fn analyze_whole_set(
    analyzer: &dyn AnalysisCapability,
    sentences: &[String],
) -> Result<WholeSet, AnalysisError> {
    let (sentiment, qualities, insights) = tokio::try_join!(
        analyzer.analyze_sentiment(sentences),
        analyzer.infer_qualities(sentences),
        analyzer.derive_insights(sentences),
    )?;

    let feedback = analyzer
        .tailored_feedback(&FeedbackInput {
            sentences: sentences.to_vec(),
            inferred_qualities: qualities.qualities.join(", "),
            sentiment_analysis: sentiment.sentiment.clone(),
            personality_insights: insights.insights.clone(),
        })
        .await?;

    Ok(WholeSet {
        qualities: qualities.qualities,
        sentiment: sentiment.sentiment,
        insights: insights.insights,
        feedback: feedback.tailored_feedback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ReportKind;
    use crate::catalog::{NO_RESPONSE, WORDS};
    use crate::reports::test_support::{Event, FakeAnalyzer};

    fn answers(responses: [&str; 5]) -> Vec<ItemAnswer> {
        WORDS
            .iter()
            .zip(responses)
            .map(|(w, r)| ItemAnswer::new(*w, r))
            .collect()
    }

    #[tokio::test]
    async fn test_five_answers_give_full_report_in_item_order() {
        let analyzer = FakeAnalyzer::default();
        let result = run(
            &analyzer,
            answers([
                "A friend stands by you.",
                "Fear can be conquered.",
                "Courage grows with practice.",
                "Class is about conduct.",
                "Games teach teamwork.",
            ]),
        )
        .await
        .unwrap();

        let words: Vec<&str> = result
            .word_analyses
            .iter()
            .map(|w| w.word.as_str())
            .collect();
        assert_eq!(words, WORDS);
        assert_eq!(
            result.word_analyses[2].report.shortcomings,
            vec!["shortcoming for courage".to_string()]
        );
        assert_eq!(result.sentiment, "Positive");
        assert_eq!(result.qualities, vec!["Loyalty", "Resilience"]);
        assert_eq!(result.insights, "Grounded and outgoing.");
        assert_eq!(result.feedback, "Build on Loyalty, Resilience (Positive)");
        assert_eq!(analyzer.count(ReportKind::WordSentiment), 5);
    }

    #[tokio::test]
    async fn test_unanswered_words_skip_model_and_feedback_waits_for_whole_set() {
        let analyzer = FakeAnalyzer::default();
        let result = run(
            &analyzer,
            answers([
                NO_RESPONSE,
                NO_RESPONSE,
                "Courage grows with practice.",
                "Class is about conduct.",
                "Games teach teamwork.",
            ]),
        )
        .await
        .unwrap();

        assert_eq!(analyzer.count(ReportKind::WordSentiment), 3);
        assert_eq!(
            result.word_analyses[0].report,
            WordAssociationReport::no_response()
        );
        assert_eq!(result.word_analyses[1].sentence, NO_RESPONSE);

        let events = analyzer.events();
        let feedback_start = events
            .iter()
            .position(|e| *e == Event::Start(ReportKind::TailoredFeedback))
            .unwrap();
        for kind in [
            ReportKind::SentimentLabel,
            ReportKind::Qualities,
            ReportKind::PersonalityInsights,
        ] {
            let end = events.iter().position(|e| *e == Event::End(kind)).unwrap();
            assert!(end < feedback_start, "{kind} must resolve before feedback");
        }
        assert_eq!(analyzer.count(ReportKind::TailoredFeedback), 1);
    }

    #[tokio::test]
    async fn test_whole_set_calls_are_issued_concurrently() {
        let analyzer = FakeAnalyzer::default();
        run(&analyzer, answers(["a", "b", "c", "d", "e"]))
            .await
            .unwrap();

        let events = analyzer.events();
        let first_end = events
            .iter()
            .position(|e| matches!(e, Event::End(_)))
            .unwrap();
        let started_before_first_end = events[..first_end]
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    Event::Start(ReportKind::SentimentLabel)
                        | Event::Start(ReportKind::Qualities)
                        | Event::Start(ReportKind::PersonalityInsights)
                )
            })
            .count();
        assert_eq!(started_before_first_end, 3);
    }

    #[tokio::test]
    async fn test_blank_sentences_reach_whole_set_as_placeholder() {
        let analyzer = FakeAnalyzer::default();
        let result = run(&analyzer, answers(["", "b", "c", "d", "e"]))
            .await
            .unwrap();
        assert_eq!(result.word_analyses[0].sentence, NO_RESPONSE);
    }

    #[tokio::test]
    async fn test_all_blank_fails_before_any_call() {
        let analyzer = FakeAnalyzer::default();
        let err = run(&analyzer, answers(["", " ", "", NO_RESPONSE, ""]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientInput(_)));
        assert!(analyzer.events().is_empty());
    }

    #[tokio::test]
    async fn test_any_failure_aborts_whole_flow() {
        let analyzer = FakeAnalyzer::failing_on(ReportKind::Qualities);
        let err = run(&analyzer, answers(["a", "b", "c", "d", "e"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AnalysisFailed(_)));
        assert_eq!(analyzer.count(ReportKind::TailoredFeedback), 0);
    }
}
