// Prompt templates for every analysis kind.
// Placeholders in `{braces}` are substituted by the render functions below.

use crate::analysis::schemas::{
    FeedbackInput, SituationAnalysis, SituationReactionInput, StoryInput, WordAssociationInput,
};
use crate::llm_client::prompts::BREVITY_INSTRUCTION;

pub const WORD_ASSOCIATION_TEMPLATE: &str = r#"Analyze the following candidate's sentence written in response to a given word.
Determine the sentiment (e.g. Positive, Negative, Neutral) and the dominant emotion (e.g. Joy, Sadness, Anger), one word each.
Identify potential shortcomings in the candidate's thinking and offer constructive suggestions for improvement in short points.

Word: {word}
Candidate's Sentence: {sentence}

Return a JSON object with this EXACT schema (no extra fields):
{"sentiment": "Positive", "emotion": "Joy", "shortcomings": ["..."], "improvements": ["..."]}

{brevity}"#;

pub const SENTIMENT_TEMPLATE: &str = r#"Analyze the sentiment of the following five sentences. Determine if the overall feeling is positive, negative, or neutral.

{sentences}

Return a JSON object with this EXACT schema (no extra fields):
{"sentiment": "Positive"}"#;

pub const QUALITIES_TEMPLATE: &str = r#"Analyze the following list of sentences and infer the qualities and related concepts they reveal about their author.

Sentences:
{sentences}

Return a JSON object with this EXACT schema (no extra fields):
{"qualities": ["Empathy", "Optimism"]}"#;

pub const INSIGHTS_TEMPLATE: &str = r#"Analyze a set of five sentences and derive potential personality insights, including possible biases and attitudes.

Sentences:
{sentences}

Return a JSON object with this EXACT schema (no extra fields):
{"insights": "..."}

{brevity}"#;

pub const FEEDBACK_TEMPLATE: &str = r#"Write tailored, encouraging feedback for a candidate who completed a word association test.
Ground the feedback in their sentences and in the prior analyses below, and suggest concrete next steps for self-improvement.

Sentences:
{sentences}

Inferred qualities: {qualities}
Overall sentiment: {sentiment}
Personality insights: {insights}

Return a JSON object with this EXACT schema (no extra fields):
{"tailoredFeedback": "..."}

{brevity}"#;

pub const SITUATION_TEMPLATE: &str = r#"Analyze the following candidate reaction to a given situation.
Identify potential shortcomings in the reaction, offer constructive suggestions for improvement,
and rate the response on a scale of 1 to 10, where 1 is poor and 10 is excellent.

Situation: {situation}
Candidate's Reaction: {reaction}

Return a JSON object with this EXACT schema (no extra fields; rating is an integer from 1 to 10):
{"shortcomings": ["..."], "improvements": ["..."], "rating": 7}"#;

pub const SUMMARY_TEMPLATE: &str = r#"Provide a final evaluation of a candidate based on their reactions to a series of situations.
You are given an analysis of five situations. Produce:
1. overallAnalysis: a summary of the candidate's performance, highlighting patterns in their thinking and decision-making.
2. overallImprovements: the most critical areas where the candidate needs to improve.
Present both in a point-based format.

Individual analyses:
{analyses}

Return a JSON object with this EXACT schema (no extra fields):
{"overallAnalysis": "...", "overallImprovements": "..."}

{brevity}"#;

pub const IMAGE_TEMPLATE: &str = r#"You are observing the attached PPDT picture.
Provide a detailed and objective analysis of the image: the setting, characters, objects, and possible actions or moods depicted.
Present the analysis as a concise, point-based summary in a single string.

Return a JSON object with this EXACT schema (no extra fields):
{"analysis": "- ..."}"#;

pub const STORY_TEMPLATE: &str = r#"Evaluate a candidate's PPDT response. Analyze their story based on the characters they perceived.

Perceived Characters:
{characters}

Candidate's Story:
"{story}"

Provide:
1. thematicAnalysis: the main themes (e.g. heroism, conflict, despair) and underlying psychological currents.
2. plotSummary: a brief, one-sentence summary of the plot.
3. areasOfConcern: potential psychological weaknesses, negative biases, or areas of concern.
4. positiveQualities: positive traits shown in the story, such as problem-solving, leadership, or courage.

Return a JSON object with this EXACT schema (no extra fields):
{"thematicAnalysis": "...", "plotSummary": "...", "areasOfConcern": ["..."], "positiveQualities": ["..."]}

{brevity}"#;

fn numbered(sentences: &[String]) -> String {
    sentences
        .iter()
        .enumerate()
        .map(|(i, s)| format!("Sentence {}: {s}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

fn bulleted(items: &[String]) -> String {
    items
        .iter()
        .map(|s| format!("- {s}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Substitutes `{name}` placeholders in a single pass over the template.
/// Substituted text is never rescanned, so braces inside candidate answers
/// or earlier model output reach the prompt verbatim. Unknown `{...}` spans
/// (the JSON schema examples) are left as they are.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let hit = tail.find('}').and_then(|end| {
            let name = &tail[1..end];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (end, *value))
        });
        match hit {
            Some((end, value)) => {
                out.push_str(value);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn render_word(input: &WordAssociationInput) -> String {
    render(
        WORD_ASSOCIATION_TEMPLATE,
        &[
            ("word", input.word.as_str()),
            ("sentence", input.sentence.as_str()),
            ("brevity", BREVITY_INSTRUCTION),
        ],
    )
}

pub fn render_sentiment(sentences: &[String]) -> String {
    render(SENTIMENT_TEMPLATE, &[("sentences", numbered(sentences).as_str())])
}

pub fn render_qualities(sentences: &[String]) -> String {
    render(QUALITIES_TEMPLATE, &[("sentences", bulleted(sentences).as_str())])
}

pub fn render_insights(sentences: &[String]) -> String {
    render(
        INSIGHTS_TEMPLATE,
        &[
            ("sentences", bulleted(sentences).as_str()),
            ("brevity", BREVITY_INSTRUCTION),
        ],
    )
}

pub fn render_feedback(input: &FeedbackInput) -> String {
    render(
        FEEDBACK_TEMPLATE,
        &[
            ("sentences", bulleted(&input.sentences).as_str()),
            ("qualities", input.inferred_qualities.as_str()),
            ("sentiment", input.sentiment_analysis.as_str()),
            ("insights", input.personality_insights.as_str()),
            ("brevity", BREVITY_INSTRUCTION),
        ],
    )
}

pub fn render_situation(input: &SituationReactionInput) -> String {
    render(
        SITUATION_TEMPLATE,
        &[
            ("situation", input.situation.as_str()),
            ("reaction", input.reaction.as_str()),
        ],
    )
}

pub fn render_summary(analyses: &[SituationAnalysis]) -> String {
    let blocks = analyses
        .iter()
        .map(|a| {
            format!(
                "---\nSituation: {}\nReaction: {}\nRating: {}/10\nShortcomings:\n{}\nImprovements:\n{}\n---",
                a.situation,
                a.reaction,
                a.report.rating,
                bulleted(&a.report.shortcomings),
                bulleted(&a.report.improvements),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    render(
        SUMMARY_TEMPLATE,
        &[("analyses", blocks.as_str()), ("brevity", BREVITY_INSTRUCTION)],
    )
}

pub fn render_story(input: &StoryInput) -> String {
    let characters = input
        .characters
        .iter()
        .map(|c| format!("- Character: {}, Mood: {}", c.gender, c.mood))
        .collect::<Vec<_>>()
        .join("\n");

    render(
        STORY_TEMPLATE,
        &[
            ("characters", characters.as_str()),
            ("story", input.story.as_str()),
            ("brevity", BREVITY_INSTRUCTION),
        ],
    )
}
