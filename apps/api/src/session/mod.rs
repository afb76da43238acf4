//! The per-candidate test session as one explicit state machine.
//!
//! `SessionState` carries the mode inside each variant so a phase can never
//! exist without its test. Every move into an active step goes through
//! `enter`, which also (re)starts the single countdown; leaving the active
//! phase always cancels it.
//!
//! Submissions are tagged with the session epoch. `reset` bumps the epoch, so
//! an analysis that finishes after a reset is dropped by `complete`.

pub mod runtime;
pub mod timer;
pub mod view;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::capture::{parse_data_uri, CaptureError};
use crate::catalog::{self, PpdtStage, TestMode, TestShape, MAX_CHARACTERS, MIN_CHARACTERS};
use crate::errors::AppError;
use crate::reports::{
    normalize_answer, AnalysisReport, CharacterDescriptor, Gender, ItemAnswer, Mood,
    PpdtSubmission, ReportRequest,
};
use timer::Countdown;
pub use view::ViewState;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("cannot {action} while {state}")]
    InvalidTransition { action: &'static str, state: String },

    #[error("invalid stimulus image: {0}")]
    Capture(#[from] CaptureError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestPhase {
    Instructions,
    Active,
    Results,
}

/// Position inside an active test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Step {
    Item { index: usize },
    Ppdt { stage: PpdtStage },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "kebab-case")]
pub enum SessionState {
    Welcome,
    Instructions { mode: TestMode },
    Active { mode: TestMode, step: Step },
    Results { mode: TestMode },
}

impl SessionState {
    pub fn mode(&self) -> Option<TestMode> {
        match *self {
            SessionState::Welcome => None,
            SessionState::Instructions { mode }
            | SessionState::Active { mode, .. }
            | SessionState::Results { mode } => Some(mode),
        }
    }

    pub fn phase(&self) -> Option<TestPhase> {
        match self {
            SessionState::Welcome => None,
            SessionState::Instructions { .. } => Some(TestPhase::Instructions),
            SessionState::Active { .. } => Some(TestPhase::Active),
            SessionState::Results { .. } => Some(TestPhase::Results),
        }
    }

    fn describe(&self) -> String {
        match self {
            SessionState::Welcome => "on the welcome screen".to_string(),
            SessionState::Instructions { mode } => format!("reading {mode} instructions"),
            SessionState::Active { mode, step } => format!("running {mode} at {step:?}"),
            SessionState::Results { mode } => format!("showing {mode} results"),
        }
    }
}

/// A field-level problem shown next to the input that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// PPDT inputs collected across the details and story phases.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PpdtDraft {
    /// Always between 1 and 5 entries; its length is the chosen character count.
    pub characters: Vec<CharacterDescriptor>,
    pub story: String,
    #[serde(skip)]
    pub image_data_uri: Option<String>,
}

impl Default for PpdtDraft {
    fn default() -> Self {
        Self {
            characters: vec![CharacterDescriptor::default(); MIN_CHARACTERS],
            story: String::new(),
            image_data_uri: None,
        }
    }
}

/// A finished test ready for the report requester.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub epoch: u64,
    pub request: ReportRequest,
}

#[derive(Debug)]
pub struct Session {
    id: Uuid,
    epoch: u64,
    state: SessionState,
    answers: Vec<String>,
    ppdt: PpdtDraft,
    countdown: Countdown<Step>,
    loading: bool,
    error: Option<String>,
    report: Option<AnalysisReport>,
    field_error: Option<FieldError>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            epoch: 0,
            state: SessionState::Welcome,
            answers: Vec::new(),
            ppdt: PpdtDraft::default(),
            countdown: Countdown::new(),
            loading: false,
            error: None,
            report: None,
            field_error: None,
        }
    }

    // ── accessors ────────────────────────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn ppdt(&self) -> &PpdtDraft {
        &self.ppdt
    }

    pub fn time_left(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn timer_active(&self) -> bool {
        self.countdown.is_active()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        self.report.as_ref()
    }

    pub fn field_error(&self) -> Option<&FieldError> {
        self.field_error.as_ref()
    }

    pub fn view(&self) -> ViewState {
        ViewState::from_session(self)
    }

    // ── transitions ──────────────────────────────────────────────────────────

    /// Welcome (or another test's instructions) → instructions for the chosen test.
    pub fn select_test(&mut self, mode: TestMode) -> Result<(), SessionError> {
        if !matches!(
            self.state,
            SessionState::Welcome | SessionState::Instructions { .. }
        ) {
            return Err(self.invalid("select a test"));
        }
        self.answers = vec![String::new(); catalog::descriptor(mode).items().len()];
        self.ppdt = PpdtDraft::default();
        self.field_error = None;
        self.state = SessionState::Instructions { mode };
        info!(session = %self.id, "Selected {mode}");
        Ok(())
    }

    /// Instructions → first active step, with its countdown running.
    pub fn start_test(&mut self) -> Result<(), SessionError> {
        let SessionState::Instructions { mode } = self.state else {
            return Err(self.invalid("start the test"));
        };
        let first = match catalog::descriptor(mode).shape {
            TestShape::ItemLoop { .. } => Step::Item { index: 0 },
            TestShape::Phased { .. } => Step::Ppdt {
                stage: PpdtStage::Perception,
            },
        };
        info!(session = %self.id, "Starting {mode}");
        self.enter(mode, first);
        Ok(())
    }

    /// Stores the text typed for the current word or situation.
    pub fn record_answer(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        let index = self.current_item("record an answer")?;
        self.answers[index] = text.into();
        self.field_error = None;
        Ok(())
    }

    /// Manual "Next": validates the current item, then advances. On the last
    /// item this submits.
    pub fn next(&mut self) -> Result<Option<Submission>, SessionError> {
        let index = self.current_item("advance")?;
        self.validate_item(index)?;
        Ok(self.advance_item(index))
    }

    /// Manual submit from the last item or the PPDT story phase.
    pub fn submit(&mut self) -> Result<Option<Submission>, SessionError> {
        match self.state {
            SessionState::Active {
                step: Step::Item { index },
                ..
            } if index + 1 == self.answers.len() => self.next(),
            SessionState::Active {
                step: Step::Ppdt {
                    stage: PpdtStage::Story,
                },
                ..
            } => {
                self.ensure_collecting("submit")?;
                self.validate_story()?;
                Ok(self.begin_submission())
            }
            _ => Err(self.invalid("submit")),
        }
    }

    /// Chooses how many characters were perceived; the list grows or shrinks to match.
    pub fn set_character_count(&mut self, count: usize) -> Result<(), SessionError> {
        self.ppdt_input_stage("set the character count")?;
        if !(MIN_CHARACTERS..=MAX_CHARACTERS).contains(&count) {
            return Err(self.field_invalid(
                "characterCount",
                format!("Choose between {MIN_CHARACTERS} and {MAX_CHARACTERS} characters."),
            ));
        }
        self.ppdt
            .characters
            .resize(count, CharacterDescriptor::default());
        self.field_error = None;
        Ok(())
    }

    pub fn set_character(
        &mut self,
        index: usize,
        gender: Option<Gender>,
        mood: Option<Mood>,
    ) -> Result<(), SessionError> {
        self.ppdt_input_stage("describe a character")?;
        if index >= self.ppdt.characters.len() {
            return Err(self.field_invalid(
                &format!("characters.{index}"),
                "No such character.".to_string(),
            ));
        }
        self.ppdt.characters[index] = CharacterDescriptor { gender, mood };
        self.field_error = None;
        Ok(())
    }

    pub fn record_story(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        match self.state {
            SessionState::Active {
                step: Step::Ppdt {
                    stage: PpdtStage::Story,
                },
                ..
            } => {
                self.ensure_collecting("write the story")?;
                self.ppdt.story = text.into();
                self.field_error = None;
                Ok(())
            }
            _ => Err(self.invalid("write the story")),
        }
    }

    /// Stores the captured stimulus for the PPDT picture analysis.
    pub fn attach_image(&mut self, data_uri: impl Into<String>) -> Result<(), SessionError> {
        if self.state.mode() != Some(TestMode::Ppdt) {
            return Err(self.invalid("attach a stimulus image"));
        }
        let data_uri = data_uri.into();
        parse_data_uri(&data_uri)?;
        self.ppdt.image_data_uri = Some(data_uri);
        Ok(())
    }

    /// The stimulus could not be captured. Stops the clock and shows the
    /// capture message until the session is reset.
    pub fn fail_capture(&mut self, err: CaptureError) {
        warn!(session = %self.id, "Stimulus capture failed: {err}");
        self.countdown.cancel();
        self.error = Some(AppError::Capture(err).user_message());
    }

    /// One elapsed second. Expiry advances without validation and may submit.
    pub fn tick(&mut self) -> Option<Submission> {
        let expired = self.countdown.tick()?;
        let SessionState::Active { mode, step } = self.state else {
            return None;
        };
        if step != expired {
            return None;
        }
        debug!(session = %self.id, "Time up for {mode} at {step:?}");

        match step {
            Step::Item { index } => {
                self.answers[index] = normalize_answer(&self.answers[index]);
                self.advance_item(index)
            }
            Step::Ppdt { stage } => match stage.next() {
                Some(next) => {
                    self.enter(mode, Step::Ppdt { stage: next });
                    None
                }
                None => self.begin_submission(),
            },
        }
    }

    /// Applies the outcome of a submission. Returns false when the outcome
    /// belongs to an earlier epoch (the session was reset) and was dropped.
    pub fn complete(
        &mut self,
        epoch: u64,
        outcome: Result<AnalysisReport, AppError>,
    ) -> bool {
        if epoch != self.epoch || !self.loading {
            warn!(
                session = %self.id,
                "Discarding analysis outcome for epoch {epoch} (current {})", self.epoch
            );
            return false;
        }
        self.loading = false;

        let SessionState::Active { mode, .. } = self.state else {
            return false;
        };
        match outcome {
            Ok(report) => {
                info!(session = %self.id, "{mode} report ready");
                self.report = Some(report);
                self.state = SessionState::Results { mode };
            }
            Err(e) => {
                self.error = Some(e.user_message());
            }
        }
        true
    }

    /// Back to welcome from anywhere. Clears every piece of session state at once.
    pub fn reset(&mut self) {
        self.countdown.cancel();
        self.epoch += 1;
        self.state = SessionState::Welcome;
        self.answers.clear();
        self.ppdt = PpdtDraft::default();
        self.loading = false;
        self.error = None;
        self.report = None;
        self.field_error = None;
        info!(session = %self.id, "Session reset (epoch {})", self.epoch);
    }

    // ── internals ────────────────────────────────────────────────────────────

    fn enter(&mut self, mode: TestMode, step: Step) {
        let seconds = match step {
            Step::Item { .. } => match catalog::descriptor(mode).shape {
                TestShape::ItemLoop {
                    seconds_per_item, ..
                } => seconds_per_item,
                TestShape::Phased { .. } => 0,
            },
            Step::Ppdt { stage } => stage.seconds(),
        };
        self.state = SessionState::Active { mode, step };
        self.field_error = None;
        self.countdown.start(seconds, step);
    }

    fn advance_item(&mut self, index: usize) -> Option<Submission> {
        let SessionState::Active { mode, .. } = self.state else {
            return None;
        };
        if index + 1 < self.answers.len() {
            self.enter(mode, Step::Item { index: index + 1 });
            None
        } else {
            self.begin_submission()
        }
    }

    fn begin_submission(&mut self) -> Option<Submission> {
        self.countdown.cancel();
        let SessionState::Active { mode, .. } = self.state else {
            return None;
        };
        if self.loading || self.error.is_some() {
            return None;
        }

        let request = match mode {
            TestMode::WordAssociation | TestMode::SituationReaction => {
                let answers = catalog::descriptor(mode)
                    .items()
                    .iter()
                    .zip(&self.answers)
                    .map(|(prompt, response)| ItemAnswer::new(*prompt, normalize_answer(response)))
                    .collect();
                if mode == TestMode::WordAssociation {
                    ReportRequest::WordAssociation(answers)
                } else {
                    ReportRequest::SituationReaction(answers)
                }
            }
            TestMode::Ppdt => ReportRequest::Ppdt(PpdtSubmission {
                image_data_uri: self.ppdt.image_data_uri.clone(),
                story: self.ppdt.story.clone(),
                characters: self.ppdt.characters.clone(),
            }),
        };

        self.loading = true;
        info!(session = %self.id, "Submitting {mode} for analysis");
        Some(Submission {
            epoch: self.epoch,
            request,
        })
    }

    fn current_item(&self, action: &'static str) -> Result<usize, SessionError> {
        match self.state {
            SessionState::Active {
                step: Step::Item { index },
                ..
            } => {
                self.ensure_collecting(action)?;
                Ok(index)
            }
            _ => Err(self.invalid(action)),
        }
    }

    fn ppdt_input_stage(&self, action: &'static str) -> Result<(), SessionError> {
        match self.state {
            SessionState::Active {
                step:
                    Step::Ppdt {
                        stage: PpdtStage::Details | PpdtStage::Story,
                    },
                ..
            } => self.ensure_collecting(action),
            _ => Err(self.invalid(action)),
        }
    }

    /// Inputs are frozen once a submission is in flight or has failed.
    fn ensure_collecting(&self, action: &'static str) -> Result<(), SessionError> {
        if self.loading || self.error.is_some() {
            return Err(SessionError::InvalidTransition {
                action,
                state: "a report is pending or has failed".to_string(),
            });
        }
        Ok(())
    }

    fn validate_item(&mut self, index: usize) -> Result<(), SessionError> {
        if self.answers[index].trim().is_empty() {
            let field = format!("answers.{index}");
            return Err(self.field_invalid(
                &field,
                "Please enter a response before continuing.".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_story(&mut self) -> Result<(), SessionError> {
        if let Some(i) = self.ppdt.characters.iter().position(|c| !c.is_complete()) {
            return Err(self.field_invalid(
                &format!("characters.{i}"),
                "Gender and mood are required.".to_string(),
            ));
        }
        if self.ppdt.story.trim().is_empty() {
            return Err(self.field_invalid("story", "Please write a story.".to_string()));
        }
        Ok(())
    }

    fn field_invalid(&mut self, field: &str, message: String) -> SessionError {
        let error = FieldError {
            field: field.to_string(),
            message,
        };
        self.field_error = Some(error.clone());
        SessionError::Validation {
            field: error.field,
            message: error.message,
        }
    }

    fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            action,
            state: self.state.describe(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{NO_RESPONSE, PPDT_STORY_SECONDS, SITUATIONS, WORDS};
    use crate::reports::test_support::FakeAnalyzer;
    use crate::reports::ReportRequester;
    use std::sync::Arc;

    const IMAGE: &str = "data:image/png;base64,iVBORw0KGgo=";

    fn started(mode: TestMode) -> Session {
        let mut session = Session::new();
        session.select_test(mode).unwrap();
        session.start_test().unwrap();
        session
    }

    fn tick_n(session: &mut Session, n: u32) -> Option<Submission> {
        let mut submitted = None;
        for _ in 0..n {
            if let Some(s) = session.tick() {
                assert!(submitted.is_none(), "only one submission per test");
                submitted = Some(s);
            }
        }
        submitted
    }

    fn item_index(session: &Session) -> usize {
        match session.state() {
            SessionState::Active {
                step: Step::Item { index },
                ..
            } => index,
            other => panic!("not on an item: {other:?}"),
        }
    }

    #[test]
    fn test_new_session_is_welcome() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Welcome);
        assert!(session.state().phase().is_none());
        assert!(!session.timer_active());
    }

    #[test]
    fn test_id_survives_reset() {
        let mut session = started(TestMode::WordAssociation);
        let id = session.id();
        assert_ne!(id, Session::new().id());
        session.reset();
        assert_eq!(session.id(), id);
    }

    #[test]
    fn test_select_then_start_runs_first_item_timer() {
        let mut session = Session::new();
        session.select_test(TestMode::WordAssociation).unwrap();
        assert_eq!(session.state().phase(), Some(TestPhase::Instructions));
        assert_eq!(session.answers().len(), 5);
        assert!(!session.timer_active());

        session.start_test().unwrap();
        assert_eq!(item_index(&session), 0);
        assert_eq!(session.time_left(), 22);
    }

    #[test]
    fn test_mode_fixed_once_started() {
        let mut session = Session::new();
        session.select_test(TestMode::Ppdt).unwrap();
        session.select_test(TestMode::WordAssociation).unwrap();
        session.start_test().unwrap();
        assert!(matches!(
            session.select_test(TestMode::Ppdt),
            Err(SessionError::InvalidTransition { .. })
        ));
        assert_eq!(session.state().mode(), Some(TestMode::WordAssociation));
        session.reset();
        session.select_test(TestMode::Ppdt).unwrap();
    }

    #[test]
    fn test_capture_failure_stops_clock_and_blocks_input() {
        let mut session = started(TestMode::Ppdt);
        session.fail_capture(CaptureError::Missing);
        assert!(!session.timer_active());
        assert_eq!(
            session.error(),
            Some("The test image could not be loaded. Please start the test again.")
        );
        assert!(tick_n(&mut session, 400).is_none());
    }

    #[test]
    fn test_manual_next_with_empty_answer_does_not_advance() {
        let mut session = started(TestMode::WordAssociation);
        session.record_answer("   ").unwrap();

        let err = session.next().unwrap_err();
        assert!(matches!(err, SessionError::Validation { ref field, .. } if field == "answers.0"));
        assert_eq!(item_index(&session), 0);
        assert_eq!(session.field_error().unwrap().field, "answers.0");

        session.record_answer("A friend is a mirror.").unwrap();
        assert!(session.field_error().is_none());
        assert!(session.next().unwrap().is_none());
        assert_eq!(item_index(&session), 1);
        assert_eq!(session.time_left(), 22);
    }

    #[test]
    fn test_timeout_advances_and_stores_placeholder() {
        let mut session = started(TestMode::SituationReaction);
        assert!(tick_n(&mut session, 29).is_none());
        assert_eq!(item_index(&session), 0);

        assert!(session.tick().is_none());
        assert_eq!(item_index(&session), 1);
        assert_eq!(session.answers()[0], NO_RESPONSE);
        assert_eq!(session.time_left(), 30);
    }

    #[test]
    fn test_timeout_keeps_partial_text() {
        let mut session = started(TestMode::WordAssociation);
        session.record_answer("Friends are").unwrap();
        tick_n(&mut session, 22);
        assert_eq!(session.answers()[0], "Friends are");
        assert_eq!(item_index(&session), 1);
    }

    #[test]
    fn test_last_item_timeout_submits_once() {
        let mut session = started(TestMode::WordAssociation);
        session.record_answer("A friend in need.").unwrap();

        let submission = tick_n(&mut session, 22 * 5 + 30).expect("submitted on last expiry");
        assert!(session.is_loading());
        assert!(!session.timer_active());
        assert_eq!(submission.epoch, session.epoch());

        let ReportRequest::WordAssociation(answers) = submission.request else {
            panic!("wrong request shape");
        };
        assert_eq!(answers.len(), 5);
        assert_eq!(answers[0], ItemAnswer::new(WORDS[0], "A friend in need."));
        assert!(answers[1..].iter().all(|a| a.response == NO_RESPONSE));
    }

    #[test]
    fn test_manual_submit_only_on_last_item() {
        let mut session = started(TestMode::SituationReaction);
        assert!(matches!(
            session.submit(),
            Err(SessionError::InvalidTransition { .. })
        ));

        for i in 0..4 {
            session.record_answer(format!("reaction {i}")).unwrap();
            session.next().unwrap();
        }
        session.record_answer("Stay and help.").unwrap();
        let submission = session.submit().unwrap().unwrap();
        let ReportRequest::SituationReaction(answers) = submission.request else {
            panic!("wrong request shape");
        };
        assert_eq!(answers[4].prompt, SITUATIONS[4]);
        assert_eq!(answers[4].response, "Stay and help.");
    }

    #[test]
    fn test_no_second_submission_while_loading() {
        let mut session = started(TestMode::WordAssociation);
        for _ in 0..4 {
            session.record_answer("x").unwrap();
            session.next().unwrap();
        }
        session.record_answer("x").unwrap();
        assert!(session.submit().unwrap().is_some());
        assert!(session.submit().is_err());
        assert!(session.tick().is_none());
    }

    #[test]
    fn test_ppdt_phases_run_forward_on_timer() {
        let mut session = started(TestMode::Ppdt);
        assert_eq!(
            session.state(),
            SessionState::Active {
                mode: TestMode::Ppdt,
                step: Step::Ppdt {
                    stage: PpdtStage::Perception
                }
            }
        );
        assert!(matches!(
            session.set_character_count(2),
            Err(SessionError::InvalidTransition { .. })
        ));

        tick_n(&mut session, 30);
        assert!(matches!(
            session.state(),
            SessionState::Active {
                step: Step::Ppdt {
                    stage: PpdtStage::Details
                },
                ..
            }
        ));

        tick_n(&mut session, 30);
        assert!(matches!(
            session.state(),
            SessionState::Active {
                step: Step::Ppdt {
                    stage: PpdtStage::Story
                },
                ..
            }
        ));
        assert_eq!(session.time_left(), PPDT_STORY_SECONDS);
        assert!(session.set_character_count(3).is_ok());
    }

    #[test]
    fn test_character_list_tracks_count() {
        let mut session = started(TestMode::Ppdt);
        tick_n(&mut session, 30);
        assert_eq!(session.ppdt().characters.len(), 1);

        session.set_character_count(4).unwrap();
        session
            .set_character(3, Some(Gender::Female), Some(Mood::Positive))
            .unwrap();
        assert_eq!(session.ppdt().characters.len(), 4);

        session.set_character_count(2).unwrap();
        assert_eq!(session.ppdt().characters.len(), 2);
        assert!(session.set_character(3, None, None).is_err());

        assert!(matches!(
            session.set_character_count(0),
            Err(SessionError::Validation { .. })
        ));
        assert!(session.set_character_count(6).is_err());
        assert_eq!(session.ppdt().characters.len(), 2);
    }

    #[test]
    fn test_ppdt_manual_submit_validates_story_and_characters() {
        let mut session = started(TestMode::Ppdt);
        session.attach_image(IMAGE).unwrap();
        tick_n(&mut session, 60);

        session.record_story("They cross the river together.").unwrap();
        let err = session.submit().unwrap_err();
        assert!(matches!(err, SessionError::Validation { ref field, .. } if field == "characters.0"));

        session
            .set_character(0, Some(Gender::Male), Some(Mood::Neutral))
            .unwrap();
        session.record_story("").unwrap();
        let err = session.submit().unwrap_err();
        assert!(matches!(err, SessionError::Validation { ref field, .. } if field == "story"));

        session.record_story("They cross the river together.").unwrap();
        let submission = session.submit().unwrap().unwrap();
        let ReportRequest::Ppdt(ppdt) = submission.request else {
            panic!("wrong request shape");
        };
        assert_eq!(ppdt.image_data_uri.as_deref(), Some(IMAGE));
        assert_eq!(ppdt.story, "They cross the river together.");
    }

    #[test]
    fn test_ppdt_story_timeout_submits_without_validation() {
        let mut session = started(TestMode::Ppdt);
        tick_n(&mut session, 60);
        let submission = tick_n(&mut session, PPDT_STORY_SECONDS).expect("auto submit");
        let ReportRequest::Ppdt(ppdt) = submission.request else {
            panic!("wrong request shape");
        };
        assert!(ppdt.story.is_empty());
        assert!(ppdt.image_data_uri.is_none());
    }

    #[test]
    fn test_attach_image_rejects_bad_uri_and_other_modes() {
        let mut session = started(TestMode::Ppdt);
        assert!(matches!(
            session.attach_image("data:image/gif;base64,AAAA"),
            Err(SessionError::Capture(_))
        ));

        let mut words = started(TestMode::WordAssociation);
        assert!(words.attach_image(IMAGE).is_err());
    }

    #[test]
    fn test_reset_from_any_phase_clears_everything() {
        let mut session = started(TestMode::WordAssociation);
        session.record_answer("Friends help.").unwrap();
        tick_n(&mut session, 5);
        let epoch = session.epoch();

        session.reset();
        assert_eq!(session.state(), SessionState::Welcome);
        assert!(session.answers().is_empty());
        assert_eq!(session.time_left(), 0);
        assert!(!session.timer_active());
        assert!(session.report().is_none());
        assert!(session.error().is_none());
        assert!(!session.is_loading());
        assert_eq!(session.epoch(), epoch + 1);

        // No late expiry after reset.
        assert!(tick_n(&mut session, 100).is_none());
        assert_eq!(session.state(), SessionState::Welcome);
    }

    #[test]
    fn test_stale_outcome_after_reset_is_dropped() {
        let mut session = started(TestMode::WordAssociation);
        let submission = tick_n(&mut session, 22 * 5).unwrap_or_else(|| panic!("no submission"));
        session.reset();
        session.select_test(TestMode::SituationReaction).unwrap();

        let applied = session.complete(
            submission.epoch,
            Err(AppError::InsufficientInput("late".to_string())),
        );
        assert!(!applied);
        assert!(session.error().is_none());
        assert_eq!(session.state().mode(), Some(TestMode::SituationReaction));
    }

    #[test]
    fn test_failed_outcome_shows_message_and_blocks_resubmit() {
        let mut session = started(TestMode::WordAssociation);
        let submission = tick_n(&mut session, 22 * 5).unwrap_or_else(|| panic!("no submission"));
        assert!(session.complete(
            submission.epoch,
            Err(AppError::InsufficientInput(
                "At least one sentence is required to generate a report.".to_string()
            )),
        ));
        assert_eq!(
            session.error(),
            Some("At least one sentence is required to generate a report.")
        );
        assert!(!session.is_loading());
        assert!(session.submit().is_err());
        assert!(session.record_answer("late").is_err());
    }

    #[tokio::test]
    async fn test_word_association_end_to_end() {
        let requester = ReportRequester::new(Arc::new(FakeAnalyzer::default()));
        let mut session = started(TestMode::WordAssociation);
        let mut submission = None;
        for word in WORDS {
            session.record_answer(format!("I think of {word}.")).unwrap();
            submission = session.next().unwrap();
        }
        let submission = submission.expect("last next submits");

        let outcome = requester.request(submission.request).await;
        assert!(session.complete(submission.epoch, outcome));
        assert_eq!(
            session.state(),
            SessionState::Results {
                mode: TestMode::WordAssociation
            }
        );
        let Some(AnalysisReport::WordAssociation(report)) = session.report() else {
            panic!("expected word association report");
        };
        assert_eq!(report.word_analyses.len(), 5);
        assert_eq!(report.word_analyses[4].word, "games");
    }

    #[tokio::test]
    async fn test_ppdt_end_to_end() {
        let requester = ReportRequester::new(Arc::new(FakeAnalyzer::default()));
        let mut session = started(TestMode::Ppdt);
        session.attach_image(IMAGE).unwrap();
        tick_n(&mut session, 30);
        session.set_character_count(2).unwrap();
        session
            .set_character(0, Some(Gender::Male), Some(Mood::Positive))
            .unwrap();
        session
            .set_character(1, Some(Gender::Other), Some(Mood::Negative))
            .unwrap();
        tick_n(&mut session, 30);
        session.record_story("A storm is coming; they secure the village.").unwrap();

        let submission = session.submit().unwrap().unwrap();
        let outcome = requester.request(submission.request).await;
        assert!(session.complete(submission.epoch, outcome));
        let Some(AnalysisReport::Ppdt(report)) = session.report() else {
            panic!("expected ppdt report");
        };
        assert_eq!(report.story_analysis.plot_summary, "2 characters work together.");
    }
}
