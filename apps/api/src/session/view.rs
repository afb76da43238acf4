//! What the presentation layer should render for a session.
//!
//! Precedence: a pending analysis wins over an error, and an error wins over
//! the current phase.

use serde::Serialize;

use crate::catalog::{self, TestMode};
use crate::reports::AnalysisReport;

use super::{FieldError, PpdtDraft, Session, SessionState, Step};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "kebab-case")]
pub enum ViewState {
    Welcome,
    Instructions {
        mode: TestMode,
        title: &'static str,
        instructions: &'static [&'static str],
    },
    #[serde(rename_all = "camelCase")]
    Active {
        mode: TestMode,
        step: Step,
        /// The word or situation on screen; `None` during the PPDT.
        prompt: Option<&'static str>,
        answer: Option<String>,
        ppdt: Option<PpdtDraft>,
        time_left: u32,
        field_error: Option<FieldError>,
    },
    Loading {
        mode: TestMode,
    },
    Results {
        mode: TestMode,
        report: AnalysisReport,
    },
    Error {
        message: String,
    },
}

impl ViewState {
    pub fn from_session(session: &Session) -> Self {
        let state = session.state();
        if session.is_loading() {
            if let Some(mode) = state.mode() {
                return ViewState::Loading { mode };
            }
        }
        if let Some(message) = session.error() {
            return ViewState::Error {
                message: message.to_string(),
            };
        }

        match state {
            SessionState::Welcome => ViewState::Welcome,
            SessionState::Instructions { mode } => {
                let descriptor = catalog::descriptor(mode);
                ViewState::Instructions {
                    mode,
                    title: descriptor.instructions_title,
                    instructions: descriptor.instructions,
                }
            }
            SessionState::Active { mode, step } => {
                let (prompt, answer, ppdt) = match step {
                    Step::Item { index } => (
                        catalog::descriptor(mode).items().get(index).copied(),
                        session.answers().get(index).cloned(),
                        None,
                    ),
                    Step::Ppdt { .. } => (None, None, Some(session.ppdt().clone())),
                };
                ViewState::Active {
                    mode,
                    step,
                    prompt,
                    answer,
                    ppdt,
                    time_left: session.time_left(),
                    field_error: session.field_error().cloned(),
                }
            }
            SessionState::Results { mode } => match session.report() {
                Some(report) => ViewState::Results {
                    mode,
                    report: report.clone(),
                },
                None => ViewState::Welcome,
            },
        }
    }
}
