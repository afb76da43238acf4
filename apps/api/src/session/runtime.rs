//! Drives a `Session` in real time.
//!
//! A background task ticks the session once per second. Any submission it (or
//! a caller) produces is sent to the report requester on its own task, and the
//! outcome is applied with the epoch it was issued under.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use crate::capture::ImageCapture;
use crate::catalog::TestMode;
use crate::reports::ReportRequester;

use super::{Session, SessionError, Submission, ViewState};

const TICK: Duration = Duration::from_secs(1);

pub struct SessionRuntime {
    session: Arc<Mutex<Session>>,
    requester: ReportRequester,
    capture: Arc<dyn ImageCapture>,
    clock: JoinHandle<()>,
}

impl SessionRuntime {
    /// Creates a fresh session and starts its clock. Must be called inside a
    /// tokio runtime.
    pub fn spawn(requester: ReportRequester, capture: Arc<dyn ImageCapture>) -> Self {
        let session = Arc::new(Mutex::new(Session::new()));
        let clock = tokio::spawn(run_clock(session.clone(), requester.clone()));
        Self {
            session,
            requester,
            capture,
            clock,
        }
    }

    /// Runs `f` with exclusive access to the session.
    pub async fn with_session<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut session = self.session.lock().await;
        f(&mut session)
    }

    pub async fn view(&self) -> ViewState {
        self.session.lock().await.view()
    }

    /// Starts the selected test. For the PPDT the stimulus is captured on a
    /// separate task so a slow capture never holds up the caller; it is
    /// attached only if the session was not reset in the meantime.
    pub async fn start_test(&self) -> Result<(), SessionError> {
        let (mode, epoch) = self
            .with_session(|s| s.start_test().map(|()| (s.state().mode(), s.epoch())))
            .await?;
        if mode == Some(TestMode::Ppdt) {
            tokio::spawn(capture_stimulus(
                self.session.clone(),
                self.capture.clone(),
                epoch,
            ));
        }
        Ok(())
    }

    pub async fn next(&self) -> Result<(), SessionError> {
        let submission = self.with_session(Session::next).await?;
        self.dispatch(submission);
        Ok(())
    }

    pub async fn submit(&self) -> Result<(), SessionError> {
        let submission = self.with_session(Session::submit).await?;
        self.dispatch(submission);
        Ok(())
    }

    pub async fn reset(&self) {
        self.with_session(Session::reset).await;
    }

    fn dispatch(&self, submission: Option<Submission>) {
        if let Some(submission) = submission {
            dispatch(self.session.clone(), self.requester.clone(), submission);
        }
    }
}

impl Drop for SessionRuntime {
    fn drop(&mut self) {
        self.clock.abort();
    }
}

async fn capture_stimulus(
    session: Arc<Mutex<Session>>,
    capture: Arc<dyn ImageCapture>,
    epoch: u64,
) {
    let captured = capture.capture().await;
    let mut session = session.lock().await;
    if session.epoch() != epoch {
        debug!(session = %session.id(), "Stimulus for epoch {epoch} arrived after reset");
        return;
    }
    let attached = match captured {
        Ok(data_uri) => session.attach_image(data_uri),
        Err(e) => {
            session.fail_capture(e);
            return;
        }
    };
    if let Err(SessionError::Capture(e)) = attached {
        session.fail_capture(e);
    }
}

fn dispatch(session: Arc<Mutex<Session>>, requester: ReportRequester, submission: Submission) {
    tokio::spawn(async move {
        let Submission { epoch, request } = submission;
        let outcome = requester.request(request).await;
        let mut session = session.lock().await;
        if !session.complete(epoch, outcome) {
            debug!(session = %session.id(), "Outcome for epoch {epoch} arrived after reset");
        }
    });
}

async fn run_clock(session: Arc<Mutex<Session>>, requester: ReportRequester) {
    let mut interval = interval_at(Instant::now() + TICK, TICK);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        let submission = session.lock().await.tick();
        if let Some(submission) = submission {
            dispatch(session.clone(), requester.clone(), submission);
        }
    }
}
