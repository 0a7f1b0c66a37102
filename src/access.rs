//! Access-event lifecycle: capture trigger -> mock recognition -> outcome ->
//! history append -> dashboard refresh.
//!
//! The controller drives one capture at a time. Recognition is the only
//! asynchronous step; it is not preemptible, and stopping the camera while a
//! capture is in flight does not cancel it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::dashboard::{self, DashboardSnapshot};
use crate::interface::{AccessOutcome, AccessStatus, CaptureState, Clock, WardenError};
use crate::models::AccessAttempt;
use crate::store::{self, RecordStore};

/// Where simulated captures happen.
pub const DEFAULT_LOCATION: &str = "Main Entrance";
/// Reason attached to every failed recognition.
pub const NOT_RECOGNIZED_REASON: &str = "Face not recognized in database";
/// Simulated recognition delay.
pub const RECOGNITION_DELAY: Duration = Duration::from_secs(2);
/// How long the presentation layer shows a result banner before auto-dismiss.
pub const RESULT_DISPLAY_DURATION: Duration = Duration::from_secs(5);

const SUCCESS_RATE: f64 = 0.7;
const SUCCESS_CONFIDENCE: std::ops::RangeInclusive<u8> = 80..=99;
const FAILURE_CONFIDENCE: std::ops::RangeInclusive<u8> = 40..=69;

/// Result of one recognition pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub recognized: bool,
    pub confidence: u8,
    pub reason: Option<String>,
}

/// Pluggable recognition backend so tests can force outcomes.
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(&self, profile_name: &str) -> Recognition;
}

/// Mock recognizer: succeeds with probability 0.7 after a fixed delay.
/// Confidence is uniform in [80, 99] on success, [40, 69] on failure.
pub struct MockRecognizer {
    rng: Mutex<StdRng>,
    delay: Duration,
}

impl MockRecognizer {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
            delay: RECOGNITION_DELAY,
        }
    }

    /// Deterministic variant for tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl Default for MockRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Recognizer for MockRecognizer {
    async fn recognize(&self, _profile_name: &str) -> Recognition {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let mut rng = self.rng.lock();
        if rng.gen_bool(SUCCESS_RATE) {
            Recognition {
                recognized: true,
                confidence: rng.gen_range(SUCCESS_CONFIDENCE),
                reason: None,
            }
        } else {
            Recognition {
                recognized: false,
                confidence: rng.gen_range(FAILURE_CONFIDENCE),
                reason: Some(NOT_RECOGNIZED_REASON.to_string()),
            }
        }
    }
}

/// Drives the capture lifecycle against an injected store, recognizer, and
/// clock. Holds the latest dashboard snapshot, refreshed after every
/// recorded attempt.
pub struct AccessController {
    store: Arc<dyn RecordStore>,
    recognizer: Arc<dyn Recognizer>,
    clock: Arc<dyn Clock>,
    state: Mutex<CaptureState>,
    camera_active: Mutex<bool>,
    snapshot: Mutex<DashboardSnapshot>,
}

impl AccessController {
    pub fn new(
        store: Arc<dyn RecordStore>,
        recognizer: Arc<dyn Recognizer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let snapshot = Self::compute_snapshot(store.as_ref(), clock.as_ref());
        Self {
            store,
            recognizer,
            clock,
            state: Mutex::new(CaptureState::Idle),
            camera_active: Mutex::new(false),
            snapshot: Mutex::new(snapshot),
        }
    }

    pub fn state(&self) -> CaptureState {
        *self.state.lock()
    }

    pub fn camera_active(&self) -> bool {
        *self.camera_active.lock()
    }

    pub fn start_camera(&self) {
        *self.camera_active.lock() = true;
        debug!("camera feed started");
    }

    /// Stopping the camera while Idle has no further effect; an in-flight
    /// recognition still resolves and records its attempt.
    pub fn stop_camera(&self) {
        *self.camera_active.lock() = false;
        debug!("camera feed stopped");
    }

    /// Latest dashboard aggregates, as of the last recorded attempt.
    pub fn dashboard(&self) -> DashboardSnapshot {
        self.snapshot.lock().clone()
    }

    /// Trigger one capture. Precondition failures surface as outcomes and
    /// record nothing; completed recognitions always append exactly one
    /// attempt and refresh the dashboard snapshot afterwards.
    pub async fn capture(&self) -> Result<AccessOutcome, WardenError> {
        if !self.camera_active() {
            return Ok(AccessOutcome::CameraError);
        }
        let profile_name = store::load_session(self.store.as_ref())
            .user
            .map(|u| u.full_name())
            .unwrap_or_default();
        if profile_name.is_empty() {
            return Ok(AccessOutcome::ProfileRequired);
        }

        let _processing = ProcessingGuard::new(&self.state);
        let recognition = self.recognizer.recognize(&profile_name).await;

        let (outcome, attempt) = if recognition.recognized {
            let attempt = AccessAttempt {
                timestamp: self.clock.now(),
                status: AccessStatus::Success,
                location: DEFAULT_LOCATION.to_string(),
                confidence: recognition.confidence,
                user_name: Some(profile_name.clone()),
                reason: None,
            };
            let outcome = AccessOutcome::Granted {
                user_name: profile_name,
                confidence: recognition.confidence,
            };
            (outcome, attempt)
        } else {
            let reason = recognition
                .reason
                .unwrap_or_else(|| NOT_RECOGNIZED_REASON.to_string());
            let attempt = AccessAttempt {
                timestamp: self.clock.now(),
                status: AccessStatus::Failed,
                location: DEFAULT_LOCATION.to_string(),
                confidence: recognition.confidence,
                user_name: None,
                reason: Some(reason.clone()),
            };
            let outcome = AccessOutcome::Denied {
                reason,
                confidence: recognition.confidence,
            };
            (outcome, attempt)
        };

        // History append happens-before the dashboard recompute, and before
        // any later index rebuild that includes this attempt.
        let history = store::append_attempt(self.store.as_ref(), attempt)?;
        let profile_name = store::load_session(self.store.as_ref())
            .user
            .map(|u| u.full_name());
        *self.snapshot.lock() = dashboard::snapshot(
            &history,
            profile_name.as_deref(),
            self.clock.as_ref(),
        );

        info!(
            outcome = outcome.title(),
            history_len = history.len(),
            "capture resolved"
        );
        Ok(outcome)
    }

    fn compute_snapshot(store: &dyn RecordStore, clock: &dyn Clock) -> DashboardSnapshot {
        let history = store::load_history(store);
        let profile_name = store::load_session(store).user.map(|u| u.full_name());
        dashboard::snapshot(&history, profile_name.as_deref(), clock)
    }
}

/// Marks the controller Processing for its lifetime and restores Idle on
/// drop, so every exit path from a capture, early returns included, leaves
/// the machine Idle.
struct ProcessingGuard<'a> {
    state: &'a Mutex<CaptureState>,
}

impl<'a> ProcessingGuard<'a> {
    fn new(state: &'a Mutex<CaptureState>) -> Self {
        *state.lock() = CaptureState::Processing;
        Self { state }
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        *self.state.lock() = CaptureState::Idle;
    }
}
