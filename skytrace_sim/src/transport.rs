//! In-memory telemetry transport for simulation runs and tests.

use async_trait::async_trait;
use skytrace_core::config::TrackingEnv;
use skytrace_core::telemetry::{TelemetryError, TrackRecord, TrackTransport};
use std::sync::Mutex;

/// Transport that records every track instead of sending it.
///
/// Can be switched into a failure mode to exercise the engine's
/// error-event path; playback must continue regardless.
pub struct RecordingTransport {
    sent: Mutex<Vec<TrackRecord>>,
    fail_with: Mutex<Option<String>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_with: Mutex::new(None),
        }
    }

    /// Makes every subsequent send fail with the given status line,
    /// e.g. `"502 Bad Gateway"`. `None` restores success.
    pub fn set_failure(&self, status: Option<&str>) {
        *self.fail_with.lock().unwrap() = status.map(str::to_string);
    }

    /// All records sent so far, in order.
    pub fn records(&self) -> Vec<TrackRecord> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TrackTransport for RecordingTransport {
    async fn send_track(
        &self,
        _env: &TrackingEnv,
        records: &[TrackRecord],
    ) -> Result<(), TelemetryError> {
        if let Some(status) = self.fail_with.lock().unwrap().clone() {
            return Err(TelemetryError::Status(status));
        }
        self.sent.lock().unwrap().extend_from_slice(records);
        Ok(())
    }
}
