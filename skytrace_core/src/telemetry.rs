//! Telemetry reporting to the tracking backend.
//!
//! One track record is sent per tick while playing: at-most-once, no retry,
//! no batching. Failures never propagate out of the engine; they surface as
//! `ApiError` events on the player's channel.

use crate::config::{FlightConfig, TrackingEnv, VehicleState};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use thiserror::Error;

/// Conversion factor from m/s to knots for the ground-speed field.
pub const MS_TO_KNOTS: f64 = 1.94384;

/// Source identifier stamped on every track record.
pub const TRACK_SOURCE: &str = "uniflyJsonToFlight";

/// Call sign used when the configuration leaves it empty.
pub const DEFAULT_CALL_SIGN: &str = "OO-UNIFLY";

/// Identification sentinel for vehicles without a transponder id.
pub const UNKNOWN_IDENTIFICATION: &str = "UNKNOWN";

/// Errors from a single telemetry send.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The backend answered with a non-2xx status.
    #[error("API Error - {0}")]
    Status(String),

    /// Transport-level failure (connection, DNS, serialization).
    #[error("Uncaught Error - {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackLocation {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackAltitude {
    pub altitude: f64,
    pub unit: String,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackHeading {
    pub true_heading: f64,
    pub magnetic_heading: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AircraftData {
    /// Ground speed in knots.
    pub ground_speed: f64,
}

/// One position report in the tracking API's wire schema.
///
/// Serialized as a single-element JSON array in the POST body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRecord {
    pub source: String,
    pub source_id: String,
    pub sequence: u64,
    /// Send time, ISO-8601.
    pub timestamp: String,
    pub location: TrackLocation,
    pub altitude: TrackAltitude,
    pub call_sign: String,
    pub vehicle_type: String,
    pub heading: TrackHeading,
    pub aircraft_data: AircraftData,
    pub identification: String,
    pub security_group: String,
    pub api_key: String,
}

impl TrackRecord {
    /// Builds the record for one computed vehicle state.
    ///
    /// `sent_at` comes from the context's wall clock so simulated runs
    /// produce reproducible timestamps.
    pub fn from_state(
        state: &VehicleState,
        sequence: u64,
        config: &FlightConfig,
        env: &TrackingEnv,
        sent_at: SystemTime,
    ) -> Self {
        let call_sign = if config.call_sign.is_empty() {
            DEFAULT_CALL_SIGN.to_string()
        } else {
            config.call_sign.clone()
        };
        let identification = if config.transponder_id.is_empty() {
            UNKNOWN_IDENTIFICATION.to_string()
        } else {
            config.transponder_id.clone()
        };

        Self {
            source: TRACK_SOURCE.to_string(),
            source_id: TRACK_SOURCE.to_string(),
            sequence,
            timestamp: DateTime::<Utc>::from(sent_at).to_rfc3339_opts(SecondsFormat::Millis, true),
            location: TrackLocation {
                latitude: state.position.lat,
                longitude: state.position.lon,
            },
            altitude: TrackAltitude {
                altitude: state.position.alt,
                unit: "m".to_string(),
                reference: "MSL".to_string(),
            },
            call_sign,
            vehicle_type: state.vehicle_type.as_str().to_string(),
            heading: TrackHeading {
                true_heading: 0.0,
                magnetic_heading: state.heading,
            },
            aircraft_data: AircraftData {
                ground_speed: config.speed_ms * MS_TO_KNOTS,
            },
            identification,
            security_group: config.security_group.clone(),
            api_key: env.api_key.clone(),
        }
    }
}

/// Abstraction over the single-send telemetry wire call.
///
/// # Implementations
///
/// - **Production**: [`HttpTrackClient`] - one HTTP POST per call
/// - **Simulation**: `RecordingTransport` (in `skytrace_sim`) - captures
///   records in memory, optionally failing on demand
#[async_trait]
pub trait TrackTransport: Send + Sync + 'static {
    /// Sends one batch of track records (in practice, a single record).
    ///
    /// Success is any 2xx status; everything else is an error value, never
    /// a panic. Implementations must not retry.
    async fn send_track(
        &self,
        env: &TrackingEnv,
        records: &[TrackRecord],
    ) -> Result<(), TelemetryError>;
}

/// Production transport: JSON POST to the environment's tracking endpoint.
pub struct HttpTrackClient {
    client: reqwest::Client,
}

impl HttpTrackClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTrackClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TrackTransport for HttpTrackClient {
    async fn send_track(
        &self,
        env: &TrackingEnv,
        records: &[TrackRecord],
    ) -> Result<(), TelemetryError> {
        let response = self
            .client
            .post(env.tracking_url())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(records)
            .send()
            .await
            .map_err(|err| TelemetryError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(TelemetryError::Status(status.to_string()))
        }
    }
}
