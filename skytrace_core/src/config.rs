//! Flight configuration and core value types.
//!
//! Everything here is a plain in-memory value object owned by the caller;
//! the engine holds read-only snapshots replaced wholesale via `set_config`.

use serde::{Deserialize, Serialize};

/// Altitude assigned to waypoints created without one, in meters.
pub const DEFAULT_ALTITUDE_M: f64 = 30.0;

/// A single waypoint: WGS84 longitude/latitude plus altitude in meters MSL.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lon: f64,
    pub lat: f64,
    pub alt: f64,
}

impl Point {
    pub fn new(lon: f64, lat: f64, alt: f64) -> Self {
        Self { lon, lat, alt }
    }

    /// Creates a waypoint at the default altitude.
    pub fn at_default_altitude(lon: f64, lat: f64) -> Self {
        Self::new(lon, lat, DEFAULT_ALTITUDE_M)
    }
}

/// An ordered sequence of waypoints.
///
/// A path needs at least 2 points before it describes any motion; shorter
/// paths are treated as immediately at end-of-path by the interpolator.
pub type Path = Vec<Point>;

/// The kind of vehicle being simulated, as understood by the tracking API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VehicleType {
    Uas,
    Airplane,
    Ground,
}

impl VehicleType {
    /// The wire name the tracking API expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Uas => "UAS",
            VehicleType::Airplane => "AIRPLANE",
            VehicleType::Ground => "GROUND",
        }
    }
}

/// Static configuration for one simulated flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightConfig {
    /// The path to fly.
    pub path: Path,

    /// Ground speed in meters per second (> 0).
    pub speed_ms: f64,

    /// Call sign reported to the tracking API.
    pub call_sign: String,

    /// Transponder identifier; empty means unidentified.
    pub transponder_id: String,

    /// Security group forwarded to the tracking API.
    pub security_group: String,

    /// Vehicle type reported with every track.
    pub vehicle_type: VehicleType,
}

/// A target tracking environment (which backend the telemetry goes to).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEnv {
    /// Environment identifier, e.g. "dev" or "prod".
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Base URL of the tracking gateway.
    pub api: String,

    /// API key sent with each track record.
    pub api_key: String,
}

impl TrackingEnv {
    /// The tracking endpoint URL for this environment.
    pub fn tracking_url(&self) -> String {
        format!("{}/api/tracking/{}", self.api.trim_end_matches('/'), self.id)
    }
}

/// Computed state of a simulated vehicle at one instant.
///
/// Derived fresh on every tick; never persisted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// Interpolated position along the path.
    pub position: Point,

    /// Geodesic bearing of the current segment, degrees in [0, 360).
    pub heading: f64,

    /// Meters travelled from the start of the path.
    pub distance_travelled: f64,

    /// Vehicle type from the active configuration.
    pub vehicle_type: VehicleType,
}
