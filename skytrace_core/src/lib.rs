//! SkyTrace Core - Flight Path Playback Engine
//!
//! Converts a static path (waypoints with longitude, latitude, altitude)
//! plus a configured ground speed into a time-varying vehicle state, drives
//! it on a periodic clock, and emits telemetry events for map rendering, UI
//! state, and a remote tracking API:
//! 1. **Geodesic interpolation**: great-circle position/heading along
//!    piecewise-linear path segments (`geo`)
//! 2. **Continuous time bookkeeping**: pause/resume/speed changes without
//!    position jumps (`tracker`)
//! 3. **Playback state machine**: STOPPED/PLAYING/PAUSED with a periodic
//!    timer and a closed event set (`player`)

pub mod config;
pub mod geo;
pub mod player;
pub mod registry;
pub mod telemetry;
pub mod tracker;

// Re-export key types for convenience
pub use config::{FlightConfig, Path, Point, TrackingEnv, VehicleState, VehicleType};
pub use player::{FlightEvent, FlightPlayer, PlayMode, DEFAULT_UPDATE_INTERVAL};
pub use registry::PlayerRegistry;
pub use telemetry::{HttpTrackClient, TelemetryError, TrackRecord, TrackTransport};
pub use tracker::DistanceTracker;
