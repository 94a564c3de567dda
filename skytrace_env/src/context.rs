//! Core environment context trait for the flight playback engine.

use async_trait::async_trait;
use std::future::Future;
use std::time::{Duration, SystemTime};

/// The central interface for environment interaction.
///
/// This trait abstracts time and task scheduling so the playback engine can
/// run in both production (tokio) and simulation (virtual clock) environments.
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `tokio::time` and the system clock
/// - **Simulation**: `SimContext` (in `skytrace_sim`) - manually advanced
///   virtual clock with an explicitly drained task queue
#[async_trait]
pub trait FlightContext: Send + Sync + 'static {
    /// Returns the current monotonic time since context creation.
    ///
    /// All distance-over-time bookkeeping in the engine is relative to this
    /// clock. In simulation, this is the virtual clock time.
    fn now(&self) -> Duration;

    /// Returns the wall-clock time used for telemetry timestamps.
    ///
    /// In simulation, this is derived from virtual clock + epoch offset, so
    /// recorded track timestamps stay reproducible.
    fn system_time(&self) -> SystemTime;

    /// Suspends execution for the given duration.
    ///
    /// In production: wraps `tokio::time::sleep`.
    /// In simulation: advances the virtual clock.
    async fn sleep(&self, duration: Duration);

    /// Spawns a background task.
    ///
    /// Used for the periodic tick loop and for fire-and-forget telemetry
    /// sends. The engine never awaits a spawned future.
    fn spawn<F>(&self, name: &str, future: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
