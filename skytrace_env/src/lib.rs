//! SkyTrace Environment Abstraction Layer
//!
//! This crate provides the seam that lets the flight playback engine run
//! against either the real world (tokio timers, system clock) or a
//! simulated one (virtual clock, manually drained task queue).
//!
//! # Core Concept
//!
//! The engine never reads the clock or spawns a task directly; it goes
//! through a [`FlightContext`]:
//! - Time (`now()`, `system_time()`, `sleep()`)
//! - Background work (`spawn()`)
//!
//! Tests drive ticks deterministically by advancing a virtual clock instead
//! of waiting on wall-clock timers.
//!
//! # Example
//!
//! ```ignore
//! use skytrace_env::FlightContext;
//! use std::time::Duration;
//!
//! async fn tick_loop<Ctx: FlightContext>(ctx: &Ctx, interval: Duration) {
//!     loop {
//!         ctx.sleep(interval).await;
//!         tick();
//!     }
//! }
//! ```

mod context;
mod tokio_impl;
mod types;

pub use context::FlightContext;
pub use tokio_impl::TokioContext;
pub use types::VehicleId;
