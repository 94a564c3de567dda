//! SkyTrace deterministic playback harness.
//!
//! Runs the full playback engine against a virtual clock: the harness
//! advances time step by step, drains spawned tasks explicitly, and
//! observes the engine's event stream and recorded telemetry. No wall
//! clock and no network are involved, so every run is reproducible.
//!
//! # Usage
//!
//! ```ignore
//! use skytrace_sim::{RecordingTransport, SimContext};
//! use skytrace_core::PlayerRegistry;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let ctx = SimContext::shared();
//! let transport = Arc::new(RecordingTransport::new());
//! let registry = PlayerRegistry::new(Arc::clone(&ctx), transport.clone());
//!
//! let player = registry.create(id, config, env);
//! player.play();
//! ctx.step(Duration::from_secs(1)); // exactly one tick
//! ```

mod context;
mod transport;

pub use context::SimContext;
pub use transport::RecordingTransport;
