//! Flight playback engine: state machine, periodic ticking, event stream.
//!
//! One `FlightPlayer` simulates one vehicle. On each tick while playing it
//! converts elapsed time into distance, interpolates the vehicle state along
//! the path, emits a `VehicleUpdated` event, and fires one telemetry report
//! without awaiting it. End of path either loops (repeat) or stops the
//! player with a `VehicleRemoved` event.

use crate::config::{FlightConfig, TrackingEnv, VehicleState};
use crate::geo::locate_along_path;
use crate::telemetry::{TrackRecord, TrackTransport};
use crate::tracker::DistanceTracker;
use skytrace_env::{FlightContext, VehicleId};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Default tick cadence when none has been configured.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_millis(1000);

/// Capacity of the per-player event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Playback state of one simulated vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    Stopped,
    Playing,
    Paused,
}

/// The closed set of events a player emits.
///
/// Delivery order per vehicle is FIFO relative to ticks: `VehicleCreated`
/// precedes the first `VehicleUpdated` of a session, `VehicleRemoved` is
/// terminal for the session. `ApiError` is out-of-band and may arrive after
/// the tick that triggered the report, including after a stop.
#[derive(Debug, Clone)]
pub enum FlightEvent {
    VehicleCreated {
        vehicle_id: VehicleId,
        state: VehicleState,
    },
    VehicleUpdated {
        vehicle_id: VehicleId,
        state: VehicleState,
    },
    VehicleRemoved {
        vehicle_id: VehicleId,
    },
    ApiError {
        message: String,
    },
}

struct PlayerInner {
    config: FlightConfig,
    env: TrackingEnv,
    play_repeat: bool,
    update_interval: Duration,
    mode: PlayMode,
    tracker: DistanceTracker,
    /// Per-report counter, reset on a fresh stopped->playing transition.
    sequence: u64,
    /// Bumped on every timer stop/restart; a tick loop exits once its
    /// epoch is stale.
    timer_epoch: u64,
}

/// Playback engine for a single vehicle.
///
/// All mutation goes through an internal mutex, so reconfiguration is
/// atomic with respect to ticks and takes effect on the next tick.
pub struct FlightPlayer<C: FlightContext> {
    vehicle_id: VehicleId,
    ctx: Arc<C>,
    transport: Arc<dyn TrackTransport>,
    events: broadcast::Sender<FlightEvent>,
    inner: Mutex<PlayerInner>,
    /// Self-handle for the spawned tick loop.
    weak: Weak<Self>,
}

impl<C: FlightContext> FlightPlayer<C> {
    pub fn new(
        vehicle_id: VehicleId,
        config: FlightConfig,
        env: TrackingEnv,
        ctx: Arc<C>,
        transport: Arc<dyn TrackTransport>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let tracker = DistanceTracker::new(config.speed_ms);

        Arc::new_cyclic(|weak| Self {
            vehicle_id,
            ctx,
            transport,
            events,
            inner: Mutex::new(PlayerInner {
                config,
                env,
                play_repeat: false,
                update_interval: DEFAULT_UPDATE_INTERVAL,
                mode: PlayMode::Stopped,
                tracker,
                sequence: 0,
                timer_epoch: 0,
            }),
            weak: weak.clone(),
        })
    }

    pub fn vehicle_id(&self) -> VehicleId {
        self.vehicle_id
    }

    pub fn mode(&self) -> PlayMode {
        self.inner.lock().unwrap().mode
    }

    /// Subscribes to this player's event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<FlightEvent> {
        self.events.subscribe()
    }

    /// Replaces the configuration snapshot wholesale.
    ///
    /// A changed speed re-bases the distance tracker so the position is
    /// continuous across the change; while paused or stopped the clock is
    /// frozen, so only the speed itself is adopted.
    pub fn set_config(&self, config: FlightConfig) {
        let mut inner = self.inner.lock().unwrap();
        if config.speed_ms != inner.config.speed_ms {
            if inner.mode == PlayMode::Playing {
                inner.tracker.change_speed(config.speed_ms, self.ctx.now());
            } else {
                inner.tracker.set_speed(config.speed_ms);
            }
        }
        inner.config = config;
    }

    pub fn set_env(&self, env: TrackingEnv) {
        self.inner.lock().unwrap().env = env;
    }

    pub fn set_play_repeat(&self, play_repeat: bool) {
        self.inner.lock().unwrap().play_repeat = play_repeat;
    }

    /// Changes the tick cadence.
    ///
    /// While playing, the periodic timer restarts at the new cadence
    /// without otherwise disturbing simulation state.
    pub fn set_update_interval(&self, update_interval: Duration) {
        let mut inner = self.inner.lock().unwrap();
        inner.update_interval = update_interval;
        if inner.mode == PlayMode::Playing {
            self.start_timer(&mut inner);
        }
    }

    /// STOPPED/PAUSED -> PLAYING.
    ///
    /// From STOPPED this is a fresh session: the sequence counter and
    /// distance reset and a `VehicleCreated` event carries the state at
    /// distance 0. From PAUSED the flight resumes from the paused distance
    /// with no new `VehicleCreated`. A no-op while already playing.
    pub fn play(&self) {
        let mut inner = self.inner.lock().unwrap();
        let now = self.ctx.now();

        match inner.mode {
            PlayMode::Playing => return,
            PlayMode::Paused => {
                inner.tracker.start(now);
                inner.mode = PlayMode::Playing;
                self.start_timer(&mut inner);
                debug!(vehicle = %self.vehicle_id, "playback resumed");
            }
            PlayMode::Stopped => {
                inner.sequence = 0;
                inner.tracker.reset();
                inner.tracker.start(now);
                inner.mode = PlayMode::Playing;
                self.start_timer(&mut inner);
                debug!(vehicle = %self.vehicle_id, "playback started");

                // A path too short to fly has no state at distance 0; the
                // first tick will observe end-of-path and stop.
                if let Some(state) =
                    locate_along_path(&inner.config.path, 0.0, inner.config.vehicle_type)
                {
                    self.emit(FlightEvent::VehicleCreated {
                        vehicle_id: self.vehicle_id,
                        state,
                    });
                }
            }
        }
    }

    /// PLAYING -> PAUSED: stops the timer and freezes the distance.
    ///
    /// A no-op unless currently playing.
    pub fn pause(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.mode != PlayMode::Playing {
            return;
        }
        inner.timer_epoch += 1;
        inner.tracker.pause(self.ctx.now());
        inner.mode = PlayMode::Paused;
        debug!(vehicle = %self.vehicle_id, "playback paused");
    }

    /// Any state -> STOPPED: stops the timer, clears accumulated distance,
    /// emits `VehicleRemoved`. Idempotent: stopping while stopped does
    /// nothing and emits nothing.
    pub fn stop(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.mode == PlayMode::Stopped {
            return;
        }
        inner.timer_epoch += 1;
        inner.tracker.reset();
        inner.mode = PlayMode::Stopped;
        drop(inner);

        debug!(vehicle = %self.vehicle_id, "playback stopped");
        self.emit(FlightEvent::VehicleRemoved {
            vehicle_id: self.vehicle_id,
        });
    }

    /// One simulation update.
    ///
    /// Invoked by the periodic timer; exposed so a deterministic harness
    /// can drive ticks directly. Does nothing unless playing.
    pub fn tick(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.mode != PlayMode::Playing {
            return;
        }

        let now = self.ctx.now();
        let distance = inner.tracker.distance_at(now);
        let vehicle_type = inner.config.vehicle_type;
        let mut state = locate_along_path(&inner.config.path, distance, vehicle_type);

        // Loop back to the path start without a stop/play cycle.
        if state.is_none() && inner.play_repeat {
            inner.tracker.reset();
            inner.tracker.start(now);
            state = locate_along_path(&inner.config.path, 0.0, vehicle_type);
        }

        let Some(state) = state else {
            drop(inner);
            self.stop();
            return;
        };

        self.emit(FlightEvent::VehicleUpdated {
            vehicle_id: self.vehicle_id,
            state: state.clone(),
        });

        let sequence = inner.sequence;
        inner.sequence += 1;
        let record = TrackRecord::from_state(
            &state,
            sequence,
            &inner.config,
            &inner.env,
            self.ctx.system_time(),
        );
        let env = inner.env.clone();
        drop(inner);

        // Fire-and-forget: the next tick never blocks on this send, and a
        // send resolving after stop() only ever emits an ApiError event.
        let transport = Arc::clone(&self.transport);
        let events = self.events.clone();
        let vehicle_id = self.vehicle_id;
        self.ctx.spawn("telemetry-report", async move {
            if let Err(err) = transport.send_track(&env, &[record]).await {
                warn!(vehicle = %vehicle_id, error = %err, "telemetry send failed");
                let _ = events.send(FlightEvent::ApiError {
                    message: err.to_string(),
                });
            }
        });
    }

    /// (Re)starts the periodic tick loop under a fresh epoch.
    ///
    /// The previous loop, if any, notices its stale epoch after its current
    /// sleep and exits.
    fn start_timer(&self, inner: &mut PlayerInner) {
        inner.timer_epoch += 1;
        let epoch = inner.timer_epoch;
        let interval = inner.update_interval;
        let Some(player) = self.weak.upgrade() else {
            return;
        };

        self.ctx.spawn("flight-ticker", async move {
            loop {
                player.ctx.sleep(interval).await;
                if !player.timer_alive(epoch) {
                    break;
                }
                player.tick();
            }
        });
    }

    fn timer_alive(&self, epoch: u64) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.timer_epoch == epoch && inner.mode == PlayMode::Playing
    }

    fn emit(&self, event: FlightEvent) {
        // Send fails only when no subscriber is listening, which is fine.
        let _ = self.events.send(event);
    }
}
