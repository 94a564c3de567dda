//! Per-vehicle ownership of playback engines.
//!
//! One `FlightPlayer` instance per vehicle id, created when a path is
//! selected for animation and destroyed explicitly when the path is removed
//! or the owning view goes away. Destruction always stops the player first
//! so its timer is released deterministically.

use crate::config::{FlightConfig, TrackingEnv};
use crate::player::FlightPlayer;
use crate::telemetry::TrackTransport;
use skytrace_env::{FlightContext, VehicleId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Registry of playback engines keyed by vehicle id.
pub struct PlayerRegistry<C: FlightContext> {
    ctx: Arc<C>,
    transport: Arc<dyn TrackTransport>,
    players: Mutex<HashMap<VehicleId, Arc<FlightPlayer<C>>>>,
}

impl<C: FlightContext> PlayerRegistry<C> {
    pub fn new(ctx: Arc<C>, transport: Arc<dyn TrackTransport>) -> Self {
        Self {
            ctx,
            transport,
            players: Mutex::new(HashMap::new()),
        }
    }

    /// Creates (or replaces) the player for a vehicle.
    ///
    /// An existing player under the same id is stopped before being
    /// replaced, so no orphaned timer keeps ticking.
    pub fn create(
        &self,
        vehicle_id: VehicleId,
        config: FlightConfig,
        env: TrackingEnv,
    ) -> Arc<FlightPlayer<C>> {
        let player = FlightPlayer::new(
            vehicle_id,
            config,
            env,
            Arc::clone(&self.ctx),
            Arc::clone(&self.transport),
        );

        let mut players = self.players.lock().unwrap();
        if let Some(previous) = players.insert(vehicle_id, Arc::clone(&player)) {
            previous.stop();
        }
        debug!(vehicle = %vehicle_id, "player created");
        player
    }

    pub fn get(&self, vehicle_id: VehicleId) -> Option<Arc<FlightPlayer<C>>> {
        self.players.lock().unwrap().get(&vehicle_id).cloned()
    }

    /// Stops and removes the player for a vehicle.
    ///
    /// Returns whether a player existed.
    pub fn remove(&self, vehicle_id: VehicleId) -> bool {
        let removed = self.players.lock().unwrap().remove(&vehicle_id);
        match removed {
            Some(player) => {
                player.stop();
                debug!(vehicle = %vehicle_id, "player removed");
                true
            }
            None => false,
        }
    }

    /// Stops and removes every player.
    pub fn clear(&self) {
        let players = std::mem::take(&mut *self.players.lock().unwrap());
        for player in players.into_values() {
            player.stop();
        }
    }

    pub fn len(&self) -> usize {
        self.players.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.lock().unwrap().is_empty()
    }
}
