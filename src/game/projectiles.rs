use rand::Rng;
use tracing::trace;

use crate::config::Config;
use crate::game::formation::Formation;
use crate::game::models::{Bolt, Owner, Ship};

/// Every bolt in flight, plus the schedule for the next alien shot.
#[derive(Clone, Debug)]
pub struct Bolts {
    live: Vec<Bolt>,
    /// Formation steps to wait before the aliens fire again.
    fire_after: u32,
}

impl Bolts {
    pub fn new<R: Rng>(rng: &mut R, config: &Config) -> Self {
        Self {
            live: Vec::new(),
            fire_after: rng.gen_range(1..=config.bolt_rate),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bolt> {
        self.live.iter()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn clear(&mut self) {
        self.live.clear();
    }

    #[cfg(test)]
    pub fn fire_after(&self) -> u32 {
        self.fire_after
    }

    pub fn player_bolt_live(&self) -> bool {
        self.live.iter().any(Bolt::is_player)
    }

    /// Fire from the top centre of the ship, unless a player bolt is
    /// already in flight.
    pub fn fire_player(&mut self, ship: &Ship, config: &Config) -> bool {
        if self.player_bolt_live() {
            return false;
        }
        self.live.push(Bolt::new(
            ship.bounds.x,
            ship.bounds.top(),
            config.bolt_speed,
            config,
        ));
        true
    }

    /// Once the formation has taken enough steps, fire from the lowest alien
    /// of a random live column and redraw the schedule. Returns the grid
    /// slot that fired.
    pub fn fire_alien<R: Rng>(
        &mut self,
        formation: &mut Formation,
        rng: &mut R,
        config: &Config,
    ) -> Option<(usize, usize)> {
        if formation.steps() < self.fire_after {
            return None;
        }
        let col = formation.random_live_column(rng)?;
        let row = formation.bottom_alien(col)?;
        let alien = formation.get(row, col)?;
        self.live.push(Bolt::new(
            alien.bounds.x,
            alien.bounds.y,
            -config.bolt_speed,
            config,
        ));

        formation.reset_steps();
        self.fire_after = rng.gen_range(1..=config.bolt_rate);
        trace!(row, col, next = self.fire_after, "aliens fired");
        Some((row, col))
    }

    /// Move every bolt of `owner` one frame, retiring those whose leading
    /// edge would leave the arena.
    pub fn advance(&mut self, owner: Owner, config: &Config) {
        self.live.retain_mut(|bolt| {
            if bolt.owner() != owner {
                return true;
            }
            if bolt.would_leave(config.height) {
                return false;
            }
            bolt.advance();
            true
        });
    }

    /// Keep only the bolts for which `keep` returns true, in order.
    pub(crate) fn retain(&mut self, keep: impl FnMut(&Bolt) -> bool) {
        self.live.retain(keep);
    }

    #[cfg(test)]
    pub(crate) fn push(&mut self, bolt: Bolt) {
        self.live.push(bolt);
    }
}
