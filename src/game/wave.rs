use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::config::Config;
use crate::game::collision;
use crate::game::formation::Formation;
use crate::game::models::{Owner, Ship};
use crate::game::projectiles::Bolts;
use crate::input::{Input, Key};

/// One playthrough of a formation against a ship and a pool of lives.
///
/// A wave owns at most one ship. When the ship's explosion finishes the
/// ship is released and `exploded` is raised until the session
/// acknowledges it with [`Wave::clear_exploded`] and attaches a new ship.
#[derive(Debug)]
pub struct Wave {
    config: Config,
    ship: Option<Ship>,
    formation: Formation,
    bolts: Bolts,
    lives: u32,
    exploded: bool,
    breached: bool,
    rng: StdRng,
}

impl Wave {
    pub fn new(config: Config, mut rng: StdRng) -> Self {
        let formation = Formation::new(&config);
        let bolts = Bolts::new(&mut rng, &config);
        info!(
            rows = formation.rows(),
            columns = formation.columns(),
            lives = config.ship_lives,
            "new wave"
        );
        Self {
            ship: Some(Ship::new(&config)),
            formation,
            bolts,
            lives: config.ship_lives,
            exploded: false,
            breached: false,
            rng,
            config,
        }
    }

    /// Advance one frame: march, let the aliens fire, move alien bolts,
    /// resolve hits, then either play out the ship's explosion or take the
    /// player's input.
    pub fn update(&mut self, input: &impl Input, dt: f32) {
        self.formation.march(dt, &self.config);
        self.bolts.fire_alien(&mut self.formation, &mut self.rng, &self.config);
        self.bolts.advance(Owner::Alien, &self.config);

        let hits = collision::resolve(&mut self.bolts, self.ship.as_mut(), &mut self.formation);
        for _ in 0..hits.ship {
            self.lives = lose_life(self.lives, self.config.life_modulus);
            debug!(lives = self.lives, "ship hit");
        }
        if hits.aliens > 0 {
            debug!(remaining = self.formation.alive(), "aliens destroyed");
        }

        let explosion = match self.ship.as_mut() {
            Some(ship) if ship.is_exploding() => Some(ship.advance_explosion(dt, &self.config)),
            _ => None,
        };
        match explosion {
            Some(true) => self.retire_ship(),
            Some(false) => {}
            None => self.steer(input),
        }

        let breached = self.formation.breached(self.config.defense_line);
        if breached && !self.breached {
            info!("defense line breached");
        }
        self.breached = breached;
    }

    fn steer(&mut self, input: &impl Input) {
        if let Some(ship) = self.ship.as_mut() {
            if input.is_key_down(Key::Fire) {
                self.bolts.fire_player(ship, &self.config);
            }
            if input.is_key_down(Key::Right) {
                ship.shift(self.config.ship_movement, self.config.width);
            } else if input.is_key_down(Key::Left) {
                ship.shift(-self.config.ship_movement, self.config.width);
            }
        }
        self.bolts.advance(Owner::Player, &self.config);
    }

    /// Release the ship once its explosion has finished and clear the field.
    pub fn retire_ship(&mut self) {
        self.ship = None;
        self.bolts.clear();
        self.exploded = true;
        debug!(lives = self.lives, "ship destroyed");
    }

    pub fn attach_ship(&mut self, ship: Ship) {
        debug_assert!(self.ship.is_none(), "wave already has a ship");
        self.ship = Some(ship);
    }

    pub fn ship(&self) -> Option<&Ship> {
        self.ship.as_ref()
    }

    pub fn formation(&self) -> &Formation {
        &self.formation
    }

    pub fn bolts(&self) -> &Bolts {
        &self.bolts
    }

    #[cfg(test)]
    pub(crate) fn bolts_mut(&mut self) -> &mut Bolts {
        &mut self.bolts
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn defense_line(&self) -> f32 {
        self.config.defense_line
    }

    /// The ship's explosion has finished and nobody has acknowledged it yet.
    pub fn exploded(&self) -> bool {
        self.exploded
    }

    pub fn clear_exploded(&mut self) {
        self.exploded = false;
    }

    pub fn breached(&self) -> bool {
        self.breached
    }

    pub fn is_cleared(&self) -> bool {
        self.formation.is_empty()
    }
}

/// Lives wrap around `modulus` instead of saturating: with a modulus of 3,
/// 3 → 2 → 1 → 0 → 2. A hit on the last ship while it is still exploding
/// takes lives back to 2. Kept as the game has always behaved until it is
/// confirmed whether the wrap is intended.
fn lose_life(lives: u32, modulus: u32) -> u32 {
    (lives % modulus + modulus - 1) % modulus
}
