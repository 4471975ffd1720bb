use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Static game constants. World coordinates are y-up: `0.0` is the bottom
/// of the arena and `height` the top.
///
/// Every field has a default, so a JSON config only needs the values it
/// overrides.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub width: f32,
    pub height: f32,

    pub ship_width: f32,
    pub ship_height: f32,
    /// Gap between the arena floor and the bottom of the ship
    pub ship_bottom: f32,
    /// Horizontal distance the ship covers per frame
    pub ship_movement: f32,
    pub ship_lives: u32,
    /// Lives wrap modulo this value on every hit
    pub life_modulus: u32,

    /// y-coordinate of the defense line
    pub defense_line: f32,

    pub alien_width: f32,
    pub alien_height: f32,
    pub alien_h_sep: f32,
    pub alien_v_sep: f32,
    /// Gap between the arena top and the top row of aliens
    pub alien_ceiling: f32,
    pub alien_rows: usize,
    pub aliens_in_row: usize,
    pub alien_h_walk: f32,
    pub alien_v_walk: f32,
    /// Seconds between two formation steps
    pub alien_speed: f32,

    pub bolt_width: f32,
    pub bolt_height: f32,
    /// Vertical distance a bolt covers per frame
    pub bolt_speed: f32,
    /// Aliens fire after a random number of steps in `1..=bolt_rate`
    pub bolt_rate: u32,

    /// Seconds the ship explosion lasts
    pub death_speed: f32,
    pub death_frames: u32,

    /// Fixed RNG seed for reproducible sessions
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 700.0,
            ship_width: 44.0,
            ship_height: 44.0,
            ship_bottom: 32.0,
            ship_movement: 5.0,
            ship_lives: 3,
            life_modulus: 3,
            defense_line: 100.0,
            alien_width: 33.0,
            alien_height: 33.0,
            alien_h_sep: 16.0,
            alien_v_sep: 16.0,
            alien_ceiling: 100.0,
            alien_rows: 5,
            aliens_in_row: 12,
            alien_h_walk: 33.0 / 4.0,
            alien_v_walk: 33.0 / 2.0,
            alien_speed: 1.0,
            bolt_width: 4.0,
            bolt_height: 16.0,
            bolt_speed: 10.0,
            bolt_rate: 5,
            death_speed: 0.3,
            death_frames: 7,
            seed: None,
        }
    }
}

impl Config {
    /// Load a JSON config from `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let sizes = [
            ("width", self.width),
            ("height", self.height),
            ("ship_width", self.ship_width),
            ("ship_height", self.ship_height),
            ("alien_width", self.alien_width),
            ("alien_height", self.alien_height),
            ("bolt_width", self.bolt_width),
            ("bolt_height", self.bolt_height),
            ("bolt_speed", self.bolt_speed),
            ("alien_speed", self.alien_speed),
            ("death_speed", self.death_speed),
        ];
        for (name, value) in sizes {
            if !(value > 0.0) {
                bail!("{name} must be positive, got {value}");
            }
        }
        if self.alien_rows == 0 || self.aliens_in_row == 0 {
            bail!(
                "formation must have at least one alien, got {}x{}",
                self.alien_rows,
                self.aliens_in_row
            );
        }
        if self.bolt_rate == 0 {
            bail!("bolt_rate must be at least 1");
        }
        if self.life_modulus == 0 {
            bail!("life_modulus must be at least 1");
        }
        if self.ship_width > self.width {
            bail!(
                "ship is {} wide but the arena is only {}",
                self.ship_width,
                self.width
            );
        }
        if self.ship_lives == 0 || self.ship_lives > self.life_modulus {
            bail!(
                "ship_lives must be between 1 and life_modulus ({}), got {}",
                self.life_modulus,
                self.ship_lives
            );
        }
        if self.death_frames == 0 {
            bail!("death_frames must be at least 1");
        }
        if self.defense_line < 0.0 || self.defense_line > self.height {
            bail!(
                "defense_line {} lies outside the arena (0..={})",
                self.defense_line,
                self.height
            );
        }
        let span = self.formation_width();
        if span > self.width {
            bail!("formation is {span} wide but the arena is only {}", self.width);
        }
        Ok(())
    }

    /// Width of a full row of aliens including the outer separation.
    pub fn formation_width(&self) -> f32 {
        let n = self.aliens_in_row as f32;
        n * self.alien_width + (n + 1.0) * self.alien_h_sep
    }
}
