use crate::config::Config;

/// Axis-aligned box stored by its centre. y grows upward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn left(&self) -> f32 {
        self.x - self.width / 2.0
    }

    pub fn right(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn top(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.y - self.height / 2.0
    }

    pub fn contains(&self, (px, py): (f32, f32)) -> bool {
        px >= self.left() && px <= self.right() && py >= self.bottom() && py <= self.top()
    }

    pub fn corners(&self) -> [(f32, f32); 4] {
        [
            (self.right(), self.top()),
            (self.left(), self.top()),
            (self.right(), self.bottom()),
            (self.left(), self.bottom()),
        ]
    }

    /// Corner-containment hit test: true when any corner of `self` lies
    /// inside `target`. Not symmetric, and a narrow box passing through a
    /// wider one without a corner inside it does not count.
    pub fn corner_within(&self, target: &Bounds) -> bool {
        self.corners().iter().any(|&corner| target.contains(corner))
    }
}

/// Which side fired a bolt. Derived from the sign of its velocity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Owner {
    Player,
    Alien,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bolt {
    pub bounds: Bounds,
    velocity: f32,
}

impl Bolt {
    pub fn new(x: f32, y: f32, velocity: f32, config: &Config) -> Self {
        Self {
            bounds: Bounds::new(x, y, config.bolt_width, config.bolt_height),
            velocity,
        }
    }

    #[cfg(test)]
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn owner(&self) -> Owner {
        if self.velocity < 0.0 {
            Owner::Alien
        } else {
            Owner::Player
        }
    }

    pub fn is_player(&self) -> bool {
        self.owner() == Owner::Player
    }

    /// Whether the next move carries the leading edge out of an arena of
    /// the given height.
    pub fn would_leave(&self, height: f32) -> bool {
        match self.owner() {
            Owner::Player => self.bounds.top() + self.velocity > height,
            Owner::Alien => self.bounds.bottom() + self.velocity < 0.0,
        }
    }

    pub fn advance(&mut self) {
        self.bounds.y += self.velocity;
    }
}

/// Alien art, cycling every two rows from the bottom of the formation up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlienKind {
    Octopus,
    Crab,
    Squid,
}

impl AlienKind {
    const CYCLE: [AlienKind; 3] = [AlienKind::Octopus, AlienKind::Crab, AlienKind::Squid];

    /// Variant for the `built`-th generated row (0 = bottom row).
    pub fn for_row(built: usize) -> Self {
        Self::CYCLE[(built / 2) % Self::CYCLE.len()]
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Alien {
    pub bounds: Bounds,
    pub kind: AlienKind,
}

impl Alien {
    pub fn new(x: f32, y: f32, kind: AlienKind, config: &Config) -> Self {
        Self {
            bounds: Bounds::new(x, y, config.alien_width, config.alien_height),
            kind,
        }
    }

    /// Only player bolts can hit an alien.
    pub fn collides(&self, bolt: &Bolt) -> bool {
        bolt.is_player() && bolt.bounds.corner_within(&self.bounds)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShipState {
    Alive,
    Exploding { elapsed: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ship {
    pub bounds: Bounds,
    /// Sprite frame; advances through the explosion strip while dying.
    pub frame: u32,
    pub state: ShipState,
}

impl Ship {
    /// A fresh ship centred at the bottom of the arena.
    pub fn new(config: &Config) -> Self {
        Self {
            bounds: Bounds::new(
                config.width / 2.0,
                config.ship_bottom + config.ship_height / 2.0,
                config.ship_width,
                config.ship_height,
            ),
            frame: 0,
            state: ShipState::Alive,
        }
    }

    pub fn is_exploding(&self) -> bool {
        matches!(self.state, ShipState::Exploding { .. })
    }

    /// Move horizontally by `dx`, clamped so the ship stays inside the arena.
    pub fn shift(&mut self, dx: f32, arena_width: f32) {
        let half = self.bounds.width / 2.0;
        self.bounds.x = (self.bounds.x + dx).clamp(half, arena_width - half);
    }

    /// Only alien bolts can hit the ship.
    pub fn collides(&self, bolt: &Bolt) -> bool {
        !bolt.is_player() && bolt.bounds.corner_within(&self.bounds)
    }

    pub fn explode(&mut self) {
        self.state = ShipState::Exploding { elapsed: 0.0 };
        self.frame = 0;
    }

    /// Advance the explosion by `dt`. Returns true once it has run for the
    /// full death duration.
    pub fn advance_explosion(&mut self, dt: f32, config: &Config) -> bool {
        let ShipState::Exploding { elapsed } = &mut self.state else {
            return false;
        };
        *elapsed += dt;
        let progress = *elapsed / config.death_speed;
        self.frame = ((progress * config.death_frames as f32) as u32).min(config.death_frames);
        *elapsed >= config.death_speed
    }
}
