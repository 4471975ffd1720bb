use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::config::Config;
use crate::game::models::Ship;
use crate::game::wave::Wave;
use crate::input::{Input, Key};

/// Lifecycle of a session. States advance through [`State::CYCLE`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Waiting for the first key press.
    Inactive,
    /// Builds a wave; lasts a single frame.
    NewWave,
    Active,
    /// The ship was lost; waiting for a key press to continue.
    Paused,
    /// Puts a new ship in the wave; lasts a single frame.
    Continue,
    Complete,
}

impl State {
    pub const CYCLE: [State; 6] = [
        State::Inactive,
        State::NewWave,
        State::Active,
        State::Paused,
        State::Continue,
        State::Complete,
    ];

    pub fn next(self) -> State {
        let index = Self::CYCLE.iter().position(|&s| s == self).unwrap_or(0);
        Self::CYCLE[(index + 1) % Self::CYCLE.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            State::Inactive => "Ready",
            State::NewWave => "New wave",
            State::Active => "Playing",
            State::Paused => "Ship lost",
            State::Continue => "Continue",
            State::Complete => "Game over",
        }
    }
}

/// Message shown over the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overlay {
    PressStart,
    GameOver,
}

impl Overlay {
    pub fn text(self) -> &'static str {
        match self {
            Overlay::PressStart => "Press 'S' to Play",
            Overlay::GameOver => "GAME OVER",
        }
    }
}

/// Top-level controller: owns at most one wave and drives it through the
/// session lifecycle one frame at a time.
#[derive(Debug)]
pub struct Session {
    config: Config,
    state: State,
    wave: Option<Wave>,
    overlay: Option<Overlay>,
    /// Keys held on the previous frame, for press detection.
    last_key_count: usize,
    rng: StdRng,
}

impl Session {
    pub fn new(config: Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            state: State::Inactive,
            wave: None,
            overlay: Some(Overlay::PressStart),
            last_key_count: 0,
            rng,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn wave(&self) -> Option<&Wave> {
        self.wave.as_ref()
    }

    pub fn overlay(&self) -> Option<Overlay> {
        self.overlay
    }

    pub fn lives(&self) -> Option<u32> {
        self.wave.as_ref().map(Wave::lives)
    }

    pub fn is_complete(&self) -> bool {
        self.state == State::Complete
    }

    /// Run one frame. States are handled in cycle order, so a state that
    /// moves forward hands over to its successor within the same frame.
    pub fn update(&mut self, input: &impl Input, dt: f32) {
        let pressed = input.key_count();
        let start = pressed > 0 && self.last_key_count == 0 && input.is_key_down(Key::Start);

        if self.state == State::Inactive && start {
            self.advance();
        }
        if self.state == State::NewWave {
            self.spawn_wave();
            self.advance();
        }
        if self.state == State::Active {
            self.play(input, dt);
        }
        if self.state == State::Paused {
            self.await_continue(start);
        }
        if self.state == State::Continue {
            self.attach_ship();
            self.transition(State::Active);
        }
        if self.state == State::Complete {
            self.overlay = Some(Overlay::GameOver);
        }

        self.last_key_count = pressed;
    }

    fn play(&mut self, input: &impl Input, dt: f32) {
        self.overlay = None;
        let Some(wave) = self.wave.as_mut() else {
            debug_assert!(false, "active session without a wave");
            return;
        };
        wave.update(input, dt);

        if wave.exploded() {
            self.transition(State::Paused);
        } else if wave.is_cleared() || wave.breached() {
            self.transition(State::Complete);
        }
    }

    fn await_continue(&mut self, start: bool) {
        let lives = self.wave.as_ref().map_or(0, Wave::lives);
        if lives == 0 {
            self.transition(State::Complete);
            return;
        }
        self.overlay = Some(Overlay::PressStart);
        if start {
            if let Some(wave) = self.wave.as_mut() {
                wave.clear_exploded();
            }
            self.advance();
        }
    }

    fn spawn_wave(&mut self) {
        let rng = StdRng::seed_from_u64(self.rng.gen());
        self.wave = Some(Wave::new(self.config.clone(), rng));
    }

    fn attach_ship(&mut self) {
        if let Some(wave) = self.wave.as_mut() {
            wave.attach_ship(Ship::new(&self.config));
        }
    }

    /// Step one position along the state cycle.
    fn advance(&mut self) {
        self.transition(self.state.next());
    }

    fn transition(&mut self, next: State) {
        info!(from = ?self.state, to = ?next, "session state");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::game::models::Bolt;
    use crate::input::Held;

    const DT: f32 = 1.0 / 60.0;

    fn quiet() -> Config {
        Config {
            alien_rows: 2,
            aliens_in_row: 2,
            alien_speed: 1_000.0,
            seed: Some(5),
            ..Config::default()
        }
    }

    fn start(session: &mut Session) {
        session.update(&Held::none(), DT);
        session.update(&Held::keys(&[Key::Start]), DT);
    }

    /// Put an alien bolt on the ship and play until the session leaves
    /// `Active`.
    fn lose_ship(session: &mut Session) {
        lose_ship_holding(session, &Held::none());
    }

    fn lose_ship_holding(session: &mut Session, input: &Held) {
        let wave = session.wave.as_mut().unwrap();
        let ship = *wave.ship().unwrap();
        let config = session.config.clone();
        wave.bolts_mut()
            .push(Bolt::new(ship.bounds.x, ship.bounds.top(), -config.bolt_speed, &config));
        let mut frames = 0;
        while session.state() == State::Active {
            session.update(input, DT);
            frames += 1;
            assert!(frames < 100);
        }
    }

    #[test]
    fn cycle_order() {
        assert_eq!(State::Inactive.next(), State::NewWave);
        assert_eq!(State::NewWave.next(), State::Active);
        assert_eq!(State::Paused.next(), State::Continue);
        assert_eq!(State::Complete.next(), State::Inactive);
    }

    #[test]
    fn starts_inactive_without_a_wave() {
        let session = Session::new(quiet());
        assert_eq!(session.state(), State::Inactive);
        assert!(session.wave().is_none());
        assert_eq!(session.overlay(), Some(Overlay::PressStart));
    }

    #[test]
    fn start_key_reaches_active_through_new_wave() {
        let mut session = Session::new(quiet());
        session.update(&Held::none(), DT);
        assert_eq!(session.state(), State::Inactive);

        session.update(&Held::keys(&[Key::Start]), DT);
        assert_eq!(session.state(), State::Active);
        assert!(session.wave().is_some());
        assert_eq!(session.overlay(), None);
        assert_eq!(session.lives(), Some(3));
    }

    #[test]
    fn other_keys_do_not_start() {
        let mut session = Session::new(quiet());
        session.update(&Held::keys(&[Key::Fire]), DT);
        session.update(&Held::unbound(2), DT);
        assert_eq!(session.state(), State::Inactive);
    }

    #[test]
    fn start_needs_a_fresh_press() {
        let mut session = Session::new(quiet());
        // Another key already held: pressing S on top of it is not a fresh
        // press.
        session.update(&Held::keys(&[Key::Fire]), DT);
        session.update(&Held::keys(&[Key::Fire, Key::Start]), DT);
        assert_eq!(session.state(), State::Inactive);

        session.update(&Held::none(), DT);
        session.update(&Held::keys(&[Key::Start]), DT);
        assert_eq!(session.state(), State::Active);
    }

    #[test]
    fn holding_start_does_not_retrigger() {
        let mut session = Session::new(quiet());
        let held = Held::keys(&[Key::Start]);
        session.update(&Held::none(), DT);
        session.update(&held, DT);
        assert_eq!(session.state(), State::Active);

        // S stays down from the start of the game until well after the ship
        // is lost.
        lose_ship_holding(&mut session, &held);
        assert_eq!(session.state(), State::Paused);
        for _ in 0..10 {
            session.update(&held, DT);
        }
        assert_eq!(session.state(), State::Paused);
        assert_eq!(session.overlay(), Some(Overlay::PressStart));

        session.update(&Held::none(), DT);
        session.update(&held, DT);
        assert_eq!(session.state(), State::Active);
    }

    #[test]
    fn lost_ship_pauses_then_continues() {
        let mut session = Session::new(quiet());
        start(&mut session);
        lose_ship(&mut session);

        assert_eq!(session.state(), State::Paused);
        assert_eq!(session.lives(), Some(2));
        assert!(session.wave().unwrap().ship().is_none());

        session.update(&Held::none(), DT);
        session.update(&Held::keys(&[Key::Start]), DT);
        assert_eq!(session.state(), State::Active);
        let wave = session.wave().unwrap();
        assert!(!wave.exploded());
        assert!(wave.ship().is_some());
        assert_eq!(session.lives(), Some(2));
    }

    #[test]
    fn three_hits_end_the_session() {
        let mut session = Session::new(quiet());
        start(&mut session);

        for expected in [2, 1] {
            lose_ship(&mut session);
            assert_eq!(session.state(), State::Paused);
            assert_eq!(session.lives(), Some(expected));
            session.update(&Held::none(), DT);
            session.update(&Held::keys(&[Key::Start]), DT);
            assert_eq!(session.state(), State::Active);
        }

        lose_ship(&mut session);
        assert_eq!(session.lives(), Some(0));
        assert_eq!(session.state(), State::Complete);
        assert_eq!(session.overlay(), Some(Overlay::GameOver));

        // Complete is terminal.
        for _ in 0..5 {
            session.update(&Held::keys(&[Key::Start]), DT);
            session.update(&Held::none(), DT);
        }
        assert_eq!(session.state(), State::Complete);
    }

    #[test]
    fn breach_completes_the_session() {
        let config = Config {
            defense_line: 600.0,
            ..quiet()
        };
        let mut session = Session::new(config);
        start(&mut session);
        assert_eq!(session.state(), State::Complete);
        assert!(session.wave().unwrap().breached());
        assert_eq!(session.overlay(), Some(Overlay::GameOver));
    }

    #[test]
    fn clearing_the_formation_completes_the_session() {
        let config = Config {
            alien_rows: 1,
            aliens_in_row: 1,
            ..quiet()
        };
        let mut session = Session::new(config);
        start(&mut session);

        let fire = Held::keys(&[Key::Fire]);
        let mut frames = 0;
        while session.state() == State::Active {
            // Walk the ship under the lone alien, firing all the way.
            let wave = session.wave().unwrap();
            let alien_x = wave.formation().aliens().next().unwrap().bounds.x;
            let ship_x = wave.ship().unwrap().bounds.x;
            let steer = if ship_x > alien_x + 2.0 {
                Held::keys(&[Key::Fire, Key::Left])
            } else {
                fire.clone()
            };
            session.update(&steer, DT);
            frames += 1;
            assert!(frames < 1_000);
        }
        assert_eq!(session.state(), State::Complete);
        assert!(session.wave().unwrap().is_cleared());
    }

    #[test]
    fn seeded_sessions_are_reproducible() {
        let config = Config {
            alien_speed: 0.05,
            ..quiet()
        };
        let mut a = Session::new(config.clone());
        let mut b = Session::new(config);
        start(&mut a);
        start(&mut b);
        for _ in 0..300 {
            a.update(&Held::none(), DT);
            b.update(&Held::none(), DT);
        }
        let xs = |s: &Session| -> Vec<(f32, f32)> {
            s.wave()
                .unwrap()
                .bolts()
                .iter()
                .map(|bolt| (bolt.bounds.x, bolt.bounds.y))
                .collect()
        };
        assert_eq!(xs(&a), xs(&b));
        assert_eq!(a.state(), b.state());
    }
}
