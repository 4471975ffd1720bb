use std::collections::HashMap;
use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, KeyCode, KeyEvent, KeyEventKind};

use crate::input::{Input, Key};

/// How long a key counts as held after its last press or repeat, on
/// terminals that never report releases.
const HOLD_WINDOW: Duration = Duration::from_millis(150);

pub enum Event {
    Key(KeyEvent),
    Tick,
}

pub struct EventHandler {
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::channel();
        let tick_rate = Duration::from_millis(tick_rate_ms);

        thread::spawn(move || {
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate.saturating_sub(last_tick.elapsed());
                if event::poll(timeout).unwrap_or(false) {
                    if let Ok(crossterm::event::Event::Key(key)) = event::read() {
                        if tx.send(Event::Key(key)).is_err() {
                            return;
                        }
                    }
                }
                if last_tick.elapsed() >= tick_rate {
                    if tx.send(Event::Tick).is_err() {
                        return;
                    }
                    last_tick = Instant::now();
                }
            }
        });

        Self { rx }
    }

    pub fn next(&self) -> io::Result<Event> {
        self.rx
            .recv()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }
}

impl Key {
    fn bound_to(self, code: KeyCode) -> bool {
        match self {
            Key::Left => matches!(code, KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A')),
            Key::Right => matches!(code, KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D')),
            Key::Fire => matches!(code, KeyCode::Up | KeyCode::Char(' ')),
            Key::Start => matches!(code, KeyCode::Char('s') | KeyCode::Char('S')),
        }
    }
}

/// Turns the terminal's key events into held-key state.
///
/// With release reporting a key is held from press to release. Without it,
/// a key is held until [`HOLD_WINDOW`] passes with no press or repeat.
#[derive(Debug, Default)]
pub struct Keyboard {
    held: HashMap<KeyCode, Instant>,
    releases: bool,
}

impl Keyboard {
    pub fn new(releases: bool) -> Self {
        Self {
            held: HashMap::new(),
            releases,
        }
    }

    pub fn apply(&mut self, key: KeyEvent, now: Instant) {
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.held.insert(key.code, now);
            }
            KeyEventKind::Release => {
                self.held.remove(&key.code);
            }
        }
    }

    /// Drop keys that have gone quiet. A no-op when releases are reported.
    pub fn expire(&mut self, now: Instant) {
        if self.releases {
            return;
        }
        self.held
            .retain(|_, seen| now.saturating_duration_since(*seen) < HOLD_WINDOW);
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }
}

impl Input for Keyboard {
    fn is_key_down(&self, key: Key) -> bool {
        self.held.keys().any(|&code| key.bound_to(code))
    }

    fn key_count(&self) -> usize {
        self.held.len()
    }
}
