use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::info;

use crate::config::Config;
use crate::event::Keyboard;
use crate::game::session::Session;

pub struct App {
    pub should_quit: bool,
    pub session: Session,
    config: Config,
    keyboard: Keyboard,
    last_frame: Instant,
}

impl App {
    /// `releases` tells whether the terminal reports key releases.
    pub fn new(config: Config, releases: bool) -> Self {
        Self {
            should_quit: false,
            session: Session::new(config.clone()),
            config,
            keyboard: Keyboard::new(releases),
            last_frame: Instant::now(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn on_tick(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.keyboard.expire(now);
        self.session.update(&self.keyboard, dt);
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Release {
            // Ctrl+C always quits
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                self.should_quit = true;
                return;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::Enter if self.session.is_complete() => {
                    info!("starting a new session");
                    self.session = Session::new(self.config.clone());
                    self.keyboard.clear();
                    return;
                }
                _ => {}
            }
        }
        self.keyboard.apply(key, Instant::now());
    }
}
