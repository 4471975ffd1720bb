use std::collections::HashMap;

use ratatui::prelude::*;

use crate::config::Config;
use crate::game::models::{AlienKind, Bolt, Ship};
use crate::game::session::Session;

const BG: Color = Color::Rgb(0, 0, 5);

type Cell = (char, Style);

/// Braille dot layer over a `w`×`h` character grid: 2×4 dots per cell.
struct Dots {
    map: HashMap<(usize, usize), u8>,
    bw: i32,
    bh: i32,
}

impl Dots {
    fn new(w: usize, h: usize) -> Self {
        Self {
            map: HashMap::new(),
            bw: (w * 2) as i32,
            bh: (h * 4) as i32,
        }
    }

    fn set(&mut self, bx: i32, by: i32) {
        if bx < 0 || by < 0 || bx >= self.bw || by >= self.bh {
            return;
        }
        let cell = (bx as usize / 2, by as usize / 4);
        *self.map.entry(cell).or_insert(0) |= braille_bit(bx as usize % 2, by as usize % 4);
    }

    fn sprite(&mut self, cx: i32, cy: i32, pixels: &[(i32, i32)]) {
        for &(dx, dy) in pixels {
            self.set(cx + dx, cy + dy);
        }
    }

    fn write(self, grid: &mut [Vec<Cell>], color: Color, bold: bool) {
        let mut style = Style::default().fg(color).bg(BG);
        if bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        for ((cx, cy), bits) in self.map {
            if bits == 0 {
                continue;
            }
            if let Some(cell) = grid.get_mut(cy).and_then(|row| row.get_mut(cx)) {
                let ch = char::from_u32(0x2800 + bits as u32).unwrap_or(' ');
                *cell = (ch, style);
            }
        }
    }
}

fn braille_bit(sub_x: usize, sub_y: usize) -> u8 {
    match (sub_x, sub_y) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0,
    }
}

/// World units to dot coordinates. The world's y axis points up, the
/// terminal's points down.
#[derive(Clone, Copy)]
struct Scale {
    sx: f32,
    sy: f32,
    world_height: f32,
}

impl Scale {
    fn new(config: &Config, w: usize, h: usize) -> Self {
        Self {
            sx: (w * 2) as f32 / config.width,
            sy: (h * 4) as f32 / config.height,
            world_height: config.height,
        }
    }

    fn dot(&self, x: f32, y: f32) -> (i32, i32) {
        ((x * self.sx) as i32, ((self.world_height - y) * self.sy) as i32)
    }

    fn row(&self, y: f32) -> usize {
        (((self.world_height - y) * self.sy) as usize) / 4
    }
}

fn alien_pixels(kind: AlienKind, frame: bool) -> &'static [(i32, i32)] {
    match (kind, frame) {
        (AlienKind::Squid, true) => &[
            (0, -2),
            (-1, -1), (0, -1), (1, -1),
            (-2, 0), (-1, 0), (0, 0), (1, 0), (2, 0),
            (-2, 1), (0, 1), (2, 1),
            (-1, 2), (1, 2),
        ],
        (AlienKind::Squid, false) => &[
            (0, -2),
            (-1, -1), (0, -1), (1, -1),
            (-2, 0), (-1, 0), (0, 0), (1, 0), (2, 0),
            (-2, 1), (0, 1), (2, 1),
            (-3, 2), (3, 2),
        ],
        (AlienKind::Crab, true) => &[
            (-1, -2), (1, -2),
            (-2, -1), (-1, -1), (0, -1), (1, -1), (2, -1),
            (-3, 0), (-2, 0), (-1, 0), (0, 0), (1, 0), (2, 0), (3, 0),
            (-3, 1), (-1, 1), (0, 1), (1, 1), (3, 1),
            (-3, 2), (-2, 2), (2, 2), (3, 2),
        ],
        (AlienKind::Crab, false) => &[
            (-1, -2), (1, -2),
            (-2, -1), (-1, -1), (0, -1), (1, -1), (2, -1),
            (-3, 0), (-2, 0), (-1, 0), (0, 0), (1, 0), (2, 0), (3, 0),
            (-3, 1), (-1, 1), (0, 1), (1, 1), (3, 1),
            (-2, 2), (-1, 2), (1, 2), (2, 2),
        ],
        (AlienKind::Octopus, true) => &[
            (-2, -2), (-1, -2), (0, -2), (1, -2), (2, -2),
            (-3, -1), (-2, -1), (-1, -1), (0, -1), (1, -1), (2, -1), (3, -1),
            (-3, 0), (-2, 0), (0, 0), (2, 0), (3, 0),
            (-3, 1), (-1, 1), (0, 1), (1, 1), (3, 1),
            (-2, 2), (2, 2),
        ],
        (AlienKind::Octopus, false) => &[
            (-2, -2), (-1, -2), (0, -2), (1, -2), (2, -2),
            (-3, -1), (-2, -1), (-1, -1), (0, -1), (1, -1), (2, -1), (3, -1),
            (-3, 0), (-2, 0), (0, 0), (2, 0), (3, 0),
            (-3, 1), (-1, 1), (0, 1), (1, 1), (3, 1),
            (-3, 2), (3, 2),
        ],
    }
}

fn alien_color(kind: AlienKind) -> Color {
    match kind {
        AlienKind::Squid => Color::Rgb(255, 80, 80),
        AlienKind::Crab => Color::Rgb(80, 255, 150),
        AlienKind::Octopus => Color::Rgb(200, 180, 255),
    }
}

const SHIP: &[(i32, i32)] = &[
    (0, -3),
    (-1, -2), (0, -2), (1, -2),
    (-1, -1), (0, -1), (1, -1),
    (-3, 0), (-2, 0), (-1, 0), (0, 0), (1, 0), (2, 0), (3, 0),
    (-4, 1), (-3, 1), (-2, 1), (-1, 1), (0, 1), (1, 1), (2, 1), (3, 1), (4, 1),
    (-4, 2), (-3, 2), (-2, 2), (-1, 2), (0, 2), (1, 2), (2, 2), (3, 2), (4, 2),
];

/// Hull pixels scattered outward and thinned as the death sequence plays.
fn explosion_pixels(frame: u32, frames: u32) -> Vec<(i32, i32)> {
    let frames = frames.max(1) as i32;
    let frame = (frame as i32).min(frames);
    let spread = frame / 2;
    SHIP.iter()
        .filter(|&&(dx, dy)| (dx * 7 + dy * 3).rem_euclid(frames + 1) >= frame)
        .map(|&(dx, dy)| (dx + dx.signum() * spread, dy + dy.signum() * spread))
        .collect()
}

fn draw_ship(grid: &mut [Vec<Cell>], ship: &Ship, config: &Config, scale: Scale, w: usize, h: usize) {
    let mut dots = Dots::new(w, h);
    let (cx, cy) = scale.dot(ship.bounds.x, ship.bounds.y);
    if ship.is_exploding() {
        dots.sprite(cx, cy, &explosion_pixels(ship.frame, config.death_frames));
        dots.write(grid, Color::Rgb(255, 180, 60), true);
    } else {
        dots.sprite(cx, cy, SHIP);
        dots.write(grid, Color::Rgb(80, 255, 80), true);
    }
}

fn draw_bolt(dots: &mut Dots, bolt: &Bolt, scale: Scale, zig: bool) {
    let (bx, top) = scale.dot(bolt.bounds.x, bolt.bounds.top());
    let (_, bottom) = scale.dot(bolt.bounds.x, bolt.bounds.bottom());
    let len = (bottom - top).max(1);
    for dy in 0..len {
        let dx = match (bolt.is_player(), dy % 4) {
            (true, _) | (false, 0) | (false, 2) => 0,
            (false, 1) => {
                if zig {
                    1
                } else {
                    -1
                }
            }
            (false, _) => {
                if zig {
                    -1
                } else {
                    1
                }
            }
        };
        dots.set(bx + dx, top + dy);
    }
}

pub fn render_field(session: &Session, config: &Config, width: usize, height: usize) -> Vec<Line<'static>> {
    let (w, h) = (width, height);
    let scale = Scale::new(config, w, h);

    let mut grid: Vec<Vec<Cell>> = vec![vec![(' ', Style::default().bg(BG)); w]; h];

    if let Some(wave) = session.wave() {
        // Defense line
        let line_y = scale.row(wave.defense_line());
        if let Some(row) = grid.get_mut(line_y) {
            for cell in row.iter_mut() {
                *cell = ('\u{2504}', Style::default().fg(Color::Rgb(40, 80, 40)).bg(BG));
            }
        }

        let anim_frame = wave.formation().steps() % 2 == 0;
        for alien in wave.formation().aliens() {
            let mut dots = Dots::new(w, h);
            let (cx, cy) = scale.dot(alien.bounds.x, alien.bounds.y);
            dots.sprite(cx, cy, alien_pixels(alien.kind, anim_frame));
            dots.write(&mut grid, alien_color(alien.kind), false);
        }

        let zig = wave.formation().steps() % 2 == 1;
        let mut player = Dots::new(w, h);
        let mut alien = Dots::new(w, h);
        for bolt in wave.bolts().iter() {
            let dots = if bolt.is_player() { &mut player } else { &mut alien };
            draw_bolt(dots, bolt, scale, zig);
        }
        player.write(&mut grid, Color::Rgb(255, 255, 200), true);
        alien.write(&mut grid, Color::Rgb(255, 100, 100), true);

        if let Some(ship) = wave.ship() {
            draw_ship(&mut grid, ship, config, scale, w, h);
        }
    }

    grid.into_iter()
        .map(|row| {
            let spans: Vec<Span<'static>> = row
                .into_iter()
                .map(|(ch, style)| Span::styled(String::from(ch), style))
                .collect();
            Line::from(spans)
        })
        .collect()
}
