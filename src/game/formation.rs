use rand::seq::SliceRandom;
use rand::Rng;
use tracing::trace;

use crate::config::Config;
use crate::game::models::{Alien, AlienKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum March {
    Left,
    Right,
}

impl March {
    fn flip(self) -> Self {
        match self {
            March::Left => March::Right,
            March::Right => March::Left,
        }
    }

    fn sign(self) -> f32 {
        match self {
            March::Left => -1.0,
            March::Right => 1.0,
        }
    }
}

/// What the formation did on a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Walk,
    Descend,
}

/// Rectangular grid of alien slots marching as one rigid body.
///
/// Row 0 is the visual top. The grid shape never changes; destroyed aliens
/// leave an empty slot behind. Kills always take the lowest alien of a
/// column, so the live aliens of every column form an unbroken run starting
/// at row 0.
#[derive(Clone, Debug)]
pub struct Formation {
    cells: Vec<Vec<Option<Alien>>>,
    direction: March,
    descended: bool,
    elapsed: f32,
    steps: u32,
}

impl Formation {
    pub fn new(config: &Config) -> Self {
        let first_y = config.height
            - (config.alien_ceiling
                + (config.alien_rows as f32 - 1.0) * (config.alien_v_sep + config.alien_height)
                + config.alien_height / 2.0);

        let mut cells = Vec::with_capacity(config.alien_rows);
        for built in 0..config.alien_rows {
            let y = first_y + built as f32 * (config.alien_height + config.alien_v_sep);
            let kind = AlienKind::for_row(built);
            let row = (0..config.aliens_in_row)
                .map(|col| {
                    let x = config.alien_width / 2.0
                        + config.alien_h_sep
                        + col as f32 * (config.alien_width + config.alien_h_sep);
                    Some(Alien::new(x, y, kind, config))
                })
                .collect();
            // Rows are generated bottom-up, so each new row becomes the top.
            cells.insert(0, row);
        }

        Self {
            cells,
            direction: March::Right,
            descended: false,
            elapsed: 0.0,
            steps: 0,
        }
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn columns(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    #[cfg(test)]
    pub fn cells(&self) -> &[Vec<Option<Alien>>] {
        &self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Alien> {
        self.cells.get(row)?.get(col)?.as_ref()
    }

    pub fn aliens(&self) -> impl Iterator<Item = &Alien> {
        self.cells.iter().flatten().flatten()
    }

    pub fn alive(&self) -> usize {
        self.aliens().count()
    }

    pub fn is_empty(&self) -> bool {
        self.aliens().next().is_none()
    }

    #[cfg(test)]
    pub fn direction(&self) -> March {
        self.direction
    }

    #[cfg(test)]
    pub fn just_descended(&self) -> bool {
        self.descended
    }

    /// Formation steps taken since the aliens last fired.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn reset_steps(&mut self) {
        self.steps = 0;
    }

    /// Accumulate `dt` and take one step once a full step interval has
    /// passed. At the edge of the arena the step is a descent followed by a
    /// change of direction, never two descents in a row.
    pub fn march(&mut self, dt: f32, config: &Config) -> Option<Step> {
        self.elapsed += dt;
        if self.elapsed < config.alien_speed {
            return None;
        }
        self.elapsed = 0.0;
        self.steps += 1;

        if self.at_edge(config) && !self.descended {
            self.shift(0.0, -config.alien_v_walk);
            self.descended = true;
            self.direction = self.direction.flip();
            trace!(direction = ?self.direction, "formation descended");
            Some(Step::Descend)
        } else {
            self.shift(self.direction.sign() * config.alien_h_walk, 0.0);
            self.descended = false;
            Some(Step::Walk)
        }
    }

    fn at_edge(&self, config: &Config) -> bool {
        let Some(col) = self.extreme_column() else {
            return false;
        };
        let Some(alien) = self.get(0, col) else {
            return false;
        };
        match self.direction {
            March::Right => alien.bounds.right() + config.alien_h_sep >= config.width,
            March::Left => alien.bounds.left() - config.alien_h_sep <= 0.0,
        }
    }

    /// Outermost occupied column in the marching direction. Only the top
    /// row is scanned: a column is empty exactly when its top slot is.
    pub fn extreme_column(&self) -> Option<usize> {
        let top = self.cells.first()?;
        let mut occupied = top.iter().enumerate().filter(|(_, slot)| slot.is_some());
        match self.direction {
            March::Right => occupied.next_back().map(|(col, _)| col),
            March::Left => occupied.next().map(|(col, _)| col),
        }
    }

    fn shift(&mut self, dx: f32, dy: f32) {
        for alien in self.cells.iter_mut().flatten().flatten() {
            alien.bounds.x += dx;
            alien.bounds.y += dy;
        }
    }

    /// Row of the lowest live alien in `col`, scanning down from the top
    /// until the first gap. `None` for an empty column.
    pub fn bottom_alien(&self, col: usize) -> Option<usize> {
        self.cells
            .iter()
            .take_while(|row| row.get(col).is_some_and(Option::is_some))
            .count()
            .checked_sub(1)
    }

    pub fn live_columns(&self) -> Vec<usize> {
        (0..self.columns())
            .filter(|&col| self.get(0, col).is_some())
            .collect()
    }

    /// Uniformly random column that still holds at least one alien.
    pub fn random_live_column<R: Rng>(&self, rng: &mut R) -> Option<usize> {
        self.live_columns().choose(rng).copied()
    }

    /// Empty a slot, returning the alien that occupied it.
    pub fn destroy(&mut self, row: usize, col: usize) -> Option<Alien> {
        self.cells.get_mut(row)?.get_mut(col)?.take()
    }

    /// Whether any live alien's bottom edge has reached `line`.
    pub fn breached(&self, line: f32) -> bool {
        self.aliens().any(|alien| alien.bounds.bottom() <= line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small() -> Config {
        Config {
            alien_rows: 3,
            aliens_in_row: 4,
            ..Config::default()
        }
    }

    /// An arena exactly as wide as the formation, so it starts at both edges.
    fn snug() -> Config {
        let config = small();
        Config {
            width: config.formation_width(),
            ..config
        }
    }

    #[test]
    fn grid_is_rectangular_and_full() {
        let cfg = small();
        let formation = Formation::new(&cfg);
        assert_eq!(formation.rows(), 3);
        assert_eq!(formation.columns(), 4);
        assert!(formation.cells().iter().all(|row| row.len() == 4));
        assert_eq!(formation.alive(), 12);
    }

    #[test]
    fn first_built_row_is_at_the_bottom() {
        let cfg = small();
        let formation = Formation::new(&cfg);
        let top = formation.get(0, 0).unwrap();
        let bottom = formation.get(2, 0).unwrap();
        assert!(top.bounds.y > bottom.bounds.y);
        assert_eq!(bottom.kind, AlienKind::Octopus);
        assert_eq!(top.kind, AlienKind::Crab);

        let expected_top = cfg.height - cfg.alien_ceiling - cfg.alien_height / 2.0;
        assert!((top.bounds.y - expected_top).abs() < 1e-3);
    }

    #[test]
    fn aliens_are_packed_left_to_right() {
        let cfg = small();
        let formation = Formation::new(&cfg);
        let first = formation.get(1, 0).unwrap();
        let second = formation.get(1, 1).unwrap();
        assert_eq!(first.bounds.left(), cfg.alien_h_sep);
        assert_eq!(
            second.bounds.x - first.bounds.x,
            cfg.alien_width + cfg.alien_h_sep
        );
    }

    #[test]
    fn march_waits_for_the_step_interval() {
        let cfg = small();
        let mut formation = Formation::new(&cfg);
        let before = formation.get(0, 0).unwrap().bounds;

        assert_eq!(formation.march(cfg.alien_speed / 2.0, &cfg), None);
        assert_eq!(formation.get(0, 0).unwrap().bounds, before);
        assert_eq!(formation.steps(), 0);

        assert_eq!(formation.march(cfg.alien_speed / 2.0, &cfg), Some(Step::Walk));
        let after = formation.get(0, 0).unwrap().bounds;
        assert_eq!(after.x, before.x + cfg.alien_h_walk);
        assert_eq!(after.y, before.y);
        assert_eq!(formation.steps(), 1);
    }

    #[test]
    fn edge_triggers_one_descent_then_reverses() {
        let cfg = snug();
        let mut formation = Formation::new(&cfg);
        let y = formation.get(0, 0).unwrap().bounds.y;
        let x = formation.get(0, 0).unwrap().bounds.x;

        assert_eq!(formation.march(cfg.alien_speed, &cfg), Some(Step::Descend));
        assert_eq!(formation.direction(), March::Left);
        assert!(formation.just_descended());
        assert_eq!(formation.get(0, 0).unwrap().bounds.y, y - cfg.alien_v_walk);
        assert_eq!(formation.get(0, 0).unwrap().bounds.x, x);

        // Still touching the left edge, but a descent just happened.
        assert_eq!(formation.march(cfg.alien_speed, &cfg), Some(Step::Walk));
        assert_eq!(formation.get(0, 0).unwrap().bounds.x, x - cfg.alien_h_walk);
        assert!(!formation.just_descended());

        assert_eq!(formation.march(cfg.alien_speed, &cfg), Some(Step::Descend));
        assert_eq!(formation.direction(), March::Right);
        assert_eq!(formation.steps(), 3);
    }

    #[test]
    fn marching_right_eventually_descends() {
        let cfg = small();
        let mut formation = Formation::new(&cfg);
        let mut walks = 0;
        loop {
            match formation.march(cfg.alien_speed, &cfg) {
                Some(Step::Walk) => walks += 1,
                Some(Step::Descend) => break,
                None => unreachable!("a full interval always steps"),
            }
            assert!(walks < 1_000);
        }
        let col = formation.columns() - 1;
        let right = formation.get(0, col).unwrap().bounds.right();
        assert!(right + cfg.alien_h_sep >= cfg.width);
        assert!(right - cfg.alien_h_walk + cfg.alien_h_sep < cfg.width);
    }

    #[test]
    fn extreme_column_skips_empty_columns() {
        let cfg = small();
        let mut formation = Formation::new(&cfg);
        assert_eq!(formation.extreme_column(), Some(3));
        for row in 0..3 {
            formation.destroy(row, 3);
        }
        assert_eq!(formation.extreme_column(), Some(2));

        let mut formation = Formation::new(&cfg);
        formation.direction = March::Left;
        for row in 0..3 {
            formation.destroy(row, 0);
        }
        assert_eq!(formation.extreme_column(), Some(1));
    }

    #[test]
    fn bottom_alien_follows_kills() {
        let cfg = small();
        let mut formation = Formation::new(&cfg);
        assert_eq!(formation.bottom_alien(1), Some(2));
        formation.destroy(2, 1);
        assert_eq!(formation.bottom_alien(1), Some(1));
        formation.destroy(1, 1);
        formation.destroy(0, 1);
        assert_eq!(formation.bottom_alien(1), None);
        assert_eq!(formation.bottom_alien(99), None);
        assert_eq!(formation.live_columns(), vec![0, 2, 3]);
    }

    #[test]
    fn random_column_is_always_live() {
        let cfg = small();
        let mut formation = Formation::new(&cfg);
        for row in 0..3 {
            formation.destroy(row, 0);
            formation.destroy(row, 2);
        }
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let col = formation.random_live_column(&mut rng).unwrap();
            assert!(col == 1 || col == 3);
        }
        for row in 0..3 {
            formation.destroy(row, 1);
            formation.destroy(row, 3);
        }
        assert!(formation.is_empty());
        assert_eq!(formation.random_live_column(&mut rng), None);
    }

    #[test]
    fn breach_uses_the_lowest_live_alien() {
        let cfg = small();
        let mut formation = Formation::new(&cfg);
        let lowest = formation.get(2, 0).unwrap().bounds.bottom();
        assert!(!formation.breached(lowest - 1.0));
        assert!(formation.breached(lowest));

        for col in 0..4 {
            formation.destroy(2, col);
        }
        assert!(!formation.breached(lowest));
    }

    #[test]
    fn dead_slots_do_not_move() {
        let cfg = small();
        let mut formation = Formation::new(&cfg);
        formation.destroy(2, 2);
        formation.march(cfg.alien_speed, &cfg);
        assert!(formation.get(2, 2).is_none());
        assert_eq!(formation.rows(), 3);
        assert_eq!(formation.alive(), 11);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Tick(f32),
        Kill(usize),
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0.0f32..0.5).prop_map(Op::Tick),
            1 => (0usize..12).prop_map(Op::Kill),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn descents_alternate_with_walks(ops in proptest::collection::vec(arb_op(), 1..600)) {
            let cfg = Config { alien_speed: 0.1, ..Config::default() };
            let mut formation = Formation::new(&cfg);
            let mut previous = None;
            for op in ops {
                match op {
                    Op::Kill(col) => {
                        if let Some(row) = formation.bottom_alien(col) {
                            formation.destroy(row, col);
                        }
                    }
                    Op::Tick(dt) => {
                        let direction = formation.direction();
                        let Some(step) = formation.march(dt, &cfg) else {
                            continue;
                        };
                        match step {
                            Step::Descend => {
                                prop_assert_ne!(previous, Some(Step::Descend));
                                prop_assert_eq!(formation.direction(), direction.flip());
                                prop_assert!(formation.just_descended());
                            }
                            Step::Walk => {
                                prop_assert_eq!(formation.direction(), direction);
                                prop_assert!(!formation.just_descended());
                            }
                        }
                        previous = Some(step);
                    }
                }
                prop_assert!(formation.cells().iter().all(|row| row.len() == cfg.aliens_in_row));
            }
        }
    }
}
