use tracing::trace;

use crate::game::formation::Formation;
use crate::game::models::{Bolt, Ship};
use crate::game::projectiles::Bolts;

/// What the collision pass hit this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Hits {
    /// Alien bolts that struck the ship.
    pub ship: usize,
    pub aliens: usize,
}

/// Resolve every live bolt against the ship and the front rank of the
/// formation. Each bolt is consumed by at most one hit; consumed bolts are
/// removed from `bolts`. A ship that is already exploding can still be hit;
/// each hit restarts its explosion.
pub fn resolve(bolts: &mut Bolts, mut ship: Option<&mut Ship>, formation: &mut Formation) -> Hits {
    let mut hits = Hits::default();
    bolts.retain(|bolt| {
        if let Some(ship) = ship.as_deref_mut() {
            if ship.collides(bolt) {
                ship.explode();
                hits.ship += 1;
                return false;
            }
        }
        if let Some((row, col)) = front_rank_hit(formation, bolt) {
            formation.destroy(row, col);
            hits.aliens += 1;
            trace!(row, col, "alien destroyed");
            return false;
        }
        true
    });
    hits
}

/// First column whose lowest live alien is struck by `bolt`. Aliens behind
/// the front rank are shielded.
fn front_rank_hit(formation: &Formation, bolt: &Bolt) -> Option<(usize, usize)> {
    (0..formation.columns()).find_map(|col| {
        let row = formation.bottom_alien(col)?;
        let alien = formation.get(row, col)?;
        alien.collides(bolt).then_some((row, col))
    })
}
