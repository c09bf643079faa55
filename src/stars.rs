use rand::seq::SliceRandom;
use rand::Rng;

use crate::maze::Pos;

pub const TOTAL_STARS: usize = 3;

/// Picks up to `TOTAL_STARS` distinct cells from the interior of `path`.
///
/// The interior is shuffled with `SliceRandom::shuffle`, a Fisher-Yates pass
/// from the last index down. Paths of two cells or fewer have no interior
/// and yield no stars.
pub fn place_stars(rng: &mut impl Rng, path: &[Pos]) -> Vec<Pos> {
    if path.len() <= 2 {
        return Vec::new();
    }

    let mut interior = path[1..path.len() - 1].to_vec();
    interior.shuffle(rng);
    interior.truncate(TOTAL_STARS.min(interior.len()));
    interior
}
