use std::collections::VecDeque;

use crate::maze::{Grid, Pos};

/// Shortest walkable route from `start` to `end`, both endpoints included.
///
/// Returns an empty vector when either endpoint is off the grid or `end`
/// cannot be reached.
pub fn shortest_path(grid: &Grid, start: Pos, end: Pos) -> Vec<Pos> {
    if !grid.contains(start) || !grid.contains(end) {
        return Vec::new();
    }

    let size = grid.size();
    let mut seen = vec![vec![false; size]; size];
    let mut parent: Vec<Vec<Option<Pos>>> = vec![vec![None; size]; size];
    let mut q = VecDeque::new();
    seen[start.y][start.x] = true;
    q.push_back(start);

    while let Some(pos) = q.pop_front() {
        if pos == end {
            let mut path = vec![end];
            let mut cur = end;
            while let Some(prev) = parent[cur.y][cur.x] {
                path.push(prev);
                cur = prev;
            }
            path.reverse();
            return path;
        }
        for next in grid.open_neighbors(pos) {
            if seen[next.y][next.x] {
                continue;
            }
            seen[next.y][next.x] = true;
            parent[next.y][next.x] = Some(pos);
            q.push_back(next);
        }
    }

    Vec::new()
}
