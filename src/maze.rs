use rand::Rng;

/// Side length of the maze for a given level.
pub fn size_for_level(level: u32) -> usize {
    match level {
        0..=2 => 10,
        3..=5 => 15,
        6..=8 => 20,
        _ => 25,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Right,
    Down,
    Left,
}

impl Dir {
    /// Neighbour enumeration order used by the generator and the path finder.
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Right, Dir::Down, Dir::Left];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }

    /// Maps a unit vector onto a direction; anything else is rejected.
    pub fn from_delta(dx: isize, dy: isize) -> Option<Dir> {
        match (dx, dy) {
            (0, -1) => Some(Dir::Up),
            (0, 1) => Some(Dir::Down),
            (-1, 0) => Some(Dir::Left),
            (1, 0) => Some(Dir::Right),
            _ => None,
        }
    }
}

/// One maze cell. A `true` flag is a wall on that side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
    pub visited: bool,
}

impl Cell {
    pub const WALLED: Cell = Cell {
        top: true,
        right: true,
        bottom: true,
        left: true,
        visited: false,
    };

    pub fn wall(&self, dir: Dir) -> bool {
        match dir {
            Dir::Up => self.top,
            Dir::Right => self.right,
            Dir::Down => self.bottom,
            Dir::Left => self.left,
        }
    }

    fn clear_wall(&mut self, dir: Dir) {
        match dir {
            Dir::Up => self.top = false,
            Dir::Right => self.right = false,
            Dir::Down => self.bottom = false,
            Dir::Left => self.left = false,
        }
    }
}

/// Square grid of cells, indexed `cells[y][x]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Vec<Cell>>,
}

impl Grid {
    /// A fully walled, unvisited grid.
    pub fn walled(size: usize) -> Self {
        Self {
            size,
            cells: vec![vec![Cell::WALLED; size]; size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, pos: Pos) -> Option<&Cell> {
        self.cells.get(pos.y).and_then(|row| row.get(pos.x))
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.x < self.size && pos.y < self.size
    }

    /// The in-bounds neighbour of `pos` in `dir`, ignoring walls.
    pub fn neighbor(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        let (dx, dy) = dir.delta();
        let nx = pos.x as isize + dx;
        let ny = pos.y as isize + dy;
        if nx < 0 || ny < 0 {
            return None;
        }
        let next = Pos::new(nx as usize, ny as usize);
        self.contains(next).then_some(next)
    }

    /// Whether a single step from `pos` towards `dir` is legal.
    ///
    /// Unknown positions and steps leaving the grid are blocked.
    pub fn can_move(&self, pos: Pos, dir: Dir) -> bool {
        match self.get(pos) {
            Some(cell) => !cell.wall(dir) && self.neighbor(pos, dir).is_some(),
            None => false,
        }
    }

    /// Neighbours reachable from `pos` in one step, in `Dir::ALL` order.
    pub fn open_neighbors(&self, pos: Pos) -> impl Iterator<Item = Pos> + '_ {
        Dir::ALL
            .into_iter()
            .filter(move |dir| self.can_move(pos, *dir))
            .filter_map(move |dir| self.neighbor(pos, dir))
    }

    /// Number of carved openings between adjacent cells.
    pub fn passage_count(&self) -> usize {
        let mut count = 0;
        for y in 0..self.size {
            for x in 0..self.size {
                let pos = Pos::new(x, y);
                if self.can_move(pos, Dir::Right) {
                    count += 1;
                }
                if self.can_move(pos, Dir::Down) {
                    count += 1;
                }
            }
        }
        count
    }

    fn cell_mut(&mut self, pos: Pos) -> &mut Cell {
        &mut self.cells[pos.y][pos.x]
    }

    /// Removes the wall between `pos` and its neighbour on both sides.
    pub(crate) fn carve(&mut self, pos: Pos, dir: Dir) {
        if let Some(next) = self.neighbor(pos, dir) {
            self.cell_mut(pos).clear_wall(dir);
            self.cell_mut(next).clear_wall(dir.opposite());
        }
    }
}

/// Builds a perfect maze with an iterative randomized depth-first backtracker.
pub fn generate(rng: &mut impl Rng, size: usize) -> Grid {
    let mut grid = Grid::walled(size);
    if size == 0 {
        return grid;
    }

    let origin = Pos::new(0, 0);
    grid.cell_mut(origin).visited = true;
    let mut stack = vec![origin];
    let mut options: Vec<Dir> = Vec::with_capacity(4);

    while let Some(&current) = stack.last() {
        options.clear();
        for dir in Dir::ALL {
            if let Some(next) = grid.neighbor(current, dir) {
                if !grid.cells[next.y][next.x].visited {
                    options.push(dir);
                }
            }
        }

        if options.is_empty() {
            stack.pop();
            continue;
        }

        let dir = options[rng.gen_range(0..options.len())];
        let Some(next) = grid.neighbor(current, dir) else {
            continue;
        };
        grid.carve(current, dir);
        grid.cell_mut(next).visited = true;
        stack.push(next);
    }

    for cell in grid.cells.iter_mut().flatten() {
        cell.visited = false;
    }
    grid
}
