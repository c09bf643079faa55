use std::io::Write;

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use crate::error::MazeResult;
use crate::layout::{Layout, CELL_W};
use crate::maze::{Dir, Grid, Pos};
use crate::session::{GameState, Snapshot};

/// Frames per twinkle phase of the star glyph.
const TWINKLE_FRAMES: u64 = 20;

/// Paints one frame of game state.
pub trait Renderer {
    fn draw(&mut self, snapshot: &Snapshot<'_>) -> MazeResult<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Glyph {
    Player,
    Celebrating,
    Wall,
    Floor,
    Exit,
    Star,
    StarTwinkle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub glyph: Glyph,
    pub color: Color,
}

const FLOOR: Cell = Cell {
    glyph: Glyph::Floor,
    color: Color::Reset,
};

/// Whether maze tile `(tx, ty)` is solid.
///
/// Cells sit on odd tile coordinates; even coordinates carry the walls
/// between them and the corner posts.
fn tile_is_wall(grid: &Grid, tx: usize, ty: usize) -> bool {
    match (tx % 2, ty % 2) {
        (1, 1) => false,
        (0, 0) => true,
        (0, _) => {
            let y = ty / 2;
            let x = tx / 2;
            if x < grid.size() {
                grid.get(Pos::new(x, y)).map_or(true, |c| c.wall(Dir::Left))
            } else {
                grid.get(Pos::new(x - 1, y)).map_or(true, |c| c.wall(Dir::Right))
            }
        }
        _ => {
            let y = ty / 2;
            let x = tx / 2;
            if y < grid.size() {
                grid.get(Pos::new(x, y)).map_or(true, |c| c.wall(Dir::Up))
            } else {
                grid.get(Pos::new(x, y - 1)).map_or(true, |c| c.wall(Dir::Down))
            }
        }
    }
}

/// Lays the snapshot out as a square of `tiles * scale` units per side.
///
/// One unit is `CELL_W` terminal columns by one row.
pub fn compose(snapshot: &Snapshot<'_>) -> Vec<Cell> {
    let layout = snapshot.layout;
    let scale = layout.scale as usize;
    let tiles = layout.tiles as usize;
    let side = tiles * scale;
    let mut units = vec![FLOOR; side * side];

    for uy in 0..side {
        for ux in 0..side {
            if tile_is_wall(snapshot.grid, ux / scale, uy / scale) {
                units[uy * side + ux] = Cell {
                    glyph: Glyph::Wall,
                    color: Color::Blue,
                };
            }
        }
    }

    let mut fill_cell = |pos: Pos, cell: Cell| {
        let tx = pos.x * 2 + 1;
        let ty = pos.y * 2 + 1;
        for uy in ty * scale..(ty + 1) * scale {
            for ux in tx * scale..(tx + 1) * scale {
                if ux < side && uy < side {
                    units[uy * side + ux] = cell;
                }
            }
        }
    };

    fill_cell(
        snapshot.exit,
        Cell {
            glyph: Glyph::Exit,
            color: Color::Green,
        },
    );
    let twinkle = (snapshot.frame / TWINKLE_FRAMES) % 2 == 1;
    for star in snapshot.stars {
        fill_cell(
            *star,
            Cell {
                glyph: if twinkle { Glyph::StarTwinkle } else { Glyph::Star },
                color: Color::Yellow,
            },
        );
    }

    let player = Cell {
        glyph: if snapshot.state == GameState::Won {
            Glyph::Celebrating
        } else {
            Glyph::Player
        },
        color: Color::Yellow,
    };
    let px = ((snapshot.player.x * 2.0 + 1.0) * scale as f32).round() as usize;
    let py = ((snapshot.player.y * 2.0 + 1.0) * scale as f32).round() as usize;
    for uy in py..py + scale {
        for ux in px..px + scale {
            if ux < side && uy < side {
                units[uy * side + ux] = player;
            }
        }
    }

    units
}

fn hud_line(snapshot: &Snapshot<'_>) -> String {
    let p = snapshot.progress;
    format!(
        "Level: {}  Stars: {}/{}  Moves: {}  Total stars: {}  (q to quit, r to restart)",
        snapshot.level, p.stars_collected, p.stars_placed, p.moves, p.run_stars
    )
}

fn status_line(snapshot: &Snapshot<'_>) -> String {
    match snapshot.state {
        GameState::Start => "Press Enter to start. Move with arrows, WASD or hjkl.".to_string(),
        GameState::Playing => String::new(),
        GameState::Won => format!(
            "Level {} complete! {}/{} stars. Next maze coming up...",
            snapshot.level, snapshot.progress.stars_collected, snapshot.progress.stars_placed
        ),
    }
}

/// Diffing renderer: only units that changed since the last frame are sent.
pub struct TerminalRenderer<W: Write> {
    out: W,
    last: Vec<Cell>,
    last_hud: String,
    last_status: String,
    last_layout: Option<Layout>,
    needs_full: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last: Vec::new(),
            last_hud: String::new(),
            last_status: String::new(),
            last_layout: None,
            needs_full: true,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw_too_small(&mut self, layout: &Layout) -> MazeResult<()> {
        self.out.queue(Clear(ClearType::All))?;
        self.out.queue(MoveTo(0, 0))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows).",
            layout.need_w, layout.need_h
        );
        self.out.queue(Print(msg))?;
        self.out.flush()?;
        self.needs_full = true;
        Ok(())
    }

    fn draw_unit(&mut self, layout: &Layout, ux: usize, uy: usize, cell: Cell) -> MazeResult<()> {
        let text = match cell.glyph {
            Glyph::Player => "😃",
            Glyph::Celebrating => "🎉",
            Glyph::Wall => "██",
            Glyph::Floor => "  ",
            Glyph::Exit => "🚪",
            Glyph::Star => "⭐",
            Glyph::StarTwinkle => "✨",
        };
        let x_pos = layout.origin_x + ux as u16 * CELL_W;
        let y_pos = layout.origin_y + uy as u16;
        self.out.queue(MoveTo(x_pos, y_pos))?;
        self.out.queue(SetForegroundColor(cell.color))?;
        self.out.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        for _ in w..CELL_W as usize {
            self.out.queue(Print(' '))?;
        }
        self.out.queue(ResetColor)?;
        Ok(())
    }

    fn draw_line(&mut self, x: u16, y: u16, text: &str, color: Color) -> MazeResult<()> {
        self.out.queue(MoveTo(x, y))?;
        self.out.queue(Clear(ClearType::CurrentLine))?;
        self.out.queue(SetForegroundColor(color))?;
        self.out.queue(Print(text))?;
        self.out.queue(ResetColor)?;
        Ok(())
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn draw(&mut self, snapshot: &Snapshot<'_>) -> MazeResult<()> {
        let layout = snapshot.layout;
        if !layout.fits {
            return self.draw_too_small(&layout);
        }

        if self.last_layout != Some(layout) {
            self.last_layout = Some(layout);
            self.needs_full = true;
        }
        if self.needs_full {
            self.out.queue(Clear(ClearType::All))?;
        }

        let hud = hud_line(snapshot);
        if self.needs_full || hud != self.last_hud {
            self.draw_line(layout.origin_x, layout.origin_y - 1, &hud, Color::White)?;
            self.last_hud = hud;
        }

        let units = compose(snapshot);
        if self.last.len() != units.len() {
            self.last = vec![FLOOR; units.len()];
            self.needs_full = true;
        }
        let side = layout.tiles as usize * layout.scale as usize;
        for (idx, cell) in units.iter().enumerate() {
            if self.needs_full || *cell != self.last[idx] {
                self.last[idx] = *cell;
                self.draw_unit(&layout, idx % side, idx / side, *cell)?;
            }
        }

        let status = status_line(snapshot);
        if self.needs_full || status != self.last_status {
            let (_, maze_h) = layout.maze_extent();
            self.draw_line(layout.origin_x, layout.origin_y + maze_h, &status, Color::Magenta)?;
            self.last_status = status;
        }

        self.needs_full = false;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::generate;
    use crate::motion::RenderPos;
    use crate::session::Progress;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn snapshot<'a>(grid: &'a Grid, stars: &'a [Pos], layout: Layout) -> Snapshot<'a> {
        Snapshot {
            grid,
            player: RenderPos::at(Pos::new(0, 0)),
            player_cell: Pos::new(0, 0),
            exit: Pos::new(grid.size() - 1, 1),
            stars,
            progress: Progress::default(),
            level: 1,
            state: GameState::Playing,
            frame: 0,
            layout,
        }
    }

    #[test]
    fn compose_marks_walls_from_cell_flags() {
        let grid = generate(&mut StdRng::seed_from_u64(1), 4);
        let layout = Layout::fit(4, 200, 100);
        let snap = snapshot(&grid, &[], Layout { scale: 1, ..layout });
        let units = compose(&snap);
        let side = 9;
        assert_eq!(units.len(), side * side);
        for y in 0..4 {
            for x in 0..4 {
                let right = units[(y * 2 + 1) * side + x * 2 + 2].glyph == Glyph::Wall;
                assert_eq!(right, !grid.can_move(Pos::new(x, y), Dir::Right));
                let below = units[(y * 2 + 2) * side + x * 2 + 1].glyph == Glyph::Wall;
                assert_eq!(below, !grid.can_move(Pos::new(x, y), Dir::Down));
            }
        }
        // Border is closed.
        assert!((0..side).all(|i| units[i].glyph == Glyph::Wall));
        assert!((0..side).all(|i| units[i * side].glyph == Glyph::Wall));
    }

    #[test]
    fn compose_places_tokens() {
        let grid = generate(&mut StdRng::seed_from_u64(2), 4);
        let stars = [Pos::new(1, 1)];
        let layout = Layout::fit(4, 18, 11);
        assert_eq!(layout.scale, 1);
        let snap = snapshot(&grid, &stars, layout);
        let units = compose(&snap);
        let side = 9;
        assert_eq!(units[side + 1].glyph, Glyph::Player);
        assert_eq!(units[3 * side + 3].glyph, Glyph::Star);
        assert_eq!(units[3 * side + 7].glyph, Glyph::Exit);
    }

    #[test]
    fn player_between_cells_sits_on_the_passage() {
        let grid = generate(&mut StdRng::seed_from_u64(3), 4);
        let layout = Layout::fit(4, 18, 11);
        let mut snap = snapshot(&grid, &[], layout);
        snap.player = RenderPos { x: 0.5, y: 0.0 };
        let units = compose(&snap);
        assert_eq!(units[9 + 2].glyph, Glyph::Player);
    }

    #[test]
    fn renderer_only_redraws_changes() {
        let grid = generate(&mut StdRng::seed_from_u64(4), 4);
        let layout = Layout::fit(4, 18, 11);
        let mut renderer = TerminalRenderer::new(Vec::new());
        let snap = snapshot(&grid, &[], layout);
        renderer.draw(&snap).unwrap();
        let first = renderer.out.len();
        renderer.out.clear();
        renderer.draw(&snap).unwrap();
        assert!(renderer.out.len() < first / 4);
    }

    #[test]
    fn renderer_reports_small_terminal() {
        let grid = generate(&mut StdRng::seed_from_u64(5), 10);
        let layout = Layout::fit(10, 20, 10);
        let mut renderer = TerminalRenderer::new(Vec::new());
        renderer.draw(&snapshot(&grid, &[], layout)).unwrap();
        let text = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(text.contains("Terminal too small"));
        assert!(text.contains("42x23"));
    }
}
