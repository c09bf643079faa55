/// Terminal columns per tile at scale 1.
pub const CELL_W: u16 = 2;
/// Rows reserved for the HUD above the maze and the status line below it.
pub const CHROME_ROWS: u16 = 2;

/// Where and how large the maze is drawn.
///
/// The maze is drawn as a `(2n+1)`-tile square: cells sit on odd tile
/// coordinates and walls on the even ones between them. Each tile covers
/// `scale` rows and `CELL_W * scale` columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    pub scale: u16,
    pub origin_x: u16,
    pub origin_y: u16,
    pub tiles: u16,
    pub fits: bool,
    pub need_w: u16,
    pub need_h: u16,
}

impl Layout {
    pub fn fit(maze_size: usize, term_w: u16, term_h: u16) -> Self {
        let tiles = (maze_size * 2 + 1).min(1023) as u16;
        let need_w = tiles * CELL_W;
        let need_h = tiles + CHROME_ROWS;

        let by_w = term_w / need_w.max(1);
        let by_h = term_h.saturating_sub(CHROME_ROWS) / tiles.max(1);
        let fitted = by_w.min(by_h);
        let fits = fitted >= 1;
        let scale = fitted.max(1);

        let maze_w = tiles * CELL_W * scale;
        let maze_h = tiles * scale;
        let origin_x = term_w.saturating_sub(maze_w) / 2;
        let origin_y = term_h.saturating_sub(maze_h + CHROME_ROWS) / 2 + 1;

        Self {
            scale,
            origin_x,
            origin_y,
            tiles,
            fits,
            need_w,
            need_h,
        }
    }

    /// Width of one tile in terminal columns.
    pub fn tile_w(&self) -> u16 {
        CELL_W * self.scale
    }

    /// Terminal size of the whole maze area.
    pub fn maze_extent(&self) -> (u16, u16) {
        (self.tiles * self.tile_w(), self.tiles * self.scale)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::fit(0, 0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_terminal_does_not_fit() {
        let layout = Layout::fit(10, 30, 10);
        assert!(!layout.fits);
        assert_eq!(layout.scale, 1);
        assert_eq!((layout.need_w, layout.need_h), (42, 23));
    }

    #[test]
    fn exact_terminal_fits_at_scale_one() {
        let layout = Layout::fit(10, 42, 23);
        assert!(layout.fits);
        assert_eq!(layout.scale, 1);
        assert_eq!(layout.origin_x, 0);
        assert_eq!(layout.origin_y, 1);
    }

    #[test]
    fn large_terminal_scales_up_and_centres() {
        let layout = Layout::fit(10, 200, 60);
        assert!(layout.fits);
        // 60 - 2 rows over 21 tiles.
        assert_eq!(layout.scale, 2);
        let (w, h) = layout.maze_extent();
        assert_eq!((w, h), (84, 42));
        assert_eq!(layout.origin_x, (200 - 84) / 2);
        assert_eq!(layout.origin_y, (60 - 44) / 2 + 1);
    }

    #[test]
    fn bigger_mazes_need_more_room() {
        let small = Layout::fit(10, 120, 60);
        let large = Layout::fit(25, 120, 60);
        assert!(large.scale <= small.scale);
        assert_eq!(large.tiles, 51);
    }
}
