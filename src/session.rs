//! Level lifecycle, progress tracking and the per-frame tick.

use std::time::Duration;

use log::{debug, info};
use rand::Rng;

use crate::feedback::AudioFeedback;
use crate::layout::Layout;
use crate::maze::{generate, size_for_level, Dir, Grid, Pos};
use crate::motion::{
    Motion, MotionEvent, MovePolicy, RenderPos, DEFAULT_ANIMATION_SPEED, SNAP_EPSILON,
};
use crate::path::shortest_path;
use crate::stars::place_stars;

pub const START: Pos = Pos::new(0, 0);
pub const DEFAULT_WIN_DELAY: Duration = Duration::from_millis(1500);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionConfig {
    pub animation_speed: f32,
    pub snap_epsilon: f32,
    pub policy: MovePolicy,
    pub win_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            animation_speed: DEFAULT_ANIMATION_SPEED,
            snap_epsilon: SNAP_EPSILON,
            policy: MovePolicy::Held,
            win_delay: DEFAULT_WIN_DELAY,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Start,
    Playing,
    Won,
}

/// Per-level counters plus the run-wide star tally.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    pub stars_collected: usize,
    pub stars_placed: usize,
    pub moves: u32,
    pub run_stars: usize,
    pub levels_cleared: u32,
}

impl Progress {
    fn reset_level(&mut self, stars_placed: usize) {
        self.stars_collected = 0;
        self.stars_placed = stars_placed;
        self.moves = 0;
    }
}

/// Read-only view handed to the renderer once per frame.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    pub grid: &'a Grid,
    pub player: RenderPos,
    pub player_cell: Pos,
    pub exit: Pos,
    pub stars: &'a [Pos],
    pub progress: Progress,
    pub level: u32,
    pub state: GameState,
    pub frame: u64,
    pub layout: Layout,
}

pub struct LevelSession<R: Rng, A: AudioFeedback> {
    rng: R,
    audio: A,
    config: SessionConfig,
    level: u32,
    state: GameState,
    grid: Grid,
    exit: Pos,
    stars: Vec<Pos>,
    solution: Vec<Pos>,
    motion: Motion,
    /// Direction the player is physically holding, tracked in every state.
    held: Option<Dir>,
    progress: Progress,
    frame: u64,
    clock: Duration,
    pending_advance: Option<Duration>,
    viewport: (u16, u16),
    layout: Layout,
}

impl<R: Rng, A: AudioFeedback> LevelSession<R, A> {
    /// Builds geometry for `level` and waits in `Start`.
    pub fn new(rng: R, audio: A, config: SessionConfig, level: u32) -> Self {
        let mut session = Self {
            rng,
            audio,
            config,
            level: level.max(1),
            state: GameState::Start,
            grid: Grid::walled(0),
            exit: START,
            stars: Vec::new(),
            solution: Vec::new(),
            motion: Motion::new(config.policy, config.animation_speed, config.snap_epsilon, START),
            held: None,
            progress: Progress::default(),
            frame: 0,
            clock: Duration::ZERO,
            pending_advance: None,
            viewport: (0, 0),
            layout: Layout::default(),
        };
        session.setup(session.level);
        session
    }

    /// Replaces all level state with a fresh level `level` and starts play.
    pub fn start_level(&mut self, level: u32) {
        self.setup(level.max(1));
        self.state = GameState::Playing;
        info!(
            "level {} started: {}x{} maze, exit {:?}, {} stars",
            self.level,
            self.grid.size(),
            self.grid.size(),
            self.exit,
            self.stars.len()
        );
    }

    /// Leaves the start screen.
    pub fn begin(&mut self) {
        if self.state == GameState::Start {
            self.start_level(self.level);
        }
    }

    /// New geometry for the current level.
    pub fn restart(&mut self) {
        if self.state != GameState::Start {
            self.start_level(self.level);
        }
    }

    fn setup(&mut self, level: u32) {
        self.level = level;
        let size = size_for_level(level);
        self.grid = generate(&mut self.rng, size);
        self.exit = Pos::new(size - 1, self.rng.gen_range(0..size));
        self.solution = shortest_path(&self.grid, START, self.exit);
        self.stars = place_stars(&mut self.rng, &self.solution);
        self.motion.reset(START);
        if self.config.policy == MovePolicy::Held {
            self.motion.set_desired(self.held);
        }
        self.progress.reset_level(self.stars.len());
        self.pending_advance = None;
        self.relayout();
    }

    pub fn key_down(&mut self, dir: Dir) {
        if self.config.policy == MovePolicy::Held {
            self.held = Some(dir);
        }
        if self.state != GameState::Playing {
            return;
        }
        if let Some(event) = self.motion.key_down(&self.grid, dir) {
            self.on_motion(event);
        }
    }

    pub fn key_up(&mut self, dir: Dir) {
        if self.held == Some(dir) {
            self.held = None;
        }
        if self.state != GameState::Playing {
            return;
        }
        self.motion.key_up(dir);
    }

    /// Held-direction intent as a unit vector; anything else releases it.
    pub fn set_desired_direction(&mut self, dx: isize, dy: isize) {
        let dir = Dir::from_delta(dx, dy);
        if self.config.policy == MovePolicy::Held {
            self.held = dir;
        }
        if self.state != GameState::Playing {
            return;
        }
        self.motion.set_desired(dir);
    }

    /// One immediate step as a unit vector, whatever the configured policy.
    pub fn press_step(&mut self, dx: isize, dy: isize) {
        if self.state != GameState::Playing {
            return;
        }
        let Some(dir) = Dir::from_delta(dx, dy) else {
            return;
        };
        if let Some(event) = self.motion.press_step(&self.grid, dir) {
            self.on_motion(event);
        }
    }

    pub fn on_resize(&mut self, width: u16, height: u16) {
        self.viewport = (width, height);
        self.relayout();
        debug!(
            "resized to {}x{}: scale {}, fits {}",
            width, height, self.layout.scale, self.layout.fits
        );
    }

    fn relayout(&mut self) {
        let (w, h) = self.viewport;
        self.layout = Layout::fit(self.grid.size(), w, h);
    }

    /// Advances one frame of `dt` wall time.
    pub fn tick(&mut self, dt: Duration) {
        self.frame = self.frame.wrapping_add(1);
        self.clock += dt;

        if let Some(fires_at) = self.pending_advance {
            if self.clock >= fires_at {
                self.start_level(self.level + 1);
            }
            return;
        }

        if self.state != GameState::Playing {
            return;
        }
        if let Some(event) = self.motion.update(&self.grid) {
            self.on_motion(event);
        }
    }

    fn on_motion(&mut self, event: MotionEvent) {
        match event {
            MotionEvent::Started { .. } => self.audio.on_move(),
            MotionEvent::Arrived(pos) => self.check_progress(pos),
        }
    }

    fn check_progress(&mut self, pos: Pos) {
        self.progress.moves += 1;

        if let Some(idx) = self.stars.iter().position(|s| *s == pos) {
            self.stars.remove(idx);
            self.progress.stars_collected += 1;
            self.progress.run_stars += 1;
            self.audio.on_star();
            debug!(
                "star picked up at {:?} ({}/{})",
                pos, self.progress.stars_collected, self.progress.stars_placed
            );
        }

        if pos == self.exit {
            self.state = GameState::Won;
            self.progress.levels_cleared += 1;
            self.pending_advance = Some(self.clock + self.config.win_delay);
            self.audio.on_win();
            info!(
                "level {} cleared in {} moves with {}/{} stars",
                self.level,
                self.progress.moves,
                self.progress.stars_collected,
                self.progress.stars_placed
            );
        }
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            grid: &self.grid,
            player: self.motion.render(),
            player_cell: self.motion.cell(),
            exit: self.exit,
            stars: &self.stars,
            progress: self.progress,
            level: self.level,
            state: self.state,
            frame: self.frame,
            layout: self.layout,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn exit(&self) -> Pos {
        self.exit
    }

    pub fn stars(&self) -> &[Pos] {
        &self.stars
    }

    /// The start-to-exit route the stars were drawn from.
    pub fn solution(&self) -> &[Pos] {
        &self.solution
    }

    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::frames_per_step;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const FRAME: Duration = Duration::from_millis(16);

    #[derive(Default)]
    struct Recorder {
        moves: u32,
        stars: u32,
        wins: u32,
    }

    impl AudioFeedback for Recorder {
        fn on_move(&mut self) {
            self.moves += 1;
        }

        fn on_star(&mut self) {
            self.stars += 1;
        }

        fn on_win(&mut self) {
            self.wins += 1;
        }
    }

    fn session(seed: u64, policy: MovePolicy) -> LevelSession<StdRng, Recorder> {
        let config = SessionConfig {
            policy,
            ..SessionConfig::default()
        };
        LevelSession::new(StdRng::seed_from_u64(seed), Recorder::default(), config, 1)
    }

    fn dir_between(a: Pos, b: Pos) -> Dir {
        let dx = b.x as isize - a.x as isize;
        let dy = b.y as isize - a.y as isize;
        Dir::from_delta(dx, dy).expect("adjacent cells")
    }

    /// Steps along the solution until the exit is reached.
    fn walk_solution(s: &mut LevelSession<StdRng, Recorder>) {
        let route = s.solution().to_vec();
        let frames = frames_per_step(DEFAULT_ANIMATION_SPEED, SNAP_EPSILON);
        for pair in route.windows(2) {
            s.press_step(
                pair[1].x as isize - pair[0].x as isize,
                pair[1].y as isize - pair[0].y as isize,
            );
            assert_eq!(s.motion().cell(), pair[1]);
            for _ in 0..frames {
                s.tick(FRAME);
            }
            assert!(!s.motion().is_animating());
        }
    }

    #[test]
    fn new_session_waits_on_start() {
        let mut s = session(1, MovePolicy::Edge);
        assert_eq!(s.state(), GameState::Start);
        assert_eq!(s.level(), 1);
        assert_eq!(s.grid().size(), 10);

        s.press_step(1, 0);
        s.key_down(Dir::Down);
        assert_eq!(s.motion().cell(), START);
        assert_eq!(s.audio().moves, 0);

        s.begin();
        assert_eq!(s.state(), GameState::Playing);
    }

    #[test]
    fn level_setup_places_exit_and_stars() {
        let mut s = session(2, MovePolicy::Held);
        for level in [1, 3, 6, 9] {
            s.start_level(level);
            let size = s.grid().size();
            assert_eq!(size, size_for_level(level));
            assert_eq!(s.exit().x, size - 1);
            assert!(s.exit().y < size);
            assert_eq!(s.grid().passage_count(), size * size - 1);
            let interior = &s.solution()[1..s.solution().len() - 1];
            assert!(s.stars().len() <= 3);
            assert!(s.stars().iter().all(|star| interior.contains(star)));
            assert_eq!(s.progress().stars_placed, s.stars().len());
        }
    }

    #[test]
    fn start_level_twice_leaves_no_residue() {
        let mut s = session(3, MovePolicy::Edge);
        s.start_level(1);
        walk_solution(&mut s);
        assert_eq!(s.state(), GameState::Won);

        s.start_level(1);
        s.start_level(1);
        assert_eq!(s.state(), GameState::Playing);
        assert_eq!(s.motion().cell(), START);
        assert_eq!(s.progress().stars_collected, 0);
        assert_eq!(s.progress().moves, 0);
        assert_eq!(s.stars().len(), s.progress().stars_placed);

        // The advance scheduled by the earlier win is gone.
        for _ in 0..500 {
            s.tick(FRAME);
        }
        assert_eq!(s.level(), 1);
    }

    #[test]
    fn reaching_the_exit_collects_stars_and_advances() {
        let mut s = session(4, MovePolicy::Edge);
        s.begin();
        let placed = s.stars().len();
        walk_solution(&mut s);

        assert_eq!(s.state(), GameState::Won);
        assert_eq!(s.progress().stars_collected, placed);
        assert!(s.stars().is_empty());
        assert_eq!(s.audio().stars as usize, placed);
        assert_eq!(s.audio().wins, 1);
        assert_eq!(s.progress().moves as usize, s.solution().len() - 1);

        // Input is frozen while celebrating.
        let at_exit = s.motion().cell();
        s.press_step(-1, 0);
        s.key_down(Dir::Left);
        assert_eq!(s.motion().cell(), at_exit);

        let delay_frames = (DEFAULT_WIN_DELAY.as_millis() / FRAME.as_millis()) as usize;
        for _ in 0..delay_frames - 1 {
            s.tick(FRAME);
        }
        assert_eq!(s.state(), GameState::Won);
        for _ in 0..2 {
            s.tick(FRAME);
        }
        assert_eq!(s.state(), GameState::Playing);
        assert_eq!(s.level(), 2);
        assert_eq!(s.motion().cell(), START);
        assert_eq!(s.progress().run_stars, placed);
        assert_eq!(s.progress().levels_cleared, 1);
    }

    #[test]
    fn held_policy_moves_from_desired_direction() {
        let mut s = session(5, MovePolicy::Held);
        s.begin();
        let first = s.solution()[1];
        let dir = dir_between(START, first);
        let (dx, dy) = dir.delta();
        s.set_desired_direction(dx, dy);
        assert_eq!(s.motion().cell(), START);

        s.tick(FRAME);
        assert_eq!(s.motion().cell(), first);
        assert_eq!(s.audio().moves, 1);

        s.set_desired_direction(0, 0);
        assert_eq!(s.motion().desired(), None);
    }

    #[test]
    fn restart_keeps_level_and_regenerates() {
        let mut s = session(6, MovePolicy::Edge);
        s.restart();
        assert_eq!(s.state(), GameState::Start);
        s.start_level(4);
        s.restart();
        assert_eq!(s.level(), 4);
        assert_eq!(s.state(), GameState::Playing);
        assert_eq!(s.grid().size(), 15);
    }

    #[test]
    fn resize_recomputes_layout_only() {
        let mut s = session(7, MovePolicy::Edge);
        s.begin();
        let grid = s.grid().clone();
        let exit = s.exit();
        let stars = s.stars().to_vec();

        s.on_resize(30, 10);
        assert!(!s.layout().fits);
        s.on_resize(200, 60);
        assert!(s.layout().fits);
        assert_eq!(s.layout().scale, 2);

        assert_eq!(s.grid(), &grid);
        assert_eq!(s.exit(), exit);
        assert_eq!(s.stars(), stars.as_slice());
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut s = session(8, MovePolicy::Held);
        s.begin();
        s.tick(FRAME);
        s.tick(FRAME);
        let snap = s.snapshot();
        assert_eq!(snap.frame, 2);
        assert_eq!(snap.level, 1);
        assert_eq!(snap.state, GameState::Playing);
        assert_eq!(snap.player_cell, START);
        assert_eq!(snap.player, RenderPos::at(START));
        assert_eq!(snap.stars.len(), snap.progress.stars_placed);
        assert_eq!(snap.grid.size(), 10);
    }

    #[test]
    fn key_held_before_play_carries_into_each_level() {
        let mut s = session(9, MovePolicy::Held);
        s.key_down(Dir::Down);
        assert_eq!(s.motion().desired(), None);

        s.begin();
        assert_eq!(s.motion().desired(), Some(Dir::Down));
        s.start_level(2);
        assert_eq!(s.motion().desired(), Some(Dir::Down));

        s.key_up(Dir::Down);
        s.restart();
        assert_eq!(s.motion().desired(), None);
    }

    #[test]
    fn edge_policy_never_carries_keys_over() {
        let mut s = session(10, MovePolicy::Edge);
        s.key_down(Dir::Right);
        s.begin();
        assert_eq!(s.motion().desired(), None);
        assert_eq!(s.motion().cell(), START);
    }
}
