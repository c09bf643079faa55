//! Grid movement with continuous animation.
//!
//! The logical cell changes the moment a step is taken; the render position
//! then decays towards it a fixed fraction per frame. No new step starts
//! until the render position has snapped onto the logical cell.

use log::trace;

use crate::maze::{Dir, Grid, Pos};

pub const DEFAULT_ANIMATION_SPEED: f32 = 0.2;
pub const SNAP_EPSILON: f32 = 0.01;

/// How key presses become grid steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MovePolicy {
    /// A held direction keeps the token moving; reversal is instant.
    #[default]
    Held,
    /// Each press attempts exactly one step, ignored while animating.
    Edge,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderPos {
    pub x: f32,
    pub y: f32,
}

impl RenderPos {
    pub fn at(pos: Pos) -> Self {
        Self {
            x: pos.x as f32,
            y: pos.y as f32,
        }
    }

    pub fn distance_to(self, pos: Pos) -> f32 {
        let dx = pos.x as f32 - self.x;
        let dy = pos.y as f32 - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionEvent {
    Started { from: Pos, to: Pos, dir: Dir },
    Arrived(Pos),
}

#[derive(Clone, Debug)]
pub struct Motion {
    policy: MovePolicy,
    speed: f32,
    epsilon: f32,
    cell: Pos,
    render: RenderPos,
    animating: bool,
    desired: Option<Dir>,
    current: Option<Dir>,
}

impl Motion {
    pub fn new(policy: MovePolicy, speed: f32, epsilon: f32, start: Pos) -> Self {
        Self {
            policy,
            speed: speed.clamp(f32::EPSILON, 1.0),
            epsilon,
            cell: start,
            render: RenderPos::at(start),
            animating: false,
            desired: None,
            current: None,
        }
    }

    pub fn policy(&self) -> MovePolicy {
        self.policy
    }

    pub fn cell(&self) -> Pos {
        self.cell
    }

    pub fn render(&self) -> RenderPos {
        self.render
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn desired(&self) -> Option<Dir> {
        self.desired
    }

    pub fn current(&self) -> Option<Dir> {
        self.current
    }

    /// Puts the token idle on `start` and forgets any pending intent.
    pub fn reset(&mut self, start: Pos) {
        self.cell = start;
        self.render = RenderPos::at(start);
        self.animating = false;
        self.desired = None;
        self.current = None;
    }

    /// Key press. Under `Edge` this may start a step immediately.
    pub fn key_down(&mut self, grid: &Grid, dir: Dir) -> Option<MotionEvent> {
        match self.policy {
            MovePolicy::Held => {
                self.desired = Some(dir);
                None
            }
            MovePolicy::Edge => self.press_step(grid, dir),
        }
    }

    pub fn key_up(&mut self, dir: Dir) {
        if self.policy == MovePolicy::Held && self.desired == Some(dir) {
            self.desired = None;
        }
    }

    /// Replaces the held direction outright; `None` releases it.
    pub fn set_desired(&mut self, dir: Option<Dir>) {
        self.desired = dir;
    }

    /// Attempts one step right now; a no-op while a step is in flight.
    pub fn press_step(&mut self, grid: &Grid, dir: Dir) -> Option<MotionEvent> {
        if self.animating || !grid.can_move(self.cell, dir) {
            return None;
        }
        self.step(grid, dir)
    }

    /// Advances one frame.
    pub fn update(&mut self, grid: &Grid) -> Option<MotionEvent> {
        if self.animating {
            return self.animate();
        }
        match self.policy {
            MovePolicy::Held => self.follow_held(grid),
            MovePolicy::Edge => None,
        }
    }

    fn animate(&mut self) -> Option<MotionEvent> {
        let tx = self.cell.x as f32;
        let ty = self.cell.y as f32;
        self.render.x += (tx - self.render.x) * self.speed;
        self.render.y += (ty - self.render.y) * self.speed;
        if self.render.distance_to(self.cell) <= self.epsilon {
            self.render = RenderPos::at(self.cell);
            self.animating = false;
            return Some(MotionEvent::Arrived(self.cell));
        }
        None
    }

    fn follow_held(&mut self, grid: &Grid) -> Option<MotionEvent> {
        if let Some(desired) = self.desired {
            if self.current == Some(desired.opposite()) || grid.can_move(self.cell, desired) {
                self.current = Some(desired);
            }
        }
        let dir = self.current?;
        if grid.can_move(self.cell, dir) {
            self.step(grid, dir)
        } else {
            trace!("blocked moving {:?} at {:?}", dir, self.cell);
            self.current = None;
            None
        }
    }

    fn step(&mut self, grid: &Grid, dir: Dir) -> Option<MotionEvent> {
        let from = self.cell;
        let to = grid.neighbor(from, dir)?;
        self.cell = to;
        self.animating = true;
        trace!("step {:?} {:?} -> {:?}", dir, from, to);
        Some(MotionEvent::Started { from, to, dir })
    }
}

/// Frames needed for a one-cell step to snap, for `speed` in (0, 1].
pub fn frames_per_step(speed: f32, epsilon: f32) -> u32 {
    if speed >= 1.0 {
        return 1;
    }
    (epsilon.ln() / (1.0 - speed).ln()).ceil().max(1.0) as u32
}
