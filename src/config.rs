use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::error::{MazeError, MazeResult};
use crate::input::DEFAULT_HOLD_MS;
use crate::motion::{MovePolicy, DEFAULT_ANIMATION_SPEED, SNAP_EPSILON};
use crate::session::{SessionConfig, DEFAULT_WIN_DELAY};

pub const DEFAULT_FPS: u64 = 60;
const MAX_FPS: u64 = 240;
const MAX_WIN_DELAY_MS: u64 = 60_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Holding a direction keeps moving; opposite keys reverse instantly.
    Held,
    /// One step per key press.
    Edge,
}

impl From<PolicyArg> for MovePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Held => MovePolicy::Held,
            PolicyArg::Edge => MovePolicy::Edge,
        }
    }
}

/// Terminal maze: collect the stars and find the exit.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Seed for maze generation; random when omitted.
    #[arg(long, env = "MAZE_SEED")]
    pub seed: Option<u64>,

    /// Level to begin on.
    #[arg(long, default_value_t = 1)]
    pub level: u32,

    /// Frame ticks per second.
    #[arg(long, env = "MAZE_FPS", default_value_t = DEFAULT_FPS)]
    pub fps: u64,

    /// Fraction of the remaining distance covered per frame, in (0, 1].
    #[arg(long, env = "MAZE_ANIMATION_SPEED", default_value_t = DEFAULT_ANIMATION_SPEED)]
    pub speed: f32,

    /// How key presses turn into moves.
    #[arg(long, value_enum, default_value_t = PolicyArg::Held)]
    pub policy: PolicyArg,

    /// Pause after reaching the exit before the next level, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_WIN_DELAY.as_millis() as u64)]
    pub win_delay_ms: u64,

    /// How long a key counts as held after its last press or repeat.
    #[arg(long, default_value_t = DEFAULT_HOLD_MS)]
    pub hold_ms: u64,

    /// Do not ring the terminal bell.
    #[arg(long)]
    pub no_bell: bool,

    /// Write logs to this file (filter with RUST_LOG).
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn validate(&self) -> MazeResult<()> {
        if self.level == 0 {
            return Err(MazeError::InvalidConfig("level must be at least 1".into()));
        }
        if self.fps == 0 || self.fps > MAX_FPS {
            return Err(MazeError::InvalidConfig(format!(
                "fps must be between 1 and {MAX_FPS}, got {}",
                self.fps
            )));
        }
        if !(self.speed > 0.0 && self.speed <= 1.0) {
            return Err(MazeError::InvalidConfig(format!(
                "speed must be in (0, 1], got {}",
                self.speed
            )));
        }
        if self.win_delay_ms > MAX_WIN_DELAY_MS {
            return Err(MazeError::InvalidConfig(format!(
                "win delay must be at most {MAX_WIN_DELAY_MS} ms, got {}",
                self.win_delay_ms
            )));
        }
        if self.hold_ms == 0 {
            return Err(MazeError::InvalidConfig("hold window must be positive".into()));
        }
        Ok(())
    }

    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            animation_speed: self.speed,
            snap_epsilon: SNAP_EPSILON,
            policy: self.policy.into(),
            win_delay: Duration::from_millis(self.win_delay_ms),
        }
    }

    pub fn frame_time(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.fps.max(1))
    }

    pub fn hold(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }
}
