use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};

use crate::error::MazeResult;
use crate::maze::Dir;
use crate::motion::MovePolicy;

pub const DEFAULT_HOLD_MS: u64 = 160;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Quit,
    Begin,
    Restart,
    KeyDown(Dir),
    KeyUp(Dir),
    Resize(u16, u16),
}

/// Source of player commands, drained once per frame.
pub trait InputSource {
    fn poll(&mut self) -> MazeResult<Vec<Command>>;
}

/// Synthesises key-up for terminals that only report presses.
///
/// A direction counts as held while its last press or auto-repeat is younger
/// than the hold window. The most recently pressed direction wins.
#[derive(Clone, Debug)]
pub struct HeldKeys {
    last_seen: [Option<Instant>; 4],
    last_pressed: Option<Dir>,
    reported: Option<Dir>,
    hold: Duration,
}

impl HeldKeys {
    pub fn new(hold: Duration) -> Self {
        Self {
            last_seen: [None; 4],
            last_pressed: None,
            reported: None,
            hold,
        }
    }

    pub fn press(&mut self, dir: Dir, now: Instant) {
        self.last_seen[idx_for_dir(dir)] = Some(now);
        self.last_pressed = Some(dir);
    }

    pub fn release(&mut self, dir: Dir) {
        self.last_seen[idx_for_dir(dir)] = None;
        if self.last_pressed == Some(dir) {
            self.last_pressed = None;
        }
    }

    pub fn active(&self, now: Instant) -> Option<Dir> {
        let fresh = |t: Instant| now.saturating_duration_since(t) <= self.hold;
        if let Some(dir) = self.last_pressed {
            if self.last_seen[idx_for_dir(dir)].is_some_and(fresh) {
                return Some(dir);
            }
        }
        let mut best: Option<(Dir, Instant)> = None;
        for dir in Dir::ALL {
            if let Some(t) = self.last_seen[idx_for_dir(dir)] {
                if !fresh(t) {
                    continue;
                }
                match best {
                    Some((_, bt)) if t <= bt => {}
                    _ => best = Some((dir, t)),
                }
            }
        }
        best.map(|(dir, _)| dir)
    }

    /// Key-up/key-down commands for any change since the last call.
    pub fn transitions(&mut self, now: Instant) -> Vec<Command> {
        let active = self.active(now);
        if active == self.reported {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(2);
        if let Some(old) = self.reported {
            out.push(Command::KeyUp(old));
        }
        if let Some(new) = active {
            out.push(Command::KeyDown(new));
        }
        self.reported = active;
        out
    }
}

fn idx_for_dir(dir: Dir) -> usize {
    match dir {
        Dir::Up => 0,
        Dir::Right => 1,
        Dir::Down => 2,
        Dir::Left => 3,
    }
}

fn dir_for_key(code: KeyCode) -> Option<Dir> {
    match code {
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('w') | KeyCode::Char('W') => Some(Dir::Up),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('s') | KeyCode::Char('S') => {
            Some(Dir::Down)
        }
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('a') | KeyCode::Char('A') => {
            Some(Dir::Left)
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('d') | KeyCode::Char('D') => {
            Some(Dir::Right)
        }
        _ => None,
    }
}

/// Keyboard and resize events from the controlling terminal.
pub struct TerminalInput {
    policy: MovePolicy,
    held: HeldKeys,
}

impl TerminalInput {
    pub fn new(policy: MovePolicy, hold: Duration) -> Self {
        Self {
            policy,
            held: HeldKeys::new(hold),
        }
    }

    /// Maps one key event, recording held directions as a side effect.
    pub fn translate_key(&mut self, key: KeyEvent, now: Instant) -> Option<Command> {
        if key.kind == KeyEventKind::Release {
            if let Some(dir) = dir_for_key(key.code) {
                self.held.release(dir);
            }
            return None;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Command::Quit),
            KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::Restart),
            KeyCode::Enter | KeyCode::Char(' ') => Some(Command::Begin),
            code => {
                let dir = dir_for_key(code)?;
                match self.policy {
                    MovePolicy::Held => {
                        self.held.press(dir, now);
                        None
                    }
                    MovePolicy::Edge if key.kind == KeyEventKind::Press => {
                        Some(Command::KeyDown(dir))
                    }
                    MovePolicy::Edge => None,
                }
            }
        }
    }
}

impl InputSource for TerminalInput {
    fn poll(&mut self) -> MazeResult<Vec<Command>> {
        let mut commands = Vec::new();
        while event::poll(Duration::from_millis(0))? {
            let now = Instant::now();
            match event::read()? {
                Event::Key(key) => commands.extend(self.translate_key(key, now)),
                Event::Resize(w, h) => commands.push(Command::Resize(w, h)),
                _ => {}
            }
        }
        if self.policy == MovePolicy::Held {
            commands.extend(self.held.transitions(Instant::now()));
        }
        Ok(commands)
    }
}
