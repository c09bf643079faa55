use std::io::{self, Write};

use log::debug;

/// Sound cues for gameplay moments. Every method defaults to silence.
pub trait AudioFeedback {
    fn on_move(&mut self) {}
    fn on_star(&mut self) {}
    fn on_win(&mut self) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl AudioFeedback for Silent {}

/// Rings the terminal bell on pickups and wins. Steps stay quiet.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl TerminalBell {
    fn ring(&self) {
        let mut stdout = io::stdout();
        if let Err(err) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
            debug!("bell failed: {err}");
        }
    }
}

impl AudioFeedback for TerminalBell {
    fn on_star(&mut self) {
        self.ring();
    }

    fn on_win(&mut self) {
        self.ring();
    }
}

impl<A: AudioFeedback + ?Sized> AudioFeedback for Box<A> {
    fn on_move(&mut self) {
        (**self).on_move();
    }

    fn on_star(&mut self) {
        (**self).on_star();
    }

    fn on_win(&mut self) {
        (**self).on_win();
    }
}
