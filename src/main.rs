use std::io::{self, Stdout};
use std::process::ExitCode;
use std::thread;
use std::time::Instant;

use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use star_maze::config::Config;
use star_maze::feedback::{AudioFeedback, Silent, TerminalBell};
use star_maze::input::{Command, InputSource, TerminalInput};
use star_maze::logging::init_file_logger;
use star_maze::render::{Renderer, TerminalRenderer};
use star_maze::{LevelSession, MazeResult};

fn main() -> ExitCode {
    let config = Config::parse();
    if let Err(err) = config.validate() {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }
    if let Some(path) = &config.log_file {
        if let Err(err) = init_file_logger(path) {
            eprintln!("cannot open log file {}: {err}", path.display());
            return ExitCode::FAILURE;
        }
    }

    match play(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn play(config: &Config) -> MazeResult<()> {
    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, config);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn run(stdout: &mut Stdout, config: &Config) -> MazeResult<()> {
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let audio: Box<dyn AudioFeedback> = if config.no_bell {
        Box::new(Silent)
    } else {
        Box::new(TerminalBell)
    };
    let mut session = LevelSession::new(rng, audio, config.session(), config.level);
    let (term_w, term_h) = terminal::size()?;
    session.on_resize(term_w, term_h);
    info!(
        "session ready: level {}, seed {:?}, policy {:?}",
        config.level, config.seed, config.policy
    );

    let mut input = TerminalInput::new(config.policy.into(), config.hold());
    let mut renderer = TerminalRenderer::new(stdout);
    let frame_time = config.frame_time();
    let mut last_frame = Instant::now();

    loop {
        let frame_start = Instant::now();
        for command in input.poll()? {
            match command {
                Command::Quit => return Ok(()),
                Command::Begin => session.begin(),
                Command::Restart => session.restart(),
                Command::KeyDown(dir) => session.key_down(dir),
                Command::KeyUp(dir) => session.key_up(dir),
                Command::Resize(w, h) => session.on_resize(w, h),
            }
        }

        session.tick(frame_start - last_frame);
        last_frame = frame_start;
        renderer.draw(&session.snapshot())?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}
