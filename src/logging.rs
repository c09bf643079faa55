use std::fs::File;
use std::path::Path;

use crate::error::MazeResult;

/// Routes `log` output to `path`. The alternate screen owns stdout and
/// stderr, so nothing is logged unless a file is given.
pub fn init_file_logger(path: &Path) -> MazeResult<()> {
    let file = File::create(path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}
