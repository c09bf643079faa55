use thiserror::Error;

#[derive(Error, Debug)]
pub enum MazeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type MazeResult<T> = Result<T, MazeError>;
