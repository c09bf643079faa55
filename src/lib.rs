//! A terminal maze game: each level is a freshly carved perfect maze with
//! stars laid along the route from the top-left corner to the exit on the
//! right edge.

pub mod config;
pub mod error;
pub mod feedback;
pub mod input;
pub mod layout;
pub mod logging;
pub mod maze;
pub mod motion;
pub mod path;
pub mod render;
pub mod session;
pub mod stars;

pub use error::{MazeError, MazeResult};
pub use maze::{generate, Cell, Dir, Grid, Pos};
pub use motion::{Motion, MotionEvent, MovePolicy, RenderPos};
pub use path::shortest_path;
pub use session::{GameState, LevelSession, SessionConfig, Snapshot};
pub use stars::{place_stars, TOTAL_STARS};
