pub mod board;
pub mod config;
pub mod cube;
pub mod editor;
pub mod input;
pub mod level;
pub mod roll;
pub mod roll_controller;
pub mod state;
pub mod time;
pub mod view_mode;

pub use board::{TileBoard, TileType};
pub use config::{load_config_from_path, CameraSettings, GameConfig};
pub use cube::{Face, Orientation, Slot};
pub use editor::{pick_tile, LevelEditor};
pub use input::{InputState, Key, MouseBtn};
pub use level::{load_level_from_path, save_level_to_path, LevelState};
pub use roll::RollDirection;
pub use roll_controller::{RollAnimation, RollConfig, RollController, RollOutcome};
pub use state::{BoardPosition, GameState};
pub use time::TimeState;
pub use view_mode::{CameraMode, ProjectionKind};
