pub mod animation;
pub mod app;
pub mod autosave;
pub mod config;
pub mod day_reset;
pub mod defaults;
pub mod errors;
pub mod handlers;
pub mod markdown;
pub mod models;
pub mod session;
pub mod state;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use day_reset::{needs_reset, DayResetState};
pub use session::Session;
pub use state::AppState;
pub use storage::Storage;
