pub mod activities;
pub mod app;
pub mod config;
pub mod errors;
pub mod export;
pub mod feedback;
pub mod handlers;
pub mod history;
pub mod models;
pub mod relay;
pub mod sparkline;
pub mod state;
pub mod stats;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::EntryStore;
