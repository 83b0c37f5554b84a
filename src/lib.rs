pub mod app;
pub mod config;
pub mod device;
pub mod errors;
pub mod fitness;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod poller;
pub mod state;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::load_data;
