//! EmoLens web layer
//!
//! The request handler that turns one text submission into a logged
//! prediction, chart-row shaping, configuration, and the axum server that
//! serves the classifier page and the monitor view.

pub mod charts;
pub mod cli;
pub mod config;
pub mod handler;
pub mod models;
pub mod server;
pub mod state;

pub use charts::{probability_rows, share_rows, ProbabilityRow, ShareRow};
pub use cli::{Cli, Commands, LogTable};
pub use config::AppConfig;
pub use handler::{PredictionResult, RequestHandler, Submission};
pub use server::{build_app, run_server};
pub use state::AppState;
