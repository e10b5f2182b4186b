//! Web layer for the campus route planner.
//!
//! Provides HTTP endpoints for planning walking routes to bus stops and
//! inspecting the loaded campus graphs.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
