mod dto;
pub mod export;
pub mod handlers;
pub mod import;
pub mod mobile;
mod repo;
mod repo_types;
pub mod report;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::sequence_routes())
        .merge(handlers::line_routes())
        .merge(mobile::mobile_routes())
}
