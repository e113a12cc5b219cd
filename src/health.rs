use axum::{routing::get, Router};

use crate::{envelope::Envelope, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/ping", get(ping))
}

pub async fn ping() -> Envelope<()> {
    Envelope::message("Pong")
}
