use crate::state::AppState;
use axum::{routing::post, Router};

pub mod handlers;

pub fn router() -> Router<AppState> {
    Router::new().route("/polka/webhooks", post(handlers::polka_webhook))
}
