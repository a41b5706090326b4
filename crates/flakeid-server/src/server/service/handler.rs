//! `GET /id64`: one request, one ID.
//!
//! The handler only sees an [`IdSequence`], so the same router serves a real
//! [`IdGenerator`](super::IdGenerator) in production and a canned sequence in
//! tests. Generation never blocks (the generator's critical section is pure
//! arithmetic), so it runs directly on the async worker.

use axum::{Json, Router, extract::State, routing::get};
use flakeid::IdSequence;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::server::{
    service::response::{ApiError, IdResponse},
    telemetry::increment_ids_generated,
};

/// Shared state handed to every request.
#[derive(Clone)]
pub struct AppState {
    sequence: Arc<dyn IdSequence + Send + Sync>,
}

/// Builds the HTTP router around `sequence`.
///
/// Only `GET` is routed; any other method on `/id64` gets
/// `405 Method Not Allowed`.
pub fn router(sequence: Arc<dyn IdSequence + Send + Sync>) -> Router {
    Router::new()
        .route("/id64", get(get_id))
        .with_state(AppState { sequence })
        .layer(TraceLayer::new_for_http())
}

async fn get_id(State(state): State<AppState>) -> Result<Json<IdResponse>, ApiError> {
    let id = state.sequence.next_id()?;

    tracing::debug!("binary id: {id:064b}");
    increment_ids_generated();

    Ok(Json(IdResponse::from(id)))
}
