//! HTTP edge: form-encoded POSTs in, plain-text status lines out.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, Uri},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::hasher::Digest;
use crate::model::Block;
use crate::AppState;

pub const POST_ONLY: &str = "Only POST requests are supported";

/// Build the service. Every POST outside the inspection routes is handed to
/// the transaction router, whatever its path.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/blocks", get(list_blocks).fallback(dispatch))
        .route("/health", get(health).fallback(dispatch))
        .route("/version", get(version).fallback(dispatch))
        .fallback(dispatch)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Decode a `key=value&...` body. Later keys win. Decoding is lossy: bad
/// percent escapes pass through verbatim and invalid UTF-8 becomes U+FFFD,
/// so a garbage body yields junk keys and the expected ones read as empty.
pub fn decode_form(body: &[u8]) -> HashMap<String, String> {
    let params: HashMap<String, String> =
        serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)
            .unwrap_or_default()
            .into_iter()
            .collect();
    debug!(keys = params.len(), "decoded form body");
    params
}

/// POST <path>
async fn dispatch(State(state): State<AppState>, method: Method, uri: Uri, body: Bytes) -> String {
    if method != Method::POST {
        return POST_ONLY.to_string();
    }
    let params = decode_form(&body);
    state.router.handle(uri.path(), &params)
}

/// GET /blocks
async fn list_blocks(State(state): State<AppState>) -> Json<Vec<Block>> {
    Json(state.router.ledger().blocks())
}

/// GET /health
#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub blocks: usize,
}
async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        blocks: state.router.ledger().len(),
    })
}

/// GET /version
#[derive(Serialize)]
pub struct Version {
    pub version: &'static str,
    pub digest: Digest,
}
async fn version(State(state): State<AppState>) -> Json<Version> {
    Json(Version {
        version: env!("CARGO_PKG_VERSION"),
        digest: state.router.ledger().digest(),
    })
}
