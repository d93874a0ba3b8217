//! HTTP-triggered crawl invocation
//!
//! `POST /crawl` takes a crawl configuration as JSON, runs the crawl to
//! completion and answers with a single JSON array: the crawled URLs, or
//! the full page records when `with_page_content` is set.

use crate::config::{parse_crawl_request, EngineConfig};
use crate::state::PageRecord;
use crate::{CrawlError, Crawler};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Clone)]
struct AppState {
    engine: Arc<EngineConfig>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Response of a finished crawl
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CrawlResponse {
    Pages(Vec<PageRecord>),
    Urls(Vec<String>),
}

type ApiError = (StatusCode, Json<ErrorBody>);

/// Builds the application router
///
/// Every crawl started through it uses `engine` as its fetch settings.
pub fn router(engine: EngineConfig) -> Router {
    let state = AppState {
        engine: Arc::new(engine),
    };

    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/crawl",
            post(crawl_handler).fallback(method_not_supported),
        )
        .with_state(state)
}

/// Serves the router on an already-bound listener until shutdown
pub async fn serve(listener: TcpListener, engine: EngineConfig) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Listening on http://{}", addr);
    }
    axum::serve(listener, router(engine)).await
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn method_not_supported() -> StatusCode {
    StatusCode::BAD_REQUEST
}

async fn crawl_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CrawlResponse>, ApiError> {
    let config = parse_crawl_request(&body).map_err(bad_request)?;
    let with_page_content = config.with_page_content;

    let stream = Crawler::new(config)
        .with_engine_config(state.engine.as_ref().clone())
        .run()
        .await
        .map_err(|e| match e {
            CrawlError::Config(e) => bad_request(e),
            other => internal_error(other),
        })?;

    let records = stream.collect().await;
    tracing::info!("HTTP crawl returned {} pages", records.len());

    let response = if with_page_content {
        CrawlResponse::Pages(records)
    } else {
        CrawlResponse::Urls(records.into_iter().map(|record| record.url).collect())
    };

    Ok(Json(response))
}

fn bad_request(err: impl ToString) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
}

fn internal_error(err: impl ToString) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
}
