use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::error::HnError;

/// Create the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        // API-backed listings
        .route("/news", get(news))
        .route("/news2", get(news2))
        .route("/newest", get(newest))
        .route("/best", get(best))
        .route("/ask", get(ask))
        .route("/show", get(show))
        .route("/jobs", get(jobs))
        // Scraped listings (no API equivalent)
        .route("/shownew", get(shownew))
        .route("/active", get(active))
        .route("/noobstories", get(noobstories))
        .route("/newcomments", get(newcomments))
        // Items, comments and users
        .route("/item/:id", get(item))
        .route("/comments", get(comments))
        .route("/user/:id", get(user))
        // Odds and ends
        .route("/robots.txt", get(robots))
        .route("/favicon.ico", get(favicon))
        .fallback(not_found)
}

#[derive(Debug, Deserialize)]
struct PageParams {
    page: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct CommentsParams {
    ids: Option<String>,
}

// ========== Service Routes ==========

async fn index() -> Response {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "description": env!("CARGO_PKG_DESCRIPTION"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
    .into_response()
}

async fn robots() -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain")],
        "User-agent: *\nDisallow: /\n",
    )
        .into_response()
}

async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn not_found() -> Response {
    failure(StatusCode::NOT_FOUND, "No content available.")
}

// ========== API-backed Listings ==========

async fn news(State(state): State<AppState>, Query(params): Query<PageParams>) -> Response {
    listing(&state, "topstories", params.page.unwrap_or(1)).await
}

/// Legacy alias for the second page of `/news`.
async fn news2(State(state): State<AppState>) -> Response {
    listing(&state, "topstories", 2).await
}

async fn newest(State(state): State<AppState>, Query(params): Query<PageParams>) -> Response {
    listing(&state, "newstories", params.page.unwrap_or(1)).await
}

async fn best(State(state): State<AppState>, Query(params): Query<PageParams>) -> Response {
    listing(&state, "beststories", params.page.unwrap_or(1)).await
}

async fn ask(State(state): State<AppState>, Query(params): Query<PageParams>) -> Response {
    listing(&state, "askstories", params.page.unwrap_or(1)).await
}

async fn show(State(state): State<AppState>, Query(params): Query<PageParams>) -> Response {
    listing(&state, "showstories", params.page.unwrap_or(1)).await
}

async fn jobs(State(state): State<AppState>, Query(params): Query<PageParams>) -> Response {
    listing(&state, "jobstories", params.page.unwrap_or(1)).await
}

async fn listing(state: &AppState, category: &str, page: usize) -> Response {
    match state.hn.list_stories(category, page).await {
        Ok(items) => Json(items).into_response(),
        Err(e) => error_response(&e),
    }
}

// ========== Scraped Listings ==========

async fn shownew(
    State(state): State<AppState>,
    headers: HeaderMap,
    connect: Option<ConnectInfo<SocketAddr>>,
) -> Response {
    scraped_listing(&state, "shownew", client_ip(&headers, connect)).await
}

async fn active(
    State(state): State<AppState>,
    headers: HeaderMap,
    connect: Option<ConnectInfo<SocketAddr>>,
) -> Response {
    scraped_listing(&state, "active", client_ip(&headers, connect)).await
}

async fn noobstories(
    State(state): State<AppState>,
    headers: HeaderMap,
    connect: Option<ConnectInfo<SocketAddr>>,
) -> Response {
    scraped_listing(&state, "noobstories", client_ip(&headers, connect)).await
}

async fn scraped_listing(state: &AppState, page_path: &str, ip: Option<String>) -> Response {
    match state.hn.front_page(page_path, ip.as_deref()).await {
        Ok(stories) => Json(stories).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn newcomments(
    State(state): State<AppState>,
    headers: HeaderMap,
    connect: Option<ConnectInfo<SocketAddr>>,
) -> Response {
    let ip = client_ip(&headers, connect);
    match state.hn.new_comments(ip.as_deref()).await {
        Ok(forest) => Json(forest).into_response(),
        Err(e) => error_response(&e),
    }
}

// ========== Items, Comments and Users ==========

async fn item(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    match state.hn.fetch_full_item(id).await {
        Ok(item) => Json(item).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn comments(State(state): State<AppState>, Query(params): Query<CommentsParams>) -> Response {
    let Some(raw_ids) = params.ids else {
        return failure(StatusCode::INTERNAL_SERVER_ERROR, "missing ids parameter");
    };
    let ids: Vec<u64> = raw_ids
        .split(',')
        .filter_map(|part| part.trim().parse().ok())
        .collect();
    Json(state.hn.expand_comments(&ids, 0).await).into_response()
}

async fn user(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.hn.fetch_user(&id).await {
        Ok(user) => Json(user).into_response(),
        Err(e) => error_response(&e),
    }
}

// ========== Helpers ==========

/// Best guess at the requesting client's IP: the first hop of
/// `X-Forwarded-For` when a proxy set one, the peer address otherwise.
fn client_ip(headers: &HeaderMap, connect: Option<ConnectInfo<SocketAddr>>) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|hop| hop.trim().to_string())
        .filter(|hop| !hop.is_empty())
        .or_else(|| connect.map(|ConnectInfo(addr)| addr.ip().to_string()))
}

fn error_response(error: &HnError) -> Response {
    tracing::error!("Request failed: {error}");
    failure(StatusCode::INTERNAL_SERVER_ERROR, &error.to_string())
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
