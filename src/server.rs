// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::error::{PageError, RenderError};
use crate::page::{HomePage, PLAY_ICON_PATH, PLAY_ICON_SVG, StaticProps};
use crate::player::PlayerQueue;
use crate::strategy::{FetchStrategy, GeneratedPage, HomeResponse, PROPS_PATH, PageGenerator};

/// Path of the player snapshot endpoint
pub const PLAYER_PATH: &str = "/api/player";

/// Shared state of the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<PageGenerator>,
    pub player: Arc<PlayerQueue>,
}

impl AppState {
    pub fn new(generator: PageGenerator, player: Arc<PlayerQueue>) -> Self {
        Self {
            generator: Arc::new(generator),
            player,
        }
    }
}

/// Build the router serving the home page and its companions
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route(PROPS_PATH, get(props))
        .route(PLAYER_PATH, get(player_state))
        .route("/play/{index}", post(play))
        .route(PLAY_ICON_PATH, get(play_icon))
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl+C
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let strategy = state.generator.strategy();
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, ?strategy, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

/// Page generation failure as an HTTP response
struct ServerError(PageError);

impl From<PageError> for ServerError {
    fn from(e: PageError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PageError::Fetch(_) | PageError::Transform(_) => StatusCode::BAD_GATEWAY,
            PageError::Render(RenderError::NoSuchControl { .. }) => StatusCode::NOT_FOUND,
            PageError::Render(_) | PageError::WriteFailed { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }

        (status, self.0.to_string()).into_response()
    }
}

async fn home(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ServerError> {
    debug!("GET /");

    match state.generator.home(Utc::now()).await? {
        HomeResponse::ClientShell(html) => Ok(Html(html).into_response()),
        HomeResponse::Page(page) => Ok(page_response(&page, state.generator.strategy(), &headers)),
    }
}

fn page_response(page: &GeneratedPage, strategy: FetchStrategy, headers: &HeaderMap) -> Response {
    let cache_control = match strategy {
        FetchStrategy::ScheduledRegeneration => {
            format!("s-maxage={}, stale-while-revalidate", page.revalidate)
        }
        _ => "private, no-cache, no-store, max-age=0, must-revalidate".to_string(),
    };

    let not_modified = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| if_none_match_matches(value, &page.etag));

    let response_headers = [
        (header::ETAG, page.etag.clone()),
        (header::CACHE_CONTROL, cache_control),
    ];

    if not_modified {
        return (StatusCode::NOT_MODIFIED, response_headers).into_response();
    }

    (
        response_headers,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        page.html.clone(),
    )
        .into_response()
}

/// Whether an `If-None-Match` value names `etag`
///
/// The header is a comma separated list; comparison is weak, so a `W/`
/// prefix is ignored. `*` matches any current representation.
fn if_none_match_matches(value: &str, etag: &str) -> bool {
    let etag = etag.strip_prefix("W/").unwrap_or(etag);

    value.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
    })
}

async fn props(State(state): State<AppState>) -> Result<Response, ServerError> {
    let now = Utc::now();

    // Under scheduled regeneration the props must match the page being served
    if state.generator.strategy() == FetchStrategy::ScheduledRegeneration
        && let Some(page) = state.generator.cached().await
        && page.is_fresh(now)
    {
        return Ok(Json(StaticProps {
            props: page.page.props().clone(),
            revalidate: page.revalidate,
        })
        .into_response());
    }

    let static_props = state.generator.static_props().await?;
    Ok(Json(static_props).into_response())
}

async fn player_state(State(state): State<AppState>) -> Response {
    Json(state.player.snapshot()).into_response()
}

async fn play(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Response, ServerError> {
    let page = match state.generator.cached().await {
        Some(generated) => generated.page.clone(),
        None => HomePage::new(state.generator.static_props().await?.props),
    };

    page.play(index, state.player.as_ref())
        .map_err(PageError::from)?;

    Ok(Json(state.player.snapshot()).into_response())
}

async fn play_icon() -> Response {
    ([(header::CONTENT_TYPE, "image/svg+xml")], PLAY_ICON_SVG).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;
    use url::Url;

    use crate::api::tests::{MockHttpClient, raw_episodes_json};
    use crate::progress::NoopReporter;

    fn app(status: u16, body: String, strategy: FetchStrategy) -> (Router, Arc<PlayerQueue>) {
        let (router, player, _) = app_with_client(status, body, strategy);
        (router, player)
    }

    fn app_with_client(
        status: u16,
        body: String,
        strategy: FetchStrategy,
    ) -> (Router, Arc<PlayerQueue>, Arc<MockHttpClient>) {
        let client = Arc::new(MockHttpClient::new(status, body));
        let generator = PageGenerator::new(
            client.clone(),
            Url::parse("http://localhost:3333/").unwrap(),
            strategy,
            NoopReporter::shared(),
        );
        let player = PlayerQueue::shared();
        (router(AppState::new(generator, player.clone())), player, client)
    }

    fn request_count(client: &MockHttpClient) -> usize {
        client.requests.lock().unwrap().len()
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_request(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn home_renders_page_with_etag() {
        let (router, _) = app(200, raw_episodes_json(3), FetchStrategy::ScheduledRegeneration);

        let (status, headers, body) = send(router, get_request("/")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Últimos lançamentos"));
        assert!(headers.contains_key(header::ETAG));
        assert_eq!(
            headers[header::CACHE_CONTROL],
            "s-maxage=28800, stale-while-revalidate"
        );
    }

    #[tokio::test]
    async fn home_honors_if_none_match() {
        let (router, _) = app(200, raw_episodes_json(3), FetchStrategy::ScheduledRegeneration);

        let (_, headers, _) = send(router.clone(), get_request("/")).await;
        let etag = headers[header::ETAG].to_str().unwrap().to_string();

        let request = Request::builder()
            .uri("/")
            .header(header::IF_NONE_MATCH, etag)
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(router, request).await;

        assert_eq!(status, StatusCode::NOT_MODIFIED);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn home_honors_weak_and_listed_etags() {
        let (router, _) = app(200, raw_episodes_json(3), FetchStrategy::ScheduledRegeneration);

        let (_, headers, _) = send(router.clone(), get_request("/")).await;
        let etag = headers[header::ETAG].to_str().unwrap().to_string();

        for value in [
            format!("W/{etag}"),
            format!("\"other\", {etag}"),
            "*".to_string(),
        ] {
            let request = Request::builder()
                .uri("/")
                .header(header::IF_NONE_MATCH, value)
                .body(Body::empty())
                .unwrap();
            let (status, _, _) = send(router.clone(), request).await;
            assert_eq!(status, StatusCode::NOT_MODIFIED);
        }

        let request = Request::builder()
            .uri("/")
            .header(header::IF_NONE_MATCH, "\"other\"")
            .body(Body::empty())
            .unwrap();
        let (status, _, _) = send(router, request).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[test]
    fn if_none_match_list_handling() {
        let etag = "\"abc\"";

        assert!(if_none_match_matches("\"abc\"", etag));
        assert!(if_none_match_matches("W/\"abc\"", etag));
        assert!(if_none_match_matches("\"x\",  W/\"abc\" ", etag));
        assert!(if_none_match_matches("*", etag));
        assert!(!if_none_match_matches("\"abcd\", \"x\"", etag));
        assert!(!if_none_match_matches("", etag));
    }

    #[tokio::test]
    async fn home_reports_upstream_failure() {
        let (router, _) = app(500, String::new(), FetchStrategy::PerRequestServer);

        let (status, _, body) = send(router, get_request("/")).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.contains("HTTP error 500"));
    }

    #[tokio::test]
    async fn props_endpoint_returns_contract_json() {
        let (router, _) = app(200, raw_episodes_json(5), FetchStrategy::OnDemandClient);

        let (status, _, body) = send(router, get_request(PROPS_PATH)).await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["revalidate"], 28800);
        assert_eq!(json["props"]["latestEpisodes"].as_array().unwrap().len(), 2);
        assert_eq!(json["props"]["allEpisodes"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn props_endpoint_serves_cached_page_props() {
        let (router, _, client) =
            app_with_client(200, raw_episodes_json(5), FetchStrategy::ScheduledRegeneration);

        send(router.clone(), get_request("/")).await;
        let (status, _, body) = send(router, get_request(PROPS_PATH)).await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(request_count(&client), 1);
        assert_eq!(json["revalidate"], 28800);
        assert_eq!(json["props"]["latestEpisodes"][0]["id"], "ep-0");
        assert_eq!(json["props"]["allEpisodes"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn props_endpoint_fetches_without_cached_page() {
        let (router, _, client) =
            app_with_client(200, raw_episodes_json(5), FetchStrategy::ScheduledRegeneration);

        let (status, _, _) = send(router.clone(), get_request(PROPS_PATH)).await;
        send(router, get_request(PROPS_PATH)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(request_count(&client), 2);
    }

    #[tokio::test]
    async fn play_dispatches_concatenated_list() {
        let (router, player) = app(200, raw_episodes_json(4), FetchStrategy::ScheduledRegeneration);

        send(router.clone(), get_request("/")).await;
        let (status, _, body) = send(router, post_request("/play/2")).await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["currentEpisodeIndex"], 2);
        assert_eq!(json["episodeList"].as_array().unwrap().len(), 4);

        let state = player.snapshot();
        assert_eq!(state.current_episode().map(|e| e.id()), Some("ep-2"));
    }

    #[tokio::test]
    async fn play_unknown_index_is_not_found() {
        let (router, player) = app(200, raw_episodes_json(2), FetchStrategy::OnDemandClient);

        let (status, _, _) = send(router, post_request("/play/7")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!player.snapshot().is_playing);
    }

    #[tokio::test]
    async fn play_icon_is_svg() {
        let (router, _) = app(200, "[]".to_string(), FetchStrategy::OnDemandClient);

        let (status, headers, body) = send(router, get_request(PLAY_ICON_PATH)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "image/svg+xml");
        assert!(body.starts_with("<svg"));
    }
}
