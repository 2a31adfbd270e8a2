use anyhow::{Context, Result};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::{debug, info, warn};

use crate::recommend::{
    BudgetBracket, ClientInputError, QueryInput, RecommendationEngine, RecommendationOutcome,
    RecommendationRecord, SoundCharacter,
};
use tower_http::services::ServeDir;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::image_relay::{ImageRelay, RelayError};
use super::metrics::{
    metrics_handler, record_genre_fallback, record_image_relay, record_recommendation,
};
use super::{http_cache, log_requests, state::*, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub products: usize,
    pub genres: usize,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

/// The three selection fields, echoed back as the client sent them.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UserInputEcho {
    pub budget: String,
    pub genre: String,
    pub sound_character: String,
}

impl UserInputEcho {
    fn from_input(input: &QueryInput) -> Self {
        let field = |v: &Option<String>| v.as_deref().unwrap_or_default().trim().to_string();
        UserInputEcho {
            budget: field(&input.budget),
            genre: field(&input.genre),
            sound_character: field(&input.sound_character),
        }
    }
}

#[derive(Serialize)]
struct RecommendSuccessResponse {
    success: bool,
    recommendations: Vec<RecommendationRecord>,
    user_input: UserInputEcho,
    genre_fallback: bool,
}

#[derive(Serialize)]
struct RecommendErrorResponse {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_input: Option<UserInputEcho>,
}

impl RecommendErrorResponse {
    fn invalid(err: ClientInputError) -> Response {
        let body = RecommendErrorResponse {
            success: false,
            error: err.message,
            field: Some(err.field),
            user_input: None,
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }

    fn no_match(user_input: UserInputEcho) -> Response {
        let body = RecommendErrorResponse {
            success: false,
            error: format!(
                "Tidak ada IEM yang tersedia dalam budget {}. Silakan pilih budget lain.",
                user_input.budget
            ),
            field: None,
            user_input: Some(user_input),
        };
        (StatusCode::NOT_FOUND, Json(body)).into_response()
    }
}

#[derive(Serialize)]
struct OptionsResponse {
    budgets: Vec<&'static str>,
    genres: Vec<String>,
    sound_characters: Vec<&'static str>,
    default_top_n: usize,
    max_top_n: usize,
}

#[derive(Deserialize, Debug)]
struct ImageRelayParams {
    u: Option<String>,
}

#[derive(Serialize)]
struct RelayErrorBody {
    error: String,
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        products: state.engine.products().len(),
        genres: state.engine.genres().len(),
    };
    Json(stats)
}

async fn get_options(
    State(engine): State<GuardedEngine>,
    State(config): State<ServerConfig>,
) -> impl IntoResponse {
    Json(OptionsResponse {
        budgets: BudgetBracket::SELECTABLE.iter().map(|b| b.label()).collect(),
        genres: engine.genres().genres().to_vec(),
        sound_characters: SoundCharacter::ALL.iter().map(|c| c.label()).collect(),
        default_top_n: config.default_top_n,
        max_top_n: config.max_top_n,
    })
}

async fn post_recommend(
    State(engine): State<GuardedEngine>,
    State(config): State<ServerConfig>,
    body: Result<Json<QueryInput>, JsonRejection>,
) -> Response {
    let Json(input) = match body {
        Ok(body) => body,
        Err(rejection) => {
            debug!("Rejected recommend body: {}", rejection.body_text());
            record_recommendation("unknown", "invalid");
            let body = RecommendErrorResponse {
                success: false,
                error: rejection.body_text(),
                field: None,
                user_input: None,
            };
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    let query = match input.validate(config.default_top_n, config.max_top_n) {
        Ok(query) => query,
        Err(err) => {
            debug!("Invalid recommend request: {}", err);
            record_recommendation("unknown", "invalid");
            return RecommendErrorResponse::invalid(err);
        }
    };

    let user_input = UserInputEcho::from_input(&input);
    match engine.recommend(&query) {
        RecommendationOutcome::Matches {
            recommendations,
            genre_fallback,
        } => {
            record_recommendation(query.budget.label(), "matched");
            if genre_fallback {
                record_genre_fallback();
            }
            Json(RecommendSuccessResponse {
                success: true,
                recommendations,
                user_input,
                genre_fallback,
            })
            .into_response()
        }
        RecommendationOutcome::NoMatch => {
            record_recommendation(query.budget.label(), "no_match");
            RecommendErrorResponse::no_match(user_input)
        }
    }
}

async fn get_image(
    State(relay): State<GuardedImageRelay>,
    Query(params): Query<ImageRelayParams>,
) -> Response {
    let result = match ImageRelay::validate_url(params.u.as_deref()) {
        Ok(url) => relay.fetch(url).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(image) => {
            record_image_relay("ok");
            ([(header::CONTENT_TYPE, image.content_type)], image.body).into_response()
        }
        Err(RelayError::InvalidUrl) => {
            record_image_relay("invalid_url");
            let body = RelayErrorBody {
                error: RelayError::InvalidUrl.to_string(),
            };
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
        Err(err) => {
            warn!("Image relay failed: {}", err);
            let result = match err {
                RelayError::UpstreamStatus(_) => "upstream_status",
                RelayError::TooLarge { .. } => "too_large",
                _ => "upstream_error",
            };
            record_image_relay(result);
            let body = RelayErrorBody {
                error: err.to_string(),
            };
            (StatusCode::BAD_GATEWAY, Json(body)).into_response()
        }
    }
}

impl ServerState {
    fn new(
        config: ServerConfig,
        engine: Arc<RecommendationEngine>,
        image_relay: ImageRelay,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            engine,
            image_relay: Arc::new(image_relay),
            hash: env!("GIT_HASH").to_owned(),
        }
    }
}

pub fn make_app(config: ServerConfig, engine: Arc<RecommendationEngine>) -> Result<Router> {
    let image_relay = ImageRelay::new(
        config.image_relay_timeout_sec,
        config.image_relay_max_bytes,
    )
    .context("Failed to build image relay HTTP client")?;
    let state = ServerState::new(config.clone(), engine, image_relay);

    let api_routes: Router = Router::new()
        .route("/recommend", post(post_recommend))
        .route("/options", get(get_options))
        .with_state(state.clone());

    let mut app: Router = Router::new()
        .route("/", get(home))
        .route("/img", get(get_image))
        .with_state(state.clone())
        .nest("/api", api_routes);

    if let Some(assets_dir) = config.assets_dir {
        info!("Serving static assets from {:?}", assets_dir);
        let static_routes: Router = Router::new()
            .nest_service("/static", ServeDir::new(assets_dir))
            .layer(middleware::from_fn_with_state(
                config.asset_cache_age_sec,
                http_cache,
            ));
        app = app.merge(static_routes);
    }

    app = app.layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

pub fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

pub async fn run_server(
    config: ServerConfig,
    engine: Arc<RecommendationEngine>,
    metrics_port: u16,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, engine)?;

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    let metrics_listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;

    let main_server = axum::serve(listener, app);
    let metrics_server = axum::serve(metrics_listener, make_metrics_app());

    tokio::try_join!(
        async { main_server.await.context("Main server failed") },
        async { metrics_server.await.context("Metrics server failed") },
    )?;
    Ok(())
}
