use std::{sync::Arc, time::Duration};

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use axum_server::{tls_rustls::RustlsConfig, Handle};
use eyre::WrapErr;
use mint_api::v1::Health;
use tokio::{sync::OnceCell, time};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::{
    config::{Config, Deployment},
    error::{self, ApiResult},
    service::TodoService,
    store::TodoStore,
    todos,
};

const FLUSH_INTERVAL: Duration = Duration::from_secs(300);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

pub struct AppState {
    pub service: TodoService,
    pub environment: String,
    // set once the store has answered a ping; failures leave it empty
    ready: OnceCell<()>,
}

impl AppState {
    pub fn new(store: Arc<dyn TodoStore>, environment: impl Into<String>) -> Self {
        Self {
            service: TodoService::new(store),
            environment: environment.into(),
            ready: OnceCell::new(),
        }
    }

    /// Waits for the store to answer once per process.
    pub async fn await_ready(&self) -> ApiResult<()> {
        (self.ready)
            .get_or_try_init(|| self.service.store().ping())
            .await?;

        Ok(())
    }
}

/// Builds the full router: todo routes, health check and middleware.
pub fn app(state: Arc<AppState>, config: &Config) -> eyre::Result<Router> {
    let mut router = Router::new()
        .route("/health", get(health))
        .nest("/api/todos", todos::router());

    if config.deployment() == Deployment::OnDemand {
        router = router.layer(middleware::from_fn_with_state(state.clone(), await_store));
    }

    // cors wraps the panic trap so trapped 500s stay readable cross-origin
    let router = router
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(cors(&config.cors_origins())?)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Health> {
    Json(Health::ok(&state.environment))
}

async fn await_store(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    state.await_ready().await?;
    Ok(next.run(request).await)
}

fn cors(origins: &[String]) -> eyre::Result<CorsLayer> {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::mirror_request()
    } else {
        let origins = (origins.iter())
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .wrap_err("invalid CORS origin")?;

        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE]))
}

/// Serves until Ctrl-C, then flushes the store.
///
/// Persistent servers only bind once the store answers.
pub async fn run(config: Config, store: Arc<dyn TodoStore>) -> eyre::Result<()> {
    if config.deployment() == Deployment::Server {
        store.ping().await.wrap_err("store is unreachable")?;
    }

    let state = Arc::new(AppState::new(store.clone(), config.environment.clone()));
    let app = app(state, &config)?;

    let handle = Handle::new();
    tokio::spawn(shutdown_on_ctrl_c(handle.clone()));

    let flusher = tokio::spawn({
        let store = store.clone();
        async move {
            loop {
                time::sleep(FLUSH_INTERVAL).await;
                if let Err(err) = store.flush().await {
                    tracing::error!("Failed to flush store: {:?}", err);
                }
            }
        }
    });

    let addr = config.address();

    match config.tls() {
        Some((cert, key)) => {
            let tls = RustlsConfig::from_pem_file(cert, key).await?;
            info!(%addr, environment = %config.environment, "API ready (tls)");

            axum_server::bind_rustls(addr, tls)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            info!(%addr, environment = %config.environment, "API ready");

            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    flusher.abort();
    store.flush().await?;

    info!("shut down");

    Ok(())
}

async fn shutdown_on_ctrl_c(handle: Handle) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown: {:?}", err);
        return;
    }

    info!("shutting down");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
