use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use shared::collision::ComponentCatalog;
use shared::{PlannerContext, PlannerError, PlannerSettings};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod routes;

const DEFAULT_ADDR: &str = "0.0.0.0:3001";

#[derive(Clone)]
pub struct AppState {
    pub context: Arc<PlannerContext>,
}

impl AppState {
    pub fn new(context: PlannerContext) -> Self {
        Self {
            context: Arc::new(context),
        }
    }
}

/// Settings from `PLANNER_SETTINGS` and the metadata catalog from
/// `PLANNER_CATALOG`; either falls back to defaults when unset.
fn load_context() -> Result<PlannerContext, PlannerError> {
    let settings = match std::env::var("PLANNER_SETTINGS") {
        Ok(path) => {
            tracing::info!("Loading settings from {}", path);
            PlannerSettings::from_json_file(path)?
        }
        Err(_) => PlannerSettings::default(),
    };
    let catalog = match std::env::var("PLANNER_CATALOG") {
        Ok(path) => {
            tracing::info!("Loading component catalog from {}", path);
            ComponentCatalog::from_json_file(path)?
        }
        Err(_) => {
            tracing::warn!("PLANNER_CATALOG not set, collision checks run without layer metadata");
            ComponentCatalog::default()
        }
    };
    Ok(PlannerContext::init(settings, catalog))
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/settings", get(routes::settings))
        .route("/api/resolve/z-position", post(routes::resolve_z_position))
        .route("/api/resolve/plinth", post(routes::resolve_plinth))
        .route("/api/render/plan", post(routes::render_plan))
        .route("/api/render/elevation", post(routes::render_elevation))
        .route("/api/placement/validate", post(routes::validate_placement))
        .route("/api/positions/validate", post(routes::validate_positions))
        .route("/api/geometry/build", post(routes::build_geometry))
        .route("/api/rooms/validate", post(routes::validate_room))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "planner_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let context = load_context()?;
    let addr = std::env::var("PLANNER_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Planner server running on http://{}", addr);
    axum::serve(listener, app(AppState::new(context))).await?;
    Ok(())
}
