use anyhow::Context;
use axum::Router;
use storage::Database;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod features;
mod middleware;

use config::Config;
use middleware::auth::ApiKeys;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::competitions::handlers::list_competitions,
        features::competitions::handlers::get_competition,
        features::competitions::handlers::create_competition,
        features::competitions::handlers::update_competition,
        features::competitions::handlers::delete_competition,
        features::submissions::handlers::list_submissions,
        features::submissions::handlers::list_athletes,
        features::submissions::handlers::create_submission,
        features::submissions::handlers::update_submission,
        features::submissions::handlers::delete_submission,
        features::leaderboard::handlers::get_leaderboard,
        features::leaderboard::handlers::rebuild_leaderboard,
    ),
    components(
        schemas(
            storage::dto::competition::CreateCompetitionRequest,
            storage::dto::competition::UpdateCompetitionRequest,
            storage::dto::competition::DivisionInput,
            storage::dto::competition::WodInput,
            storage::dto::competition::CompetitionResponse,
            storage::dto::competition::CompetitionDetailResponse,
            storage::dto::submission::CreateSubmissionRequest,
            storage::dto::submission::UpdateSubmissionRequest,
            storage::dto::leaderboard::RebuildResponse,
            storage::dto::common::PaginationMeta,
            storage::models::Competition,
            storage::models::Division,
            storage::models::Wod,
            storage::models::MetricConfig,
            storage::models::MetricKind,
            storage::models::SortOrder,
            storage::models::Submission,
            storage::models::LeaderboardRow,
            storage::models::EventResult,
        )
    ),
    tags(
        (name = "competitions", description = "Competitions with their divisions and WODs"),
        (name = "submissions", description = "Raw athlete scores"),
        (name = "leaderboard", description = "Materialized competition rankings"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

fn app(db: Database, api_keys: ApiKeys) -> Router {
    let competition_scoped = features::submissions::routes(api_keys.clone())
        .merge(features::leaderboard::routes(api_keys.clone()));

    Router::new()
        .nest("/api/competitions", features::competitions::routes(api_keys))
        .nest("/api/competitions/:handle", competition_scoped)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(db)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting leaderboard API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let api_keys = ApiKeys::from_comma_separated(&config.api_keys);
    if api_keys.is_empty() {
        tracing::warn!("API_KEYS is empty, every mutating endpoint will answer 401");
    }

    let bind_address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    axum::serve(listener, app(db, api_keys)).await?;

    Ok(())
}
