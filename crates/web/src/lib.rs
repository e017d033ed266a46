use std::sync::Arc;

use axum::Router;
use storage::LeagueStore;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod error;
pub mod features;
pub mod middleware;

/// Shared handler state. Any [`LeagueStore`] can back the API.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LeagueStore>,
}

impl AppState {
    pub fn new(store: impl LeagueStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        features::climbers::handlers::list_climbers,
        features::climbers::handlers::get_climber,
        features::climbers::handlers::create_climber,
        features::climbers::handlers::check_promotion,
        features::climbers::handlers::resolve_promotion,
        features::climbers::handlers::recompute_score,
        features::climbers::handlers::list_climber_ascents,
        features::ascents::handlers::log_ascent,
        features::ascents::handlers::delete_ascent,
        features::ascents::handlers::get_points,
        features::leaderboard::handlers::get_leaderboard,
        features::voting::handlers::list_candidates,
        features::voting::handlers::propose_candidate,
        features::voting::handlers::withdraw_candidate,
        features::voting::handlers::get_ranking,
        features::voting::handlers::submit_ranking,
    ),
    components(
        schemas(
            storage::dto::climber::ClimberResponse,
            storage::dto::climber::ReconciliationRange,
            storage::dto::climber::CreateClimberRequest,
            storage::dto::climber::ResolvePromotionRequest,
            storage::dto::climber::LeaderboardEntry,
            storage::dto::ascent::AscentResponse,
            storage::dto::ascent::LogAscentRequest,
            storage::dto::ascent::LoggedAscentResponse,
            storage::dto::ascent::PointsResponse,
            storage::dto::voting::ProposeCandidateRequest,
            storage::dto::voting::SubmitRankingRequest,
            storage::dto::voting::RankedCandidate,
            storage::dto::voting::RankingResponse,
            storage::services::working_grade::PromotionOutcome,
            storage::models::Climber,
            storage::models::Ascent,
            storage::models::Candidate,
            storage::models::BallotEntry,
            storage::models::Subject,
            storage::models::SubjectKind,
        )
    ),
    tags(
        (name = "climbers", description = "Climber records and working-grade promotion"),
        (name = "ascents", description = "Logging sends and pricing them"),
        (name = "leaderboard", description = "League standings"),
        (name = "voting", description = "Nickname and profile photo elections"),
    ),
    modifiers(&IdentityAddon)
)]
pub struct ApiDoc;

struct IdentityAddon;

impl utoipa::Modify for IdentityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "climber_id",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new(
                            middleware::identity::CLIMBER_ID_HEADER,
                        ),
                    ),
                ),
            )
        }
    }
}

/// The full API: league routes under `/api` plus the Swagger UI.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .nest("/climbers", features::climbers::routes::routes())
        .nest("/leaderboard", features::leaderboard::routes::routes())
        .merge(features::ascents::routes::routes())
        .merge(features::voting::routes::routes());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api)
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
}
