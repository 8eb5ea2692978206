use axum::{
    routing::{get, patch, post},
    Router,
};
use placement_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let candidate_api = Router::new()
        .route("/api/applications", post(routes::applications::apply))
        .route(
            "/api/applications/withdraw",
            post(routes::applications::withdraw),
        )
        .route(
            "/api/candidates/:candidate_id/applications",
            get(routes::applications::list_applied),
        )
        .route(
            "/api/candidates/:candidate_id/interviews/upcoming",
            get(routes::interviews::upcoming_interviews),
        );

    let agency_api = Router::new()
        .route(
            "/api/applications/:id",
            get(routes::applications::get_application),
        )
        .route(
            "/api/applications/:id/status",
            patch(routes::applications::update_status),
        )
        .route(
            "/api/applications/:id/interview",
            post(routes::interviews::schedule_interview)
                .get(routes::interviews::get_latest_interview),
        )
        .route(
            "/api/applications/:id/interview/complete",
            post(routes::interviews::complete_interview),
        )
        .route(
            "/api/applications/:id/interview/:interview_id",
            patch(routes::interviews::reschedule_interview),
        )
        .route(
            "/api/postings/:posting_id/interviews/stats",
            get(routes::interviews::interview_stats),
        );

    let admin_api = Router::new().route(
        "/api/admin/applications/:id/correction",
        post(routes::admin::make_correction),
    );

    let app = base_routes
        .merge(candidate_api)
        .merge(agency_api)
        .merge(admin_api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
