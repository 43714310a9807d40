use migration::MigratorTrait;
use sea_orm::Database;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::todo::TodoState;
use crate::todo::api::v1::create_api_router;

/// OpenAPI documentation for the to-do API.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::todo::api::v1::create_todo_handler,
        crate::todo::api::v1::read_todo_handler,
        crate::todo::api::v1::update_todo_handler,
        crate::todo::api::v1::delete_todo_handler,
        crate::todo::api::v1::read_all_todos_handler,
    ),
    tags(
        (name = "Todos", description = "To-do item CRUD operations")
    )
)]
pub struct ApiDoc;

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    use axum::Router;

    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("To-do server running on http://{}", server_address);

    let db = Database::connect(&config.db_url).await?;
    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let todo_state = Arc::new(TodoState { db: Arc::new(db) });

    // Create the API router with the pooled database handle as shared state
    let api_router = create_api_router(todo_state);

    let app = Router::new()
        .nest("/api/v1", api_router)
        .route("/health", axum::routing::get(health_check_handler))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        );

    axum::serve(listener, app).await?;
    Ok(())
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}
