use obras_api::{app_router, AppState, RestIdentityProvider};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("obras_api=info".parse()?))
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| "DATABASE_URL no configurada")?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    let identity = RestIdentityProvider::from_env()
        .ok_or("IDENTITY_API_KEY no configurada")?;
    let state = AppState {
        pool,
        identity: Arc::new(identity),
    };

    let app = app_router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);
    let listener = TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    tracing::info!("API escuchando en http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
