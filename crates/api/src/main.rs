use std::sync::Arc;

use storders_api::app::{build_app, AppState};
use storders_api::config::Config;
use storders_infra::PostgresStore;

#[tokio::main]
async fn main() {
    storders_observability::init();

    let config = Config::from_env();

    let store = PostgresStore::connect(&config.database_url)
        .await
        .expect("failed to connect to database");
    store.migrate().await.expect("failed to run migrations");

    let app = build_app(AppState::from_store(Arc::new(store)));

    let listener = tokio::net::TcpListener::bind(config.addr())
        .await
        .expect("failed to bind listener");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
