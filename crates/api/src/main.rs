use std::sync::Arc;

use nilecart_infra::{OutboxWorker, OutboxWorkerConfig};
use nilecart_notify::LogNotifier;

#[tokio::main]
async fn main() {
    nilecart_observability::init();

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let admin_email =
        std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@localhost".to_string());

    let services = Arc::new(nilecart_api::app::services::build_services(admin_email));

    // Notification dispatch runs beside the server for the process lifetime.
    let _outbox = OutboxWorker::spawn(
        services.db.clone(),
        Arc::new(LogNotifier),
        OutboxWorkerConfig::default(),
    );

    let app = nilecart_api::app::build_app(jwt_secret, services);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("failed to bind listen address");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
