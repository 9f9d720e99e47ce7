use dotenvy::dotenv;
use tracing::info;

use batchwise::logging::init_tracing;
use batchwise::router::init_router;
use batchwise::state::init_app_state;

#[tokio::main]
async fn main() {
    dotenv().ok();

    init_tracing();

    let state = init_app_state().await;
    let app = init_router(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000")
        .await
        .expect("Failed to bind to 0.0.0.0:3000");
    info!("Server running on http://localhost:3000");
    info!("Swagger UI available at http://localhost:3000/swagger-ui");
    info!("Scalar UI available at http://localhost:3000/scalar");
    axum::serve(listener, app).await.expect("Server error");
}
