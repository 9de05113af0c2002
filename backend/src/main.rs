use site_safety_portal::{
    AppState, FormRegistry, PolicyTable,
    config::{AppConfig, Env},
    create_router,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Initializes configuration, logging, the role policy table and the form registry,
/// then serves HTTP.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "site_safety_portal=debug,tower_http=info,axum=trace".into());

    // 3. Logging Format: pretty locally, JSON for log aggregation in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Role Policy Table: loaded once, read-only for the life of the process.
    let policies = match &config.policy_path {
        Some(path) => PolicyTable::from_file(path)
            .unwrap_or_else(|e| panic!("FATAL: invalid role policy table: {e}")),
        None => PolicyTable::portal_defaults(),
    };
    tracing::info!(
        roles = policies.len(),
        source = config.policy_path.as_deref().unwrap_or("built-in"),
        "Role policy table loaded"
    );

    // 5. Form Definitions: a malformed definition is a build defect, refuse to start.
    let forms = FormRegistry::builtin()
        .unwrap_or_else(|e| panic!("FATAL: invalid form definition: {e}"));
    tracing::info!(forms = forms.len(), "Form registry built");

    // 6. Router and Server Startup
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState::new(config, policies, forms));

    let listener = TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("FATAL: cannot bind {bind_addr}: {e}"));

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app).await.unwrap();
}
