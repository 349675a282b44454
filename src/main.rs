//! Qase Dashboard Server binary.
//!
//! Reads configuration from the environment, then serves the dashboard API, its
//! OpenAPI docs and (optionally) the built frontend.

use std::path::PathBuf;

use actix_cors::Cors;
use actix_files::{Files, NamedFile};
use actix_web::{App, HttpRequest, HttpServer, Result as ActixResult, http::header, web};
use tracing::{Level, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use qase_dashboard_lib::api::{self, ApiDoc};
use qase_dashboard_lib::config::Config;
use qase_dashboard_lib::middleware::RequestLogger;
use qase_dashboard_lib::services::{QaseClient, SessionStore};

/// Vite and CRA dev servers allowed in development.
const DEV_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://127.0.0.1:5173",
    "http://localhost:3000",
];

fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Exit with a hint when the environment does not describe a usable server.
fn load_config_or_exit() -> Config {
    match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            error!("Check RUST_ENV, QASE_API_BASE, QASE_PROJECT_CODE and QD_* variables.");
            error!("Production requires an https QASE_API_BASE.");
            std::process::exit(1);
        }
    }
}

fn cors(origins: &[String], is_development: bool) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-session-id"),
        ])
        .max_age(3600);

    let dev_origins = DEV_ORIGINS.iter().copied().filter(|_| is_development);
    for origin in dev_origins.chain(origins.iter().map(String::as_str)) {
        cors = cors.allowed_origin(origin);
    }
    cors
}

/// Serve index.html for any unmatched path so client-side routing works.
async fn spa_fallback(req: HttpRequest) -> ActixResult<NamedFile> {
    let dir = req
        .app_data::<web::Data<PathBuf>>()
        .ok_or_else(|| actix_web::error::ErrorNotFound("Frontend not configured"))?;
    Ok(NamedFile::open(dir.join("index.html"))?)
}

/// Built frontend: hashed assets plus the SPA fallback.
fn configure_frontend(dir: PathBuf) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.service(Files::new("/assets", dir.join("assets")).prefer_utf8(true))
            .app_data(web::Data::new(dir))
            .default_service(web::route().to(spa_fallback));
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Docker HEALTHCHECK: succeed when the configuration loads
    if std::env::args().any(|arg| arg == "--health-check") {
        dotenvy::dotenv().ok();
        std::process::exit(if Config::from_env().is_ok() { 0 } else { 1 });
    }

    dotenvy::dotenv().ok();
    init_tracing();

    let config = load_config_or_exit();
    info!(
        environment = %config.environment,
        project = %config.qase.project_code,
        root = ?config.root_suite.spec,
        root_name = %config.root_suite.display_name,
        "Qase dashboard starting"
    );
    if config.is_development() {
        warn!("Development mode: relaxed CORS, do not expose publicly");
    }

    let client = QaseClient::new(&config.qase).unwrap_or_else(|e| {
        error!("Failed to build Qase client: {}", e);
        std::process::exit(1);
    });
    let store = SessionStore::new(
        client,
        config.root_suite.clone(),
        config.required_suite_ids.clone(),
    );

    let workers = if config.is_development() {
        4
    } else {
        num_cpus::get()
    };
    let bind_address = config.bind_address();
    info!("Listening on http://{} with {} workers", bind_address, workers);
    if let Some(dir) = &config.static_dir {
        info!("Serving frontend from {}", dir.display());
    }

    let static_dir = config.static_dir.clone();
    let cors_origins = config.cors_origins.clone();
    let is_development = config.is_development();

    HttpServer::new(move || {
        let mut app = App::new()
            .wrap(cors(&cors_origins, is_development))
            .wrap(RequestLogger::default())
            .app_data(web::Data::new(store.clone()))
            .service(web::scope("/api/v1").configure(api::configure_api_routes))
            .service(
                SwaggerUi::new("/api/docs/{_:.*}")
                    .url("/api/docs/openapi.json", ApiDoc::openapi()),
            );
        if let Some(dir) = &static_dir {
            app = app.configure(configure_frontend(dir.clone()));
        }
        app
    })
    .workers(workers)
    .bind(&bind_address)?
    .run()
    .await
}
