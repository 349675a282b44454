//! API endpoint modules.

pub mod cases;
pub mod dashboard;
pub mod health;
pub mod openapi;
pub mod session;

pub use cases::configure_routes as configure_case_routes;
pub use dashboard::configure_routes as configure_dashboard_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use session::configure_routes as configure_session_routes;

use actix_web::web;

/// Register every `/api/v1` route.
pub fn configure_api_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_health_routes)
        .configure(configure_session_routes)
        .configure(configure_dashboard_routes)
        .configure(configure_case_routes);
}
