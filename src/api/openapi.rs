//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models, services};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Qase Dashboard Server",
        version = "0.1.0",
        description = "Suite tree, root scoping and automation statistics over Qase test cases"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::info,
        // Session endpoints
        api::session::create_session,
        api::session::delete_session,
        // Dashboard endpoints
        api::dashboard::get_dashboard,
        api::dashboard::refresh_dashboard,
        api::dashboard::list_cases,
        api::dashboard::get_descendants,
        api::dashboard::toggle_selection,
        api::dashboard::select_all,
        api::dashboard::clear_selection,
        // Test case endpoints
        api::cases::get_case,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ServerInfoResponse,
            // Session
            models::CreateSessionRequest,
            models::CreateSessionResponse,
            models::RefreshStatus,
            models::RefreshResponse,
            // Dashboard
            services::scope::RootSpec,
            services::scope::RootSuite,
            models::TestSuite,
            models::SuiteTreeNode,
            models::DashboardStats,
            models::DistributionEntry,
            models::Distributions,
            models::LoadStateResponse,
            models::SelectionResponse,
            models::DashboardResponse,
            models::TestCaseListResponse,
            models::DescendantsResponse,
            // Test cases
            models::TestCase,
            models::TestStep,
            models::TestCaseDetail,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Session", description = "Login and logout with a Qase API token"),
        (name = "Dashboard", description = "Scoped suite tree, statistics and selection"),
        (name = "Test Cases", description = "Test case details")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add session header security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_id",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new("X-Session-Id"),
                    ),
                ),
            );
        }
    }
}
