//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{boats, health, uploads};

/// Registers the bearer token scheme referenced by the handlers
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Boat Budget API",
        version = "1.0.0",
        description = "Boat records, equipment checklists and refit budgets",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    modifiers(&BearerAuth),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Boats
        boats::list_boats,
        boats::get_boat,
        boats::get_budget,
        boats::create_boat,
        boats::update_boat,
        boats::delete_boat,
        boats::duplicate_boat,
        // Uploads
        uploads::upload_file,
    ),
    components(
        schemas(
            // Boats
            crate::models::boat::Boat,
            crate::models::boat::CreateBoat,
            crate::models::boat::UpdateBoat,
            crate::models::boat::BoatBudget,
            crate::models::boat::BudgetLine,
            crate::models::equipment::EquipmentItem,
            crate::models::equipment::Condition,
            // Uploads
            uploads::UploadForm,
            uploads::UploadResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "boats", description = "Boat records and budgets"),
        (name = "uploads", description = "Photo uploads")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
