//! OpenAPI specification endpoints

use actix_web::{HttpResponse, get};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::{ApiError, feeds, health, keys, verify};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "newscheck",
        description = "Headline credibility checks and misinformation feeds generated by an OpenAI-compatible LLM"
    ),
    paths(
        verify::verify_headline,
        verify::analyze,
        verify::related_articles,
        feeds::trending,
        feeds::archive,
        keys::verify_key,
        health::liveness,
        health::readiness,
    ),
    components(schemas(
        crate::model::Verdict,
        crate::model::SourceLink,
        crate::model::VerificationResult,
        crate::model::HeadlineAnalysis,
        crate::model::RelatedArticle,
        crate::model::TrendingArticle,
        crate::model::Votes,
        crate::model::ArchivedArticle,
        crate::model::AiErrorKind,
        crate::api::error::ErrorResponse,
        crate::service::api_key::KeyCheck,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "verification", description = "Headline verification"),
        (name = "feeds", description = "Trending and archived articles"),
        (name = "keys", description = "API key checks"),
        (name = "health", description = "Probes")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` scheme carrying the user's AI provider key
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

/// Serve OpenAPI JSON specification
#[get("/openapi.json")]
pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Serve OpenAPI YAML specification
#[get("/openapi.yaml")]
pub async fn openapi_yaml() -> Result<HttpResponse, ApiError> {
    let yaml = ApiDoc::openapi()
        .to_yaml()
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().content_type("text/yaml").body(yaml))
}

/// Configure OpenAPI routes
pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(openapi_json).service(openapi_yaml);
}
