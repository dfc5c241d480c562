//! API key verification endpoint

use actix_web::{HttpResponse, post, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::service::NewsService;
use crate::service::api_key::{KeyCheck, verify_api_key};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyKeyRequest {
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Check an API key's format and whether the provider accepts it
///
/// Rejected keys are reported in the body with `isValid: false`; only a
/// missing key is a 400.
#[utoipa::path(
    post,
    path = "/v1/keys/verify",
    request_body = VerifyKeyRequest,
    responses(
        (status = 200, description = "Verification outcome", body = KeyCheck),
        (status = 400, description = "No key supplied", body = KeyCheck)
    ),
    tag = "keys"
)]
#[post("/v1/keys/verify")]
pub async fn verify_key(
    service: web::Data<NewsService>,
    body: web::Json<VerifyKeyRequest>,
) -> HttpResponse {
    let api_key = match body.into_inner().api_key {
        Some(key) if !key.trim().is_empty() => key,
        _ => return HttpResponse::BadRequest().json(KeyCheck::invalid("API key is required")),
    };

    let check = verify_api_key(service.backend(), &api_key).await;
    if !check.is_valid {
        tracing::info!(error = ?check.error, "API key rejected");
    }

    HttpResponse::Ok().json(check)
}

/// Configure key routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(verify_key);
}
