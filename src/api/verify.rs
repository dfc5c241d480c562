//! REST API endpoints for headline verification

use actix_web::{HttpRequest, HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::{ApiError, bearer_key};
use crate::model::{HeadlineAnalysis, RelatedArticle, VerificationResult};
use crate::service::{AnalysisRequest, NewsService};

/// Headline submitted for verification
#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyRequest {
    /// News headline or URL
    #[serde(default, alias = "headline")]
    pub query: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyResponse {
    pub query: String,
    pub results: Vec<VerificationResult>,
}

/// Content for a single-verdict analysis; one of the fields is required
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    pub url: Option<String>,
    pub headline: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RelatedResponse {
    pub query: String,
    pub articles: Vec<RelatedArticle>,
}

/// Verify a news headline
///
/// Returns generated articles with a verdict, confidence score and sources.
#[utoipa::path(
    post,
    path = "/v1/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Verification results", body = VerifyResponse),
        (status = 400, description = "Empty headline", body = crate::api::error::ErrorResponse),
        (status = 401, description = "Missing or rejected API key", body = crate::api::error::ErrorResponse),
        (status = 429, description = "Provider quota exceeded", body = crate::api::error::ErrorResponse),
        (status = 502, description = "Provider failure", body = crate::api::error::ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "verification"
)]
#[post("/v1/verify")]
pub async fn verify_headline(
    req: HttpRequest,
    service: web::Data<NewsService>,
    body: web::Json<VerifyRequest>,
) -> Result<HttpResponse, ApiError> {
    let api_key = bearer_key(&req);
    let query = body.into_inner().query;

    let results = service
        .verify_headline(api_key.as_deref(), &query)
        .await?;

    Ok(HttpResponse::Ok().json(VerifyResponse {
        query: query.trim().to_string(),
        results,
    }))
}

/// Analyze the credibility of a single URL or headline
#[utoipa::path(
    post,
    path = "/v1/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Credibility analysis", body = HeadlineAnalysis),
        (status = 400, description = "Neither URL nor headline given", body = crate::api::error::ErrorResponse),
        (status = 401, description = "Missing or rejected API key", body = crate::api::error::ErrorResponse),
        (status = 502, description = "Provider failure", body = crate::api::error::ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "verification"
)]
#[post("/v1/analyze")]
pub async fn analyze(
    req: HttpRequest,
    service: web::Data<NewsService>,
    body: web::Json<AnalyzeRequest>,
) -> Result<HttpResponse, ApiError> {
    let api_key = bearer_key(&req);
    let body = body.into_inner();

    let analysis = service
        .analyze(
            api_key.as_deref(),
            AnalysisRequest {
                url: body.url,
                headline: body.headline,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(analysis))
}

/// Related supporting, debunking and neutral articles for a headline
#[utoipa::path(
    post,
    path = "/v1/related",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Related articles", body = RelatedResponse),
        (status = 400, description = "Empty headline", body = crate::api::error::ErrorResponse),
        (status = 401, description = "Missing or rejected API key", body = crate::api::error::ErrorResponse),
        (status = 502, description = "Provider failure", body = crate::api::error::ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "verification"
)]
#[post("/v1/related")]
pub async fn related_articles(
    req: HttpRequest,
    service: web::Data<NewsService>,
    body: web::Json<VerifyRequest>,
) -> Result<HttpResponse, ApiError> {
    let api_key = bearer_key(&req);
    let query = body.into_inner().query;

    let articles = service
        .related_articles(api_key.as_deref(), &query)
        .await?;

    Ok(HttpResponse::Ok().json(RelatedResponse {
        query: query.trim().to_string(),
        articles,
    }))
}

/// Configure verification routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(verify_headline)
        .service(analyze)
        .service(related_articles);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::news_service;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::{Value, json};

    const REPLY: &str = r#"```json
[{"id": 1, "title": "t", "source": "s", "status": "fake", "confidence": 90, "summary": "x", "sources": []}]
```"#;

    #[actix_web::test]
    async fn test_verify_returns_results() {
        let data = web::Data::new(news_service(Ok(REPLY), None));
        let app = test::init_service(App::new().app_data(data).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/v1/verify")
            .insert_header(("Authorization", "Bearer AIzaUserKey12345"))
            .set_json(json!({"query": " Aliens land in Paris "}))
            .to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp["query"], "Aliens land in Paris");
        assert_eq!(resp["results"][0]["status"], "fake");
        assert_eq!(resp["results"][0]["id"], "1");
    }

    #[actix_web::test]
    async fn test_verify_without_key_is_unauthorized() {
        let data = web::Data::new(news_service(Ok(REPLY), None));
        let app = test::init_service(App::new().app_data(data).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/v1/verify")
            .set_json(json!({"query": "headline"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "auth");
        assert_eq!(body["retryable"], false);
    }

    #[actix_web::test]
    async fn test_verify_quota_maps_to_429() {
        let data = web::Data::new(news_service(
            Err((reqwest::StatusCode::TOO_MANY_REQUESTS, "quota exhausted")),
            Some("AIzaServerKey123"),
        ));
        let app = test::init_service(App::new().app_data(data).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/v1/verify")
            .set_json(json!({"query": "headline"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[actix_web::test]
    async fn test_analyze_requires_url_or_headline() {
        let data = web::Data::new(news_service(Ok(REPLY), Some("AIzaServerKey123")));
        let app = test::init_service(App::new().app_data(data).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/v1/analyze")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_malformed_body_uses_error_response() {
        let data = web::Data::new(news_service(Ok(REPLY), Some("AIzaServerKey123")));
        let app = test::init_service(
            App::new()
                .app_data(data)
                .app_data(crate::api::json_config())
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/v1/verify")
            .insert_header(("Content-Type", "application/json"))
            .set_payload(r#"{"query": "#)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "bad_request");
        assert_eq!(body["retryable"], false);
        assert!(body["request_id"].is_string());
    }
}
