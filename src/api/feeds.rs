//! REST API endpoints for the trending and archive feeds

use actix_web::{HttpRequest, HttpResponse, get, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::{ApiError, bearer_key};
use crate::model::{ArchivedArticle, TrendingArticle, Verdict};
use crate::service::{ArchiveFilter, NewsService};

/// Query parameters for the trending feed
#[derive(Debug, Deserialize, IntoParams)]
pub struct TrendingParams {
    /// Only return articles with this verdict (fake, questionable, verified or all)
    pub status: Option<String>,
}

/// Query parameters for the archive feed
#[derive(Debug, Deserialize, IntoParams)]
pub struct ArchiveParams {
    /// Case-insensitive keyword matched against titles
    pub q: Option<String>,
    /// Category name, or "all"
    pub category: Option<String>,
    /// Verdict (fake, questionable, verified) or "all"
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrendingResponse {
    pub articles: Vec<TrendingArticle>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ArchiveResponse {
    pub articles: Vec<ArchivedArticle>,
    pub generated_at: DateTime<Utc>,
}

/// Parse a status filter where empty and "all" mean no filter
fn parse_status(raw: Option<&str>) -> Result<Option<Verdict>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("all") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(ApiError::BadRequest),
    }
}

/// Trending misinformation feed
#[utoipa::path(
    get,
    path = "/v1/trending",
    params(TrendingParams),
    responses(
        (status = 200, description = "Trending articles", body = TrendingResponse),
        (status = 400, description = "Unknown status filter", body = crate::api::error::ErrorResponse),
        (status = 401, description = "Missing or rejected API key", body = crate::api::error::ErrorResponse),
        (status = 502, description = "Provider failure", body = crate::api::error::ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "feeds"
)]
#[get("/v1/trending")]
pub async fn trending(
    req: HttpRequest,
    service: web::Data<NewsService>,
    query: web::Query<TrendingParams>,
) -> Result<HttpResponse, ApiError> {
    let status = parse_status(query.status.as_deref())?;
    let api_key = bearer_key(&req);

    let feed = service.trending(api_key.as_deref(), status).await?;

    Ok(HttpResponse::Ok().json(TrendingResponse {
        articles: feed.articles,
        generated_at: feed.generated_at,
    }))
}

/// Archive of previously generated articles
#[utoipa::path(
    get,
    path = "/v1/archive",
    params(ArchiveParams),
    responses(
        (status = 200, description = "Archived articles", body = ArchiveResponse),
        (status = 400, description = "Unknown status filter", body = crate::api::error::ErrorResponse),
        (status = 401, description = "Missing or rejected API key", body = crate::api::error::ErrorResponse),
        (status = 502, description = "Provider failure", body = crate::api::error::ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "feeds"
)]
#[get("/v1/archive")]
pub async fn archive(
    req: HttpRequest,
    service: web::Data<NewsService>,
    query: web::Query<ArchiveParams>,
) -> Result<HttpResponse, ApiError> {
    let params = query.into_inner();
    let filter = ArchiveFilter {
        keyword: params.q,
        category: params.category,
        status: parse_status(params.status.as_deref())?,
    };
    let api_key = bearer_key(&req);

    let feed = service.archive(api_key.as_deref(), &filter).await?;

    tracing::debug!(
        returned = feed.articles.len(),
        keyword = ?filter.keyword,
        category = ?filter.category,
        "Archive feed filtered"
    );

    Ok(HttpResponse::Ok().json(ArchiveResponse {
        articles: feed.articles,
        generated_at: feed.generated_at,
    }))
}

/// Configure feed routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(trending).service(archive);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::news_service;
    use actix_web::http::StatusCode;
    use actix_web::App;
    use actix_web::test::{TestRequest, call_and_read_body_json, call_service, init_service};
    use serde_json::Value;

    const ARCHIVE_REPLY: &str = r#"```json
[
  {"id": 1, "title": "5G towers spread illness", "category": "Technology", "date": "March 15, 2024", "status": "fake", "summary": "Debunked."},
  {"id": 2, "title": "Exercise improves mood", "category": "Health", "date": "February 5, 2024", "status": "verified", "summary": "Peer reviewed."}
]
```"#;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status(None).unwrap(), None);
        assert_eq!(parse_status(Some("ALL")).unwrap(), None);
        assert_eq!(parse_status(Some(" fake ")).unwrap(), Some(Verdict::Fake));
        assert!(parse_status(Some("bogus")).is_err());
    }

    #[actix_web::test]
    async fn test_archive_applies_query_filters() {
        let data = web::Data::new(news_service(Ok(ARCHIVE_REPLY), Some("AIzaServerKey123")));
        let app = init_service(App::new().app_data(data).configure(configure)).await;

        let req = TestRequest::get()
            .uri("/v1/archive?category=health&status=all")
            .to_request();
        let resp: Value = call_and_read_body_json(&app, req).await;

        let articles = resp["articles"].as_array().unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0]["title"], "Exercise improves mood");
        assert!(resp["generated_at"].is_string());
    }

    #[actix_web::test]
    async fn test_trending_rejects_unknown_status() {
        let data = web::Data::new(news_service(Ok("[]"), Some("AIzaServerKey123")));
        let app = init_service(App::new().app_data(data).configure(configure)).await;

        let req = TestRequest::get()
            .uri("/v1/trending?status=maybe")
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_malformed_query_uses_error_response() {
        let data = web::Data::new(news_service(Ok(ARCHIVE_REPLY), Some("AIzaServerKey123")));
        let app = init_service(
            App::new()
                .app_data(data)
                .app_data(crate::api::query_config())
                .configure(configure),
        )
        .await;

        let req = TestRequest::get()
            .uri("/v1/archive?q=vaccine&q=5g")
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = actix_web::test::read_body_json(resp).await;
        assert_eq!(body["error"], "bad_request");
        assert!(body["request_id"].is_string());
    }
}
