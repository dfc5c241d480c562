pub mod error;
pub mod feeds;
pub mod health;
pub mod keys;
pub mod openapi;
pub mod verify;

#[cfg(test)]
pub(crate) mod test_support;

use actix_web::http::header::AUTHORIZATION;
use actix_web::{HttpRequest, web};

pub use error::ApiError;

/// JSON body extractor whose failures use the standard error body
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into())
}

/// Query string extractor whose failures use the standard error body
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into())
}

/// API key carried in an `Authorization: Bearer <key>` header
pub(crate) fn bearer_key(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?.trim();
    let key = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();

    (!key.is_empty()).then(|| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_key_extraction() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer AIzaKey123456"))
            .to_http_request();
        assert_eq!(bearer_key(&req).as_deref(), Some("AIzaKey123456"));

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Basic abc"))
            .to_http_request();
        assert_eq!(bearer_key(&req), None);

        let req = TestRequest::default().to_http_request();
        assert_eq!(bearer_key(&req), None);
    }
}
