use http::header::{COOKIE, HeaderValue, SET_COOKIE};
use http::{HeaderMap, Request, Response};
use sealed_session::{CookieOptions, KeyRing, SessionConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSession {
    pub user_id: u64,
    pub roles: Vec<String>,
}

pub fn sample_session() -> UserSession {
    UserSession {
        user_id: 1001,
        roles: vec!["admin".to_string(), "billing".to_string()],
    }
}

pub fn create_test_config(secrets: &[&str]) -> SessionConfig {
    SessionConfig::new(KeyRing::from_secrets(secrets)).with_cookie(CookieOptions {
        max_age: 3600,
        ..Default::default()
    })
}

/// Builds the request a browser would send back after receiving `response`.
pub fn browser_request<B>(response: &Response<B>) -> Request<()> {
    let mut builder = Request::builder().uri("https://example.com/");
    for value in response.headers().get_all(SET_COOKIE) {
        let pair = value.to_str().unwrap().split(';').next().unwrap();
        builder = builder.header(COOKIE, HeaderValue::from_str(pair).unwrap());
    }
    builder.body(()).unwrap()
}

pub fn set_cookie_values(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}
