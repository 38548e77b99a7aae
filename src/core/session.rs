//! Session cookie management.
//!
//! Reads and writes encrypted session tokens through HTTP cookies, or reads
//! them from the `Authorization` header for API clients.

use http::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{trace, warn};

use super::codec::{decode, encode};
use super::headers::{
    MAX_COOKIE_LEN, authorization_token, format_clear_cookie, format_set_cookie,
    replace_set_cookie, request_cookie,
};
use crate::config::{Result, SessionConfig, SessionError};

/// Encodes `value` into the session cookie on `headers`.
///
/// Any existing `Set-Cookie` entry for the same cookie name is replaced, so
/// calling this twice on one response leaves only the latest session.
///
/// # Errors
///
/// Returns the errors of [`encode`], `SessionError::InvalidCookie` if the
/// cookie attributes are invalid, and `SessionError::TooLong` if the cookie
/// would exceed the browser limit. `headers` is untouched on error.
pub fn set_session<T: Serialize + ?Sized>(
    headers: &mut HeaderMap,
    value: &T,
    config: &SessionConfig,
) -> Result<()> {
    config.cookie.validate()?;
    let token = encode(value, config)?;
    let cookie = format_set_cookie(&token, &config.cookie);
    if cookie.len() > MAX_COOKIE_LEN {
        warn!(
            cookie = %config.cookie.name,
            len = cookie.len(),
            max = MAX_COOKIE_LEN,
            action = "SET_SESSION",
            "Session cookie too long"
        );
        return Err(SessionError::TooLong {
            len: cookie.len(),
            max: MAX_COOKIE_LEN,
        });
    }
    replace_set_cookie(headers, &config.cookie.name, &cookie)
}

/// Decodes the session cookie from request `headers`.
///
/// Any error means no valid session was presented. In production, treat
/// every error the same way, as an unauthenticated request; the variants
/// are mostly useful for debugging.
///
/// # Errors
///
/// Returns `SessionError::NotFound` if the cookie is absent, otherwise the
/// errors of [`decode`].
pub fn get_session<T: DeserializeOwned>(headers: &HeaderMap, config: &SessionConfig) -> Result<T> {
    let Some(token) = request_cookie(headers, &config.cookie.name) else {
        trace!(cookie = %config.cookie.name, "No session cookie");
        return Err(SessionError::NotFound);
    };
    decode(token, config)
}

/// Decodes a session token from the `Authorization` header.
///
/// Accepts `Basic` credentials carrying the token as the username, or
/// `Bearer` credentials carrying it directly.
///
/// # Errors
///
/// Returns `SessionError::NotFound` if no usable credentials are present,
/// otherwise the errors of [`decode`].
pub fn get_bearer_token<T: DeserializeOwned>(
    headers: &HeaderMap,
    config: &SessionConfig,
) -> Result<T> {
    let Some(token) = authorization_token(headers) else {
        trace!("No authorization token");
        return Err(SessionError::NotFound);
    };
    decode(&token, config)
}

/// Tells the browser to drop the session cookie.
///
/// # Errors
///
/// Returns `SessionError::InvalidCookie` if the cookie attributes are
/// invalid.
pub fn clear_session(headers: &mut HeaderMap, config: &SessionConfig) -> Result<()> {
    config.cookie.validate()?;
    let cookie = format_clear_cookie(&config.cookie);
    replace_set_cookie(headers, &config.cookie.name, &cookie)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_config;
    use http::header::{AUTHORIZATION, COOKIE, HeaderValue, SET_COOKIE};
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Login {
        user_id: u64,
    }

    fn request_from(response: &HeaderMap) -> HeaderMap {
        let set_cookie = response.get(SET_COOKIE).unwrap().to_str().unwrap();
        let pair = set_cookie.split(';').next().unwrap();
        let mut request = HeaderMap::new();
        request.insert(COOKIE, HeaderValue::from_str(pair).unwrap());
        request
    }

    #[test]
    fn test_set_get_roundtrip() {
        let config = create_test_config();
        let mut response = HeaderMap::new();
        set_session(&mut response, &Login { user_id: 7 }, &config).unwrap();

        let request = request_from(&response);
        let login: Login = get_session(&request, &config).unwrap();
        assert_eq!(login, Login { user_id: 7 });
    }

    #[test]
    fn test_get_missing_cookie() {
        let config = create_test_config();
        let mut request = HeaderMap::new();
        request.insert(COOKIE, HeaderValue::from_static("other=1"));
        let err = get_session::<Login>(&request, &config).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_get_garbage_cookie() {
        let config = create_test_config();
        let mut request = HeaderMap::new();
        request.insert(COOKIE, HeaderValue::from_static("session=garbage"));
        assert!(matches!(
            get_session::<Login>(&request, &config),
            Err(SessionError::InvalidToken)
        ));
    }

    #[test]
    fn test_set_twice_replaces() {
        let config = create_test_config();
        let mut response = HeaderMap::new();
        set_session(&mut response, &Login { user_id: 1 }, &config).unwrap();
        set_session(&mut response, &Login { user_id: 2 }, &config).unwrap();

        assert_eq!(response.get_all(SET_COOKIE).iter().count(), 1);
        let login: Login = get_session(&request_from(&response), &config).unwrap();
        assert_eq!(login.user_id, 2);
    }

    #[test]
    fn test_too_long_writes_nothing() {
        let config = create_test_config();
        let mut response = HeaderMap::new();
        let huge = "x".repeat(4_000);
        assert!(matches!(
            set_session(&mut response, &huge, &config),
            Err(SessionError::TooLong { max: 4093, .. })
        ));
        assert!(response.get(SET_COOKIE).is_none());
    }

    #[test]
    fn test_size_limit_boundary() {
        let config = create_test_config();
        let cookie_len = |payload: &str| {
            let token = encode(&payload, &config).unwrap();
            format_set_cookie(&token, &config.cookie).len()
        };

        let fits = (2_900..3_100)
            .map(|n| "x".repeat(n))
            .find(|p| cookie_len(p) == MAX_COOKIE_LEN)
            .expect("no payload formats to exactly the limit");
        let mut response = HeaderMap::new();
        set_session(&mut response, &fits, &config).unwrap();
        let written: Vec<_> = response.get_all(SET_COOKIE).iter().collect();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].len(), MAX_COOKIE_LEN);

        let over = format!("{fits}x");
        assert_eq!(cookie_len(&over), MAX_COOKIE_LEN + 1);
        let mut response = HeaderMap::new();
        assert!(matches!(
            set_session(&mut response, &over, &config),
            Err(SessionError::TooLong { len: 4094, max: 4093 })
        ));
        assert!(response.is_empty());
    }

    #[test]
    fn test_invalid_cookie_name_writes_nothing() {
        let mut config = create_test_config();
        config.cookie.name = "bad name".to_string();
        let mut response = HeaderMap::new();
        assert!(matches!(
            set_session(&mut response, &Login { user_id: 1 }, &config),
            Err(SessionError::InvalidCookie(_))
        ));
        assert!(response.is_empty());
    }

    #[test]
    fn test_bearer_token() {
        let config = create_test_config();
        let token = encode(&Login { user_id: 9 }, &config).unwrap();

        let mut request = HeaderMap::new();
        request.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        let login: Login = get_bearer_token(&request, &config).unwrap();
        assert_eq!(login.user_id, 9);

        assert!(get_bearer_token::<Login>(&HeaderMap::new(), &config)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_clear_session() {
        let config = create_test_config();
        let mut response = HeaderMap::new();
        set_session(&mut response, &Login { user_id: 1 }, &config).unwrap();
        clear_session(&mut response, &config).unwrap();

        let values: Vec<&str> = response
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(values.len(), 1);
        assert!(values[0].starts_with("session=;"));
        assert!(values[0].contains("Max-Age=0"));
    }
}
