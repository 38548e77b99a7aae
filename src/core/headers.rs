//! Cookie and authorization header handling.
//!
//! Formats `Set-Cookie` values, replaces same-named entries in a response
//! `HeaderMap`, and pulls session tokens out of `Cookie` and
//! `Authorization` request headers.

use std::fmt::Write as _;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use http::HeaderMap;
use http::header::{AUTHORIZATION, COOKIE, HeaderValue, SET_COOKIE};

use crate::config::{CookieOptions, Result, SessionError};

/// Browsers silently drop cookies longer than this.
pub const MAX_COOKIE_LEN: usize = 4093;

const MAX_DOMAIN_LEN: usize = 255;

const fn is_token_char(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
        )
}

/// Cookie names must be non-empty HTTP tokens.
///
/// # Errors
///
/// Returns `SessionError::InvalidCookie` otherwise.
pub fn validate_cookie_name(name: &str) -> Result<()> {
    if name.is_empty() || !name.bytes().all(is_token_char) {
        return Err(SessionError::InvalidCookie(format!(
            "invalid cookie name '{name}'"
        )));
    }
    Ok(())
}

/// Paths may hold any printable ASCII except `;`.
///
/// # Errors
///
/// Returns `SessionError::InvalidCookie` otherwise.
pub fn validate_cookie_path(path: &str) -> Result<()> {
    if path.bytes().any(|b| !(0x20..0x7f).contains(&b) || b == b';') {
        return Err(SessionError::InvalidCookie(format!(
            "invalid cookie path '{path}'"
        )));
    }
    Ok(())
}

/// Domains are dot-separated labels of letters, digits and hyphens. A single
/// leading dot is tolerated and dropped when formatting.
///
/// # Errors
///
/// Returns `SessionError::InvalidCookie` otherwise.
pub fn validate_cookie_domain(domain: &str) -> Result<()> {
    let host = domain.strip_prefix('.').unwrap_or(domain);
    let valid = !host.is_empty()
        && host.len() <= MAX_DOMAIN_LEN
        && host.split('.').all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        });
    if !valid {
        return Err(SessionError::InvalidCookie(format!(
            "invalid cookie domain '{domain}'"
        )));
    }
    Ok(())
}

/// Formats a `Set-Cookie` value carrying `value` with the attributes in
/// `options`.
#[must_use]
pub fn format_set_cookie(value: &str, options: &CookieOptions) -> String {
    format_with_max_age(value, options, options.max_age)
}

/// Formats a `Set-Cookie` value that makes the browser drop the cookie.
#[must_use]
pub fn format_clear_cookie(options: &CookieOptions) -> String {
    format_with_max_age("", options, 0)
}

fn format_with_max_age(value: &str, options: &CookieOptions, max_age: u64) -> String {
    let mut cookie = format!("{}={value}", options.name);
    if !options.path.is_empty() {
        cookie.push_str("; Path=");
        cookie.push_str(&options.path);
    }
    if let Some(domain) = &options.domain {
        cookie.push_str("; Domain=");
        cookie.push_str(domain.strip_prefix('.').unwrap_or(domain));
    }
    let _ = write!(cookie, "; Max-Age={max_age}");
    if options.http_only {
        cookie.push_str("; HttpOnly");
    }
    if options.secure {
        cookie.push_str("; Secure");
    }
    cookie.push_str("; SameSite=");
    cookie.push_str(options.same_site.as_str());
    cookie
}

/// Returns the cookie name of a `Set-Cookie` value.
#[must_use]
pub fn set_cookie_name(set_cookie: &str) -> Option<&str> {
    let (name, _) = set_cookie.split(';').next()?.split_once('=')?;
    let name = name.trim();
    (!name.is_empty()).then_some(name)
}

/// Writes `cookie` into `headers`, replacing any `Set-Cookie` entry with the
/// same name.
///
/// The first same-named entry is replaced in place and later duplicates are
/// dropped, so exactly one entry for `name` remains. Entries for other
/// cookies keep their order. Without a match, the cookie is appended.
///
/// # Errors
///
/// Returns `SessionError::InvalidCookie` if `cookie` is not a valid header
/// value.
pub fn replace_set_cookie(headers: &mut HeaderMap, name: &str, cookie: &str) -> Result<()> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|e| SessionError::InvalidCookie(format!("invalid header value: {e}")))?;

    let existing: Vec<HeaderValue> = headers.get_all(SET_COOKIE).iter().cloned().collect();
    if existing.is_empty() {
        headers.append(SET_COOKIE, value);
        return Ok(());
    }

    headers.remove(SET_COOKIE);
    let mut replacement = Some(value);
    for old in existing {
        let same_name = old
            .to_str()
            .ok()
            .and_then(set_cookie_name)
            .is_some_and(|n| n == name);
        if !same_name {
            headers.append(SET_COOKIE, old);
        } else if let Some(new) = replacement.take() {
            headers.append(SET_COOKIE, new);
        }
    }
    if let Some(new) = replacement {
        headers.append(SET_COOKIE, new);
    }
    Ok(())
}

/// Finds the value of cookie `name` in the request's `Cookie` headers.
///
/// Surrounding double quotes are stripped.
#[must_use]
pub fn request_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|header| header.split(';'))
        .find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            if key.trim() != name {
                return None;
            }
            let value = value.trim();
            Some(
                value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(value),
            )
        })
}

/// Extracts a token from the `Authorization` header.
///
/// `Basic` credentials yield the username, and the password is ignored.
/// `Bearer` credentials yield the token as-is.
#[must_use]
pub fn authorization_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, credentials) = header.trim().split_once(' ')?;
    let credentials = credentials.trim();

    let token = if scheme.eq_ignore_ascii_case("basic") {
        let decoded = STANDARD.decode(credentials).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, _password) = decoded.split_once(':')?;
        username.to_string()
    } else if scheme.eq_ignore_ascii_case("bearer") {
        credentials.to_string()
    } else {
        return None;
    };

    (!token.is_empty()).then_some(token)
}
