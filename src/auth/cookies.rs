use std::str::FromStr;

use axum::http::{header, HeaderMap, HeaderValue};
use serde::Deserialize;

use crate::config::CookieConfig;

pub const ACCESS_COOKIE: &str = "accessToken";
pub const REFRESH_COOKIE: &str = "refreshToken";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

impl FromStr for SameSite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(SameSite::Strict),
            "lax" => Ok(SameSite::Lax),
            "none" => Ok(SameSite::None),
            other => Err(format!("unknown SameSite policy: {other}")),
        }
    }
}

/// Serialize one `Set-Cookie` header value. Both session cookies are
/// HttpOnly and scoped to the whole site.
pub fn serialize_cookie(name: &str, value: &str, max_age_seconds: i64, cfg: &CookieConfig) -> String {
    let mut cookie = format!(
        "{name}={value}; Max-Age={max_age_seconds}; Path=/; HttpOnly; SameSite={}",
        cfg.same_site.as_str()
    );
    if cfg.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Expire a cookie: empty value, Max-Age=0, same attributes otherwise so
/// the browser matches the cookie it set earlier.
pub fn expire_cookie(name: &str, cfg: &CookieConfig) -> String {
    serialize_cookie(name, "", 0, cfg)
}

fn append(headers: &mut HeaderMap, cookie: &str) {
    if let Ok(v) = HeaderValue::from_str(cookie) {
        headers.append(header::SET_COOKIE, v);
    }
}

/// Set-Cookie headers for a fresh session: both tokens, each with its own
/// Max-Age.
pub fn set_session_cookies(
    cfg: &CookieConfig,
    access_token: &str,
    refresh_token: &str,
    refresh_max_age_seconds: i64,
) -> HeaderMap {
    let mut headers = HeaderMap::new();
    append(
        &mut headers,
        &serialize_cookie(ACCESS_COOKIE, access_token, cfg.access_max_age_seconds, cfg),
    );
    append(
        &mut headers,
        &serialize_cookie(REFRESH_COOKIE, refresh_token, refresh_max_age_seconds, cfg),
    );
    headers
}

/// Set-Cookie header refreshing only the access token.
pub fn set_access_cookie(cfg: &CookieConfig, access_token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    append(
        &mut headers,
        &serialize_cookie(ACCESS_COOKIE, access_token, cfg.access_max_age_seconds, cfg),
    );
    headers
}

/// Set-Cookie headers expiring both session cookies.
pub fn clear_session_cookies(cfg: &CookieConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    append(&mut headers, &expire_cookie(ACCESS_COOKIE, cfg));
    append(&mut headers, &expire_cookie(REFRESH_COOKIE, cfg));
    headers
}

/// Find a cookie by name in the request `Cookie` header.
pub fn request_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then(|| v.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(secure: bool, same_site: SameSite) -> CookieConfig {
        CookieConfig {
            access_max_age_seconds: 120,
            same_site,
            secure,
        }
    }

    #[test]
    fn serializes_all_attributes() {
        let cookie = serialize_cookie(ACCESS_COOKIE, "tok", 120, &cfg(true, SameSite::None));
        assert_eq!(
            cookie,
            "accessToken=tok; Max-Age=120; Path=/; HttpOnly; SameSite=None; Secure"
        );
    }

    #[test]
    fn omits_secure_outside_production() {
        let cookie = serialize_cookie(REFRESH_COOKIE, "tok", 604800, &cfg(false, SameSite::Lax));
        assert!(!cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=604800"));
    }

    #[test]
    fn expired_cookie_has_empty_value_and_zero_age() {
        let cookie = expire_cookie(ACCESS_COOKIE, &cfg(false, SameSite::Lax));
        assert!(cookie.starts_with("accessToken=; Max-Age=0;"));
    }

    #[test]
    fn session_cookie_pair_uses_distinct_max_ages() {
        let headers = set_session_cookies(&cfg(false, SameSite::Lax), "a", "r", 604800);
        let values: Vec<_> = headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(values.len(), 2);
        assert!(values[0].contains("accessToken=a; Max-Age=120"));
        assert!(values[1].contains("refreshToken=r; Max-Age=604800"));
    }

    #[test]
    fn parses_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("foo=1; accessToken=abc.def; refreshToken=xyz"),
        );
        assert_eq!(request_cookie(&headers, ACCESS_COOKIE).as_deref(), Some("abc.def"));
        assert_eq!(request_cookie(&headers, REFRESH_COOKIE).as_deref(), Some("xyz"));
        assert_eq!(request_cookie(&headers, "missing"), None);
    }

    #[test]
    fn same_site_parses_case_insensitively() {
        assert_eq!("NONE".parse::<SameSite>().unwrap(), SameSite::None);
        assert_eq!("Lax".parse::<SameSite>().unwrap(), SameSite::Lax);
        assert!("sometimes".parse::<SameSite>().is_err());
    }
}
