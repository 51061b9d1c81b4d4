use serde::Deserialize;

use crate::auth::cookies::SameSite;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CookieConfig {
    /// Max-Age for the access cookie, deliberately shorter than the
    /// access token TTL so the browser drops it first.
    pub access_max_age_seconds: i64,
    pub same_site: SameSite,
    pub secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub cookies: CookieConfig,
    pub usda_api_key: Option<String>,
    pub frontend_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            access_secret: std::env::var("ACCESS_TOKEN_SECRET")?,
            refresh_secret: std::env::var("REFRESH_TOKEN_SECRET")?,
            access_ttl_minutes: parse_or("ACCESS_TOKEN_TTL_MINUTES", 5),
            refresh_ttl_days: parse_or("REFRESH_TOKEN_TTL_DAYS", 7),
        };

        let production = std::env::var("PRODUCTION")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let same_site = std::env::var("COOKIE_SAME_SITE")
            .ok()
            .and_then(|v| v.parse::<SameSite>().ok())
            .unwrap_or(SameSite::Lax);
        // Browsers reject SameSite=None cookies without the Secure attribute.
        if same_site == SameSite::None && !production {
            anyhow::bail!("COOKIE_SAME_SITE=none requires PRODUCTION=true (Secure cookies)");
        }
        let cookies = CookieConfig {
            access_max_age_seconds: parse_or("ACCESS_COOKIE_MAX_AGE_SECONDS", 120),
            same_site,
            secure: production,
        };

        let frontend_origins = std::env::var("FRONTEND_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            database_url,
            jwt,
            cookies,
            usda_api_key: std::env::var("USDA_API_KEY").ok().filter(|k| !k.is_empty()),
            frontend_origins,
        })
    }
}

fn parse_or(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(default)
}
