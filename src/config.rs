use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    /// URL-safe base64 VAPID private key, as produced by `web-push generate-vapid-keys`.
    pub vapid_private_key: String,
    /// Contact claim sent to push services, e.g. "mailto:ops@plantling.app".
    pub vapid_subject: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub push: PushConfig,
    /// Shared secret for the external scheduler hitting /sweep/run.
    pub sweep_token: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "plantling".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "plantling-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let push = PushConfig {
            vapid_private_key: std::env::var("VAPID_PRIVATE_KEY")?,
            vapid_subject: std::env::var("VAPID_SUBJECT")
                .unwrap_or_else(|_| "mailto:ops@plantling.app".into()),
        };
        let sweep_token = std::env::var("SWEEP_TOKEN").ok();
        Ok(Self {
            database_url,
            jwt,
            push,
            sweep_token,
        })
    }
}
