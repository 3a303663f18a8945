//! Environment helpers shared by every service's `Config::from_env`

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Deployment environment name, `development` when unset
pub fn environment() -> String {
    std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into())
}

/// String variable with a default
pub fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Optional, non-empty string variable
pub fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

/// Parsed variable with a default; unparseable values fall back too
pub fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Require a secret env var: must be set and non-empty outside development.
pub fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
    let val = match std::env::var(name) {
        Ok(v) => v,
        Err(_) => {
            if environment != "development" {
                return Err(format!("{name} must be set in {environment} environment").into());
            }
            format!("dev-{name}-not-for-production")
        }
    };
    if val.is_empty() && environment != "development" {
        return Err(format!("{name} must not be empty in {environment} environment").into());
    }
    Ok(val)
}
