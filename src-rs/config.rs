use std::{env, time::Duration};

#[derive(Clone, Debug)]
pub struct Config {
    pub admin_identity: String,
    pub scene_rate_limit: usize,
    pub image_rate_limit: usize,
    pub login_rate_limit: usize,
    pub rate_limit_window: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            admin_identity: env::var("ADMIN_IDENTITY")
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| "admin".to_string()),
            scene_rate_limit: parse_limit("SCENE_RATE_LIMIT", env::var("SCENE_RATE_LIMIT").ok(), 10)?,
            image_rate_limit: parse_limit("IMAGE_RATE_LIMIT", env::var("IMAGE_RATE_LIMIT").ok(), 5)?,
            login_rate_limit: parse_limit("LOGIN_RATE_LIMIT", env::var("LOGIN_RATE_LIMIT").ok(), 5)?,
            rate_limit_window: Duration::from_secs(parse_window_secs(
                "RATE_LIMIT_WINDOW_SECS",
                env::var("RATE_LIMIT_WINDOW_SECS").ok(),
                60,
            )?),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            admin_identity: "admin".to_string(),
            scene_rate_limit: 10,
            image_rate_limit: 5,
            login_rate_limit: 5,
            rate_limit_window: Duration::from_secs(60),
        }
    }
}

fn parse_limit(name: &str, value: Option<String>, fallback: usize) -> anyhow::Result<usize> {
    match value {
        None => Ok(fallback),
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("{name} must be a non-negative integer, got {raw:?}")),
    }
}

fn parse_window_secs(name: &str, value: Option<String>, fallback: u64) -> anyhow::Result<u64> {
    let secs = match value {
        None => fallback,
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("{name} must be a positive integer, got {raw:?}"))?,
    };
    if secs == 0 {
        return Err(anyhow::anyhow!("{name} must be at least one second"));
    }
    Ok(secs)
}
