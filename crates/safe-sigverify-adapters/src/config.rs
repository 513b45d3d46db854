use std::time::Duration;

const CACHE_RESET_MS_VAR: &str = "SAFE_SIGVERIFY_CACHE_RESET_MS";
const EPHEMERAL_VAR: &str = "SAFE_SIGVERIFY_EPHEMERAL";

#[derive(Debug, Clone)]
pub struct SigVerifyConfig {
    /// Spawn the periodic owner-cache reset task.
    pub cache_reset_enabled: bool,
    pub cache_reset_interval_ms: u64,
}

impl Default for SigVerifyConfig {
    fn default() -> Self {
        Self {
            cache_reset_enabled: true,
            cache_reset_interval_ms: 60 * 60 * 1000,
        }
    }
}

impl SigVerifyConfig {
    /// Config for tests and one-shot runs: the cache is never reset.
    pub fn ephemeral() -> Self {
        Self {
            cache_reset_enabled: false,
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(ms) = std::env::var(CACHE_RESET_MS_VAR)
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
        {
            config.cache_reset_interval_ms = ms;
        }
        if std::env::var(EPHEMERAL_VAR)
            .map(|raw| env_flag(&raw))
            .unwrap_or(false)
        {
            config.cache_reset_enabled = false;
        }
        config
    }

    pub fn cache_reset_interval(&self) -> Duration {
        Duration::from_millis(self.cache_reset_interval_ms)
    }
}

fn env_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
