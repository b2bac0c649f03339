use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    pub backend: BackendConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    #[serde(default)]
    pub per_page: PerPage,
    /// Generate stand-in chart series when a monitoring endpoint fails.
    /// Pages flag such charts as simulated.
    #[serde(default)]
    pub simulate_on_failure: bool,
    #[serde(default = "default_view_ttl")]
    pub view_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_heartbeat_path")]
    pub heartbeat_path: String,
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u64,
    #[serde(default = "default_remember_days")]
    pub remember_days: u64,
    #[serde(default)]
    pub secure_cookies: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PerPage {
    #[serde(default = "default_containers_per_page")]
    pub containers: u32,
    #[serde(default = "default_users_per_page")]
    pub users: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            heartbeat_path: default_heartbeat_path(),
            heartbeat_interval_secs: default_heartbeat_interval(),
            remember_days: default_remember_days(),
            secure_cookies: false,
        }
    }
}

impl Default for PerPage {
    fn default() -> Self {
        Self {
            containers: default_containers_per_page(),
            users: default_users_per_page(),
        }
    }
}

fn default_listen_port() -> u16 {
    8080
}

fn default_refresh_interval() -> u64 {
    5
}

fn default_view_ttl() -> u64 {
    3600
}

fn default_timeout() -> u64 {
    10
}

fn default_heartbeat_path() -> String {
    "/api/auth/heartbeat".to_string()
}

fn default_heartbeat_interval() -> u64 {
    60
}

fn default_remember_days() -> u64 {
    7
}

fn default_containers_per_page() -> u32 {
    20
}

fn default_users_per_page() -> u32 {
    10
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| format!("reading config {}: {}", path.display(), e))?;
        Self::from_yaml(&data)
    }

    pub fn from_yaml(data: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut cfg: Config =
            serde_yaml::from_str(data).map_err(|e| format!("parsing config: {}", e))?;

        cfg.backend.base_url = cfg.backend.base_url.trim_end_matches('/').to_string();
        if cfg.backend.base_url.is_empty() {
            return Err("backend.base_url must be configured".into());
        }
        if cfg.per_page.containers == 0 || cfg.per_page.users == 0 {
            return Err("per_page values must be positive".into());
        }

        Ok(cfg)
    }

    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.listen_port)
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn view_ttl(&self) -> Duration {
        Duration::from_secs(self.view_ttl_secs)
    }

    pub fn remember_for(&self) -> Duration {
        Duration::from_secs(self.session.remember_days * 86400)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_takes_defaults() {
        let cfg = Config::from_yaml("backend:\n  base_url: http://monitor:8001/\n").unwrap();
        assert_eq!(cfg.backend.base_url, "http://monitor:8001");
        assert_eq!(cfg.listen_addr(), "0.0.0.0:8080");
        assert_eq!(cfg.per_page.containers, 20);
        assert_eq!(cfg.per_page.users, 10);
        assert_eq!(cfg.session.heartbeat_path, "/api/auth/heartbeat");
        assert_eq!(cfg.refresh_interval(), Duration::from_secs(5));
        assert_eq!(cfg.remember_for(), Duration::from_secs(7 * 86400));
        assert!(!cfg.simulate_on_failure);
    }

    #[test]
    fn missing_backend_is_rejected() {
        assert!(Config::from_yaml("listen_port: 9000\n").is_err());
        assert!(Config::from_yaml("backend:\n  base_url: \"\"\n").is_err());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let yaml = "backend:\n  base_url: http://m\nper_page:\n  users: 0\n";
        assert!(Config::from_yaml(yaml).is_err());
    }
}
