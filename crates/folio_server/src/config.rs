//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the publishing service front end.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Root of the service data directory.
    pub data_dir: PathBuf,
    /// Static file root; `<data_dir>/static` when unset.
    pub static_dir: Option<PathBuf>,
    /// Sliding session lifetime.
    pub session_ttl: Duration,
    /// How often the session sweeper runs.
    pub sweep_interval: Duration,
}

impl ServerConfig {
    /// Creates a configuration serving `data_dir` on the default
    /// loopback address.
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            data_dir,
            static_dir: None,
            session_ttl: Duration::from_secs(15 * 60),
            sweep_interval: Duration::from_secs(1),
        }
    }

    /// Sets the bind address.
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Overrides the static file root.
    pub fn with_static_dir(mut self, dir: PathBuf) -> Self {
        self.static_dir = Some(dir);
        self
    }

    /// Sets the session lifetime.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Sets the sweep interval.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::new(PathBuf::from("data"));
        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.static_dir, None);
        assert_eq!(config.session_ttl, Duration::from_secs(900));
        assert_eq!(config.sweep_interval, Duration::from_secs(1));
    }

    #[test]
    fn builder() {
        let config = ServerConfig::new(PathBuf::from("data"))
            .with_bind_addr("0.0.0.0:9000".parse().unwrap())
            .with_session_ttl(Duration::from_secs(60))
            .with_sweep_interval(Duration::from_millis(250));
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.session_ttl, Duration::from_secs(60));
        assert_eq!(config.sweep_interval, Duration::from_millis(250));
    }
}
