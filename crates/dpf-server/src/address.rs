//! Server addressing and its environment configuration.

use core::fmt;
use core::str::FromStr;

use crate::{ServerError, ServerResult};

pub const DEFAULT_IP: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 50054;

pub const IP_ENV: &str = "DPF_IP";
pub const PORT_ENV: &str = "DPF_PORT";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerAddress {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerAddress {
    fn default() -> Self {
        Self::new(DEFAULT_IP, DEFAULT_PORT)
    }
}

impl ServerAddress {
    pub fn new(ip: impl Into<String>, port: u16) -> Self {
        Self {
            ip: ip.into(),
            port,
        }
    }

    /// Defaults overridden by `DPF_IP` and `DPF_PORT`.
    pub fn from_env() -> ServerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for `DPF_IP` and `DPF_PORT`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ServerResult<Self> {
        let ip = lookup(IP_ENV)
            .filter(|ip| !ip.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_IP.to_string());
        let port = match lookup(PORT_ENV) {
            Some(port) => parse_port(&port)?,
            None => DEFAULT_PORT,
        };
        Ok(Self::new(ip.trim(), port))
    }
}

fn parse_port(port: &str) -> ServerResult<u16> {
    port.trim()
        .parse()
        .map_err(|_| ServerError::InvalidAddress(format!("invalid port `{port}`")))
}

impl FromStr for ServerAddress {
    type Err = ServerError;

    /// Parses `host:port`; a bare host keeps the default port.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.rsplit_once(':') {
            Some((ip, port)) if !ip.is_empty() => Ok(Self::new(ip, parse_port(port)?)),
            Some(_) => Err(ServerError::InvalidAddress(format!("missing host in `{s}`"))),
            None if !s.is_empty() => Ok(Self::new(s, DEFAULT_PORT)),
            None => Err(ServerError::InvalidAddress("empty address".to_string())),
        }
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}
