use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Server settings. Each flag falls back to an environment variable, which
/// may come from a `.env` file in the working directory.
#[derive(Parser, Debug, Clone)]
#[command(name = "todo-hub")]
#[command(about = "Multi-list todo web application")]
pub struct Config {
    /// Listen port
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Listen address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Store connection string (`redis://host:port` or `memory://`)
    #[arg(long, env = "DATABASE")]
    pub database: String,

    /// Directory of static assets served for unmatched paths
    #[arg(long, env = "STATIC_DIR", default_value = "public")]
    pub static_dir: PathBuf,
}

impl Config {
    /// Loads `.env` if present, then parses flags and environment.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::parse()
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .trim_matches(|c: char| c == '[' || c == ']')
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid HOST {:?}: {}", self.host, e))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
