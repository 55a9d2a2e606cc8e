//! Runtime configuration for the server, read from the environment.

use std::{
    fmt::Debug,
    net::{Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use clap::Parser;

/// The REST API server for fintrack.
///
/// Every option can also be set with the environment variable of the same
/// name in upper case, e.g. `DB_HOST`.
#[derive(Parser, Clone)]
#[command(version, about, long_about = None)]
pub struct ServerConfig {
    /// Directory holding the SQLite database file.
    #[arg(long, env = "DB_HOST", default_value = ".")]
    pub db_host: PathBuf,

    /// Database account name. SQLite has no accounts so this is only logged.
    #[arg(long, env = "DB_USER", default_value = "root")]
    pub db_user: String,

    /// Database password. Unused by SQLite and never logged.
    #[arg(long, env = "DB_PASSWORD", default_value = "example", hide_env_values = true)]
    pub db_password: String,

    /// Name of the database, the file is `<DB_HOST>/<DB_NAME>.db`.
    #[arg(long, env = "DB_NAME", default_value = "fintrack")]
    pub db_name: String,

    /// The port to serve the API from.
    #[arg(short, long, env = "PORT", default_value_t = 4000)]
    pub port: u16,
}

impl ServerConfig {
    /// The path of the SQLite database file.
    pub fn database_path(&self) -> PathBuf {
        self.db_host.join(format!("{}.db", self.db_name))
    }

    /// The address to listen on, on all interfaces.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

impl Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("db_host", &self.db_host)
            .field("db_user", &self.db_user)
            .field("db_password", &"********")
            .field("db_name", &self.db_name)
            .field("port", &self.port)
            .finish()
    }
}
