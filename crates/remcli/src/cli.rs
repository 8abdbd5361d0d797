//! Command-line arguments. Every flag can also come from a `REMCLI_*`
//! environment variable.

use std::net::IpAddr;
use std::time::Duration;

use clap::Parser;

use crate::config::{BridgeConfig, ServerConfig, DEFAULT_LOCK_WAIT, DEFAULT_PORT, DEFAULT_SCRIPT_TIMEOUT};

#[derive(Debug, Clone, Parser)]
#[command(name = "remcli", version, about = "Serve Reminders and Calendar automation over HTTP")]
pub struct Cli {
    /// Address to listen on.
    #[arg(long, env = "REMCLI_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to listen on.
    #[arg(short, long, env = "REMCLI_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Seconds a single script may run before it is killed.
    #[arg(long, env = "REMCLI_SCRIPT_TIMEOUT_SECS", default_value_t = DEFAULT_SCRIPT_TIMEOUT.as_secs(),
          value_parser = clap::value_parser!(u64).range(1..))]
    pub script_timeout_secs: u64,

    /// Seconds a request waits for the previous command to finish.
    #[arg(long, env = "REMCLI_LOCK_WAIT_SECS", default_value_t = DEFAULT_LOCK_WAIT.as_secs(),
          value_parser = clap::value_parser!(u64).range(1..))]
    pub lock_wait_secs: u64,
}

impl Cli {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host,
            port: self.port,
        }
    }

    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            script_timeout: Duration::from_secs(self.script_timeout_secs),
            lock_wait: Duration::from_secs(self.lock_wait_secs),
        }
    }
}
