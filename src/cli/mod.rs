use clap::Parser;

use crate::config::{AdminGate, AppConfig, StoreKind};

/// Command-line flags. Anything given here wins over the environment.
#[derive(Debug, Default, Parser)]
#[command(name = "afterschool-api")]
#[command(about = "REST backend for an after-school children's program")]
#[command(version)]
pub struct Cli {
    #[arg(long, help = "Interface to bind")]
    pub host: Option<String>,

    #[arg(short, long, help = "Port to listen on")]
    pub port: Option<u16>,

    #[arg(long, value_parser = parse_store, help = "Document store: postgres or memory")]
    pub store: Option<StoreKind>,

    #[arg(long, help = "PostgreSQL connection URL")]
    pub database_url: Option<String>,

    #[arg(long, value_parser = parse_admin_gate, help = "Admin gate: stored or body")]
    pub admin_gate: Option<AdminGate>,
}

impl Cli {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(store) = self.store {
            config.database.store = store;
        }
        if let Some(url) = &self.database_url {
            config.database.url = Some(url.clone());
        }
        if let Some(gate) = self.admin_gate {
            config.security.admin_gate = gate;
        }
    }
}

fn parse_store(s: &str) -> Result<StoreKind, String> {
    s.parse()
}

fn parse_admin_gate(s: &str) -> Result<AdminGate, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from(["afterschool-api", "--port", "8123", "--store", "memory", "--host", "127.0.0.1"]);
        let mut config = AppConfig::development();
        cli.apply(&mut config);
        assert_eq!(config.server.port, 8123);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.database.store, StoreKind::Memory);
        assert_eq!(config.security.admin_gate, AdminGate::StoredRole);
    }

    #[test]
    fn no_flags_leave_config_alone() {
        let mut config = AppConfig::development();
        Cli::parse_from(["afterschool-api"]).apply(&mut config);
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.database.store, StoreKind::Postgres);
    }

    #[test]
    fn unknown_store_is_rejected() {
        assert!(Cli::try_parse_from(["afterschool-api", "--store", "mongo"]).is_err());
    }
}
