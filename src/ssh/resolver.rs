// ABOUTME: Resolves a host alias into concrete connection parameters
// ABOUTME: Applies user override, config value, then the root default

use super::registry::HostRegistry;
use thiserror::Error;

pub const DEFAULT_USER: &str = "root";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    pub user: String,
    pub hostname: String,
    pub port: Option<String>,
    pub identity_file: Option<String>,
}

impl ConnectionDescriptor {
    /// `user@hostname`, the form both ssh and scp accept.
    pub fn address(&self) -> String {
        format!("{}@{}", self.user, self.hostname)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("host '{alias}' not found in SSH config")]
    HostNotFound { alias: String },
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

pub fn resolve(
    registry: &HostRegistry,
    alias: &str,
    user_override: Option<&str>,
) -> Result<ConnectionDescriptor, ResolveError> {
    let hostname = non_empty(registry.get(alias, "Hostname")).ok_or_else(|| {
        ResolveError::HostNotFound {
            alias: alias.to_string(),
        }
    })?;

    let user = non_empty(user_override)
        .or_else(|| non_empty(registry.get(alias, "User")))
        .unwrap_or(DEFAULT_USER);

    Ok(ConnectionDescriptor {
        user: user.to_string(),
        hostname: hostname.to_string(),
        port: non_empty(registry.get(alias, "Port")).map(str::to_string),
        identity_file: non_empty(registry.get(alias, "IdentityFile")).map(str::to_string),
    })
}
