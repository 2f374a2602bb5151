// ABOUTME: SSH config loading, alias resolution, transfer classification and process launching
// ABOUTME: Everything needed to turn an alias plus arguments into an ssh or scp invocation

pub mod launcher;
pub mod parser;
pub mod registry;
pub mod resolver;
pub mod transfer;

pub use launcher::{CommandRunner, LaunchError, Launcher, SystemRunner};
pub use parser::{ConfigError, parse_ssh_config};
pub use registry::HostRegistry;
pub use resolver::{ConnectionDescriptor, ResolveError, resolve};
pub use transfer::{TransferError, TransferIntent, classify};
