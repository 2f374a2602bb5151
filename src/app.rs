// ABOUTME: Application context built once at startup and passed to every command
// ABOUTME: Holds settings, the loaded host registry, the user override and the process launcher

use crate::config::Config;
use crate::listing::{Palette, write_host_list};
use crate::ssh::{
    CommandRunner, ConnectionDescriptor, HostRegistry, Launcher, ResolveError, SystemRunner,
    classify, parse_ssh_config, resolve,
};
use anyhow::{Context, Result};
use std::io::Write;

pub struct App<R: CommandRunner = SystemRunner> {
    pub config: Config,
    registry: HostRegistry,
    user: Option<String>,
    palette: Palette,
    launcher: Launcher<R>,
}

impl App<SystemRunner> {
    /// Reads the SSH config named in the settings. Failing to load the root
    /// file is fatal for the caller.
    pub fn load(config: Config, user: Option<String>, palette: Palette) -> Result<Self> {
        let path = config.ssh_config_path();
        let registry = parse_ssh_config(&path)?;
        tracing::info!(
            "Loaded {} aliases from {}",
            registry.list_aliases().len(),
            path.display()
        );
        Ok(Self::with_runner(config, registry, user, palette, SystemRunner))
    }
}

impl<R: CommandRunner> App<R> {
    pub fn with_runner(
        config: Config,
        registry: HostRegistry,
        user: Option<String>,
        palette: Palette,
        runner: R,
    ) -> Self {
        let launcher = Launcher::new(
            config.ssh.ssh_binary.clone(),
            config.ssh.scp_binary.clone(),
            runner,
        );
        Self {
            config,
            registry,
            user,
            palette,
            launcher,
        }
    }

    pub fn registry(&self) -> &HostRegistry {
        &self.registry
    }

    pub fn launcher(&self) -> &Launcher<R> {
        &self.launcher
    }

    pub fn resolve(&self, alias: &str) -> Result<ConnectionDescriptor, ResolveError> {
        resolve(&self.registry, alias, self.user.as_deref())
    }

    /// Opens an interactive session, or runs `command` remotely when given.
    pub fn connect(&self, alias: &str, command: &[String]) -> Result<()> {
        let target = self.resolve(alias)?;
        self.launcher.connect(&target, command)?;
        Ok(())
    }

    pub fn copy(&self, alias: &str, files: &[String]) -> Result<()> {
        let target = self.resolve(alias)?;
        let intent = classify(files)?;
        self.launcher.copy(&target, &intent)?;
        Ok(())
    }

    pub fn list<W: Write>(&self, out: &mut W) -> Result<()> {
        write_host_list(&self.registry, &self.palette, out).context("Failed to write host list")
    }
}
