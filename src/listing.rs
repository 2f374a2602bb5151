// ABOUTME: Renders the `list` command: one line per concrete alias with its resolved target
// ABOUTME: Segments are colorized unless colors are turned off

use crate::ssh::{ConnectionDescriptor, HostRegistry, resolve};
use owo_colors::{OwoColorize, Style};
use std::io::{self, IsTerminal, Write};

const ALIAS_WIDTH: usize = 20;
const DEFAULT_SSH_PORT: &str = "22";

/// True when the NO_COLOR convention asks for plain output.
fn no_color_requested() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty())
}

/// Colors are only written to a terminal, and never when NO_COLOR is set.
pub fn color_allowed(enabled: bool, stream: &impl IsTerminal) -> bool {
    enabled && !no_color_requested() && stream.is_terminal()
}

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn for_stream(enabled: bool, stream: &impl IsTerminal) -> Self {
        Self::new(color_allowed(enabled, stream))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.enabled {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }

    fn alias(&self, text: &str) -> String {
        self.paint(text, Style::new().blue().bold())
    }

    fn user(&self, text: &str) -> String {
        self.paint(text, Style::new().green())
    }

    fn domain(&self, text: &str) -> String {
        self.paint(text, Style::new().yellow())
    }

    fn subdomain(&self, text: &str) -> String {
        self.paint(text, Style::new().cyan())
    }

    fn port(&self, text: &str) -> String {
        self.paint(text, Style::new().magenta())
    }

    fn symbol(&self, text: &str) -> String {
        self.paint(text, Style::new().white())
    }

    fn warning(&self, text: &str) -> String {
        self.paint(text, Style::new().yellow())
    }
}

/// The last label is the TLD; with three or more labels the one before it
/// is the domain. Everything earlier is a subdomain.
fn format_hostname(hostname: &str, palette: &Palette) -> String {
    let parts: Vec<&str> = hostname.split('.').collect();
    let count = parts.len();

    parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            let is_domain = i == count - 1 || (count > 2 && i == count - 2);
            if is_domain {
                palette.domain(part)
            } else {
                palette.subdomain(part)
            }
        })
        .collect::<Vec<_>>()
        .join(&palette.symbol("."))
}

/// `alias    user@host.example.com:port`
pub fn format_host_line(alias: &str, target: &ConnectionDescriptor, palette: &Palette) -> String {
    let mut line = format!(
        "{} {}{}{}",
        palette.alias(&format!("{alias:<width$}", width = ALIAS_WIDTH)),
        palette.user(&target.user),
        palette.symbol("@"),
        format_hostname(&target.hostname, palette)
    );

    if let Some(port) = target
        .port
        .as_deref()
        .filter(|port| *port != DEFAULT_SSH_PORT)
    {
        line.push_str(&palette.symbol(":"));
        line.push_str(&palette.port(port));
    }

    line
}

/// Writes every concrete alias that resolves to a hostname.
pub fn write_host_list<W: Write>(
    registry: &HostRegistry,
    palette: &Palette,
    out: &mut W,
) -> io::Result<()> {
    let aliases = registry.list_aliases();
    if aliases.is_empty() {
        return writeln!(out, "{}", palette.warning("No SSH hosts found"));
    }

    for alias in aliases {
        match resolve(registry, alias, None) {
            Ok(target) => writeln!(out, "{}", format_host_line(alias, &target, palette))?,
            Err(e) => tracing::debug!("Not listing '{alias}': {e}"),
        }
    }

    Ok(())
}
