// ABOUTME: Command-line surface: connect to an alias, copy files with -s, or list aliases
// ABOUTME: Flags override the SSH config user, the config file location and output coloring

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "gt",
    version,
    about = "gt is a simple SSH connection manager",
    long_about = "gt simplifies SSH connections by using your existing SSH config.\nIt reads Host definitions from ~/.ssh/config (including Include files) and\nprovides a simpler interface for connecting to your hosts.",
    after_help = "EXAMPLES:\n  Connect to a host defined in ~/.ssh/config:  gt myserver\n  Connect with a different user:               gt myserver -u admin\n  Run a command remotely:                      gt myserver -- uptime -p\n  Upload files to remote host:                 gt myserver -s local1.txt local2.txt :remote/path/\n  Download files from remote host:             gt myserver -s :remote/file1.txt :remote/file2.txt local/path/\n  List configured hosts:                       gt list",
    subcommand_negates_reqs = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(help = "Host alias from the SSH config", required = true)]
    pub alias: Option<String>,

    #[arg(
        help = "Remote command to run, or with --scp the files to copy\nRemote paths start with ':' (e.g. :remote/path)"
    )]
    pub args: Vec<String>,

    #[arg(short = 'u', long, global = true, help = "Override the SSH config user")]
    pub user: Option<String>,

    #[arg(short = 's', long, help = "Use SCP instead of SSH")]
    pub scp: bool,

    #[arg(
        long,
        global = true,
        help = "SSH config file [default: ~/.ssh/config, or ssh.config_path from settings]"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Settings file [default: <config dir>/gt/config.toml]"
    )]
    pub settings: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Disable colored output (NO_COLOR is also honored)"
    )]
    pub no_color: bool,

    #[arg(
        short = 'v',
        long,
        global = true,
        action = ArgAction::Count,
        help = "Increase log verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    #[command(
        about = "List all hosts from SSH config",
        long_about = "List all hosts defined in your SSH config file.\nIncludes entries from included config files."
    )]
    List,
}

impl Cli {
    pub fn lists_hosts(&self) -> bool {
        self.command == Some(Commands::List) && self.alias.is_none()
    }

    /// Words after the alias. `gt <alias> list` parses as the subcommand,
    /// so the word is put back in front as the remote command.
    pub fn remote_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.args.len() + 1);
        if self.command == Some(Commands::List) && self.alias.is_some() {
            args.push("list".to_string());
        }
        args.extend(self.args.iter().cloned());
        args
    }

    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
