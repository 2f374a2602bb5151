// ABOUTME: Builds ssh/scp argument vectors and runs them with the caller's terminal attached
// ABOUTME: Process spawning sits behind the CommandRunner trait so it can be swapped in tests

use crate::ssh::resolver::ConnectionDescriptor;
use crate::ssh::transfer::{Direction, TransferIntent};
use std::io;
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {status}")]
    Exit { program: String, status: ExitStatus },
}

impl LaunchError {
    /// Exit code of the child process, if it ran and exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            LaunchError::Exit { status, .. } => status.code(),
            LaunchError::Spawn { .. } => None,
        }
    }
}

pub trait CommandRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<(), LaunchError>;
}

/// Runs the program in the foreground, sharing stdin/stdout/stderr, and
/// waits for it to exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<(), LaunchError> {
        tracing::debug!("Running {program} with args: {args:?}");

        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| LaunchError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            tracing::debug!("{program} finished with a non-zero status: {status}");
            Err(LaunchError::Exit {
                program: program.to_string(),
                status,
            })
        }
    }
}

fn push_option(args: &mut Vec<String>, flag: &str, value: Option<&String>) {
    if let Some(value) = value {
        args.push(flag.to_string());
        args.push(value.clone());
    }
}

/// `[-p port] [-i identity] user@host [command...]`
pub fn ssh_args(target: &ConnectionDescriptor, command: &[String]) -> Vec<String> {
    let mut args = Vec::new();
    push_option(&mut args, "-p", target.port.as_ref());
    push_option(&mut args, "-i", target.identity_file.as_ref());
    args.push(target.address());
    args.extend(command.iter().cloned());
    args
}

/// `[-P port] [-i identity] -p` followed by the transfer operands, with the
/// remote side prefixed by `user@host:`.
pub fn scp_args(target: &ConnectionDescriptor, intent: &TransferIntent) -> Vec<String> {
    let mut args = Vec::new();
    push_option(&mut args, "-P", target.port.as_ref());
    push_option(&mut args, "-i", target.identity_file.as_ref());
    args.push("-p".to_string());

    let address = target.address();
    match intent.direction {
        Direction::Upload => {
            args.extend(intent.sources.iter().cloned());
            args.push(format!("{address}:{}", intent.destination));
        }
        Direction::Download => {
            args.extend(
                intent
                    .sources
                    .iter()
                    .map(|source| format!("{address}:{source}")),
            );
            args.push(intent.destination.clone());
        }
    }
    args
}

pub struct Launcher<R: CommandRunner = SystemRunner> {
    ssh_binary: String,
    scp_binary: String,
    runner: R,
}

impl<R: CommandRunner> Launcher<R> {
    pub fn new(ssh_binary: String, scp_binary: String, runner: R) -> Self {
        Self {
            ssh_binary,
            scp_binary,
            runner,
        }
    }

    pub fn connect(
        &self,
        target: &ConnectionDescriptor,
        command: &[String],
    ) -> Result<(), LaunchError> {
        tracing::info!("Connecting to {}", target.address());
        self.runner.run(&self.ssh_binary, &ssh_args(target, command))
    }

    pub fn copy(
        &self,
        target: &ConnectionDescriptor,
        intent: &TransferIntent,
    ) -> Result<(), LaunchError> {
        tracing::info!(
            "Copying {} file(s) {:?} {}",
            intent.sources.len(),
            intent.direction,
            target.address()
        );
        self.runner.run(&self.scp_binary, &scp_args(target, intent))
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }
}

/// Records invocations instead of spawning processes.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingRunner {
    pub calls: std::cell::RefCell<Vec<(String, Vec<String>)>>,
}

#[cfg(test)]
impl RecordingRunner {
    pub fn last_call(&self) -> Option<(String, Vec<String>)> {
        self.calls.borrow().last().cloned()
    }
}

#[cfg(test)]
impl CommandRunner for RecordingRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<(), LaunchError> {
        self.calls
            .borrow_mut()
            .push((program.to_string(), args.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssh::transfer::classify;

    fn test_target() -> ConnectionDescriptor {
        ConnectionDescriptor {
            user: "testuser".to_string(),
            hostname: "test.example.com".to_string(),
            port: Some("2222".to_string()),
            identity_file: Some("~/.ssh/test_key".to_string()),
        }
    }

    fn plain_target() -> ConnectionDescriptor {
        ConnectionDescriptor {
            user: "root".to_string(),
            hostname: "plain.example.com".to_string(),
            port: None,
            identity_file: None,
        }
    }

    fn launcher() -> Launcher<RecordingRunner> {
        Launcher::new(
            "ssh".to_string(),
            "scp".to_string(),
            RecordingRunner::default(),
        )
    }

    #[test]
    fn test_ssh_args_with_port_and_identity() {
        assert_eq!(
            ssh_args(&test_target(), &[]),
            ["-p", "2222", "-i", "~/.ssh/test_key", "testuser@test.example.com"]
        );
    }

    #[test]
    fn test_ssh_args_minimal_with_command() {
        let command = vec!["uptime".to_string(), "-p".to_string()];
        assert_eq!(
            ssh_args(&plain_target(), &command),
            ["root@plain.example.com", "uptime", "-p"]
        );
    }

    #[test]
    fn test_scp_args_upload() {
        let intent = classify(&["local1.txt", "local2.txt", ":remote/path"]).unwrap();

        assert_eq!(
            scp_args(&test_target(), &intent),
            [
                "-P",
                "2222",
                "-i",
                "~/.ssh/test_key",
                "-p",
                "local1.txt",
                "local2.txt",
                "testuser@test.example.com:remote/path",
            ]
        );
    }

    #[test]
    fn test_scp_args_download() {
        let intent = classify(&[":remote1.txt", ":remote2.txt", "local/path"]).unwrap();

        assert_eq!(
            scp_args(&plain_target(), &intent),
            [
                "-p",
                "root@plain.example.com:remote1.txt",
                "root@plain.example.com:remote2.txt",
                "local/path",
            ]
        );
    }

    #[test]
    fn test_connect_uses_ssh_binary() {
        let launcher = launcher();
        launcher.connect(&plain_target(), &[]).unwrap();

        let (program, args) = launcher.runner().last_call().unwrap();
        assert_eq!(program, "ssh");
        assert_eq!(args, ["root@plain.example.com"]);
    }

    #[test]
    fn test_copy_uses_scp_binary() {
        let launcher = launcher();
        let intent = classify(&[":remote.txt", "local/path"]).unwrap();
        launcher.copy(&test_target(), &intent).unwrap();

        let (program, args) = launcher.runner().last_call().unwrap();
        assert_eq!(program, "scp");
        assert_eq!(
            args,
            [
                "-P",
                "2222",
                "-i",
                "~/.ssh/test_key",
                "-p",
                "testuser@test.example.com:remote.txt",
                "local/path",
            ]
        );
    }

    #[test]
    fn test_system_runner_reports_spawn_failure() {
        let err = SystemRunner
            .run("gt-test-program-that-does-not-exist", &[])
            .unwrap_err();

        assert!(matches!(err, LaunchError::Spawn { .. }));
        assert_eq!(err.exit_code(), None);
        assert!(err.to_string().contains("gt-test-program-that-does-not-exist"));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_reports_exit_status() {
        let err = SystemRunner
            .run("sh", &["-c".to_string(), "exit 3".to_string()])
            .unwrap_err();

        assert!(matches!(err, LaunchError::Exit { .. }));
        assert_eq!(err.exit_code(), Some(3));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_success() {
        assert!(SystemRunner.run("true", &[]).is_ok());
    }
}
