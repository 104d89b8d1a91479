//! Remote execution through the system `ssh` client.

use std::fmt;
use std::process::Command;
use std::str::FromStr;

use tracing::debug;

use super::{CommandOutput, RemoteCommand, RemoteExecutor};
use crate::error::{DingleError, Result};

/// `[user@]host[:port]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    pub user: Option<String>,
    pub host: String,
    pub port: Option<u16>,
}

impl SshTarget {
    /// Destination argument for `ssh`, e.g. `deploy@repo.example.org`.
    pub fn destination(&self) -> String {
        match &self.user {
            Some(user) => format!("{}@{}", user, self.host),
            None => self.host.clone(),
        }
    }
}

impl FromStr for SshTarget {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let (user, rest) = match s.split_once('@') {
            Some((user, rest)) if !user.is_empty() => (Some(user.to_string()), rest),
            Some(_) => return Err(format!("Invalid host '{}': empty user", s)),
            None => (None, s),
        };
        let (host, port) = split_host_port(rest).ok_or_else(|| format!("Invalid host '{}'", s))?;
        let port = port
            .map(|p| p.parse::<u16>())
            .transpose()
            .map_err(|_| format!("Invalid port in host '{}'", s))?;
        if host.is_empty() {
            return Err(format!("Invalid host '{}': empty hostname", s));
        }
        Ok(Self {
            user,
            host: host.to_string(),
            port,
        })
    }
}

/// Split `host[:port]`. IPv6 addresses take a port only in brackets
/// (`[fe80::1]:2222`); a bare address with several colons has no port.
fn split_host_port(rest: &str) -> Option<(&str, Option<&str>)> {
    if let Some(bracketed) = rest.strip_prefix('[') {
        let (host, after) = bracketed.split_once(']')?;
        return match after {
            "" => Some((host, None)),
            _ => after.strip_prefix(':').map(|port| (host, Some(port))),
        };
    }
    match rest.matches(':').count() {
        0 => Some((rest, None)),
        1 => rest.split_once(':').map(|(host, port)| (host, Some(port))),
        _ => Some((rest, None)),
    }
}

impl fmt::Display for SshTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(user) = &self.user {
            write!(f, "{user}@")?;
        }
        match self.port {
            Some(port) if self.host.contains(':') => write!(f, "[{}]:{port}", self.host),
            Some(port) => write!(f, "{}:{port}", self.host),
            None => f.write_str(&self.host),
        }
    }
}

/// Runs commands on the repository host over ssh.
///
/// Honors the user's `~/.ssh/config`. Privileged commands are wrapped in
/// `sudo`; time-outs are left to ssh's own `ConnectTimeout`.
#[derive(Debug, Clone)]
pub struct SshExecutor {
    target: SshTarget,
    connect_timeout_secs: u32,
    use_sudo: bool,
}

impl SshExecutor {
    pub fn new(target: SshTarget) -> Self {
        Self {
            target,
            connect_timeout_secs: 30,
            use_sudo: true,
        }
    }

    pub fn with_connect_timeout(mut self, secs: u32) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    pub fn with_sudo(mut self, use_sudo: bool) -> Self {
        self.use_sudo = use_sudo;
        self
    }

    pub fn target(&self) -> &SshTarget {
        &self.target
    }

    /// Arguments passed to the `ssh` binary for `command`.
    pub fn command_args(&self, command: &RemoteCommand) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout_secs),
        ];
        if let Some(port) = self.target.port {
            args.push("-p".to_string());
            args.push(port.to_string());
        }
        args.push(self.target.destination());
        args.push("--".to_string());

        let shell = command.to_shell();
        if self.use_sudo && command.needs_privilege() {
            args.push(format!("sudo -n {shell}"));
        } else {
            args.push(shell);
        }
        args
    }
}

impl RemoteExecutor for SshExecutor {
    fn run(&self, command: &RemoteCommand) -> Result<CommandOutput> {
        let args = self.command_args(command);
        debug!(host = %self.target, "ssh {}", command);

        let output = Command::new("ssh")
            .args(&args)
            .output()
            .map_err(|source| DingleError::RemoteSpawn {
                program: "ssh".to_string(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if output.status.success() {
            return Ok(CommandOutput::success(stdout.into_owned()));
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        Ok(CommandOutput::failure(
            format!("{}{}", stdout, stderr.trim_end()).trim().to_string(),
        ))
    }
}
