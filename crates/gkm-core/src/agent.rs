//! Access to the external SSH agent and client
//!
//! [`SshAgentClient`] is the only seam between the controller and the OpenSSH
//! binaries. [`SystemAgentClient`] shells out to `ssh-add`, `ssh-agent` and
//! `ssh`; tests substitute an in-memory fake.

use std::path::Path;
use std::process::{Output, Stdio};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::RwLock;

use crate::config::Binaries;
use crate::error::AgentError;
use crate::types::{AgentEnv, AuthProbe, IdentityList};

/// Typed operations on an SSH agent
#[async_trait]
pub trait SshAgentClient: Send + Sync {
    /// List the identities the agent holds (`ssh-add -l`)
    async fn list_identities(&self) -> Result<IdentityList, AgentError>;

    /// Start a new agent (`ssh-agent -s`)
    async fn start_agent(&self) -> Result<Option<AgentEnv>, AgentError>;

    /// Add the private key at `path` (`ssh-add <path>`)
    async fn add_identity(&self, path: &Path) -> Result<(), AgentError>;

    /// Remove every identity (`ssh-add -D`)
    async fn remove_all_identities(&self) -> Result<(), AgentError>;

    /// Attempt an authentication-only session with `host` (`ssh -T <host>`)
    ///
    /// Implementations return whatever the client printed; classification
    /// and the deadline belong to the caller.
    async fn probe_auth(&self, host: &str) -> Result<AuthProbe, AgentError>;
}

/// [`SshAgentClient`] backed by the OpenSSH command-line tools
#[derive(Debug)]
pub struct SystemAgentClient {
    binaries: Binaries,
    /// Environment of an agent started by this client
    env: RwLock<Option<AgentEnv>>,
}

impl SystemAgentClient {
    pub fn new(binaries: Binaries) -> Self {
        Self {
            binaries,
            env: RwLock::new(None),
        }
    }

    /// Environment captured from the last agent this client started
    pub async fn agent_env(&self) -> Option<AgentEnv> {
        self.env.read().await.clone()
    }

    /// Build a command wired to the agent this client knows about
    ///
    /// Children are killed if the awaiting future is dropped, so an expired
    /// deadline doesn't leave processes behind.
    async fn command(&self, program: &str) -> Command {
        let mut cmd = Command::new(program);
        cmd.stdin(Stdio::null()).kill_on_drop(true);

        if let Some(env) = self.env.read().await.as_ref() {
            if let Some(sock) = &env.auth_sock {
                cmd.env("SSH_AUTH_SOCK", sock);
            }
            if let Some(pid) = env.agent_pid {
                cmd.env("SSH_AGENT_PID", pid.to_string());
            }
        }
        cmd
    }

    async fn run(mut cmd: Command, label: &str) -> Result<Output, AgentError> {
        tracing::debug!("Running {}", label);
        let output = cmd.output().await.map_err(|source| AgentError::Spawn {
            command: label.to_string(),
            source,
        })?;
        tracing::debug!("{} exited with {:?}", label, output.status.code());
        Ok(output)
    }

    fn failure(label: &str, output: &Output) -> AgentError {
        AgentError::Invocation {
            command: label.to_string(),
            detail: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl Default for SystemAgentClient {
    fn default() -> Self {
        Self::new(Binaries::default())
    }
}

#[async_trait]
impl SshAgentClient for SystemAgentClient {
    async fn list_identities(&self) -> Result<IdentityList, AgentError> {
        let label = format!("{} -l", self.binaries.ssh_add);
        let mut cmd = self.command(&self.binaries.ssh_add).await;
        cmd.arg("-l");

        let output = Self::run(cmd, &label).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(IdentityList::from_output(output.status.code(), &stdout))
    }

    async fn start_agent(&self) -> Result<Option<AgentEnv>, AgentError> {
        let label = format!("{} -s", self.binaries.ssh_agent);
        let mut cmd = self.command(&self.binaries.ssh_agent).await;
        // The agent daemonizes; the foreground process exits right away
        cmd.arg("-s").kill_on_drop(false);

        let output = Self::run(cmd, &label).await?;
        if !output.status.success() {
            return Err(Self::failure(&label, &output));
        }

        let env = AgentEnv::parse(&String::from_utf8_lossy(&output.stdout));
        match &env {
            Some(found) => {
                tracing::info!(
                    "Started ssh-agent (pid: {:?}, socket: {:?})",
                    found.agent_pid,
                    found.auth_sock
                );
                *self.env.write().await = Some(found.clone());
            }
            None => tracing::warn!("ssh-agent started but printed no environment"),
        }
        Ok(env)
    }

    async fn add_identity(&self, path: &Path) -> Result<(), AgentError> {
        let label = self.binaries.ssh_add.clone();
        let mut cmd = self.command(&self.binaries.ssh_add).await;
        cmd.arg(path);

        let output = Self::run(cmd, &label).await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(Self::failure(&label, &output))
        }
    }

    async fn remove_all_identities(&self) -> Result<(), AgentError> {
        let label = format!("{} -D", self.binaries.ssh_add);
        let mut cmd = self.command(&self.binaries.ssh_add).await;
        cmd.arg("-D");

        let output = Self::run(cmd, &label).await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(Self::failure(&label, &output))
        }
    }

    async fn probe_auth(&self, host: &str) -> Result<AuthProbe, AgentError> {
        let label = format!("{} -T {}", self.binaries.ssh, host);
        let mut cmd = self.command(&self.binaries.ssh).await;
        // Never prompt: an unknown host key or a passphrase request must fail
        // with a diagnostic instead of waiting on the terminal
        cmd.args(["-o", "BatchMode=yes", "-T"]).arg(host);

        let output = Self::run(cmd, &label).await?;
        Ok(AuthProbe {
            exit_code: output.status.code(),
            diagnostics: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
