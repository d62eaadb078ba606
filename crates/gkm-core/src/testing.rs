//! In-memory SSH agent for unit tests

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::agent::SshAgentClient;
use crate::error::AgentError;
use crate::types::{AgentEnv, AuthProbe, IdentityList};

#[derive(Default)]
struct FakeState {
    running: bool,
    identities: Vec<String>,
    add_failure: Option<String>,
    auth_diagnostics: String,
    auth_delay: Option<Duration>,
    list_delay: Option<Duration>,
    calls: Vec<String>,
}

/// Records every call and answers from scripted state
#[derive(Default)]
pub struct FakeAgent {
    state: Mutex<FakeState>,
}

impl FakeAgent {
    /// An agent that is up and holds nothing
    pub fn running() -> Self {
        let agent = Self::default();
        agent.state.lock().unwrap().running = true;
        agent
    }

    /// No agent reachable until `start_agent` is called
    pub fn stopped() -> Self {
        Self::default()
    }

    pub fn with_identities(self, lines: &[&str]) -> Self {
        self.set_identities(lines);
        self
    }

    pub fn failing_add(self, stderr: &str) -> Self {
        self.state.lock().unwrap().add_failure = Some(stderr.to_string());
        self
    }

    pub fn auth_reply(self, diagnostics: &str) -> Self {
        self.state.lock().unwrap().auth_diagnostics = diagnostics.to_string();
        self
    }

    pub fn auth_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().auth_delay = Some(delay);
        self
    }

    pub fn list_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().list_delay = Some(delay);
        self
    }

    /// Replace what the agent holds, as another process would
    pub fn set_identities(&self, lines: &[&str]) {
        self.state.lock().unwrap().identities = lines.iter().map(|l| l.to_string()).collect();
    }

    /// Simulate the agent process going away
    pub fn kill(&self) {
        let mut state = self.state.lock().unwrap();
        state.running = false;
        state.identities.clear();
    }

    /// Bring a killed agent back up, empty
    pub fn restart(&self) {
        self.state.lock().unwrap().running = true;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }
}

fn no_agent() -> AgentError {
    AgentError::Invocation {
        command: "ssh-add".to_string(),
        detail: "Could not open a connection to your authentication agent.\n".to_string(),
    }
}

#[async_trait]
impl SshAgentClient for FakeAgent {
    async fn list_identities(&self) -> Result<IdentityList, AgentError> {
        self.record("list".to_string());
        let delay = self.state.lock().unwrap().list_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.lock().unwrap();
        if !state.running {
            return Ok(IdentityList::NoAgent);
        }
        if state.identities.is_empty() {
            Ok(IdentityList::NoIdentities)
        } else {
            Ok(IdentityList::Identities(state.identities.clone()))
        }
    }

    async fn start_agent(&self) -> Result<Option<AgentEnv>, AgentError> {
        self.record("start".to_string());
        self.state.lock().unwrap().running = true;
        Ok(Some(AgentEnv {
            auth_sock: Some("/tmp/ssh-fake/agent.1".to_string()),
            agent_pid: Some(2),
        }))
    }

    async fn add_identity(&self, path: &Path) -> Result<(), AgentError> {
        self.record(format!("add {}", path.display()));
        let mut state = self.state.lock().unwrap();
        if !state.running {
            return Err(no_agent());
        }
        if let Some(detail) = &state.add_failure {
            return Err(AgentError::Invocation {
                command: "ssh-add".to_string(),
                detail: detail.clone(),
            });
        }
        let line = format!("256 SHA256:{} (ED25519)", path.display());
        state.identities.push(line);
        Ok(())
    }

    async fn remove_all_identities(&self) -> Result<(), AgentError> {
        self.record("remove-all".to_string());
        let mut state = self.state.lock().unwrap();
        if !state.running {
            return Err(no_agent());
        }
        state.identities.clear();
        Ok(())
    }

    async fn probe_auth(&self, host: &str) -> Result<AuthProbe, AgentError> {
        self.record(format!("probe {}", host));
        let delay = self.state.lock().unwrap().auth_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(AuthProbe {
            exit_code: Some(1),
            diagnostics: self.state.lock().unwrap().auth_diagnostics.clone(),
        })
    }
}
