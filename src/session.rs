use crate::models::{Agent, LoginResponse};

/// Signed-in agent, passed explicitly to whatever needs identity.
/// Read-only once created.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSession {
    agent: Agent,
}

impl AgentSession {
    pub fn new(agent: Agent) -> Self {
        Self { agent }
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn agent_id(&self) -> i64 {
        self.agent.id
    }

    pub fn contact_name(&self) -> &str {
        &self.agent.full_name
    }

    pub fn contact_phone(&self) -> &str {
        &self.agent.phone_number
    }

    pub fn contact_email(&self) -> &str {
        &self.agent.email
    }
}

impl From<LoginResponse> for AgentSession {
    fn from(response: LoginResponse) -> Self {
        Self::new(response.agent)
    }
}
