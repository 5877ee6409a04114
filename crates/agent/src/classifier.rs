//! Task classification — route a request to an agent kind.

use std::sync::Arc;

use codewright_core::AgentType;
use codewright_core::error::Result;
use codewright_core::provider::{ModelSettings, Provider, ProviderRequest};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

fn classification_prompt(user_prompt: &str) -> String {
    format!(
        "You are a task classifier. Analyze the following user request and determine which type of coding agent should handle it.\n\
         \n\
         Available agent types:\n\
         - ANALYZE: For code analysis, review, quality assessment, architecture evaluation, identifying issues\n\
         - CODE: For generating new code, implementing features, creating functions/classes\n\
         - BUGFIX: For debugging, fixing errors, resolving issues in existing code\n\
         \n\
         User request: {user_prompt}\n\
         \n\
         Respond with ONLY one word: ANALYZE, CODE, or BUGFIX"
    )
}

/// How much to trust a classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "confidence", rename_all = "snake_case")]
pub enum Confidence {
    /// The model answered with a valid agent type.
    Confident,
    /// The answer could not be parsed; the type is the CODE default.
    Fallback { raw: String },
}

/// The agent kind chosen for a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub agent_type: AgentType,
    #[serde(flatten)]
    pub confidence: Confidence,
}

impl Classification {
    pub fn confident(agent_type: AgentType) -> Self {
        Self {
            agent_type,
            confidence: Confidence::Confident,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.confidence, Confidence::Fallback { .. })
    }

    /// Interpret a raw classifier reply.
    ///
    /// The reply is trimmed and upper-cased; anything that is not exactly
    /// one agent type falls back to CODE.
    pub fn from_reply(raw: &str) -> Self {
        let normalized = raw.trim().to_uppercase();
        match normalized.parse::<AgentType>() {
            Ok(agent_type) => Self::confident(agent_type),
            Err(_) => Self {
                agent_type: AgentType::Code,
                confidence: Confidence::Fallback {
                    raw: raw.to_string(),
                },
            },
        }
    }
}

/// Single-shot classifier backed by a non-streaming completion.
#[derive(Clone)]
pub struct ClassificationAgent {
    provider: Arc<dyn Provider>,
    settings: ModelSettings,
}

impl ClassificationAgent {
    pub fn new(provider: Arc<dyn Provider>, settings: ModelSettings) -> Self {
        Self { provider, settings }
    }

    /// Classify a request. A provider failure is an error, not a fallback.
    pub async fn classify(&self, user_prompt: &str) -> Result<Classification> {
        let request =
            ProviderRequest::from_prompt(&self.settings, classification_prompt(user_prompt), false);
        let response = self.provider.complete(request).await?;

        let classification = Classification::from_reply(&response.message.content);
        match &classification.confidence {
            Confidence::Confident => {
                info!(agent = %classification.agent_type, "Classified request");
            }
            Confidence::Fallback { raw } => {
                warn!(reply = %raw, "Unable to parse agent type from reply, defaulting to CODE");
            }
        }
        Ok(classification)
    }
}
