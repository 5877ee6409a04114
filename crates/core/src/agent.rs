//! Agent kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of specialist agents a request can be routed to.
///
/// Chosen once per request by classification and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AgentType {
    /// Code analysis, review, architecture evaluation
    Analyze,
    /// New code, features, functions/classes
    Code,
    /// Debugging and fixing existing code
    Bugfix,
}

impl AgentType {
    pub const ALL: [AgentType; 3] = [AgentType::Analyze, AgentType::Code, AgentType::Bugfix];

    /// The token the classifier is asked to answer with.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Analyze => "ANALYZE",
            Self::Code => "CODE",
            Self::Bugfix => "BUGFIX",
        }
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not exactly one of the agent tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not an agent type: '{0}'")]
pub struct ParseAgentTypeError(pub String);

impl FromStr for AgentType {
    type Err = ParseAgentTypeError;

    /// Exact match against the upper-case tokens; callers normalise first.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ANALYZE" => Ok(Self::Analyze),
            "CODE" => Ok(Self::Code),
            "BUGFIX" => Ok(Self::Bugfix),
            other => Err(ParseAgentTypeError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exact_tokens() {
        assert_eq!("ANALYZE".parse::<AgentType>().unwrap(), AgentType::Analyze);
        assert_eq!("CODE".parse::<AgentType>().unwrap(), AgentType::Code);
        assert_eq!("BUGFIX".parse::<AgentType>().unwrap(), AgentType::Bugfix);
    }

    #[test]
    fn rejects_anything_else() {
        assert!("bugfix".parse::<AgentType>().is_err());
        assert!("MAYBE BUGFIX?".parse::<AgentType>().is_err());
        assert!("".parse::<AgentType>().is_err());
    }

    #[test]
    fn serializes_upper_case() {
        let json = serde_json::to_string(&AgentType::Bugfix).unwrap();
        assert_eq!(json, r#""BUGFIX""#);
        assert_eq!(AgentType::Code.to_string(), "CODE");
    }
}
