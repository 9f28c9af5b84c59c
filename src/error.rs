use std::time::Duration;
use thiserror::Error;

/// Failures reported by the connection handle or its navigator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("no path to goal: {0}")]
    PathNotFound(String),
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("{0}")]
    Rejected(String),
    #[error("connection closed")]
    Closed,
}

/// Outcome of a failed action
///
/// Every variant is handled locally by the caller: the action has already
/// reported it on the status channel, nothing here aborts the process.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Name unknown to the loaded game-data table
    #[error("{category} \"{name}\" not found in this Minecraft version")]
    UnknownName { category: &'static str, name: String },

    /// No matching block, entity or player in range
    #[error("{0}")]
    NotFound(String),

    /// Required item not in inventory
    #[error("I don't have any {0}")]
    MissingItem(String),

    /// Navigator rejected the goal
    #[error("failed to reach {target}: {source}")]
    Navigation {
        target: String,
        #[source]
        source: ConnectionError,
    },

    /// Dig, place, craft, equip or container operation rejected
    #[error("{action} failed: {source}")]
    Rejected {
        action: String,
        #[source]
        source: ConnectionError,
    },

    /// A local check said the action cannot be done
    #[error("{0}")]
    CannotPerform(String),

    #[error("timed out after {after:?} waiting for {what}")]
    Timeout { what: String, after: Duration },

    #[error("{0} cancelled")]
    Cancelled(String),
}

impl ActionError {
    pub fn unknown_block(name: &str) -> Self {
        ActionError::UnknownName {
            category: "Block",
            name: name.to_string(),
        }
    }

    pub fn unknown_item(name: &str) -> Self {
        ActionError::UnknownName {
            category: "Item",
            name: name.to_string(),
        }
    }

    pub fn navigation(target: impl Into<String>, source: ConnectionError) -> Self {
        ActionError::Navigation {
            target: target.into(),
            source,
        }
    }

    pub fn rejected(action: impl Into<String>, source: ConnectionError) -> Self {
        ActionError::Rejected {
            action: action.into(),
            source,
        }
    }

    /// Whether this error means a name, block, item or entity was missing
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ActionError::UnknownName { .. } | ActionError::NotFound(_) | ActionError::MissingItem(_)
        )
    }
}

pub type ActionResult<T> = Result<T, ActionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ActionError::unknown_block("stoen").to_string(),
            "Block \"stoen\" not found in this Minecraft version"
        );
        let err = ActionError::navigation(
            "crafting table",
            ConnectionError::PathNotFound("blocked".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "failed to reach crafting table: no path to goal: blocked"
        );
        assert!(!err.is_not_found());
        assert!(ActionError::MissingItem("coal".into()).is_not_found());
    }
}
