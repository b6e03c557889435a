//! Configuration for the reconciliation core

use crate::{Result, StateError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Configuration for one collection cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// Treat every imported nodeinfo document as proof the node is online
    ///
    /// Set by callers whose nodeinfo feed only ever contains nodes that
    /// answered a request during this cycle.
    pub assume_online: bool,

    /// Prune records not seen for at least this many whole days
    ///
    /// `None` disables age-based pruning. A threshold of zero prunes every
    /// record carrying any `lastseen` value; the comparison is `>=`.
    pub prune_after_days: Option<i64>,
}

impl StateConfig {
    /// Deserialize a configuration fragment supplied by the embedding
    /// application and validate it
    pub fn from_value(value: Value) -> Result<Self> {
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(days) = self.prune_after_days {
            if days < 0 {
                return Err(StateError::Configuration(format!(
                    "prune_after_days must be non-negative, got {}",
                    days
                )));
            }
        }

        Ok(())
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            assume_online: false,
            prune_after_days: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_disables_pruning() {
        let config = StateConfig::default();
        assert!(!config.assume_online);
        assert_eq!(config.prune_after_days, None);
    }

    #[test]
    fn test_negative_threshold_is_rejected() {
        let config = StateConfig {
            assume_online: false,
            prune_after_days: Some(-3),
        };
        assert!(matches!(
            config.validate(),
            Err(StateError::Configuration(_))
        ));
    }

    #[test]
    fn test_from_value_roundtrip() {
        let config =
            StateConfig::from_value(json!({"assume_online": true, "prune_after_days": 30}))
                .unwrap();
        assert!(config.assume_online);
        assert_eq!(config.prune_after_days, Some(30));

        // Unknown fields are fine, wrong types are not.
        assert!(StateConfig::from_value(json!({"extra": 1})).is_ok());
        assert!(matches!(
            StateConfig::from_value(json!({"assume_online": "yes"})),
            Err(StateError::Serialization(_))
        ));
    }
}
