use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Engine tuning knobs, deserializable from whatever config source the host
/// process uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Production tasks are due this many days before the order itself, so
    /// components are ready for assembly and shipping.
    pub lead_time_buffer_days: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lead_time_buffer_days: 2,
        }
    }
}

impl EngineConfig {
    /// Derive a task deadline from the parent order's deadline.
    pub fn task_deadline(&self, order_deadline: DateTime<Utc>) -> DateTime<Utc> {
        order_deadline - Duration::days(self.lead_time_buffer_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_buffer_is_two_days() {
        let config = EngineConfig::default();
        let deadline = Utc::now();
        assert_eq!(config.task_deadline(deadline), deadline - Duration::days(2));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());

        let config: EngineConfig =
            serde_json::from_str(r#"{"lead_time_buffer_days": 5}"#).unwrap();
        assert_eq!(config.lead_time_buffer_days, 5);
    }
}
