use std::path::PathBuf;

use anyhow::{Context, Result};
use mcadesk_pipeline::DEFAULT_STALE_AFTER_DAYS;

const DEFAULT_HOT_LEAD_LIMIT: usize = 5;
const DEFAULT_ATTENTION_LIMIT: usize = 5;

#[derive(Clone, Debug)]
pub struct DeskConfig {
    pub snapshot_path: PathBuf,
    pub stale_after_days: i64,
    pub hot_lead_limit: usize,
    /// Cap on the stale-deal and overdue-task lists.
    pub attention_limit: usize,
}

impl DeskConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let snapshot_path = lookup("MCADESK_SNAPSHOT_PATH")
            .map(PathBuf::from)
            .context("MCADESK_SNAPSHOT_PATH is required")?;

        let stale_after_days = match lookup("MCADESK_STALE_AFTER_DAYS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .context("MCADESK_STALE_AFTER_DAYS must be an integer")?,
            None => DEFAULT_STALE_AFTER_DAYS,
        };
        if stale_after_days <= 0 {
            anyhow::bail!("MCADESK_STALE_AFTER_DAYS must be positive");
        }

        let hot_lead_limit = limit(&lookup, "MCADESK_HOT_LEAD_LIMIT", DEFAULT_HOT_LEAD_LIMIT)?;
        let attention_limit =
            limit(&lookup, "MCADESK_ATTENTION_LIMIT", DEFAULT_ATTENTION_LIMIT)?;

        Ok(Self {
            snapshot_path,
            stale_after_days,
            hot_lead_limit,
            attention_limit,
        })
    }
}

fn limit<F>(lookup: &F, key: &str, default: usize) -> Result<usize>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .with_context(|| format!("{key} must be a non-negative integer")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<DeskConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        DeskConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_path_is_set() {
        let config = load(&[("MCADESK_SNAPSHOT_PATH", "/tmp/desk.json")]).unwrap();
        assert_eq!(config.snapshot_path, PathBuf::from("/tmp/desk.json"));
        assert_eq!(config.stale_after_days, 7);
        assert_eq!(config.hot_lead_limit, 5);
        assert_eq!(config.attention_limit, 5);
    }

    #[test]
    fn snapshot_path_is_required() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("MCADESK_SNAPSHOT_PATH"));
    }

    #[test]
    fn threshold_must_be_a_positive_integer() {
        for bad in ["soon", "0", "-3"] {
            let result = load(&[
                ("MCADESK_SNAPSHOT_PATH", "/tmp/desk.json"),
                ("MCADESK_STALE_AFTER_DAYS", bad),
            ]);
            assert!(result.is_err(), "accepted {bad}");
        }
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("MCADESK_SNAPSHOT_PATH", "desk.json"),
            ("MCADESK_STALE_AFTER_DAYS", " 14 "),
            ("MCADESK_HOT_LEAD_LIMIT", "3"),
            ("MCADESK_ATTENTION_LIMIT", "10"),
        ])
        .unwrap();
        assert_eq!(config.stale_after_days, 14);
        assert_eq!(config.hot_lead_limit, 3);
        assert_eq!(config.attention_limit, 10);
    }

    #[test]
    fn limits_reject_negative_values() {
        let err = load(&[
            ("MCADESK_SNAPSHOT_PATH", "desk.json"),
            ("MCADESK_ATTENTION_LIMIT", "-1"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("MCADESK_ATTENTION_LIMIT"));
    }
}
