use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("no admin channel known for team {0}")]
    NoAdminChannel(String),

    #[error("directory lookup failed: {0}")]
    Lookup(String),
}

/// Per-workspace lookups the flagging worker needs.
///
/// Only the admin channel is required. Name and permalink lookups are
/// cosmetic and may return `None`.
#[async_trait]
pub trait AdminDirectory: Send + Sync {
    async fn admin_channel(&self, team_id: &str) -> Result<String, DirectoryError>;

    async fn user_name(&self, _team_id: &str, _user_id: &str) -> Option<String> {
        None
    }

    async fn permalink(&self, _team_id: &str, _channel_id: &str, _ts: &str) -> Option<String> {
        None
    }
}

/// Admin channels fixed in configuration, keyed by team ID.
#[derive(Debug, Clone, Default)]
pub struct StaticAdminDirectory {
    channels: BTreeMap<String, String>,
}

impl StaticAdminDirectory {
    pub fn new(channels: BTreeMap<String, String>) -> Self {
        Self { channels }
    }
}

#[async_trait]
impl AdminDirectory for StaticAdminDirectory {
    async fn admin_channel(&self, team_id: &str) -> Result<String, DirectoryError> {
        match self.channels.get(team_id) {
            Some(channel) if !channel.is_empty() => Ok(channel.clone()),
            _ => Err(DirectoryError::NoAdminChannel(team_id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_configured_teams_only() {
        let mut channels = BTreeMap::new();
        channels.insert("TBLG57ECT".to_string(), "CADMIN01".to_string());
        channels.insert("TEMPTY".to_string(), String::new());
        let dir = StaticAdminDirectory::new(channels);

        assert_eq!(dir.admin_channel("TBLG57ECT").await.unwrap(), "CADMIN01");
        assert_eq!(
            dir.admin_channel("TOTHER").await,
            Err(DirectoryError::NoAdminChannel("TOTHER".into()))
        );
        assert!(dir.admin_channel("TEMPTY").await.is_err());
        assert_eq!(dir.user_name("TBLG57ECT", "U1").await, None);
    }
}
