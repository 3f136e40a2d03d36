//! In-memory user and campaign directory
//!
//! Stands in for the subscription store. It can be seeded from a JSON file of
//! the shape `{ "users": [...], "campaigns": [...] }`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::UserDirectory;
use shared::{process_info, Campaign, ProcessId, UserSnapshot};

/// On-disk layout of a directory seed file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectorySeed {
    #[serde(default)]
    pub users: Vec<UserSnapshot>,
    #[serde(default)]
    pub campaigns: Vec<Campaign>,
}

#[derive(Default)]
pub struct RealUserDirectory {
    users: RwLock<HashMap<String, UserSnapshot>>,
    campaigns: RwLock<HashMap<Uuid, Campaign>>,
}

impl RealUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: DirectorySeed) -> Self {
        let users = seed.users.into_iter().map(|u| (u.user_id.clone(), u)).collect();
        let campaigns = seed.campaigns.into_iter().map(|c| (c.id, c)).collect();
        Self {
            users: RwLock::new(users),
            campaigns: RwLock::new(campaigns),
        }
    }

    pub async fn from_json_file(path: impl AsRef<Path>) -> OrchestratorResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await?;
        let seed: DirectorySeed = serde_json::from_str(&raw)?;

        process_info!(
            ProcessId::current(),
            "👥 Loaded {} users and {} campaigns from {}",
            seed.users.len(),
            seed.campaigns.len(),
            path.display()
        );
        Ok(Self::from_seed(seed))
    }

    pub async fn insert_user(&self, user: UserSnapshot) {
        self.users.write().await.insert(user.user_id.clone(), user);
    }

    pub async fn insert_campaign(&self, campaign: Campaign) {
        self.campaigns.write().await.insert(campaign.id, campaign);
    }
}

#[async_trait]
impl UserDirectory for RealUserDirectory {
    async fn get_user(&self, user_id: &str) -> OrchestratorResult<Option<UserSnapshot>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn list_users(&self) -> OrchestratorResult<Vec<UserSnapshot>> {
        let mut users: Vec<UserSnapshot> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(users)
    }

    async fn get_campaign(&self, campaign_id: Uuid) -> OrchestratorResult<Option<Campaign>> {
        Ok(self.campaigns.read().await.get(&campaign_id).cloned())
    }

    async fn record_campaign_post(&self, campaign_id: Uuid) -> OrchestratorResult<()> {
        let mut campaigns = self.campaigns.write().await;
        let campaign = campaigns
            .get_mut(&campaign_id)
            .ok_or(OrchestratorError::CampaignNotFound { campaign_id })?;
        campaign.total_posts += 1;
        Ok(())
    }
}
