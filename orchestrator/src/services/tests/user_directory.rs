//! User directory loading and campaign counters

use crate::services::user_directory::{DirectorySeed, RealUserDirectory};
use crate::traits::UserDirectory;
use crate::OrchestratorError;
use shared::{Campaign, Tier, UserSnapshot};
use uuid::Uuid;

#[tokio::test]
async fn test_load_from_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    let campaign_id = Uuid::new_v4();
    std::fs::write(
        &path,
        format!(
            r#"{{
                "users": [
                    {{"userId": "u2", "tier": "pro", "channels": {{"discordWebhookUrl": "https://d/1"}}}},
                    {{"userId": "u1", "tier": "free"}}
                ],
                "campaigns": [
                    {{"id": "{campaign_id}", "userId": "u2", "category": "Gaming"}}
                ]
            }}"#
        ),
    )
    .unwrap();

    let directory = RealUserDirectory::from_json_file(&path).await.unwrap();

    let users = directory.list_users().await.unwrap();
    assert_eq!(users.iter().map(|u| u.user_id.as_str()).collect::<Vec<_>>(), vec!["u1", "u2"]);
    assert!(users[1].has_channels());

    let campaign = directory.get_campaign(campaign_id).await.unwrap().unwrap();
    assert!(campaign.is_active);
    assert_eq!(campaign.category.as_deref(), Some("Gaming"));
}

#[tokio::test]
async fn test_record_campaign_post_increments() {
    let campaign = Campaign::new("u1", "Summer", None);
    let id = campaign.id;
    let directory = RealUserDirectory::from_seed(DirectorySeed {
        users: vec![UserSnapshot::new("u1", Tier::Premium)],
        campaigns: vec![campaign],
    });

    directory.record_campaign_post(id).await.unwrap();
    directory.record_campaign_post(id).await.unwrap();

    assert_eq!(directory.get_campaign(id).await.unwrap().unwrap().total_posts, 2);
}

#[tokio::test]
async fn test_unknown_campaign_post_is_error() {
    let directory = RealUserDirectory::new();
    let result = directory.record_campaign_post(Uuid::new_v4()).await;

    assert!(matches!(result, Err(OrchestratorError::CampaignNotFound { .. })));
}

#[tokio::test]
async fn test_missing_user_is_none() {
    let directory = RealUserDirectory::new();
    directory.insert_user(UserSnapshot::new("u1", Tier::Free)).await;

    assert!(directory.get_user("u1").await.unwrap().is_some());
    assert!(directory.get_user("ghost").await.unwrap().is_none());
}
