//! Rotation policy: which products a user may be shown again

use chrono::{DateTime, Duration, Utc};
use shared::Product;

use crate::config::SchedulerConfig;
use crate::error::OrchestratorResult;
use crate::traits::{InventoryStore, PromotionLedger};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    pub primary_window: Duration,
    pub fallback_window: Duration,
}

/// Eligible products plus the window that produced them
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSet {
    pub products: Vec<Product>,
    pub window: Duration,
    pub used_fallback: bool,
}

impl RotationPolicy {
    pub fn new(primary_window: Duration, fallback_window: Duration) -> Self {
        Self {
            primary_window,
            fallback_window,
        }
    }

    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::new(config.primary_window(), config.fallback_window())
    }

    pub fn cutoff(window: Duration, now: DateTime<Utc>) -> DateTime<Utc> {
        now - window
    }

    /// Eligible products for a user, at most `limit` of them.
    ///
    /// Products promoted to the user inside the primary window are excluded.
    /// When that leaves nothing, the query is retried once with the fallback
    /// window so a small catalog never starves.
    pub async fn eligible_candidates<I, L>(
        &self,
        inventory: &I,
        ledger: &L,
        user_id: &str,
        category: Option<&str>,
        limit: usize,
        now: DateTime<Utc>,
    ) -> OrchestratorResult<CandidateSet>
    where
        I: InventoryStore + ?Sized,
        L: PromotionLedger + ?Sized,
    {
        let category = category.map(str::to_string);

        let excluded = ledger
            .recent_asins(user_id, Self::cutoff(self.primary_window, now))
            .await?;
        let mut products = inventory.query_eligible(&excluded, category.clone(), true).await?;
        let mut window = self.primary_window;
        let mut used_fallback = false;

        if products.is_empty() && self.fallback_window < self.primary_window {
            let excluded = ledger
                .recent_asins(user_id, Self::cutoff(self.fallback_window, now))
                .await?;
            products = inventory.query_eligible(&excluded, category, true).await?;
            window = self.fallback_window;
            used_fallback = true;
        }

        products.truncate(limit);
        Ok(CandidateSet {
            products,
            window,
            used_fallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockInventoryStore, MockPromotionLedger};
    use chrono::TimeZone;
    use shared::CatalogEntry;
    use std::collections::HashSet;

    fn product(asin: &str) -> Product {
        Product::from_entry(CatalogEntry::with_asin(asin), &mut Vec::new()).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
    }

    fn policy() -> RotationPolicy {
        RotationPolicy::new(Duration::days(7), Duration::days(3))
    }

    #[tokio::test]
    async fn test_primary_window_used_when_products_remain() {
        let mut ledger = MockPromotionLedger::new();
        ledger
            .expect_recent_asins()
            .withf(|user, since| user == "u1" && *since == now() - Duration::days(7))
            .times(1)
            .returning(|_, _| Ok(HashSet::from(["A".to_string()])));

        let mut inventory = MockInventoryStore::new();
        inventory
            .expect_query_eligible()
            .withf(|excluded, category, active_only| excluded.contains("A") && category.is_none() && *active_only)
            .times(1)
            .returning(|_, _, _| Ok(vec![product("B"), product("C"), product("D")]));

        let set = policy()
            .eligible_candidates(&inventory, &ledger, "u1", None, 2, now())
            .await
            .unwrap();

        assert!(!set.used_fallback);
        assert_eq!(set.window, Duration::days(7));
        assert_eq!(set.products.len(), 2);
    }

    #[tokio::test]
    async fn test_falls_back_to_narrow_window_once() {
        let mut ledger = MockPromotionLedger::new();
        ledger
            .expect_recent_asins()
            .withf(|user, since| user == "u1" && *since == now() - Duration::days(7))
            .times(1)
            .returning(|_, _| Ok(HashSet::from(["A".to_string(), "B".to_string()])));
        ledger
            .expect_recent_asins()
            .withf(|user, since| user == "u1" && *since == now() - Duration::days(3))
            .times(1)
            .returning(|_, _| Ok(HashSet::from(["B".to_string()])));

        let mut inventory = MockInventoryStore::new();
        inventory
            .expect_query_eligible()
            .withf(|excluded, _, _| excluded.len() == 2)
            .times(1)
            .returning(|_, _, _| Ok(vec![]));
        inventory
            .expect_query_eligible()
            .withf(|excluded, _, _| excluded.len() == 1)
            .times(1)
            .returning(|_, _, _| Ok(vec![product("A")]));

        let set = policy()
            .eligible_candidates(&inventory, &ledger, "u1", Some("Electronics"), 5, now())
            .await
            .unwrap();

        assert!(set.used_fallback);
        assert_eq!(set.window, Duration::days(3));
        assert_eq!(set.products, vec![product("A")]);
    }
}
