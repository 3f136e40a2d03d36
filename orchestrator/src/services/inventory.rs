//! In-memory inventory store
//!
//! Products are keyed by ASIN behind a single `RwLock`, so reads run
//! concurrently and each write is atomic for its key.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tokio::sync::RwLock;

use crate::error::OrchestratorResult;
use crate::traits::{InventoryStore, PromotionStats};
use shared::{process_debug, process_info, process_warn, CatalogEntry, ProcessId, Product, UpsertOutcome};

/// Counts from a bulk catalog import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

#[derive(Default)]
pub struct RealInventoryStore {
    products: RwLock<HashMap<String, Product>>,
}

impl RealInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Import a JSON array of catalog entries.
    ///
    /// Entries that fail validation are logged and counted as skipped; the
    /// rest of the file still loads.
    pub async fn load_catalog(&self, path: impl AsRef<Path>) -> OrchestratorResult<ImportSummary> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&raw)?;

        let summary = self.import(entries).await;
        process_info!(
            ProcessId::current(),
            "📦 Loaded catalog {}: {} imported, {} skipped",
            path.display(),
            summary.imported,
            summary.skipped
        );
        Ok(summary)
    }

    pub async fn import(&self, entries: Vec<CatalogEntry>) -> ImportSummary {
        let mut summary = ImportSummary::default();
        for entry in entries {
            match self.upsert(entry).await {
                Ok(_) => summary.imported += 1,
                Err(e) => {
                    process_warn!(ProcessId::current(), "⚠️ Skipping catalog entry: {}", e);
                    summary.skipped += 1;
                }
            }
        }
        summary
    }
}

/// Trending first, then higher conversion, fewer promotions, higher rating.
/// ASIN is the final key so the order is total.
fn eligibility_order(a: &Product, b: &Product) -> Ordering {
    b.is_trending
        .cmp(&a.is_trending)
        .then_with(|| b.conversion_rate.total_cmp(&a.conversion_rate))
        .then_with(|| a.times_promoted.cmp(&b.times_promoted))
        .then_with(|| b.rating.total_cmp(&a.rating))
        .then_with(|| a.asin.cmp(&b.asin))
}

fn category_matches(product: &Product, category: Option<&str>) -> bool {
    match category {
        Some(wanted) if !wanted.trim().is_empty() => product.category.trim().eq_ignore_ascii_case(wanted.trim()),
        _ => true,
    }
}

#[async_trait]
impl InventoryStore for RealInventoryStore {
    async fn upsert(&self, entry: CatalogEntry) -> OrchestratorResult<UpsertOutcome> {
        let mut issues = Vec::new();
        let product = Product::from_entry(entry, &mut issues)?;
        for issue in &issues {
            process_warn!(ProcessId::current(), "⚠️ Catalog validation: {}", issue);
        }

        let mut products = self.products.write().await;
        let was_new = match products.get_mut(&product.asin) {
            Some(existing) => {
                existing.merge_descriptive(product);
                false
            }
            None => {
                products.insert(product.asin.clone(), product);
                true
            }
        };
        Ok(UpsertOutcome { was_new })
    }

    async fn get(&self, asin: &str) -> OrchestratorResult<Option<Product>> {
        Ok(self.products.read().await.get(asin).cloned())
    }

    async fn query_eligible(
        &self,
        exclude: &HashSet<String>,
        category: Option<String>,
        active_only: bool,
    ) -> OrchestratorResult<Vec<Product>> {
        let products = self.products.read().await;
        let mut eligible: Vec<Product> = products
            .values()
            .filter(|p| !active_only || p.is_active)
            .filter(|p| !exclude.contains(&p.asin))
            .filter(|p| category_matches(p, category.as_deref()))
            .cloned()
            .collect();

        eligible.sort_by(eligibility_order);
        Ok(eligible)
    }

    async fn mark_promoted(&self, asin: &str, at: DateTime<Utc>) -> OrchestratorResult<Option<PromotionStats>> {
        let mut products = self.products.write().await;
        let Some(product) = products.get_mut(asin) else {
            process_warn!(ProcessId::current(), "⚠️ mark_promoted for unknown asin {}", asin);
            return Ok(None);
        };

        let previous = PromotionStats {
            times_promoted: product.times_promoted,
            last_promoted_at: product.last_promoted_at,
        };
        product.times_promoted = product.times_promoted.saturating_add(1);
        product.last_promoted_at = Some(at);

        process_debug!(ProcessId::current(), "Marked {} promoted ({} total)", asin, product.times_promoted);
        Ok(Some(previous))
    }

    async fn restore_stats(&self, asin: &str, stats: PromotionStats) -> OrchestratorResult<()> {
        if let Some(product) = self.products.write().await.get_mut(asin) {
            product.times_promoted = stats.times_promoted;
            product.last_promoted_at = stats.last_promoted_at;
        }
        Ok(())
    }
}
