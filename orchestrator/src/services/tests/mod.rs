//! Service-specific tests
//!
//! Each service has its own test file; shared builders live in `common`.

#[cfg(test)]
mod ledger;
#[cfg(test)]
mod user_directory;

// Common test utilities for services
#[cfg(test)]
pub mod common {
    use chrono::{DateTime, TimeZone, Utc};
    use shared::{CatalogEntry, Platform, PromotionRecord, TriggerKind};

    /// Fixed reference instant so windows are easy to reason about
    pub fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
    }

    pub fn entry(asin: &str, category: &str) -> CatalogEntry {
        CatalogEntry {
            category: Some(category.to_string()),
            ..CatalogEntry::with_asin(asin)
        }
    }

    pub fn record(user_id: &str, asin: &str, at: DateTime<Utc>) -> PromotionRecord {
        PromotionRecord::new(user_id, asin, at, vec![Platform::Discord], TriggerKind::Manual)
    }
}
