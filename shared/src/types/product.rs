//! Catalog products and the ingestion shape they are normalized from

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::errors::{SharedError, SharedResult};

static PRICE_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Parse a free-text currency string such as `"$1,299.99"` into a number.
///
/// Returns `None` when no amount can be found. The first amount wins, so a
/// range like `"$20 - $30"` parses as `20.0`.
pub fn parse_price(text: &str) -> Option<f64> {
    let pattern = PRICE_PATTERN.get_or_init(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("valid price pattern"));

    let matched = pattern.find(text)?;
    let cleaned: String = matched.as_str().chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Price as it arrives from ingestion: either already numeric or scraped text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Amount(f64),
    Text(String),
}

/// Loose catalog record handed over by the inventory source.
///
/// Only `asin` is required; everything else falls back to documented defaults
/// when normalized into a [`Product`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub asin: Option<String>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub price: Option<PriceInput>,
    pub rating: Option<f64>,
    pub conversion_rate: Option<f64>,
    pub is_active: Option<bool>,
    pub is_trending: Option<bool>,
    pub image_url: Option<String>,
    pub url: Option<String>,
}

impl CatalogEntry {
    /// Minimal entry with just an ASIN, mostly useful for tests and manual imports
    pub fn with_asin(asin: impl Into<String>) -> Self {
        Self {
            asin: Some(asin.into()),
            ..Default::default()
        }
    }
}

/// A promotable catalog item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub asin: String,
    pub title: String,
    pub category: String,
    /// `None` when the source price text could not be parsed
    pub price: Option<f64>,
    pub rating: f64,
    pub conversion_rate: f64,
    pub times_promoted: u32,
    pub last_promoted_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_trending: bool,
    pub image_url: Option<String>,
    pub url: Option<String>,
}

impl Product {
    /// Normalize an ingestion record.
    ///
    /// Non-fatal problems (unparsable price, out-of-range rating) are pushed onto
    /// `issues` and the offending field falls back to a safe value.
    pub fn from_entry(entry: CatalogEntry, issues: &mut Vec<String>) -> SharedResult<Self> {
        let asin = entry
            .asin
            .map(|asin| asin.trim().to_string())
            .filter(|asin| !asin.is_empty())
            .ok_or(SharedError::MissingAsin)?;

        let price = match entry.price {
            Some(PriceInput::Amount(amount)) if amount.is_finite() && amount >= 0.0 => Some(amount),
            Some(PriceInput::Amount(amount)) => {
                issues.push(format!("{asin}: rejected price {amount}"));
                None
            }
            Some(PriceInput::Text(text)) => {
                let parsed = parse_price(&text);
                if parsed.is_none() {
                    issues.push(format!("{asin}: unparsable price '{text}'"));
                }
                parsed
            }
            None => None,
        };

        let rating = clamp_field(&asin, "rating", entry.rating.unwrap_or(0.0), 5.0, issues);
        let conversion_rate = clamp_field(&asin, "conversionRate", entry.conversion_rate.unwrap_or(0.0), 1.0, issues);

        Ok(Self {
            title: entry.title.unwrap_or_default(),
            category: entry.category.unwrap_or_default(),
            price,
            rating,
            conversion_rate,
            times_promoted: 0,
            last_promoted_at: None,
            is_active: entry.is_active.unwrap_or(true),
            is_trending: entry.is_trending.unwrap_or(false),
            image_url: entry.image_url,
            url: entry.url,
            asin,
        })
    }

    /// Overwrite descriptive fields from a fresher copy, keeping promotion stats
    pub fn merge_descriptive(&mut self, fresh: Product) {
        let times_promoted = self.times_promoted;
        let last_promoted_at = self.last_promoted_at;
        *self = fresh;
        self.times_promoted = times_promoted;
        self.last_promoted_at = last_promoted_at;
    }
}

fn clamp_field(asin: &str, field: &str, value: f64, max: f64, issues: &mut Vec<String>) -> f64 {
    if !value.is_finite() {
        issues.push(format!("{asin}: {field} is not a number, using 0"));
        return 0.0;
    }
    let clamped = value.clamp(0.0, max);
    if clamped != value {
        issues.push(format!("{asin}: {field} {value} clamped to {clamped}"));
    }
    clamped
}

/// Result of an inventory upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertOutcome {
    pub was_new: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_variants() {
        assert_eq!(parse_price("$49.99"), Some(49.99));
        assert_eq!(parse_price("$1,299.00"), Some(1299.0));
        assert_eq!(parse_price("USD 999"), Some(999.0));
        assert_eq!(parse_price("$20 - $30"), Some(20.0));
        assert_eq!(parse_price("Currently unavailable."), None);
        assert_eq!(parse_price(""), None);
    }

    #[test]
    fn test_from_entry_applies_defaults() {
        let mut issues = Vec::new();
        let product = Product::from_entry(CatalogEntry::with_asin(" B000TEST "), &mut issues).unwrap();

        assert_eq!(product.asin, "B000TEST");
        assert_eq!(product.rating, 0.0);
        assert_eq!(product.conversion_rate, 0.0);
        assert!(product.is_active);
        assert!(!product.is_trending);
        assert_eq!(product.price, None);
        assert_eq!(product.times_promoted, 0);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_from_entry_requires_asin() {
        let mut issues = Vec::new();
        let entry = CatalogEntry {
            asin: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(Product::from_entry(entry, &mut issues), Err(SharedError::MissingAsin));
    }

    #[test]
    fn test_from_entry_reports_non_fatal_issues() {
        let mut issues = Vec::new();
        let entry = CatalogEntry {
            asin: Some("B0BAD".to_string()),
            price: Some(PriceInput::Text("See price in cart".to_string())),
            rating: Some(7.5),
            ..Default::default()
        };

        let product = Product::from_entry(entry, &mut issues).unwrap();
        assert_eq!(product.price, None);
        assert_eq!(product.rating, 5.0);
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn test_catalog_entry_accepts_numeric_or_text_price() {
        let json = r#"[{"asin":"A1","price":"$12.50"},{"asin":"A2","price":30}]"#;
        let entries: Vec<CatalogEntry> = serde_json::from_str(json).unwrap();

        assert_eq!(entries[0].price, Some(PriceInput::Text("$12.50".to_string())));
        assert_eq!(entries[1].price, Some(PriceInput::Amount(30.0)));
    }

    #[test]
    fn test_merge_descriptive_keeps_stats() {
        let mut issues = Vec::new();
        let mut stored = Product::from_entry(CatalogEntry::with_asin("A1"), &mut issues).unwrap();
        stored.times_promoted = 4;
        stored.last_promoted_at = Some(Utc::now());

        let mut fresh = Product::from_entry(CatalogEntry::with_asin("A1"), &mut issues).unwrap();
        fresh.title = "Renamed".to_string();
        stored.merge_descriptive(fresh);

        assert_eq!(stored.title, "Renamed");
        assert_eq!(stored.times_promoted, 4);
        assert!(stored.last_promoted_at.is_some());
    }
}
