//! Candidate scoring and top-N selection
//!
//! A score is the sum of independent terms (rating, price band, freshness,
//! conversion, trending, category affinity, campaign match) plus optional
//! jitter. Jitter comes from an explicitly seeded RNG so rankings are
//! reproducible for a given seed and input order.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::Product;

/// Seeded source of bounded score noise
#[derive(Debug, Clone)]
pub struct Jitter {
    rng: StdRng,
    max: f64,
}

impl Jitter {
    pub fn seeded(seed: u64, max: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            max: if max.is_finite() { max.max(0.0) } else { 0.0 },
        }
    }

    /// Next sample in `[0, max)`
    pub fn sample(&mut self) -> f64 {
        if self.max <= 0.0 {
            return 0.0;
        }
        self.rng.gen_range(0.0..self.max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredProduct {
    pub product: Product,
    pub score: f64,
}

fn price_term(price: Option<f64>) -> f64 {
    match price {
        Some(p) if (20.0..=300.0).contains(&p) => 30.0,
        Some(p) if p < 20.0 => 15.0,
        Some(_) => 20.0,
        None => 10.0,
    }
}

fn freshness_term(times_promoted: u32) -> f64 {
    match times_promoted {
        0..=4 => 25.0,
        5..=14 => 15.0,
        _ => 5.0,
    }
}

fn category_term(category: &str) -> f64 {
    let category = category.trim();
    if category.eq_ignore_ascii_case("electronics") {
        15.0
    } else if category.eq_ignore_ascii_case("gaming") || category.eq_ignore_ascii_case("smart home") {
        10.0
    } else {
        0.0
    }
}

fn campaign_term(category: &str, campaign_category: Option<&str>) -> f64 {
    match campaign_category {
        Some(wanted) if !wanted.trim().is_empty() && wanted.trim().eq_ignore_ascii_case(category.trim()) => 20.0,
        _ => 0.0,
    }
}

/// Deterministic part of the score
pub fn base_score(product: &Product, campaign_category: Option<&str>) -> f64 {
    let rating = product.rating.clamp(0.0, 5.0);
    let conversion = product.conversion_rate.clamp(0.0, 1.0);

    (rating / 5.0) * 50.0
        + price_term(product.price)
        + freshness_term(product.times_promoted)
        + conversion * 20.0
        + if product.is_trending { 20.0 } else { 0.0 }
        + category_term(&product.category)
        + campaign_term(&product.category, campaign_category)
}

pub fn score(product: &Product, campaign_category: Option<&str>, jitter: Option<&mut Jitter>) -> f64 {
    let noise = jitter.map(Jitter::sample).unwrap_or(0.0);
    base_score(product, campaign_category) + noise
}

/// Score every product and keep the best `n`, highest first; equal scores
/// are ordered by ASIN ascending.
pub fn select_top(
    products: Vec<Product>,
    n: usize,
    campaign_category: Option<&str>,
    mut jitter: Option<&mut Jitter>,
) -> Vec<ScoredProduct> {
    let mut scored: Vec<ScoredProduct> = products
        .into_iter()
        .map(|product| {
            let score = score(&product, campaign_category, jitter.as_deref_mut());
            ScoredProduct { product, score }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.product.asin.cmp(&b.product.asin))
    });
    scored.truncate(n);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{parse_price, CatalogEntry};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn product(asin: &str) -> Product {
        Product::from_entry(CatalogEntry::with_asin(asin), &mut Vec::new()).unwrap()
    }

    fn product_a() -> Product {
        let mut p = product("A");
        p.rating = 4.8;
        p.price = parse_price("$49.99");
        p.times_promoted = 2;
        p.conversion_rate = 0.1;
        p.is_trending = true;
        p.category = "Electronics".to_string();
        p
    }

    fn product_b() -> Product {
        let mut p = product("B");
        p.rating = 3.0;
        p.price = parse_price("$999");
        p.times_promoted = 20;
        p.category = "Books".to_string();
        p
    }

    #[test]
    fn test_worked_example_scores() {
        assert!(approx(score(&product_a(), None, None), 140.0));
        assert!(approx(score(&product_b(), None, None), 55.0));

        let top = select_top(vec![product_b(), product_a()], 1, None, None);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].product.asin, "A");
    }

    #[test]
    fn test_price_bands() {
        assert_eq!(price_term(Some(20.0)), 30.0);
        assert_eq!(price_term(Some(300.0)), 30.0);
        assert_eq!(price_term(Some(19.99)), 15.0);
        assert_eq!(price_term(Some(300.01)), 20.0);
        assert_eq!(price_term(None), 10.0);
    }

    #[test]
    fn test_freshness_bands() {
        assert_eq!(freshness_term(4), 25.0);
        assert_eq!(freshness_term(5), 15.0);
        assert_eq!(freshness_term(14), 15.0);
        assert_eq!(freshness_term(15), 5.0);
    }

    #[test]
    fn test_category_and_campaign_terms() {
        let mut p = product("G");
        p.category = " smart home ".to_string();
        let plain = base_score(&p, None);

        assert!(approx(plain, 0.0 + 10.0 + 25.0 + 10.0));
        assert!(approx(base_score(&p, Some("Smart Home")), plain + 20.0));
        assert!(approx(base_score(&p, Some("Books")), plain));
    }

    #[test]
    fn test_ties_break_by_asin() {
        let products = vec![product("C"), product("A"), product("B")];
        let top = select_top(products, 3, None, None);
        let asins: Vec<&str> = top.iter().map(|s| s.product.asin.as_str()).collect();

        assert_eq!(asins, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_jitter_is_bounded_and_reproducible() {
        let mut first = Jitter::seeded(42, 15.0);
        let mut second = Jitter::seeded(42, 15.0);

        for _ in 0..100 {
            let a = first.sample();
            assert!((0.0..15.0).contains(&a));
            assert_eq!(a, second.sample());
        }

        let mut silent = Jitter::seeded(7, 0.0);
        assert_eq!(silent.sample(), 0.0);
    }

    #[test]
    fn test_seeded_selection_is_stable() {
        let products: Vec<Product> = (0..10).map(|i| product(&format!("P{i}"))).collect();

        let mut j1 = Jitter::seeded(99, 15.0);
        let mut j2 = Jitter::seeded(99, 15.0);
        let run1 = select_top(products.clone(), 3, None, Some(&mut j1));
        let run2 = select_top(products, 3, None, Some(&mut j2));

        assert_eq!(run1, run2);
    }
}
