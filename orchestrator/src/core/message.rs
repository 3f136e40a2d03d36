//! Uniform message handed to every notification channel

use shared::Product;

/// Text, image and link triple; each channel decides how to render it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionMessage {
    pub text: String,
    pub image_url: Option<String>,
    pub link: Option<String>,
}

impl PromotionMessage {
    pub fn new(text: impl Into<String>, image_url: Option<String>, link: Option<String>) -> Self {
        Self {
            text: text.into(),
            image_url,
            link,
        }
    }

    pub fn for_product(product: &Product, affiliate_tag: Option<&str>) -> Self {
        let mut text = if product.title.is_empty() {
            format!("Deal: {}", product.asin)
        } else {
            format!("Deal: {}", product.title)
        };
        if let Some(price) = product.price {
            text.push_str(&format!(" for ${price:.2}"));
        }
        if product.rating > 0.0 {
            text.push_str(&format!(" ({:.1}/5)", product.rating));
        }

        Self {
            text,
            image_url: product.image_url.clone(),
            link: Some(product_link(product, affiliate_tag)),
        }
    }
}

/// Product URL with the affiliate tag appended as a `tag` query parameter
fn product_link(product: &Product, affiliate_tag: Option<&str>) -> String {
    let base = product
        .url
        .clone()
        .unwrap_or_else(|| format!("https://www.amazon.com/dp/{}", product.asin));

    match affiliate_tag {
        Some(tag) if !tag.is_empty() => {
            let separator = if base.contains('?') { '&' } else { '?' };
            format!("{base}{separator}tag={tag}")
        }
        _ => base,
    }
}
