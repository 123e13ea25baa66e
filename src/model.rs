use std::fmt;

use serde::{Deserialize, Serialize};

/// Session-unique handle for a product row. Stable across edits and reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "product-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRating {
    pub rating_value: f64,
    pub rating_count: u64,
}

/// One user-entered product row. List position is the ranking fed to generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub id: ProductId,
    pub coupang_link: String,
    pub json_ld: String,
    /// Editor toggle only; never sent to the generation service.
    pub is_json_ld_visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_rating: Option<AggregateRating>,
}

impl ProductInput {
    pub fn empty(id: ProductId) -> Self {
        ProductInput {
            id,
            coupang_link: String::new(),
            json_ld: String::new(),
            is_json_ld_visible: false,
            product_name: None,
            image_url: None,
            price: None,
            brand: None,
            aggregate_rating: None,
        }
    }

    /// Name and affiliate link are both filled in.
    pub fn is_complete(&self) -> bool {
        let named = self
            .product_name
            .as_deref()
            .is_some_and(|n| !n.trim().is_empty());
        named && !self.coupang_link.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductReview {
    pub rank: u32,
    pub product_name: String,
    pub description: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub price: String,
    pub aggregate_rating: AggregateRating,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

/// Article as returned by the generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub blog_title: String,
    pub introduction: String,
    pub products: Vec<ProductReview>,
    pub conclusion: String,
    pub meta_description: String,
    pub keywords: Vec<String>,
    pub faq: Vec<Faq>,
    /// Minified JSON-LD, passed through untouched.
    pub schema_markup: String,
}

impl BlogPost {
    /// Sort reviews by ascending rank. Stable, so equal ranks keep service order.
    pub fn sort_by_rank(&mut self) {
        self.products.sort_by_key(|p| p.rank);
    }
}

/// A generated review joined with the user-only fields the model never sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderableProduct {
    #[serde(flatten)]
    pub review: ProductReview,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub coupang_link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderableBlogPost {
    pub blog_title: String,
    pub introduction: String,
    pub products: Vec<RenderableProduct>,
    pub conclusion: String,
    pub meta_description: String,
    pub keywords: Vec<String>,
    pub faq: Vec<Faq>,
    pub schema_markup: String,
}

// ── Tests ──
