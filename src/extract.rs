//! JSON-LD → product record.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::model::{AggregateRating, ProductInput};

static LEADING_FLOAT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)").unwrap());
static LEADING_INT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[+-]?\d+").unwrap());

const PRODUCT_TYPE: &str = "Product";

/// Fields lifted out of a `Product` node. Absent values stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedProduct {
    pub product_name: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<String>,
    pub brand: Option<String>,
    pub aggregate_rating: Option<AggregateRating>,
}

impl ExtractedProduct {
    /// Overwrite every extracted field on `input` and close the blob editor.
    pub fn apply_to(self, input: &mut ProductInput) {
        input.product_name = self.product_name;
        input.image_url = self.image_url;
        input.price = self.price;
        input.brand = self.brand;
        input.aggregate_rating = self.aggregate_rating;
        input.is_json_ld_visible = false;
    }
}

/// Where the product node lives in a parsed blob.
#[derive(Debug)]
pub enum ProductShape<'a> {
    DirectProduct(&'a Map<String, Value>),
    GraphWrapper(&'a [Value]),
    Unrecognized,
}

impl<'a> ProductShape<'a> {
    pub fn classify(root: &'a Value) -> Self {
        let Some(obj) = root.as_object() else {
            return ProductShape::Unrecognized;
        };
        if is_product(obj) {
            return ProductShape::DirectProduct(obj);
        }
        match obj.get("@graph").and_then(Value::as_array) {
            Some(graph) => ProductShape::GraphWrapper(graph),
            None => ProductShape::Unrecognized,
        }
    }

    pub fn product_node(&self) -> Option<&'a Map<String, Value>> {
        match *self {
            ProductShape::DirectProduct(obj) => Some(obj),
            ProductShape::GraphWrapper(graph) => graph
                .iter()
                .filter_map(Value::as_object)
                .find(|node| is_product(node)),
            ProductShape::Unrecognized => None,
        }
    }
}

/// Parse a JSON-LD blob and pull the product fields out of it.
pub fn extract_product(blob: &str) -> Result<ExtractedProduct, ExtractError> {
    if blob.trim().is_empty() {
        return Err(ExtractError::MissingBlob);
    }
    let root: Value = serde_json::from_str(blob)?;
    let shape = ProductShape::classify(&root);
    let node = shape.product_node().ok_or(ExtractError::ProductNotFound)?;

    let extracted = ExtractedProduct {
        product_name: string_field(node.get("name")),
        image_url: image_field(node.get("image")),
        price: price_field(node.get("offers")),
        brand: brand_field(node.get("brand")),
        aggregate_rating: node.get("aggregateRating").and_then(rating_field),
    };
    debug!(
        name = ?extracted.product_name,
        has_rating = extracted.aggregate_rating.is_some(),
        "extracted product from JSON-LD"
    );
    Ok(extracted)
}

fn is_product(node: &Map<String, Value>) -> bool {
    match node.get("@type") {
        Some(Value::String(t)) => t == PRODUCT_TYPE,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(PRODUCT_TYPE)),
        _ => false,
    }
}

fn string_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn image_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => image_field(items.first()),
        Value::Object(obj) => string_field(obj.get("url").or_else(|| obj.get("contentUrl"))),
        _ => None,
    }
}

fn price_field(offers: Option<&Value>) -> Option<String> {
    match offers? {
        Value::Array(items) => price_field(items.first()),
        Value::Object(obj) => string_field(obj.get("price").or_else(|| obj.get("lowPrice"))),
        _ => None,
    }
}

fn brand_field(brand: Option<&Value>) -> Option<String> {
    match brand? {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => string_field(obj.get("name")),
        _ => None,
    }
}

fn rating_field(rating: &Value) -> Option<AggregateRating> {
    let obj = rating.as_object()?;
    let value = obj.get("ratingValue").and_then(parse_float);
    let count = obj
        .get("reviewCount")
        .or_else(|| obj.get("ratingCount"))
        .and_then(parse_int);

    match (value, count) {
        (Some(v), Some(c)) if (0.0..=5.0).contains(&v) && c >= 0 => Some(AggregateRating {
            rating_value: v,
            rating_count: c as u64,
        }),
        _ => {
            warn!(?value, ?count, "dropping unusable aggregateRating");
            None
        }
    }
}

/// Leading-number parse: "4.5점" → 4.5, "1,234" → 1234.
fn parse_float(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned = s.trim().replace(',', "");
            LEADING_FLOAT_RE
                .find(&cleaned)
                .and_then(|m| m.as_str().parse::<f64>().ok())
        }
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let cleaned = s.trim().replace(',', "");
            LEADING_INT_RE
                .find(&cleaned)
                .and_then(|m| m.as_str().parse::<i64>().ok())
        }
        _ => None,
    }
}

// ── Tests ──
