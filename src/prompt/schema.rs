//! Response schema handed to the generation service.
//!
//! Serializes to the OpenAPI subset the Gemini `responseSchema` field accepts
//! (`type` in upper case, `propertyOrdering` to pin the field order of the output).

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    Object,
    Array,
    String,
    Integer,
    Number,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type")]
    pub kind: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub property_ordering: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
}

/// Object member: name, schema and whether the service must always emit it.
pub struct Field {
    name: &'static str,
    schema: Schema,
    required: bool,
}

impl Field {
    pub fn required(name: &'static str, schema: Schema) -> Self {
        Field { name, schema, required: true }
    }

    pub fn optional(name: &'static str, schema: Schema) -> Self {
        Field { name, schema, required: false }
    }
}

impl Schema {
    fn leaf(kind: SchemaType) -> Self {
        Schema {
            kind,
            description: None,
            properties: BTreeMap::new(),
            property_ordering: Vec::new(),
            required: Vec::new(),
            items: None,
            min_items: None,
            max_items: None,
        }
    }

    pub fn string() -> Self {
        Self::leaf(SchemaType::String)
    }

    pub fn integer() -> Self {
        Self::leaf(SchemaType::Integer)
    }

    pub fn number() -> Self {
        Self::leaf(SchemaType::Number)
    }

    pub fn array(items: Schema) -> Self {
        Schema {
            items: Some(Box::new(items)),
            ..Self::leaf(SchemaType::Array)
        }
    }

    pub fn object(fields: Vec<Field>) -> Self {
        let mut schema = Self::leaf(SchemaType::Object);
        for field in fields {
            schema.property_ordering.push(field.name.to_string());
            if field.required {
                schema.required.push(field.name.to_string());
            }
            schema.properties.insert(field.name.to_string(), field.schema);
        }
        schema
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn bounded(mut self, min: usize, max: usize) -> Self {
        self.min_items = Some(min);
        self.max_items = Some(max);
        self
    }

    pub fn property(&self, name: &str) -> Option<&Schema> {
        self.properties.get(name)
    }
}

pub const MIN_FAQ: usize = 3;
pub const MAX_FAQ: usize = 5;

fn rating_schema() -> Schema {
    Schema::object(vec![
        Field::required(
            "ratingValue",
            Schema::number().describe("Average customer rating between 0 and 5, taken from the product data."),
        ),
        Field::required(
            "ratingCount",
            Schema::integer().describe("Number of customer reviews behind the rating, taken from the product data."),
        ),
    ])
}

fn review_schema() -> Schema {
    Schema::object(vec![
        Field::required(
            "rank",
            Schema::integer().describe("Position in the ranking, starting at 1 for the first product given."),
        ),
        Field::required("productName", Schema::string().describe("Product name as given in the input.")),
        Field::required(
            "description",
            Schema::string().describe("Detailed, persuasive review of the product in Korean."),
        ),
        Field::required(
            "pros",
            Schema::array(Schema::string()).describe("Strengths of the product in Korean."),
        ),
        Field::required(
            "cons",
            Schema::array(Schema::string()).describe("Weaknesses of the product in Korean."),
        ),
        Field::required("price", Schema::string().describe("Price as given in the input.")),
        Field::required("aggregateRating", rating_schema()),
    ])
}

fn faq_schema() -> Schema {
    Schema::object(vec![
        Field::required("question", Schema::string().describe("Question a buyer would ask, in Korean.")),
        Field::required("answer", Schema::string().describe("Helpful answer in Korean.")),
    ])
}

/// Schema of a complete article for `product_count` products.
pub fn blog_post_schema(product_count: usize) -> Schema {
    Schema::object(vec![
        Field::required(
            "blogTitle",
            Schema::string().describe("A catchy, SEO-friendly title for the blog post in Korean."),
        ),
        Field::required(
            "introduction",
            Schema::string().describe("An engaging introductory paragraph in Korean."),
        ),
        Field::required(
            "products",
            Schema::array(review_schema())
                .describe("One review per input product, in input order.")
                .bounded(product_count, product_count),
        ),
        Field::required(
            "conclusion",
            Schema::string().describe("A concluding paragraph in Korean."),
        ),
        Field::required(
            "metaDescription",
            Schema::string().describe("A 150-160 character meta description in Korean for SEO."),
        ),
        Field::required(
            "keywords",
            Schema::array(Schema::string()).describe("A list of relevant SEO keywords in Korean."),
        ),
        Field::required(
            "faq",
            Schema::array(faq_schema())
                .describe("Frequently asked questions about the products, in Korean.")
                .bounded(MIN_FAQ, MAX_FAQ),
        ),
        Field::required(
            "schemaMarkup",
            Schema::string().describe(
                "A minified string containing a valid and comprehensive JSON-LD schema including BlogPosting, Review, Product, and FAQPage.",
            ),
        ),
    ])
}

// ── Tests ──
