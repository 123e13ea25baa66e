pub mod instruction;
pub mod schema;

pub use instruction::{build_instruction, product_summary, SiteProfile};
pub use schema::{blog_post_schema, Field, Schema, SchemaType};
