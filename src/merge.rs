use tracing::warn;

use crate::error::MergeError;
use crate::model::{BlogPost, ProductInput, RenderableBlogPost, RenderableProduct};

/// Attach image and affiliate link to each review by list position.
///
/// `inputs` must be the same list, in the same order, that the article was
/// generated from. Review `i` gets the fields of input `i`; rank and id play no part.
pub fn merge(post: BlogPost, inputs: &[ProductInput]) -> Result<RenderableBlogPost, MergeError> {
    if post.products.len() != inputs.len() {
        warn!(
            generated = post.products.len(),
            inputs = inputs.len(),
            "product list changed between request and response"
        );
        return Err(MergeError::LengthMismatch {
            generated: post.products.len(),
            inputs: inputs.len(),
        });
    }

    let products = post
        .products
        .into_iter()
        .zip(inputs)
        .map(|(review, input)| RenderableProduct {
            review,
            image_url: input.image_url.clone(),
            coupang_link: input.coupang_link.clone(),
        })
        .collect();

    Ok(RenderableBlogPost {
        blog_title: post.blog_title,
        introduction: post.introduction,
        products,
        conclusion: post.conclusion,
        meta_description: post.meta_description,
        keywords: post.keywords,
        faq: post.faq,
        schema_markup: post.schema_markup,
    })
}

// ── Tests ──
