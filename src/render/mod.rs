pub mod html;
pub mod markdown;

use crate::model::RenderableBlogPost;

pub use html::render_html;
pub use markdown::{export_markdown, render_markdown};

pub const HEADING_PRODUCTS: &str = "추천 상품 목록";
pub const HEADING_CONCLUSION: &str = "결론";
pub const HEADING_FAQ: &str = "자주 묻는 질문 (FAQ)";
pub const CTA_LABEL: &str = "쿠팡에서 최저가 확인하기";
pub const DISCLOSURE: &str =
    "이 포스팅은 쿠팡 파트너스 활동의 일환으로, 이에 따른 일정액의 수수료를 제공받습니다.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Html,
    Markdown,
}

impl ExportFormat {
    pub fn file_extension(self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Markdown => "md",
        }
    }

    /// Where the exported text is meant to be pasted.
    pub fn save_hint(self) -> &'static str {
        match self {
            ExportFormat::Html => {
                "위 코드를 복사하여 HTML 파일로 저장하거나, 블로그 에디터의 HTML 모드에 붙여넣으세요."
            }
            ExportFormat::Markdown => "위 코드를 복사하여 새로운 .md 파일에 붙여넣으세요.",
        }
    }
}

pub fn export(post: &RenderableBlogPost, format: ExportFormat) -> String {
    match format {
        ExportFormat::Html => render_html(post),
        ExportFormat::Markdown => export_markdown(post),
    }
}

// ── Tests ──
