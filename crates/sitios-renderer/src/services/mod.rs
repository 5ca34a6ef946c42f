mod content;
mod html;
mod theme;

pub use content::{
    NavigationItem, PageDocument, RenderedBlock, RenderedPage, RendererError, RendererService,
    SiteSummary,
};
pub use html::render_html_document;
pub use theme::theme_css;
