use sitios_entities::types::BlockContent;
use std::fmt::Write;

use super::content::{NavigationItem, PageDocument, RenderedBlock};

/// Render a page document as a self-contained HTML page with the theme CSS
/// inlined. Presentation is deliberately minimal; selection, filtering and
/// ordering happened upstream.
pub fn render_html_document(document: &PageDocument, navigation: &[NavigationItem]) -> String {
    let title = document
        .page
        .meta_title
        .as_deref()
        .unwrap_or(&document.page.title);

    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{} | {}</title>\n",
        escape_html(title),
        escape_html(&document.microsite.name),
    );
    if let Some(description) = &document.page.meta_description {
        let _ = write!(
            html,
            "<meta name=\"description\" content=\"{}\">\n",
            escape_html(description)
        );
    }
    let _ = write!(html, "<style>\n{}\n</style>\n</head>\n<body>\n", document.theme_css);

    let _ = write!(
        html,
        "<header class=\"site-header\">\n<h1>{}</h1>\n<nav class=\"site-nav\">\n",
        escape_html(&document.microsite.name)
    );
    for item in navigation {
        let _ = write!(
            html,
            "<a href=\"{}\">{}</a>\n",
            escape_html(&item.path),
            escape_html(&item.title)
        );
    }
    html.push_str("</nav>\n</header>\n<main>\n");

    for block in &document.page.blocks {
        html.push_str(&render_block(block));
    }

    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn render_block(block: &RenderedBlock) -> String {
    match &block.content {
        BlockContent::Text { heading, body } => {
            let mut out = String::from("<section class=\"block block-text\">\n");
            if let Some(heading) = heading {
                let _ = write!(out, "<h2>{}</h2>\n", escape_html(heading));
            }
            let _ = write!(out, "<p>{}</p>\n</section>\n", escape_html(body));
            out
        }
        BlockContent::Image { url, alt, caption } => {
            let mut out = format!(
                "<figure class=\"block block-image\">\n<img src=\"{}\" alt=\"{}\">\n",
                escape_html(url),
                escape_html(alt.as_deref().unwrap_or(""))
            );
            if let Some(caption) = caption {
                let _ = write!(out, "<figcaption>{}</figcaption>\n", escape_html(caption));
            }
            out.push_str("</figure>\n");
            out
        }
        BlockContent::Gallery { images } => {
            let mut out = String::from("<section class=\"block block-gallery\">\n");
            for image in images {
                let _ = write!(
                    out,
                    "<img src=\"{}\" alt=\"{}\">\n",
                    escape_html(&image.url),
                    escape_html(image.alt.as_deref().unwrap_or(""))
                );
            }
            out.push_str("</section>\n");
            out
        }
        BlockContent::Video { url, title } => {
            format!(
                "<section class=\"block block-video\">\n\
                 <video controls src=\"{}\" title=\"{}\"></video>\n</section>\n",
                escape_html(url),
                escape_html(title.as_deref().unwrap_or(""))
            )
        }
        BlockContent::Contact { heading } => {
            format!(
                "<section class=\"block block-contact\">\n<h2>{}</h2>\n\
                 <div data-contact-form></div>\n</section>\n",
                escape_html(heading.as_deref().unwrap_or("Contacto"))
            )
        }
        BlockContent::Map {
            latitude,
            longitude,
            label,
        } => {
            format!(
                "<section class=\"block block-map\" data-lat=\"{latitude}\" data-lng=\"{longitude}\">\n\
                 <span>{}</span>\n</section>\n",
                escape_html(label.as_deref().unwrap_or(""))
            )
        }
        BlockContent::CourtList { court_ids } => {
            list_section("block-court-list", "data-court-id", court_ids)
        }
        BlockContent::TournamentList { tournament_ids } => {
            list_section("block-tournament-list", "data-tournament-id", tournament_ids)
        }
        BlockContent::Calendar { calendar_id } => {
            format!(
                "<section class=\"block block-calendar\" data-calendar-id=\"{}\"></section>\n",
                escape_html(calendar_id.as_deref().unwrap_or(""))
            )
        }
        // Owner-authored markup is embedded as is.
        BlockContent::CustomHtml { html } => {
            format!("<section class=\"block block-custom\">\n{html}\n</section>\n")
        }
    }
}

fn list_section(class: &str, attr: &str, ids: &[i32]) -> String {
    let mut out = format!("<section class=\"block {class}\">\n<ul>\n");
    for id in ids {
        let _ = write!(out, "<li {attr}=\"{id}\"></li>\n");
    }
    out.push_str("</ul>\n</section>\n");
    out
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitios_entities::types::ContentBlockType;

    #[test]
    fn escapes_user_content() {
        let block = RenderedBlock {
            id: 1,
            block_type: ContentBlockType::Text,
            content: BlockContent::Text {
                heading: Some("<script>".to_string()),
                body: "a & b".to_string(),
            },
            sort_order: 0,
        };
        let html = render_block(&block);
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("a &amp; b"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn custom_html_passes_through() {
        let block = RenderedBlock {
            id: 1,
            block_type: ContentBlockType::CustomHtml,
            content: BlockContent::CustomHtml {
                html: "<marquee>hola</marquee>".to_string(),
            },
            sort_order: 0,
        };
        assert!(render_block(&block).contains("<marquee>hola</marquee>"));
    }
}
