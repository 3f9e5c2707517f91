//! Renderer: turns the markdown preview into a print-ready document.
//!
//! `AppState` holds an `Arc<dyn Renderer>`; a true document-generation backend
//! can replace `HtmlPrintRenderer` without touching the composer or pipeline.

use std::sync::LazyLock;

use pulldown_cmark::{html, Options, Parser};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::resume::print_style::{PRINT_STYLESHEET, PRINT_TITLE};

static STYLE_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s+style\s*=\s*("[^"]*"|'[^']*')"#).expect("style pattern is valid")
});

static CLASS_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s+class\s*=\s*("[^"]*"|'[^']*')"#).expect("class pattern is valid")
});

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Nothing to render")]
    Empty,
}

/// A standalone document ready to hand to a print surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrintableDocument {
    /// Sanitized body markup.
    pub body: String,
    /// Full HTML document: print stylesheet plus body.
    pub html: String,
}

pub trait Renderer: Send + Sync {
    fn render(&self, markdown: &str) -> Result<PrintableDocument, RenderError>;
}

/// Markdown → HTML via pulldown-cmark, styled only by the fixed print stylesheet.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlPrintRenderer;

impl Renderer for HtmlPrintRenderer {
    fn render(&self, markdown: &str) -> Result<PrintableDocument, RenderError> {
        let markup = render_markdown(markdown);
        let body = sanitize_markup(&markup);
        if body.trim().is_empty() {
            return Err(RenderError::Empty);
        }
        let html = wrap_for_print(&body);
        Ok(PrintableDocument { body, html })
    }
}

/// Off-screen rendering of the preview, GitHub-flavoured like the editor's preview.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Strips every inline `style` and `class` attribute.
pub fn sanitize_markup(markup: &str) -> String {
    let without_style = STYLE_ATTR_RE.replace_all(markup, "");
    CLASS_ATTR_RE.replace_all(&without_style, "").into_owned()
}

pub fn wrap_for_print(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{PRINT_TITLE}</title>\n<style>{PRINT_STYLESHEET}</style>\n</head>\n<body>\n{body}</body>\n</html>\n"
    )
}
