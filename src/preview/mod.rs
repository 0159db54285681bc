//! Link previews for social crawlers
//!
//! Link unfurlers (Facebook, WhatsApp, Twitter, ...) do not run the
//! storefront SPA, so product links point here instead. Crawlers get a static
//! page with Open Graph tags; people get redirected to the storefront.

use serde::Deserialize;
use validator::Validate;

use crate::config::PreviewConfig;

/// Which `og:url` policy a preview endpoint uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    /// `og:url` is the backend URL (`self_url`), falling back to the storefront URL.
    Product,
    /// `og:url` is always the storefront URL so the Facebook card stays clickable.
    Facebook,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PreviewQuery {
    #[validate(custom(function = "not_blank"))]
    pub name: Option<String>,
    pub desc: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub image: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub spa_url: Option<String>,
    pub self_url: Option<String>,
}

fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

/// Fully resolved preview content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPreview {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub spa_url: String,
    pub og_url: String,
}

impl PreviewQuery {
    /// `None` when a required field (`name`, `image`, `spa_url`) is missing or blank.
    pub fn resolve(&self, kind: PreviewKind, config: &PreviewConfig) -> Option<ProductPreview> {
        if self.validate().is_err() {
            return None;
        }
        let title = self.name.clone()?;
        let image_url = self.image.clone()?;
        let spa_url = self.spa_url.clone()?;

        let description = self
            .desc
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| config.default_description.clone());

        let og_url = match kind {
            PreviewKind::Product => self
                .self_url
                .clone()
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| spa_url.clone()),
            PreviewKind::Facebook => spa_url.clone(),
        };

        Some(ProductPreview {
            title,
            description,
            image_url,
            spa_url,
            og_url,
        })
    }
}

/// Case-insensitive substring match of the user agent against `agents`.
pub fn is_crawler(user_agent: &str, agents: &[String]) -> bool {
    let ua = user_agent.to_lowercase();
    agents
        .iter()
        .filter(|a| !a.is_empty())
        .any(|a| ua.contains(&a.to_lowercase()))
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape for a double-quoted JS string inside a `<script>` block.
pub fn escape_js(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '<' => out.push_str("\\u003C"),
            '>' => out.push_str("\\u003E"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_page(preview: &ProductPreview, site_name: &str) -> String {
    let title = escape_html(&preview.title);
    let description = escape_html(&preview.description);
    let image = escape_html(&preview.image_url);
    let og_url = escape_html(&preview.og_url);
    let spa_url = escape_html(&preview.spa_url);
    let site_name = escape_html(site_name);
    let spa_url_js = escape_js(&preview.spa_url);

    format!(
        r#"<!doctype html>
<html lang="es">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{title}</title>

  <meta property="og:site_name" content="{site_name}" />
  <meta property="og:type" content="product" />
  <meta property="og:title" content="{title}" />
  <meta property="og:description" content="{description}" />
  <meta property="og:image" content="{image}" />
  <meta property="og:image:alt" content="{title}" />
  <meta property="og:url" content="{og_url}" />
  <link rel="canonical" href="{spa_url}" />

  <meta name="twitter:card" content="summary_large_image" />
</head>
<body>
  <main style="font-family: system-ui, sans-serif; padding: 32px; text-align:center;">
    <h1>Cargando producto…</h1>
    <p>Si no eres un bot, haz clic para ver el producto:</p>
    <p><a href="{spa_url}">{spa_url}</a></p>
  </main>
  <script>
    setTimeout(function () {{ window.location.replace("{spa_url_js}"); }}, 400);
  </script>
</body>
</html>"#
    )
}
