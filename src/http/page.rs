//! Interstitial page rendering.
//!
//! # Responsibilities
//! - Compile the page template once at startup
//! - Render the "this page has moved" page for a redirect target
//!
//! # Design Decisions
//! - Templates are HTML auto-escaped; the script uses `tojson`
//! - A user template replaces the built-in one entirely
//! - Template problems are startup errors, not request errors

use std::path::{Path, PathBuf};

use minijinja::{context, Environment};
use thiserror::Error;

/// Seconds before the page navigates to the target.
pub const COUNTDOWN_SECS: u32 = 15;

const TEMPLATE_NAME: &str = "interstitial.html";
const DEFAULT_TEMPLATE: &str = include_str!("interstitial.html");

/// Error type for template loading and rendering.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("could not read template file {}: {source}", .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Compiled interstitial template.
#[derive(Debug)]
pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    /// Renderer using the built-in page.
    pub fn builtin() -> Result<Self, PageError> {
        Self::from_source(DEFAULT_TEMPLATE.to_string())
    }

    /// Renderer using the template at `path`, or the built-in page when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, PageError> {
        match path {
            Some(path) => {
                let source = std::fs::read_to_string(path).map_err(|source| PageError::NotFound {
                    path: path.to_path_buf(),
                    source,
                })?;
                tracing::info!(path = %path.display(), "Using interstitial template from file");
                Self::from_source(source)
            }
            None => Self::builtin(),
        }
    }

    /// Compile `source` as the page template.
    pub fn from_source(source: String) -> Result<Self, PageError> {
        let mut env = Environment::new();
        env.add_template_owned(TEMPLATE_NAME, source)?;
        Ok(Self { env })
    }

    /// Render the page pointing at `redirect_uri`.
    pub fn render(&self, redirect_uri: &str) -> Result<String, PageError> {
        let template = self.env.get_template(TEMPLATE_NAME)?;
        let page = template.render(context! {
            redirect_uri => redirect_uri,
            countdown_seconds => COUNTDOWN_SECS,
        })?;
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_page_links_and_counts_down() {
        let renderer = PageRenderer::builtin().unwrap();
        let page = renderer.render("https://example.com/new").unwrap();

        // two links, the moved-to text and the script
        assert!(page.matches("example.com").count() >= 5);
        assert!(page.contains(r#"<span id="countdown">15</span>"#));
        assert!(page.contains(r#"window.location = "https://example.com/new";"#));
    }

    #[test]
    fn test_target_is_escaped() {
        let renderer = PageRenderer::builtin().unwrap();
        let page = renderer.render(r#"https://example.com/?a=1&b="2""#).unwrap();

        assert!(!page.contains(r#"b="2""#));
        assert!(page.contains("a=1&amp;b="));
    }

    #[test]
    fn test_custom_template_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<p>{{{{ redirect_uri }}}} in {{{{ countdown_seconds }}}}</p>").unwrap();

        let renderer = PageRenderer::load(Some(file.path())).unwrap();
        assert_eq!(
            renderer.render("example").unwrap(),
            "<p>example in 15</p>"
        );
    }

    #[test]
    fn test_missing_template_file() {
        let err = PageRenderer::load(Some(Path::new("/nonexistent/page.html"))).unwrap_err();
        assert!(matches!(err, PageError::NotFound { .. }));
    }

    #[test]
    fn test_broken_template() {
        let err = PageRenderer::from_source("{% if %}".to_string()).unwrap_err();
        assert!(matches!(err, PageError::Template(_)));
    }
}
