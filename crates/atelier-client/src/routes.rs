use serde::{Deserialize, Serialize};

use atelier_shared::Variant;

/// Pages of the studio site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Home,
    Art,
    Design,
    Impressum,
    Datenschutz,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Home,
        Page::Art,
        Page::Design,
        Page::Impressum,
        Page::Datenschutz,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Art => "/art",
            Self::Design => "/design",
            Self::Impressum => "/impressum",
            Self::Datenschutz => "/datenschutz",
        }
    }

    /// Resolve a request path, ignoring query string, fragment and a
    /// trailing slash.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };
        Self::ALL.into_iter().find(|p| p.path() == normalized)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Home => "Start",
            Self::Art => "Kunst",
            Self::Design => "Design",
            Self::Impressum => "Impressum",
            Self::Datenschutz => "Datenschutz",
        }
    }

    /// Variant attached to submissions from this page's contact form.
    pub fn contact_variant(&self) -> Variant {
        match self {
            Self::Art => Variant::Art,
            Self::Design => Variant::UxUi,
            Self::Home => Variant::ContactSection,
            Self::Impressum | Self::Datenschutz => Variant::Default,
        }
    }
}
