use serde::{Deserialize, Serialize};

/// Category of a contact request. Decides the subject prefix of the
/// outbound mail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum Variant {
    Art,
    UxUi,
    Photography,
    ContactSection,
    #[default]
    Default,
}

impl Variant {
    /// Parse a wire tag. Unknown tags fall back to [`Variant::Default`].
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "art" => Self::Art,
            "uxui" => Self::UxUi,
            "photography" => Self::Photography,
            "contact-section" => Self::ContactSection,
            _ => Self::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Art => "art",
            Self::UxUi => "uxui",
            Self::Photography => "photography",
            Self::ContactSection => "contact-section",
            Self::Default => "default",
        }
    }

    /// Human-readable prefix for the mail subject line.
    pub fn subject_prefix(&self) -> &'static str {
        match self {
            Self::UxUi => "UX/UI",
            Self::Photography => "Fotografie",
            Self::Art | Self::ContactSection | Self::Default => "Kunst",
        }
    }
}

impl From<String> for Variant {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<Variant> for &'static str {
    fn from(variant: Variant) -> Self {
        variant.as_str()
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Site-wide colour scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Self::Dark)
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_prefixes() {
        assert_eq!(Variant::UxUi.subject_prefix(), "UX/UI");
        assert_eq!(Variant::Photography.subject_prefix(), "Fotografie");
        assert_eq!(Variant::Art.subject_prefix(), "Kunst");
        assert_eq!(Variant::ContactSection.subject_prefix(), "Kunst");
        assert_eq!(Variant::Default.subject_prefix(), "Kunst");
    }

    #[test]
    fn test_unknown_variant_falls_back() {
        let v: Variant = serde_json::from_str("\"sculpture\"").unwrap();
        assert_eq!(v, Variant::Default);

        let v: Variant = serde_json::from_str("\"contact-section\"").unwrap();
        assert_eq!(v, Variant::ContactSection);
        assert_eq!(serde_json::to_string(&v).unwrap(), "\"contact-section\"");
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(ThemeMode::Light.toggled(), ThemeMode::Dark);
        assert_eq!(ThemeMode::Dark.toggled().toggled(), ThemeMode::Dark);
        assert_eq!(serde_json::to_string(&ThemeMode::Light).unwrap(), "\"light\"");
    }
}
