//! URL slug derivation.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A URL-safe identifier derived from a display name.
///
/// Slugs are regenerated whenever the source name changes, so
/// `products.slug` and `categories.slug` always track the current name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(transparent))]
pub struct Slug(String);

impl Slug {
    /// Derive a slug from a display name.
    ///
    /// Lowercases the input and collapses every run of non-alphanumeric
    /// characters into a single hyphen. Edge hyphens are trimmed so
    /// "Fresh Fruits!" becomes "fresh-fruits", not "fresh-fruits-".
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let mut out = String::with_capacity(name.len());
        let mut pending_hyphen = false;

        for c in name.chars() {
            if c.is_ascii_alphanumeric() {
                if pending_hyphen && !out.is_empty() {
                    out.push('-');
                }
                pending_hyphen = false;
                out.push(c.to_ascii_lowercase());
            } else {
                pending_hyphen = true;
            }
        }

        Self(out)
    }

    /// The slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the `Slug` and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases() {
        assert_eq!(Slug::from_name("Fresh Fruits").as_str(), "fresh-fruits");
    }

    #[test]
    fn test_collapses_symbol_runs() {
        assert_eq!(
            Slug::from_name("Milk & Dairy  Products").as_str(),
            "milk-dairy-products"
        );
    }

    #[test]
    fn test_trims_edge_hyphens() {
        assert_eq!(Slug::from_name("  Organic Honey!  ").as_str(), "organic-honey");
        assert_eq!(Slug::from_name("!!!").as_str(), "");
    }

    #[test]
    fn test_keeps_digits() {
        assert_eq!(Slug::from_name("Coke 1.5L").as_str(), "coke-1-5l");
    }
}
