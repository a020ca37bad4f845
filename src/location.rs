//! Page location service: the current URL and its query parameters.

use url::{form_urlencoded, Url};

use crate::Result;

/// Snapshot of the page URL the manager resolves overrides against.
///
/// Parameter lookup follows `URLSearchParams.get`: values are
/// percent-decoded and the first occurrence of a name wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLocation {
    href: String,
    params: Vec<(String, String)>,
}

impl PageLocation {
    /// Parse an absolute page URL.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidLocation` if `href` is not an absolute URL.
    pub fn parse(href: &str) -> Result<Self> {
        let url = Url::parse(href)?;
        let params = url.query_pairs().into_owned().collect();
        Ok(Self {
            href: url.into(),
            params,
        })
    }

    /// Build a location from a bare query string, with or without the
    /// leading `?`. The base URL of such a location is empty.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let trimmed = query.strip_prefix('?').unwrap_or(query);
        let params = form_urlencoded::parse(trimmed.as_bytes())
            .into_owned()
            .collect();
        Self {
            href: format!("?{trimmed}"),
            params,
        }
    }

    /// Full href
    #[must_use]
    pub fn href(&self) -> &str {
        &self.href
    }

    /// Href up to, not including, the first `?`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.href.split('?').next().unwrap_or_default()
    }

    /// First value of the query parameter `name`.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether `name` is present with a non-empty value.
    #[must_use]
    pub fn is_truthy(&self, name: &str) -> bool {
        self.param(name).is_some_and(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reads_params() {
        let location =
            PageLocation::parse("https://shop.test/cart?ab-test=exp1&ab-variant=a").unwrap();

        assert_eq!(location.param("ab-test"), Some("exp1"));
        assert_eq!(location.param("ab-variant"), Some("a"));
        assert_eq!(location.param("missing"), None);
        assert_eq!(location.base_url(), "https://shop.test/cart");
    }

    #[test]
    fn test_first_occurrence_wins() {
        let location = PageLocation::from_query("?ab-test=first&ab-test=second");
        assert_eq!(location.param("ab-test"), Some("first"));
    }

    #[test]
    fn test_values_are_percent_decoded() {
        let location = PageLocation::from_query("ab-variant=big%20button");
        assert_eq!(location.param("ab-variant"), Some("big button"));
    }

    #[test]
    fn test_empty_value_is_not_truthy() {
        let location = PageLocation::from_query("?ab-test-debug&other=1");

        assert_eq!(location.param("ab-test-debug"), Some(""));
        assert!(!location.is_truthy("ab-test-debug"));
        assert!(location.is_truthy("other"));
    }

    #[test]
    fn test_parse_rejects_relative_href() {
        assert!(PageLocation::parse("/relative?x=1").is_err());
    }

    #[test]
    fn test_default_has_no_params() {
        let location = PageLocation::default();
        assert_eq!(location.param("ab-test"), None);
        assert_eq!(location.base_url(), "");
    }
}
