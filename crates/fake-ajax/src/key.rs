//! Canonical lookup keys for rule tables.
//!
//! A key is the lowercased method, a single space and the URL. `GET` is the
//! exception: its key is the bare URL, so rule tables written before other
//! verbs were supported keep working unchanged.

use std::borrow::Borrow;
use std::fmt;

/// Method assumed when a call does not name one.
pub const DEFAULT_METHOD: &str = "GET";

/// Canonical key identifying a method + URL pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallKey(String);

impl CallKey {
    /// Derive the key for a call.
    ///
    /// A missing or empty method means `GET`. The method is compared
    /// case-insensitively, the URL is taken verbatim.
    pub fn for_call(method: Option<&str>, url: &str) -> Self {
        let method = method
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_METHOD);

        if method.eq_ignore_ascii_case(DEFAULT_METHOD) {
            CallKey(url.to_string())
        } else {
            CallKey(format!("{} {url}", method.to_lowercase()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split a key back into its method and URL parts.
    ///
    /// Keys without a method prefix are `GET` keys. Only a leading HTTP verb
    /// (any case) counts as a prefix, so bare URLs containing spaces such as
    /// `"Search results"` are not misread.
    pub fn split(key: &str) -> (Option<&str>, &str) {
        match key.split_once(' ') {
            Some((method, url)) if looks_like_method(method) => (Some(method), url),
            _ => (None, key),
        }
    }
}

const HTTP_METHODS: [&str; 9] = [
    "GET", "HEAD", "POST", "PUT", "DELETE", "PATCH", "OPTIONS", "TRACE", "CONNECT",
];

fn looks_like_method(token: &str) -> bool {
    HTTP_METHODS.iter().any(|m| m.eq_ignore_ascii_case(token))
}

impl fmt::Display for CallKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for CallKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CallKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<CallKey> for String {
    fn from(key: CallKey) -> Self {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_get_key_is_bare_url() {
        assert_eq!(CallKey::for_call(Some("GET"), "/x").as_str(), "/x");
        assert_eq!(CallKey::for_call(Some("get"), "/x").as_str(), "/x");
        assert_eq!(CallKey::for_call(None, "/x").as_str(), "/x");
        assert_eq!(CallKey::for_call(Some(""), "/x").as_str(), "/x");
    }

    #[test]
    fn test_other_methods_are_lowercased_prefix() {
        assert_eq!(CallKey::for_call(Some("post"), "/x").as_str(), "post /x");
        assert_eq!(CallKey::for_call(Some("POST"), "/x").as_str(), "post /x");
        assert_eq!(CallKey::for_call(Some("Delete"), "/x").as_str(), "delete /x");
    }

    #[test]
    fn test_url_is_case_sensitive() {
        assert_ne!(
            CallKey::for_call(None, "/Users"),
            CallKey::for_call(None, "/users")
        );
    }

    #[test]
    fn test_split() {
        assert_eq!(CallKey::split("put /error"), (Some("put"), "/error"));
        assert_eq!(CallKey::split("/error"), (None, "/error"));
        assert_eq!(CallKey::split("/a b"), (None, "/a b"));
        assert_eq!(CallKey::split("PATCH /x"), (Some("PATCH"), "/x"));
    }

    #[test]
    fn test_split_ignores_words_that_are_not_verbs() {
        assert_eq!(CallKey::split("Search results"), (None, "Search results"));
        assert_eq!(CallKey::split("posts /x"), (None, "posts /x"));
    }

    proptest! {
        #[test]
        fn prop_missing_method_equals_get(url in "/[a-z0-9/?=&]{0,20}") {
            prop_assert_eq!(
                CallKey::for_call(None, &url),
                CallKey::for_call(Some("GET"), &url)
            );
        }

        #[test]
        fn prop_method_case_is_irrelevant(method in "[a-zA-Z]{3,7}", url in "/[a-z0-9]{0,12}") {
            prop_assert_eq!(
                CallKey::for_call(Some(&method.to_uppercase()), &url),
                CallKey::for_call(Some(&method.to_lowercase()), &url)
            );
        }

        #[test]
        fn prop_non_get_key_round_trips(method in "(post|put|delete|patch)", url in "/[a-z0-9]{0,12}") {
            let key = CallKey::for_call(Some(&method), &url);
            prop_assert_eq!(CallKey::split(key.as_str()), (Some(method.as_str()), url.as_str()));
        }
    }
}
