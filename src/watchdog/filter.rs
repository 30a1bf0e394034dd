use regex::Regex;

use crate::error::{WatchdogError, WatchdogResult};

/// Namespace eligibility filter. Unanchored: `mem|couch` matches `prod-memcached`.
/// An empty expression matches every namespace.
#[derive(Debug, Clone)]
pub struct NamespaceFilter {
    regex: Regex,
}

impl NamespaceFilter {
    pub fn new(expression: &str) -> WatchdogResult<Self> {
        let regex = Regex::new(expression).map_err(|source| WatchdogError::InvalidFilter {
            expression: expression.to_string(),
            source,
        })?;
        Ok(Self { regex })
    }

    pub fn matches(&self, namespace: &str) -> bool {
        self.regex.is_match(namespace)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}
