//! # Resource Filtering
//!
//! A view over the extracted resources driven by include, exclude and regex
//! criteria. Filtering never removes anything from the resource map itself.

use std::collections::HashSet;
use std::fmt;

use regex::Regex;

use crate::error::AppResult;
use crate::models::Resource;

/// Caller-supplied filter criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceFilter {
    /// Names to keep, matched case-insensitively. Wins over `exclude`.
    pub include: Vec<String>,
    /// Names to drop, matched case-insensitively.
    pub exclude: Vec<String>,
    /// Regex tested against the resource name as written in the paths.
    pub pattern: Option<String>,
}

impl ResourceFilter {
    /// True when no criterion is set.
    pub fn is_empty(&self) -> bool {
        self.include.is_empty()
            && self.exclude.is_empty()
            && self.pattern.as_deref().map_or(true, str::is_empty)
    }
}

impl fmt::Display for ResourceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.include.is_empty() {
            parts.push(format!("include: {}", self.include.join(", ")));
        }
        if !self.exclude.is_empty() {
            parts.push(format!("exclude: {}", self.exclude.join(", ")));
        }
        if let Some(pattern) = self.pattern.as_deref().filter(|p| !p.is_empty()) {
            parts.push(format!("pattern: {}", pattern));
        }

        if parts.is_empty() {
            write!(f, "no filter")
        } else {
            write!(f, "{}", parts.join("; "))
        }
    }
}

/// A compiled [`ResourceFilter`].
#[derive(Debug, Clone)]
pub struct ResourceFilterer {
    include: HashSet<String>,
    exclude: HashSet<String>,
    pattern: Option<Regex>,
}

impl ResourceFilterer {
    /// Compiles the filter. An invalid regex is rejected here, before any
    /// resource is looked at.
    pub fn new(filter: &ResourceFilter) -> AppResult<Self> {
        let pattern = match filter.pattern.as_deref() {
            Some(p) if !p.is_empty() => Some(Regex::new(p)?),
            _ => None,
        };
        let lowered = |names: &[String]| -> HashSet<String> {
            names.iter().map(|n| n.to_lowercase()).collect()
        };

        Ok(Self {
            include: lowered(&filter.include),
            exclude: lowered(&filter.exclude),
            pattern,
        })
    }

    /// Whether a resource named `name` is part of the output.
    ///
    /// An explicit include always wins. A pattern match is still subject to
    /// `exclude`. With neither include nor pattern set, everything not
    /// excluded passes.
    pub fn matches(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        let excluded = self.exclude.contains(&lower);

        if self.include.contains(&lower) {
            return true;
        }
        if let Some(pattern) = &self.pattern {
            return pattern.is_match(name) && !excluded;
        }
        self.include.is_empty() && !excluded
    }

    /// Keeps the resources that [`matches`](Self::matches) accepts, in input order.
    pub fn filter<'a>(&self, resources: impl IntoIterator<Item = &'a Resource>) -> Vec<&'a Resource> {
        resources
            .into_iter()
            .filter(|r| self.matches(&r.name))
            .collect()
    }
}
