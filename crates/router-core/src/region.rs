//! Region configuration and fan-out resolution.
//!
//! A [`RegionMap`] is parsed once from a `CODE=name` block and is bijective:
//! codes and names are both unique. [`resolve_regions`] picks the regions an
//! invocation builds for.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Result, RouterError};

/// Bijective mapping between alpha-2 codes and region names.
///
/// Codes are stored upper-cased; lookups by code are case-insensitive.
/// Iteration is ordered by code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionMap {
    by_code: BTreeMap<String, String>,
    by_name: BTreeMap<String, String>,
}

impl RegionMap {
    /// Parse a `CODE=name` per-line block.
    ///
    /// Blank lines are skipped and both sides are trimmed.
    pub fn parse(text: &str) -> Result<Self> {
        let mut pairs = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let (code, name) = line.split_once('=').ok_or_else(|| {
                RouterError::MalformedRegionLine {
                    line: idx + 1,
                    content: raw.to_string(),
                }
            })?;
            let (code, name) = (code.trim(), name.trim());
            if code.is_empty() || name.is_empty() {
                return Err(RouterError::MalformedRegionLine {
                    line: idx + 1,
                    content: raw.to_string(),
                });
            }
            pairs.push((code.to_string(), name.to_string()));
        }
        Self::from_pairs(pairs)
    }

    /// Build a map from `(code, name)` pairs, enforcing uniqueness both ways.
    pub fn from_pairs<I, C, N>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (C, N)>,
        C: Into<String>,
        N: Into<String>,
    {
        let mut map = RegionMap::default();
        for (code, name) in pairs {
            let code: String = code.into();
            let name: String = name.into();
            if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(RouterError::InvalidRegionCode { code });
            }
            let code = code.to_ascii_uppercase();
            if map.by_code.contains_key(&code) {
                return Err(RouterError::DuplicateRegionCode(code));
            }
            if map.by_name.contains_key(&name) {
                return Err(RouterError::DuplicateRegionName(name));
            }
            map.by_name.insert(name.clone(), code.clone());
            map.by_code.insert(code, name);
        }
        if map.is_empty() {
            return Err(RouterError::EmptyRegionMap);
        }
        Ok(map)
    }

    /// Region name for a code, case-insensitively.
    pub fn name_for(&self, code: &str) -> Option<&str> {
        self.by_code
            .get(&code.to_ascii_uppercase())
            .map(String::as_str)
    }

    /// Alpha-2 code for a region name.
    pub fn code_for(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    /// Whether the code is configured.
    pub fn contains_code(&self, code: &str) -> bool {
        self.name_for(code).is_some()
    }

    /// Configured codes in order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.by_code.keys().map(String::as_str)
    }

    /// `(code, name)` pairs in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_code.iter().map(|(c, n)| (c.as_str(), n.as_str()))
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

/// Codes skipped during a "build all" fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludeSet(BTreeSet<String>);

impl ExcludeSet {
    /// Parse one code per line, ignoring blank lines.
    pub fn parse(text: &str) -> Self {
        Self::from_codes(text.lines())
    }

    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ExcludeSet(
            codes
                .into_iter()
                .map(|c| c.as_ref().trim().to_ascii_uppercase())
                .filter(|c| !c.is_empty())
                .collect(),
        )
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.contains(&code.to_ascii_uppercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One region an invocation builds for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionTarget {
    pub code: String,
    pub name: String,
}

/// Which branch of the resolution policy produced the targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// The token named a configured region.
    Single,
    /// Pull request without a region: default region only.
    PullRequestFallback,
    /// Every configured region not excluded.
    All,
}

impl Resolution {
    /// Whether targets of this resolution get rewritten tags.
    pub fn rewrites_tags(&self) -> bool {
        matches!(self, Resolution::All)
    }
}

/// Ordered targets plus the policy branch that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionPlan {
    pub resolution: Resolution,
    pub targets: Vec<RegionTarget>,
}

/// Decide which regions to build for.
///
/// Policy, first match wins:
/// 1. `region_code` is configured: that region only, excludes ignored.
/// 2. `pull_request`: the default region only, excludes ignored.
/// 3. Otherwise every configured region whose code is not excluded.
pub fn resolve_regions(
    region_code: Option<&str>,
    regions: &RegionMap,
    excludes: &ExcludeSet,
    pull_request: bool,
    default_code: &str,
) -> Result<RegionPlan> {
    if let Some(code) = region_code {
        if let Some(name) = regions.name_for(code) {
            debug!(code, name, "single region build");
            return Ok(RegionPlan {
                resolution: Resolution::Single,
                targets: vec![RegionTarget {
                    code: code.to_ascii_uppercase(),
                    name: name.to_string(),
                }],
            });
        }
        warn!(code, "region code not configured, resolving without it");
    }

    if pull_request {
        let name = regions
            .name_for(default_code)
            .ok_or_else(|| RouterError::UnknownDefaultRegion(default_code.to_string()))?;
        debug!(code = default_code, name, "pull request, falling back to default region");
        return Ok(RegionPlan {
            resolution: Resolution::PullRequestFallback,
            targets: vec![RegionTarget {
                code: default_code.to_ascii_uppercase(),
                name: name.to_string(),
            }],
        });
    }

    for code in excludes.iter().filter(|c| !regions.contains_code(c)) {
        warn!(code, "excluded region is not configured, ignoring");
    }

    let targets = regions
        .iter()
        .filter(|(code, _)| !excludes.contains(code))
        .map(|(code, name)| RegionTarget {
            code: code.to_string(),
            name: name.to_string(),
        })
        .collect();

    Ok(RegionPlan {
        resolution: Resolution::All,
        targets,
    })
}
