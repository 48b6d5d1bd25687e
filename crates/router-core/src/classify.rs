//! Build type classification.

use std::fmt;

use serde::Serialize;

use crate::error::{Result, RouterError};
use crate::token::ReferenceToken;

/// Build flavour, ordered by increasing production-ness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildType {
    Debug,
    Qa,
    Release,
}

impl BuildType {
    /// Canonical lowercase name used in generated identifiers.
    pub fn name(&self) -> &'static str {
        match self {
            BuildType::Debug => "debug",
            BuildType::Qa => "qa",
            BuildType::Release => "release",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The reference an invocation was started from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Tag(String),
    Branch(String),
}

impl Reference {
    /// Pick the tag when present, else the branch. Empty values count as absent.
    pub fn from_parts(tag: Option<&str>, branch: Option<&str>) -> Result<Self> {
        match (non_empty(tag), non_empty(branch)) {
            (Some(tag), _) => Ok(Reference::Tag(tag.to_string())),
            (None, Some(branch)) => Ok(Reference::Branch(branch.to_string())),
            (None, None) => Err(RouterError::NoReference),
        }
    }

    /// The string parsed for build intent: the tag itself, or the branch name
    /// after its last `/`.
    pub fn token(&self) -> &str {
        match self {
            Reference::Tag(tag) => tag.as_str(),
            Reference::Branch(branch) => branch.rsplit('/').next().unwrap_or(branch.as_str()),
        }
    }

    /// Build type before the token is inspected.
    pub fn initial_build_type(&self) -> BuildType {
        match self {
            Reference::Tag(_) => BuildType::Qa,
            Reference::Branch(_) => BuildType::Debug,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Final build type for a reference and its extracted fields.
///
/// Tags start as QA, branches as Debug. A token carrying a version and no
/// release candidate is a release cut and is promoted to Release.
pub fn classify(reference: &Reference, token: &ReferenceToken) -> BuildType {
    let initial = reference.initial_build_type();
    if token.version.is_some() && token.release_candidate.is_none() {
        BuildType::Release
    } else {
        initial
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(version: Option<&str>, rc: Option<&str>) -> ReferenceToken {
        ReferenceToken {
            version: version.map(str::to_string),
            release_candidate: rc.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_type_names_and_order() {
        assert_eq!(BuildType::Debug.name(), "debug");
        assert_eq!(BuildType::Qa.name(), "qa");
        assert_eq!(BuildType::Release.name(), "release");
        assert!(BuildType::Debug < BuildType::Qa);
        assert!(BuildType::Qa < BuildType::Release);
        assert_eq!(BuildType::Release.to_string(), "release");
    }

    #[test]
    fn test_tag_wins_over_branch() {
        let reference = Reference::from_parts(Some("1.0.0"), Some("main")).unwrap();
        assert_eq!(reference, Reference::Tag("1.0.0".to_string()));
    }

    #[test]
    fn test_empty_tag_falls_back_to_branch() {
        let reference = Reference::from_parts(Some(""), Some("release/1.0.0-SG")).unwrap();
        assert_eq!(reference.token(), "1.0.0-SG");
        assert_eq!(reference.initial_build_type(), BuildType::Debug);
    }

    #[test]
    fn test_branch_without_separator_is_whole_name() {
        let reference = Reference::Branch("develop".to_string());
        assert_eq!(reference.token(), "develop");
    }

    #[test]
    fn test_nested_branch_uses_last_segment() {
        let reference = Reference::Branch("feature/team/TW-login".to_string());
        assert_eq!(reference.token(), "TW-login");
    }

    #[test]
    fn test_no_reference_is_error() {
        assert!(matches!(
            Reference::from_parts(None, Some("")),
            Err(RouterError::NoReference)
        ));
    }

    #[test]
    fn test_version_without_rc_is_release() {
        let tag = Reference::Tag("2.0.0".to_string());
        assert_eq!(classify(&tag, &token(Some("2.0.0"), None)), BuildType::Release);
    }

    #[test]
    fn test_version_with_rc_stays_qa() {
        let tag = Reference::Tag("2.0.0-RC3".to_string());
        assert_eq!(classify(&tag, &token(Some("2.0.0"), Some("RC3"))), BuildType::Qa);
    }

    #[test]
    fn test_branch_without_version_is_debug() {
        let branch = Reference::Branch("feature/x".to_string());
        assert_eq!(classify(&branch, &token(None, None)), BuildType::Debug);
        assert_eq!(classify(&branch, &token(None, Some("RC1"))), BuildType::Debug);
    }

    #[test]
    fn test_tag_without_version_stays_qa() {
        let tag = Reference::Tag("nightly".to_string());
        assert_eq!(classify(&tag, &token(None, None)), BuildType::Qa);
    }
}
