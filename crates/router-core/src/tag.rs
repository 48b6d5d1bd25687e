//! Per-region tag rewriting for "build all" fan-outs.
//!
//! A fan-out tag such as `1.2.3-ALL-HMS-RC1` is rewritten once per region so
//! that each child build carries a tag naming its own region:
//! `1.2.3-HMS-SG-RC1`, `1.2.3-HMS-TW-RC1`, ...

use crate::classify::BuildType;

/// Separator between tag components.
pub const TAG_SEPARATOR: &str = "-";

/// Keywords that only make sense on the fan-out tag itself.
const FANOUT_KEYWORDS: [&str; 2] = ["ALL", "APK"];

/// Split `original` on `sep` and drop components matching any keyword,
/// ignoring ASCII case. Empty components are dropped as well. Surviving
/// components keep their order.
pub fn remove_keywords(keywords: &[&str], original: &str, sep: &str) -> String {
    original
        .split(sep)
        .filter(|component| !component.is_empty())
        .filter(|component| !keywords.iter().any(|k| k.eq_ignore_ascii_case(component)))
        .collect::<Vec<_>>()
        .join(sep)
}

/// Join the non-empty items with `sep`.
pub fn join_ignore_empty(items: &[&str], sep: &str) -> String {
    items
        .iter()
        .filter(|item| !item.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(sep)
}

/// Compute the tag a fan-out child for `code` should carry.
///
/// Returns `None` for debug builds: they never override the tag.
pub fn rewrite_tag(
    token: &str,
    version: Option<&str>,
    code: &str,
    release_candidate: Option<&str>,
    build_type: BuildType,
) -> Option<String> {
    let version = version.unwrap_or_default();
    let release_candidate = release_candidate.unwrap_or_default();

    let mut keywords = vec![token, code];
    keywords.extend([version, release_candidate].into_iter().filter(|k| !k.is_empty()));
    keywords.extend(FANOUT_KEYWORDS);

    let remainder = remove_keywords(&keywords, token, TAG_SEPARATOR);

    match build_type {
        BuildType::Qa => Some(join_ignore_empty(
            &[version, remainder.as_str(), code, release_candidate],
            TAG_SEPARATOR,
        )),
        BuildType::Release => Some(join_ignore_empty(&[version, code], TAG_SEPARATOR)),
        BuildType::Debug => None,
    }
}
