//! Build parameter records and the naming rules that fill them.

use serde::Serialize;

use crate::classify::BuildType;
use crate::region::RegionTarget;
use crate::token::{ReferenceToken, VendorService};

/// Application package domain shared by every region.
pub const DEFAULT_PACKAGE_BASE: &str = "com.circles.selfcare";

/// Where the google-services plugin writes its generated values for a
/// flavor and build type.
pub const DEFAULT_ARTIFACT_TEMPLATE: &str =
    "accmng/build/generated/res/google-services/{flavor}/{build_type}/values/values.xml";

/// One fully specified build, ready to apply locally or to start remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildParameterRecord {
    /// Gradle task, e.g. `bundleSingaporeGmsRelease`.
    #[serde(rename = "build_task")]
    pub build_command: String,

    pub alpha2_code: String,

    /// Chat notification flag, e.g. `:flag-sg:`.
    pub notification_flag: String,

    /// Title-cased region name.
    pub region_display_name: String,

    /// Platform-console artifact path.
    pub artifact_path: String,

    #[serde(rename = "pkg")]
    pub package_name: String,

    /// `QA` or `PROD`.
    #[serde(rename = "bs_suffix")]
    pub env_suffix: String,

    /// Tag this build should carry, when it differs from the current one.
    pub new_tag: Option<String>,

    /// Commit this build should check out, when it differs from the current one.
    pub new_commit_hash: Option<String>,

    pub build_type: BuildType,
}

/// Upper-case the first letter of every word.
///
/// Words are separated by whitespace and by ASCII punctuation other than
/// `_`, so `hong-kong` becomes `Hong-Kong`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = is_word_separator(c);
    }
    out
}

fn is_word_separator(c: char) -> bool {
    if c.is_ascii() {
        !(c.is_ascii_alphanumeric() || c == '_')
    } else {
        c.is_whitespace()
    }
}

/// Join words camel-case: the first verbatim, the rest title-cased.
pub fn camel_join(words: &[&str]) -> String {
    let mut out = String::new();
    for word in words {
        if out.is_empty() {
            out.push_str(word);
        } else {
            out.push_str(&title_case(word));
        }
    }
    out
}

/// `bundle` for store releases of the primary vendor, `assemble` otherwise.
pub fn base_command(build_type: BuildType, vendor: VendorService, is_apk: bool) -> &'static str {
    if build_type == BuildType::Release && vendor == VendorService::PRIMARY && !is_apk {
        "bundle"
    } else {
        "assemble"
    }
}

/// Gradle product flavor: region name followed by the vendor service.
pub fn flavor(region_name: &str, vendor: VendorService) -> String {
    let vendor = vendor.as_str().to_ascii_lowercase();
    camel_join(&[region_name, vendor.as_str()])
}

/// Package identifier for a region and build type.
///
/// Non-default regions append their lowercase code; non-release builds
/// append the build type name.
pub fn package_name(
    base: &str,
    target: &RegionTarget,
    default_region_name: &str,
    build_type: BuildType,
) -> String {
    let mut pkg = base.to_string();
    if target.name != default_region_name {
        pkg.push('.');
        pkg.push_str(&target.code.to_ascii_lowercase());
    }
    if build_type != BuildType::Release {
        pkg.push('.');
        pkg.push_str(build_type.name());
    }
    pkg
}

/// Fill `{flavor}` and `{build_type}` in an artifact path template.
pub fn artifact_path(template: &str, flavor: &str, build_type: BuildType) -> String {
    template
        .replace("{flavor}", flavor)
        .replace("{build_type}", build_type.name())
}

pub fn env_suffix(build_type: BuildType) -> &'static str {
    match build_type {
        BuildType::Release => "PROD",
        BuildType::Debug | BuildType::Qa => "QA",
    }
}

pub fn notification_flag(code: &str) -> String {
    format!(":flag-{}:", code.to_ascii_lowercase())
}

/// Naming settings shared by every record of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordAssembler {
    pub package_base: String,
    pub artifact_template: String,
    /// Name of the canonical region, which gets no package segment.
    pub default_region_name: String,
}

impl RecordAssembler {
    pub fn new(default_region_name: impl Into<String>) -> Self {
        Self {
            package_base: DEFAULT_PACKAGE_BASE.to_string(),
            artifact_template: DEFAULT_ARTIFACT_TEMPLATE.to_string(),
            default_region_name: default_region_name.into(),
        }
    }

    pub fn with_package_base(mut self, base: impl Into<String>) -> Self {
        self.package_base = base.into();
        self
    }

    pub fn with_artifact_template(mut self, template: impl Into<String>) -> Self {
        self.artifact_template = template.into();
        self
    }

    /// Assemble the record for one target region.
    pub fn assemble(
        &self,
        target: &RegionTarget,
        token: &ReferenceToken,
        build_type: BuildType,
        new_tag: Option<String>,
        new_commit_hash: Option<String>,
    ) -> BuildParameterRecord {
        let vendor = token.vendor_or_primary();
        let base = base_command(build_type, vendor, token.is_apk);
        let vendor_lower = vendor.as_str().to_ascii_lowercase();

        BuildParameterRecord {
            build_command: camel_join(&[
                base,
                target.name.as_str(),
                vendor_lower.as_str(),
                build_type.name(),
            ]),
            alpha2_code: target.code.clone(),
            notification_flag: notification_flag(&target.code),
            region_display_name: title_case(&target.name),
            artifact_path: artifact_path(
                &self.artifact_template,
                &flavor(&target.name, vendor),
                build_type,
            ),
            package_name: package_name(
                &self.package_base,
                target,
                &self.default_region_name,
                build_type,
            ),
            env_suffix: env_suffix(build_type).to_string(),
            new_tag,
            new_commit_hash,
            build_type,
        }
    }
}
