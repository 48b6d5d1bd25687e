//! Reference token extraction.
//!
//! A reference token is the tag (or branch suffix) that encodes version,
//! release candidate, region and vendor intent, e.g. `1.2.3-SG-HMS-RC2`.
//! Each field is extracted independently; the first match wins.

use std::fmt;

use regex::Regex;
use serde::Serialize;

use crate::error::Result;
use crate::region::RegionMap;

/// Placeholder rendered for fields that were not found.
pub const NONE: &str = "none";

/// Marker that selects a raw package build instead of a bundle.
const APK_MARKER: &str = "-APK";

/// Push/distribution backend a build targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VendorService {
    /// Google Mobile Services, the primary store.
    Gms,
    /// Huawei Mobile Services.
    Hms,
}

impl VendorService {
    /// The primary store identifier, used when a token names none.
    pub const PRIMARY: VendorService = VendorService::Gms;

    pub fn as_str(&self) -> &'static str {
        match self {
            VendorService::Gms => "GMS",
            VendorService::Hms => "HMS",
        }
    }

    fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "GMS" => Some(VendorService::Gms),
            "HMS" => Some(VendorService::Hms),
            _ => None,
        }
    }
}

impl fmt::Display for VendorService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields derived from a reference token. Immutable once extracted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceToken {
    /// Three-part dotted version, e.g. `1.2.3`.
    pub version: Option<String>,
    /// Release candidate qualifier, e.g. `RC1`.
    pub release_candidate: Option<String>,
    /// Configured alpha-2 code found in the token.
    pub region_code: Option<String>,
    pub vendor_service: Option<VendorService>,
    /// Token asks for a raw APK instead of a bundle.
    pub is_apk: bool,
}

impl ReferenceToken {
    /// Vendor service named by the token, or the primary store.
    pub fn vendor_or_primary(&self) -> VendorService {
        self.vendor_service.unwrap_or(VendorService::PRIMARY)
    }
}

impl fmt::Display for ReferenceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "version=\"{}\"\nrc=\"{}\"\nregionA2=\"{}\"\nvendorSvc=\"{}\"\napk={}",
            self.version.as_deref().unwrap_or(NONE),
            self.release_candidate.as_deref().unwrap_or(NONE),
            self.region_code.as_deref().unwrap_or(NONE),
            self.vendor_service.map(|v| v.as_str()).unwrap_or(NONE),
            self.is_apk,
        )
    }
}

/// Compiled patterns for one region configuration.
#[derive(Debug, Clone)]
pub struct TokenExtractor {
    version: Regex,
    release_candidate: Regex,
    region: Option<Regex>,
    vendor_service: Regex,
}

impl TokenExtractor {
    /// Compile the extraction patterns; the region pattern is an alternation
    /// of the configured codes.
    pub fn new(regions: &RegionMap) -> Result<Self> {
        let alternation = regions
            .codes()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");
        let region = if alternation.is_empty() {
            None
        } else {
            Some(Regex::new(&alternation)?)
        };

        Ok(Self {
            version: Regex::new(r"\d+\.\d+\.\d+")?,
            release_candidate: Regex::new(r"RC\d+")?,
            region,
            vendor_service: Regex::new(r"(G|H)MS")?,
        })
    }

    /// Extract every field from `token`.
    pub fn extract(&self, token: &str) -> ReferenceToken {
        ReferenceToken {
            version: find(&self.version, token),
            release_candidate: find(&self.release_candidate, token),
            region_code: self.region.as_ref().and_then(|re| find(re, token)),
            vendor_service: find(&self.vendor_service, token)
                .and_then(|m| VendorService::from_marker(&m)),
            is_apk: token.contains(APK_MARKER),
        }
    }
}

fn find(re: &Regex, haystack: &str) -> Option<String> {
    re.find(haystack)
        .map(|m| m.as_str().to_string())
        .filter(|s| !s.is_empty())
}
