//! Version string comparison
//!
//! Versions look like `major.minor.patch[-buildtag]`. Only the release part
//! (everything before the first `-`) takes part in ordering; the vendor build
//! tag is kept for patch-chain matching.

use crate::error::{Error, Result};
use regex::Regex;
use std::cmp::Ordering;
use std::sync::OnceLock;

/// Pre-release markers that sort below the release they precede
const PRE_RELEASE: &[&str] = &["dev", "alpha", "a", "beta", "b", "rc", "pre"];

fn major_minor_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+\.\d+)").expect("static regex"))
}

/// Compare two version strings by their release parts
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a_parts = parse_version_parts(release_prefix(a));
    let b_parts = parse_version_parts(release_prefix(b));
    let max_len = a_parts.len().max(b_parts.len());
    let zero = VersionPart::Numeric("0".to_string());

    for i in 0..max_len {
        let a_part = a_parts.get(i).unwrap_or(&zero);
        let b_part = b_parts.get(i).unwrap_or(&zero);

        match a_part.cmp_part(b_part) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    Ordering::Equal
}

/// Sort versions ascending, lowest first
pub fn sort_versions(versions: &mut [String]) {
    versions.sort_by(|a, b| compare_versions(a, b));
}

/// Extract the leading `major.minor` of a version, e.g. `"5.4"` from `"5.4.16-7.el6.1"`
pub fn major_minor(version: &str) -> Result<&str> {
    major_minor_regex()
        .captures(version)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| Error::invalid_version(version, "could not determine major version"))
}

/// The vendor build tag after the first `-`, if any
pub fn build_tag(version: &str) -> Option<&str> {
    version.split_once('-').map(|(_, tag)| tag)
}

/// The numeric release without any vendor build tag
pub fn release_prefix(version: &str) -> &str {
    version.split_once('-').map_or(version, |(release, _)| release)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum VersionPart {
    /// Digit run without leading zeros, so arbitrarily long components compare exactly
    Numeric(String),
    Alpha(String),
}

impl VersionPart {
    fn pre_release_rank(tag: &str) -> Option<usize> {
        PRE_RELEASE.iter().position(|p| *p == tag)
    }

    fn cmp_part(&self, other: &VersionPart) -> Ordering {
        match (self, other) {
            (VersionPart::Numeric(a), VersionPart::Numeric(b)) => {
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            (VersionPart::Alpha(a), VersionPart::Alpha(b)) => {
                match (Self::pre_release_rank(a), Self::pre_release_rank(b)) {
                    (Some(ra), Some(rb)) => ra.cmp(&rb),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => a.cmp(b),
                }
            }
            // "5.4.0RC1" < "5.4.0", but "5.4.0pl1" > "5.4.0"
            (VersionPart::Numeric(_), VersionPart::Alpha(tag)) => {
                if Self::pre_release_rank(tag).is_some() {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
            (VersionPart::Alpha(_), VersionPart::Numeric(_)) => other.cmp_part(self).reverse(),
        }
    }
}

fn parse_version_parts(version: &str) -> Vec<VersionPart> {
    let mut parts = Vec::new();
    let mut current_num = String::new();
    let mut current_alpha = String::new();

    for c in version.chars() {
        if c.is_ascii_digit() {
            if !current_alpha.is_empty() {
                parts.push(VersionPart::Alpha(std::mem::take(&mut current_alpha)));
            }
            current_num.push(c);
        } else if c.is_alphabetic() {
            if !current_num.is_empty() {
                push_numeric(&mut parts, &mut current_num);
            }
            current_alpha.push(c.to_ascii_lowercase());
        } else {
            if !current_num.is_empty() {
                push_numeric(&mut parts, &mut current_num);
            }
            if !current_alpha.is_empty() {
                parts.push(VersionPart::Alpha(std::mem::take(&mut current_alpha)));
            }
        }
    }

    if !current_num.is_empty() {
        push_numeric(&mut parts, &mut current_num);
    }
    if !current_alpha.is_empty() {
        parts.push(VersionPart::Alpha(current_alpha));
    }

    parts
}

fn push_numeric(parts: &mut Vec<VersionPart>, digits: &mut String) {
    let significant = digits.trim_start_matches('0');
    let value = if significant.is_empty() { "0" } else { significant };
    parts.push(VersionPart::Numeric(value.to_string()));
    digits.clear();
}
