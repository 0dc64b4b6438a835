//! Vendor build detection
//!
//! Distro packages carry backported fixes under the upstream version number,
//! e.g. `5.4.16-7.el6.1` or `5.5.9-1ubuntu4.14`. Only those builds go through
//! patch reconciliation; a stock `5.4.16` never does.

use regex::Regex;
use versionscan_core::{Error, Result};

/// Label reported for the four-component build number signature
pub const BUILD_NUMBER: &str = "build-number";

/// One recognizable vendor build pattern
#[derive(Debug, Clone)]
pub struct VendorSignature {
    /// Vendor label used in logs
    pub vendor: String,
    pattern: Regex,
}

impl VendorSignature {
    pub fn new(vendor: impl Into<String>, pattern: &str) -> Result<Self> {
        let vendor = vendor.into();
        let pattern = Regex::new(pattern).map_err(|e| {
            Error::Configuration(format!("Invalid signature for vendor {}: {}", vendor, e))
        })?;
        Ok(Self { vendor, pattern })
    }

    pub fn matches(&self, version: &str) -> bool {
        self.pattern.is_match(version)
    }
}

/// Ordered set of vendor build signatures
#[derive(Debug, Clone)]
pub struct VendorSignatures {
    signatures: Vec<VendorSignature>,
}

impl VendorSignatures {
    /// An empty set that recognizes nothing
    pub fn empty() -> Self {
        Self {
            signatures: Vec::new(),
        }
    }

    /// Add a signature; the first match wins in [`VendorSignatures::detect`]
    pub fn with_signature(mut self, vendor: impl Into<String>, pattern: &str) -> Result<Self> {
        self.signatures.push(VendorSignature::new(vendor, pattern)?);
        Ok(self)
    }

    /// The vendor whose signature matches `version`, if any
    pub fn detect(&self, version: &str) -> Option<&str> {
        self.signatures
            .iter()
            .find(|sig| sig.matches(version))
            .map(|sig| sig.vendor.as_str())
    }

    pub fn is_vendor_build(&self, version: &str) -> bool {
        self.detect(version).is_some()
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

impl Default for VendorSignatures {
    fn default() -> Self {
        let signatures = common_signatures()
            .iter()
            .map(|(vendor, pattern)| VendorSignature::new(*vendor, pattern))
            .collect::<Result<Vec<_>>>()
            .expect("built-in vendor signatures compile");
        Self { signatures }
    }
}

/// Common distro and enterprise build signatures
pub fn common_signatures() -> &'static [(&'static str, &'static str)] {
    &[
        ("ubuntu", r"(?i)ubuntu"),
        ("debian", r"(?i)(debian|dotdeb|[+~.]deb\d+)"),
        ("redhat", r"(?i)(\.el\d+|rhel|centos|\.amzn\d*)"),
        ("fedora", r"(?i)\.fc\d+"),
        ("suse", r"(?i)(suse|sles)"),
        (BUILD_NUMBER, r"^\d+\.\d+\.\d+\.\d+"),
    ]
}
