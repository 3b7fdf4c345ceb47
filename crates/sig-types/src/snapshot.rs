use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::decl::{ClassDecl, Package};
use crate::error::TypeError;

/// A parsed, in-memory description of a library's API surface at one
/// point in time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSnapshot {
    /// Library or platform name, e.g. `android`.
    pub name: String,
    /// Version label, e.g. `2.1`.
    pub version: String,
    #[serde(default)]
    pub packages: Vec<Package>,
}

impl ApiSnapshot {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            packages: Vec::new(),
        }
    }

    pub fn with_package(mut self, package: Package) -> Self {
        self.packages.push(package);
        self
    }

    /// Storage label: `{name}-{version}`.
    pub fn label(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// Look up a class by package and simple name.
    pub fn class(&self, package: &str, name: &str) -> Option<&ClassDecl> {
        self.package(package).and_then(|p| p.class(name))
    }

    /// Total number of classes across all packages.
    pub fn class_count(&self) -> usize {
        self.packages.iter().map(|p| p.classes.len()).sum()
    }

    /// Compute the content digest of this snapshot.
    ///
    /// The digest covers the canonical JSON encoding, so two snapshots with
    /// the same content and declaration order share a digest.
    pub fn digest(&self) -> Result<SnapshotDigest, TypeError> {
        let bytes =
            serde_json::to_vec(self).map_err(|e| TypeError::Serialization(e.to_string()))?;
        Ok(SnapshotDigest::of_bytes(&bytes))
    }

    /// Reject snapshots whose declarations cannot be matched by key.
    ///
    /// Package names, class names within a package, field names, method
    /// signatures and constructor signatures within a class must be unique.
    pub fn validate(&self) -> Result<(), TypeError> {
        check_unique("package", self.packages.iter().map(|p| p.name.clone()))?;
        for package in &self.packages {
            check_unique(
                "class",
                package
                    .classes
                    .iter()
                    .map(|c| format!("{}.{}", package.name, c.name)),
            )?;
            for class in &package.classes {
                let owner = format!("{}.{}", package.name, class.name);
                check_unique(
                    "field",
                    class.fields.iter().map(|f| format!("{owner}#{}", f.name)),
                )?;
                let scope = &class.type_parameters;
                check_unique(
                    "method",
                    class
                        .methods
                        .iter()
                        .map(|m| format!("{owner}#{}", m.signature_in(scope))),
                )?;
                check_unique(
                    "constructor",
                    class
                        .constructors
                        .iter()
                        .map(|c| format!("{owner}{}", c.signature_in(scope))),
                )?;
                check_unique(
                    "enum constant",
                    class.enum_constants.iter().map(|e| format!("{owner}.{e}")),
                )?;
            }
        }
        Ok(())
    }
}

fn check_unique(scope: &str, keys: impl Iterator<Item = String>) -> Result<(), TypeError> {
    let mut seen = BTreeSet::new();
    for key in keys {
        if !seen.insert(key.clone()) {
            return Err(TypeError::Duplicate {
                scope: scope.to_string(),
                key,
            });
        }
    }
    Ok(())
}

/// BLAKE3 digest of a snapshot's canonical encoding.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SnapshotDigest([u8; 32]);

impl SnapshotDigest {
    /// Hash raw bytes, domain-separated from other BLAKE3 uses.
    pub fn of_bytes(data: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"sigdiff-snapshot-v1:");
        hasher.update(data);
        Self(*hasher.finalize().as_bytes())
    }

    pub fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short identifier: `sig:` plus the first 8 hex characters.
    pub fn short_id(&self) -> String {
        format!("sig:{}", hex::encode(&self.0[..4]))
    }

    /// Parse from 64 hex characters, with or without the `sig:` prefix.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let s = s.strip_prefix("sig:").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for SnapshotDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SnapshotDigest({})", self.short_id())
    }
}

impl fmt::Display for SnapshotDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_id())
    }
}
