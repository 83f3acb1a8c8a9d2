//! Library artifact record and the package types Artifactory reports

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::registries::ResolvedVersion;
use crate::snippets::{GeneratedCode, generate_package_managers_code};

/// Repository package type as declared by Artifactory
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PackageType {
    Maven,
    Gradle,
    Ivy,
    Sbt,
    Pypi,
    Docker,
    Npm,
    Nuget,
    Generic,
    Helm,
    Go,
    /// Any other type, stored lower-cased
    Other(String),
}

impl PackageType {
    /// Parse a package type case-insensitively
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "maven" => PackageType::Maven,
            "gradle" => PackageType::Gradle,
            "ivy" => PackageType::Ivy,
            "sbt" => PackageType::Sbt,
            "pypi" => PackageType::Pypi,
            "docker" => PackageType::Docker,
            "npm" => PackageType::Npm,
            "nuget" => PackageType::Nuget,
            "generic" => PackageType::Generic,
            "helm" => PackageType::Helm,
            "go" => PackageType::Go,
            other => PackageType::Other(other.to_string()),
        }
    }

    /// Lower-case key, also used as the metadata `packageId` scheme
    pub fn as_str(&self) -> &str {
        match self {
            PackageType::Maven => "maven",
            PackageType::Gradle => "gradle",
            PackageType::Ivy => "ivy",
            PackageType::Sbt => "sbt",
            PackageType::Pypi => "pypi",
            PackageType::Docker => "docker",
            PackageType::Npm => "npm",
            PackageType::Nuget => "nuget",
            PackageType::Generic => "generic",
            PackageType::Helm => "helm",
            PackageType::Go => "go",
            PackageType::Other(s) => s,
        }
    }

    /// Types whose artifacts are consumed through JVM build tools
    pub fn is_maven_like(&self) -> bool {
        matches!(
            self,
            PackageType::Maven | PackageType::Gradle | PackageType::Ivy | PackageType::Sbt
        )
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for PackageType {
    fn from(s: String) -> Self {
        PackageType::from_str_loose(&s)
    }
}

impl From<PackageType> for String {
    fn from(p: PackageType) -> Self {
        p.as_str().to_string()
    }
}

/// A library as declared by a catalog entity, enriched by resolution.
///
/// Created from entity annotations with only the declaration fields set;
/// `version`, `package_type` and the metadata fields are filled in once the
/// repository has been classified and queried.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryArtifact {
    pub repo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub artifact: String,
    /// Original Docker reference (tag stripped) before name normalization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packaging: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transitive: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classifiers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_type: Option<PackageType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Download count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl LibraryArtifact {
    pub fn new(repo: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            artifact: artifact.into(),
            ..Default::default()
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Finish resolution: version and package type are always set together
    pub fn resolved(mut self, package_type: PackageType, result: Option<ResolvedVersion>) -> Self {
        self.package_type = Some(package_type);
        match result {
            Some(found) => {
                self.version = Some(found.version);
                self.size = found.size;
                self.stats = found.stats_download;
                self.last_modified = found.last_modified;
                self.file_path = found.file_path;
            }
            None => self.version = None,
        }
        self
    }
}

/// A resolved library, ready to be rendered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactInfo {
    pub lib: LibraryArtifact,
}

impl ArtifactInfo {
    pub fn new(lib: LibraryArtifact) -> Self {
        Self { lib }
    }

    /// Snippets for the resolved library, without classifier variants
    pub fn code(&self) -> GeneratedCode {
        generate_package_managers_code(&self.lib, false, false)
    }
}
