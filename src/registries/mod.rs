//! Artifactory query strategies for finding the latest version of a package

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::artifact::{LibraryArtifact, PackageType};
use crate::error::Result;

pub mod http_client;
pub mod maven;
pub mod metadata;
pub mod pypi;
pub mod repository;
pub mod version_utils;

pub use http_client::ManagerClient;

/// Latest version of a package and whatever metadata the strategy exposes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedVersion {
    pub version: String,
    /// Size in bytes
    pub size: Option<u64>,
    /// Download count
    pub stats_download: Option<u64>,
    /// Directory holding the version's lead file
    pub file_path: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
}

impl ResolvedVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Default::default()
        }
    }
}

/// Strategy answering "what is the latest version" for one package type.
///
/// `Ok(None)` means the package has no published version yet; it is a valid
/// outcome, not an error.
#[async_trait]
pub trait VersionResolver: Send + Sync {
    async fn resolve(
        &self,
        client: &ManagerClient,
        lib: &LibraryArtifact,
    ) -> Result<Option<ResolvedVersion>>;
}

/// Package type → strategy lookup, falling back to the Maven strategy
#[derive(Clone)]
pub struct ResolverRegistry {
    resolvers: HashMap<String, Arc<dyn VersionResolver>>,
    fallback: Arc<dyn VersionResolver>,
}

impl ResolverRegistry {
    /// Registry with no specific strategies; everything goes to `fallback`
    pub fn with_fallback(fallback: Arc<dyn VersionResolver>) -> Self {
        Self {
            resolvers: HashMap::new(),
            fallback,
        }
    }

    /// Strategies for the package types Artifactory commonly hosts
    pub fn standard() -> Self {
        let mut registry = Self::with_fallback(Arc::new(maven::MavenResolver));
        registry.register(PackageType::Maven, Arc::new(maven::MavenResolver));
        registry.register(PackageType::Pypi, Arc::new(pypi::PypiResolver));
        for package_type in [
            PackageType::Docker,
            PackageType::Npm,
            PackageType::Nuget,
            PackageType::Generic,
            PackageType::Helm,
            PackageType::Go,
        ] {
            let resolver = metadata::MetadataGraphResolver::new(package_type.clone());
            registry.register(package_type, Arc::new(resolver));
        }
        registry
    }

    pub fn register(&mut self, package_type: PackageType, resolver: Arc<dyn VersionResolver>) {
        self.resolvers
            .insert(package_type.as_str().to_string(), resolver);
    }

    /// Strategy for a package type key (case-insensitive)
    pub fn resolver_for(&self, package_type: &str) -> Arc<dyn VersionResolver> {
        let key = package_type.to_lowercase();
        match self.resolvers.get(&key) {
            Some(resolver) => Arc::clone(resolver),
            None => {
                tracing::debug!("No resolver for package type {:?}, using maven", key);
                Arc::clone(&self.fallback)
            }
        }
    }

    pub fn is_registered(&self, package_type: &str) -> bool {
        self.resolvers.contains_key(&package_type.to_lowercase())
    }
}

impl Default for ResolverRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registries::http_client::create_shared_client;

    struct FixedResolver(&'static str);

    #[async_trait]
    impl VersionResolver for FixedResolver {
        async fn resolve(
            &self,
            _client: &ManagerClient,
            _lib: &LibraryArtifact,
        ) -> Result<Option<ResolvedVersion>> {
            Ok(Some(ResolvedVersion::new(self.0)))
        }
    }

    fn offline_client() -> ManagerClient {
        ManagerClient::with_client(
            create_shared_client().expect("Failed to create client"),
            "http://127.0.0.1:9/",
        )
    }

    #[test]
    fn test_standard_registry_keys() {
        let registry = ResolverRegistry::standard();
        for key in ["maven", "pypi", "docker", "npm", "nuget", "generic", "helm", "go"] {
            assert!(registry.is_registered(key), "{key} should be registered");
        }
        assert!(registry.is_registered("PyPI"));
        assert!(!registry.is_registered("conan"));
    }

    #[tokio::test]
    async fn test_unknown_type_uses_fallback() {
        let mut registry = ResolverRegistry::with_fallback(Arc::new(FixedResolver("fallback")));
        registry.register(PackageType::Pypi, Arc::new(FixedResolver("pypi")));

        let client = offline_client();
        let lib = LibraryArtifact::new("repo", "artifact");

        let found = registry
            .resolver_for("PYPI")
            .resolve(&client, &lib)
            .await
            .unwrap();
        assert_eq!(found.unwrap().version, "pypi");

        let found = registry
            .resolver_for("conan")
            .resolve(&client, &lib)
            .await
            .unwrap();
        assert_eq!(found.unwrap().version, "fallback");
    }
}
