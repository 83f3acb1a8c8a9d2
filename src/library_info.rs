//! Entity → resolved artifact pipeline.
//!
//! Each entity goes through annotation checks, repository classification,
//! version resolution and record assembly, strictly in that order. Entities
//! are independent of each other, so a batch resolves them concurrently and
//! keeps one outcome per entity.

use std::sync::Arc;

use futures::future::join_all;
use reqwest::Client;

use crate::artifact::{ArtifactInfo, LibraryArtifact, PackageType};
use crate::config::Config;
use crate::entity::{Entity, check_annotations_present};
use crate::error::{LibverError, Result};
use crate::names::{extract_artifact_from_full_docker_name, remove_docker_version};
use crate::registries::repository::classify;
use crate::registries::{ManagerClient, ResolverRegistry};

/// Resolves catalog entities against the Artifactory proxy.
///
/// Holds no per-entity state; one builder can serve any number of lookups,
/// concurrently.
#[derive(Clone)]
pub struct LibraryInfoBuilder {
    client: ManagerClient,
    registry: ResolverRegistry,
}

/// Result of one entity of a batch
#[derive(Debug)]
pub struct BatchOutcome {
    /// `metadata.name` of the entity
    pub entity: String,
    pub result: Result<ArtifactInfo>,
}

impl LibraryInfoBuilder {
    /// Builder talking to the proxy configured in `config`, with the
    /// standard resolver set
    pub fn new(config: &Config, http: Arc<Client>) -> Result<Self> {
        let base_url = config.proxy_base_url()?;
        tracing::debug!("Artifactory proxy at {}", base_url);
        Ok(Self::with_client(ManagerClient::with_client(http, base_url)))
    }

    pub fn with_client(client: ManagerClient) -> Self {
        Self {
            client,
            registry: ResolverRegistry::standard(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.client = self.client.with_token(token);
        self
    }

    pub fn with_registry(mut self, registry: ResolverRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn client(&self) -> &ManagerClient {
        &self.client
    }

    /// Resolve the artifact an entity is annotated with.
    ///
    /// Annotation problems are reported before any request is made.
    pub async fn build(&self, entity: &Entity) -> Result<ArtifactInfo> {
        let lib = check_annotations_present(entity)?;
        self.resolve(lib).await
    }

    /// Resolve an artifact described directly rather than through an entity.
    ///
    /// A blank artifact or repository is rejected before any request.
    pub async fn resolve(&self, lib: LibraryArtifact) -> Result<ArtifactInfo> {
        if lib.artifact.trim().is_empty() {
            return Err(LibverError::MissingArtifact {
                entity: format!("repository {}", lib.repo),
            });
        }
        if lib.repo.trim().is_empty() {
            return Err(LibverError::MissingRepository {
                artifact: lib.artifact,
            });
        }

        let details = classify(&self.client, &lib.repo).await?;
        let package_type = PackageType::from_str_loose(&details.package_type);

        let lib = match package_type {
            PackageType::Docker => normalize_docker_name(lib),
            _ => lib,
        };

        let resolver = self.registry.resolver_for(package_type.as_str());
        let found = resolver.resolve(&self.client, &lib).await?;
        match &found {
            Some(found) => tracing::debug!(
                "Resolved {} in {} ({}) to {}",
                lib.artifact,
                lib.repo,
                package_type,
                found.version
            ),
            None => tracing::debug!(
                "No version of {} in {} ({})",
                lib.artifact,
                lib.repo,
                package_type
            ),
        }

        Ok(ArtifactInfo::new(lib.resolved(package_type, found)))
    }

    /// Resolve many entities concurrently.
    ///
    /// Outcomes come back in input order. A failing entity is logged and
    /// recorded; it never stops the others.
    pub async fn build_all(&self, entities: &[Entity]) -> Vec<BatchOutcome> {
        let futures = entities.iter().map(|entity| async move {
            let result = self.build(entity).await;
            if let Err(e) = &result {
                tracing::warn!("Failed to resolve {}: {}", entity.metadata.name, e);
            }
            BatchOutcome {
                entity: entity.metadata.name.clone(),
                result,
            }
        });

        let outcomes = join_all(futures).await;
        let resolved = outcomes.iter().filter(|o| o.result.is_ok()).count();
        tracing::info!("Resolved {}/{} entities", resolved, outcomes.len());
        outcomes
    }
}

/// Keep the successfully resolved artifacts of a batch
pub fn successful(outcomes: Vec<BatchOutcome>) -> Vec<ArtifactInfo> {
    outcomes
        .into_iter()
        .filter_map(|outcome| outcome.result.ok())
        .collect()
}

/// Split a Docker reference into the bare image name (queried and displayed)
/// and the untagged full reference (kept for `FROM` lines).
fn normalize_docker_name(mut lib: LibraryArtifact) -> LibraryArtifact {
    let full_name = remove_docker_version(&lib.artifact).to_string();
    lib.artifact = extract_artifact_from_full_docker_name(&lib.artifact).to_string();
    lib.artifact_full_name = Some(full_name);
    lib
}
