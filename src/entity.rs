//! Catalog entities and their JFrog annotations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::artifact::LibraryArtifact;
use crate::error::{LibverError, Result};

pub const ENTITY_GROUP: &str = "jfrog.com/artifactory-group";
pub const ENTITY_ARTIFACT: &str = "jfrog.com/artifactory-artifact";
pub const ENTITY_PACKAGING: &str = "jfrog.com/artifactory-packaging";
pub const ENTITY_SCOPE: &str = "jfrog.com/artifactory-scope";
pub const ENTITY_REPO: &str = "jfrog.com/artifactory-repo";

/// The part of a catalog entity the lookup reads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub metadata: EntityMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            metadata: EntityMetadata {
                name: name.into(),
                annotations: BTreeMap::new(),
            },
        }
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.annotations.insert(key.into(), value.into());
        self
    }

    /// Annotation value; empty and blank strings count as absent
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.metadata
            .annotations
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn is_artifact_available(&self) -> bool {
        self.annotation(ENTITY_ARTIFACT).is_some()
    }

    pub fn is_repo_available(&self) -> bool {
        self.annotation(ENTITY_REPO).is_some()
    }
}

/// Read the JFrog annotations into an unresolved [`LibraryArtifact`].
///
/// Fails before anything touches the network: an artifact without a
/// repository is [`LibverError::MissingRepository`], an entity without an
/// artifact is [`LibverError::MissingArtifact`].
pub fn check_annotations_present(entity: &Entity) -> Result<LibraryArtifact> {
    let Some(artifact) = entity.annotation(ENTITY_ARTIFACT) else {
        return Err(LibverError::MissingArtifact {
            entity: entity.metadata.name.clone(),
        });
    };
    let Some(repo) = entity.annotation(ENTITY_REPO) else {
        return Err(LibverError::MissingRepository {
            artifact: artifact.to_string(),
        });
    };

    let mut lib = LibraryArtifact::new(repo, artifact);
    lib.group = entity.annotation(ENTITY_GROUP).map(str::to_string);
    lib.packaging = entity.annotation(ENTITY_PACKAGING).map(str::to_string);
    lib.scope = entity.annotation(ENTITY_SCOPE).map(str::to_string);
    Ok(lib)
}
