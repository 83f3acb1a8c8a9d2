//! # Maven latest-version search
//!
//! - **Endpoint**: `GET artifactory/api/search/latestVersion?g={group}&a={artifact}&repos={repo}`
//! - **Response**: the version as plain text
//! - **404**: no release of the artifact in the repository (not an error)
//!
//! Also the fallback strategy for package types without a dedicated resolver
//! (gradle, ivy, sbt and anything unrecognized), since the search endpoint
//! works on any layout-aware repository.

use async_trait::async_trait;
use reqwest::StatusCode;

use super::http_client::{ManagerClient, error_message};
use super::{ResolvedVersion, VersionResolver};
use crate::artifact::LibraryArtifact;
use crate::error::{LibverError, Result};

const LATEST_VERSION_PATH: &str = "artifactory/api/search/latestVersion";

/// Latest version through the GAVC search
#[derive(Debug, Clone, Copy, Default)]
pub struct MavenResolver;

/// Latest version of `group:artifact` in `repo`, or `None` when nothing is published
pub async fn get_maven_latest_version(
    client: &ManagerClient,
    lib: &LibraryArtifact,
) -> Result<Option<String>> {
    let mut query: Vec<(&str, &str)> = Vec::with_capacity(3);
    if let Some(group) = lib.group.as_deref() {
        query.push(("g", group));
    }
    query.push(("a", lib.artifact.as_str()));
    query.push(("repos", lib.repo.as_str()));

    let response = client
        .get_with_query(LATEST_VERSION_PATH, &query)?
        .send()
        .await?;

    match response.status() {
        StatusCode::NOT_FOUND => {
            tracing::debug!("No version of {} found in {}", lib.artifact, lib.repo);
            Ok(None)
        }
        StatusCode::OK => Ok(Some(response.text().await?)),
        _ => Err(LibverError::upstream(
            "Error getting latest version",
            error_message(response).await,
        )),
    }
}

#[async_trait]
impl VersionResolver for MavenResolver {
    async fn resolve(
        &self,
        client: &ManagerClient,
        lib: &LibraryArtifact,
    ) -> Result<Option<ResolvedVersion>> {
        Ok(get_maven_latest_version(client, lib)
            .await?
            .map(ResolvedVersion::new))
    }
}
