//! # PyPI property search
//!
//! PyPI repositories do not answer the GAVC latest-version search. Every
//! uploaded distribution file instead carries `pypi.name` and `pypi.version`
//! properties, so the latest version is found by property search:
//!
//! - **Endpoint**: `GET artifactory/api/search/prop?pypi.name={artifact}&repos={repo}`
//! - **Response**: `{"results":[{"properties":{"pypi.version":["1.0"]}}, ...]}`
//! - **404**: no file with that name (not an error)
//!
//! One result per file means the same version shows up several times (wheel
//! and sdist) in no particular order, so all versions are aggregated and the
//! maximum is picked.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use super::http_client::{ManagerClient, error_message};
use super::version_utils::find_latest_version;
use super::{ResolvedVersion, VersionResolver};
use crate::artifact::LibraryArtifact;
use crate::error::{LibverError, Result};

const PROPERTY_SEARCH_PATH: &str = "artifactory/api/search/prop";
const VERSION_PROPERTY: &str = "pypi.version";

/// Latest version through the `pypi.name` property search
#[derive(Debug, Clone, Copy, Default)]
pub struct PypiResolver;

#[derive(Debug, Deserialize)]
struct PropertySearchResponse {
    #[serde(default)]
    results: Vec<PropertySearchResult>,
}

#[derive(Debug, Deserialize)]
struct PropertySearchResult {
    #[serde(default)]
    properties: HashMap<String, Vec<String>>,
}

/// First `pypi.version` value of every result that carries one
fn collect_versions(response: PropertySearchResponse) -> Vec<String> {
    response
        .results
        .into_iter()
        .filter_map(|mut result| {
            result
                .properties
                .remove(VERSION_PROPERTY)
                .and_then(|values| values.into_iter().next())
        })
        .collect()
}

pub async fn get_pypi_latest_version(
    client: &ManagerClient,
    lib: &LibraryArtifact,
) -> Result<Option<String>> {
    let response = client
        .get_with_query(
            PROPERTY_SEARCH_PATH,
            &[("pypi.name", lib.artifact.as_str()), ("repos", lib.repo.as_str())],
        )?
        .send()
        .await?;

    match response.status() {
        StatusCode::NOT_FOUND => Ok(None),
        StatusCode::OK => {
            let body: PropertySearchResponse = serde_json::from_str(&response.text().await?)?;
            let versions = collect_versions(body);
            tracing::debug!(
                "Found {} pypi.version entries for {}",
                versions.len(),
                lib.artifact
            );
            Ok(find_latest_version(&versions))
        }
        _ => Err(LibverError::upstream(
            "Error getting latest version",
            error_message(response).await,
        )),
    }
}

#[async_trait]
impl VersionResolver for PypiResolver {
    async fn resolve(
        &self,
        client: &ManagerClient,
        lib: &LibraryArtifact,
    ) -> Result<Option<ResolvedVersion>> {
        Ok(get_pypi_latest_version(client, lib)
            .await?
            .map(ResolvedVersion::new))
    }
}
