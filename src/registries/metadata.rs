//! # Metadata GraphQL query
//!
//! Docker, npm, NuGet and generic repositories have no latest-version search
//! endpoint. Their versions are looked up through the metadata service:
//!
//! - **Endpoint**: `POST metadata/api/v1/query`
//! - **Filter**: `packageId = "<packageType>://<name>"`, all names, pre-releases included
//! - **Order**: newest first by creation time, one result
//! - **404**: the package is unknown to the metadata service (not an error)
//!
//! Unlike the other strategies this one also returns the size, download
//! count, modification date and location of the version.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::http_client::ManagerClient;
use super::{ResolvedVersion, VersionResolver};
use crate::artifact::{LibraryArtifact, PackageType};
use crate::error::{LibverError, Result};
use crate::names::display_path;

const METADATA_QUERY_PATH: &str = "metadata/api/v1/query";

const VERSIONS_QUERY: &str = "query ($filter: VersionFilter!, $first: Int, $orderBy: VersionOrder) { versions (filter: $filter, first: $first, orderBy: $orderBy) { edges { node { name, created, modified, package { id }, repos { name, type, leadFilePath }, licenses { name, source }, size, stats { downloadCount }, vulnerabilities { critical, high, medium, low, info, unknown, skipped }, files { name, lead, size, md5, sha1, sha256, mimeType } } } } }";

/// Field the version list is ordered by (always descending)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VersionOrderField {
    /// Most recently created version first
    #[default]
    Created,
    /// Highest semantic version first; opt-in, skips Artifactory's creation order
    NameSemver,
}

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Variables,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Variables {
    filter: VersionFilter,
    first: u32,
    order_by: VersionOrder,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VersionFilter {
    package_id: String,
    name: &'static str,
    ignore_pre_release: bool,
}

#[derive(Debug, Serialize)]
struct VersionOrder {
    field: VersionOrderField,
    direction: &'static str,
}

/// JSON body asking for the latest version of `package_id`
pub fn metadata_version_query(package_id: &str, order: VersionOrderField) -> serde_json::Value {
    let request = GraphQlRequest {
        query: VERSIONS_QUERY,
        variables: Variables {
            filter: VersionFilter {
                package_id: package_id.to_string(),
                name: "*",
                ignore_pre_release: false,
            },
            first: 1,
            order_by: VersionOrder {
                field: order,
                direction: "DESC",
            },
        },
    };
    serde_json::to_value(request).unwrap_or(serde_json::Value::Null)
}

// Metadata response structures
#[derive(Debug, Deserialize)]
struct MetadataResponse {
    data: Option<Data>,
    /// GraphQL failures come back with status 200
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct Data {
    versions: Option<Versions>,
}

#[derive(Debug, Deserialize)]
struct Versions {
    #[serde(default)]
    edges: Vec<Edge>,
}

#[derive(Debug, Deserialize)]
struct Edge {
    node: Node,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Node {
    name: Option<String>,
    modified: Option<String>,
    #[serde(default)]
    repos: Vec<Repo>,
    size: Option<SizeField>,
    stats: Option<Stats>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Repo {
    lead_file_path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Stats {
    download_count: Option<u64>,
}

/// Sizes come back as strings, but some versions of the service send numbers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SizeField {
    Text(String),
    Number(u64),
}

impl SizeField {
    fn as_bytes(&self) -> Option<u64> {
        match self {
            SizeField::Text(s) => s.trim().parse().ok(),
            SizeField::Number(n) => Some(*n),
        }
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

fn into_resolved(response: MetadataResponse) -> Option<ResolvedVersion> {
    let node = response
        .data?
        .versions?
        .edges
        .into_iter()
        .map(|edge| edge.node)
        .next_back()?;
    let version = node.name.filter(|name| !name.is_empty())?;

    Some(ResolvedVersion {
        version,
        size: node.size.as_ref().and_then(SizeField::as_bytes),
        stats_download: node.stats.and_then(|s| s.download_count),
        file_path: node
            .repos
            .first()
            .and_then(|repo| repo.lead_file_path.as_deref())
            .and_then(display_path),
        last_modified: node.modified.as_deref().and_then(parse_timestamp),
    })
}

/// Latest-created version through the metadata service
#[derive(Debug, Clone)]
pub struct MetadataGraphResolver {
    package_type: PackageType,
    order: VersionOrderField,
}

impl MetadataGraphResolver {
    pub fn new(package_type: PackageType) -> Self {
        Self {
            package_type,
            order: VersionOrderField::default(),
        }
    }

    pub fn with_order(mut self, order: VersionOrderField) -> Self {
        self.order = order;
        self
    }

    /// `<packageType>://<name>`
    pub fn package_id(&self, name: &str) -> String {
        format!("{}://{}", self.package_type.as_str(), name)
    }
}

pub async fn get_latest_created_version(
    client: &ManagerClient,
    package_id: &str,
    order: VersionOrderField,
) -> Result<Option<ResolvedVersion>> {
    let response = client
        .post(METADATA_QUERY_PATH)
        .json(&metadata_version_query(package_id, order))
        .send()
        .await?;

    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(LibverError::upstream(
            "Error getting latest version",
            response.text().await?,
        ));
    }

    let body: MetadataResponse = serde_json::from_str(&response.text().await?)?;
    if let Some(error) = body.errors.first() {
        return Err(LibverError::upstream(
            "Error getting latest version",
            error.message.clone(),
        ));
    }
    let resolved = into_resolved(body);
    if resolved.is_none() {
        tracing::debug!("Metadata service has no named version for {}", package_id);
    }
    Ok(resolved)
}

#[async_trait]
impl VersionResolver for MetadataGraphResolver {
    async fn resolve(
        &self,
        client: &ManagerClient,
        lib: &LibraryArtifact,
    ) -> Result<Option<ResolvedVersion>> {
        get_latest_created_version(client, &self.package_id(&lib.artifact), self.order).await
    }
}
