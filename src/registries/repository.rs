//! Repository classification and listing.
//!
//! The package type of a repository decides which query strategy can find a
//! version in it, so every resolution starts here.

use regex::{Regex, RegexBuilder};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::http_client::{ManagerClient, error_message};
use crate::error::{LibverError, Result};

const REPOSITORIES_PATH: &str = "artifactory/api/repositories";

/// Repository configuration as answered by `api/repositories/{key}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryDetails {
    pub key: String,
    /// Declared package type, in whatever case Artifactory uses
    pub package_type: String,
    #[serde(default)]
    pub rclass: Option<String>,
}

/// Entry of the repository list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryInfo {
    pub key: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `LOCAL`, `REMOTE`, `VIRTUAL`, `FEDERATED`
    #[serde(rename = "type")]
    pub repo_type: String,
    pub package_type: String,
}

/// Look up the package type of `repo`.
///
/// An unknown repository is a configuration error, reported as
/// [`LibverError::RepositoryNotFound`].
pub async fn classify(client: &ManagerClient, repo: &str) -> Result<RepositoryDetails> {
    let response = client.get_segment(REPOSITORIES_PATH, repo)?.send().await?;

    match response.status() {
        StatusCode::NOT_FOUND => Err(LibverError::RepositoryNotFound(repo.to_string())),
        StatusCode::OK => {
            let details: RepositoryDetails = serde_json::from_str(&response.text().await?)?;
            tracing::debug!("Repository {} has package type {}", repo, details.package_type);
            Ok(details)
        }
        _ => Err(LibverError::upstream(
            format!("Cannot get repository {repo} detail info"),
            error_message(response).await,
        )),
    }
}

/// All repositories visible through the proxy
pub async fn list_repositories(client: &ManagerClient) -> Result<Vec<RepositoryInfo>> {
    let response = client.get(REPOSITORIES_PATH).send().await?;

    if response.status() != StatusCode::OK {
        return Err(LibverError::upstream(
            "Cannot get repositories list -",
            error_message(response).await,
        ));
    }

    Ok(serde_json::from_str(&response.text().await?)?)
}

/// Narrow a repository list by package type, repository type and key pattern.
///
/// Empty lists filter nothing.
#[derive(Debug, Clone, Default)]
pub struct RepositoryFilter {
    /// Lower-cased package types to keep
    pub package_types: Vec<String>,
    /// Lower-cased repository types to keep
    pub repository_types: Vec<String>,
    /// Keys matching any of these are dropped
    pub excluded: Vec<Regex>,
}

impl RepositoryFilter {
    /// Build a filter from user-supplied strings.
    ///
    /// Exclusion patterns use the `/pattern/flags` notation; malformed
    /// patterns are skipped with a warning.
    pub fn from_options<S: AsRef<str>>(
        package_types: &[S],
        repository_types: &[S],
        excluded: &[S],
    ) -> Self {
        Self {
            package_types: package_types
                .iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect(),
            repository_types: repository_types
                .iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect(),
            excluded: excluded
                .iter()
                .filter_map(|s| parse_slash_regex(s.as_ref()))
                .collect(),
        }
    }

    pub fn matches(&self, repo: &RepositoryInfo) -> bool {
        let package_ok = self.package_types.is_empty()
            || self
                .package_types
                .contains(&repo.package_type.to_lowercase());
        let type_ok = self.repository_types.is_empty()
            || self
                .repository_types
                .contains(&repo.repo_type.to_lowercase());
        let not_excluded = !self.excluded.iter().any(|re| re.is_match(&repo.key));
        package_ok && type_ok && not_excluded
    }

    /// Keys of the repositories passing the filter, in input order
    pub fn apply(&self, repos: &[RepositoryInfo]) -> Vec<String> {
        repos
            .iter()
            .filter(|repo| self.matches(repo))
            .map(|repo| repo.key.clone())
            .collect()
    }
}

/// Parse `/pattern/flags`. Flags `i`, `m` and `s` are honoured; `g`, `y`
/// and `u` have no meaning for a key match and are ignored.
pub fn parse_slash_regex(input: &str) -> Option<Regex> {
    let Some(body) = input.strip_prefix('/') else {
        tracing::warn!("Invalid regex pattern format: {}", input);
        return None;
    };
    let Some(end) = body.rfind('/') else {
        tracing::warn!("Invalid regex pattern format: {}", input);
        return None;
    };
    let (pattern, flags) = (&body[..end], &body[end + 1..]);
    if !flags.chars().all(|c| "gimyus".contains(c)) {
        tracing::warn!("Invalid regex flags in {}", input);
        return None;
    }

    match RegexBuilder::new(pattern)
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .build()
    {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!("Error creating regex from {}: {}", input, e);
            None
        }
    }
}
