//! Error types for artifact resolution

use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while resolving an entity against Artifactory.
///
/// "No version found" is deliberately absent: version-search endpoints answer
/// 404 for packages without a release, and resolvers report that as `Ok(None)`.
#[derive(Error, Debug)]
pub enum LibverError {
    /// The entity names an artifact but no repository to look it up in
    #[error("Repository definition is required for JFrog artifact {artifact}")]
    MissingRepository { artifact: String },

    /// Artifactory does not know the repository key
    #[error("Repository {0} was not found")]
    RepositoryNotFound(String),

    /// Non-404 failure answered by Artifactory
    #[error("{context} {message}")]
    Upstream { context: String, message: String },

    /// No artifact name to look up; `entity` names where it was missing
    #[error("Artifact name is required for {entity}")]
    MissingArtifact { entity: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

impl LibverError {
    pub fn upstream(context: impl Into<String>, message: impl Into<String>) -> Self {
        LibverError::Upstream {
            context: context.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LibverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_repository_message() {
        let err = LibverError::MissingRepository {
            artifact: "widget".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Repository definition is required for JFrog artifact widget"
        );
    }

    #[test]
    fn test_upstream_message_passes_through() {
        let err = LibverError::upstream("Error getting latest version", "Bad credentials");
        assert_eq!(err.to_string(), "Error getting latest version Bad credentials");
    }

    #[test]
    fn test_repository_not_found_message() {
        let err = LibverError::RepositoryNotFound("libs-release".to_string());
        assert_eq!(err.to_string(), "Repository libs-release was not found");
    }
}
