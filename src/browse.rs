//! Deep links into the Artifactory repository browser.

use crate::artifact::{ArtifactInfo, LibraryArtifact};

const BROWSE_PATH: &str = "artifactory/list";

fn root(artifactory_url: &str) -> &str {
    artifactory_url.trim_end_matches('/')
}

/// `{url}/artifactory/list/{repo}`
pub fn browse_repo_url(artifactory_url: &str, lib: &LibraryArtifact) -> String {
    format!("{}/{BROWSE_PATH}/{}", root(artifactory_url), lib.repo)
}

/// Folder of the group, dots turned into path segments
pub fn browse_package_url(artifactory_url: &str, lib: &LibraryArtifact) -> String {
    let group = lib.group.as_deref().unwrap_or("").replace('.', "/");
    format!("{}/{group}", browse_repo_url(artifactory_url, lib))
}

pub fn browse_artifact_url(artifactory_url: &str, lib: &LibraryArtifact) -> String {
    format!("{}/{}", browse_repo_url(artifactory_url, lib), lib.artifact)
}

/// Folder of the resolved version; the artifact folder with a trailing slash
/// when no version is known.
pub fn browse_version_url(artifactory_url: &str, lib: &LibraryArtifact) -> String {
    format!(
        "{}/{}",
        browse_artifact_url(artifactory_url, lib),
        lib.version.as_deref().unwrap_or("")
    )
}

/// Link for a card: the version folder when exactly one artifact is shown,
/// the Artifactory root otherwise.
pub fn browse_link_default(artifactory_url: &str, infos: &[ArtifactInfo]) -> String {
    match infos {
        [single] => browse_version_url(artifactory_url, &single.lib),
        _ => artifactory_url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://acme.jfrog.io";

    fn widget() -> LibraryArtifact {
        LibraryArtifact::new("libs-release", "widget")
            .with_group("com.example")
            .with_version("3.4.1")
    }

    #[test]
    fn test_browse_urls() {
        let lib = widget();
        assert_eq!(browse_repo_url(URL, &lib), "https://acme.jfrog.io/artifactory/list/libs-release");
        assert_eq!(
            browse_package_url(URL, &lib),
            "https://acme.jfrog.io/artifactory/list/libs-release/com/example"
        );
        assert_eq!(
            browse_artifact_url(URL, &lib),
            "https://acme.jfrog.io/artifactory/list/libs-release/widget"
        );
        assert_eq!(
            browse_version_url(URL, &lib),
            "https://acme.jfrog.io/artifactory/list/libs-release/widget/3.4.1"
        );
    }

    #[test]
    fn test_trailing_slash_on_base() {
        assert_eq!(
            browse_repo_url("https://acme.jfrog.io/", &widget()),
            "https://acme.jfrog.io/artifactory/list/libs-release"
        );
    }

    #[test]
    fn test_version_url_without_version() {
        let lib = LibraryArtifact::new("pypi-local", "requests");
        assert_eq!(
            browse_version_url(URL, &lib),
            "https://acme.jfrog.io/artifactory/list/pypi-local/requests/"
        );
    }

    #[test]
    fn test_browse_link_default() {
        let one = vec![ArtifactInfo::new(widget())];
        assert!(browse_link_default(URL, &one).ends_with("/widget/3.4.1"));

        let two = vec![ArtifactInfo::new(widget()), ArtifactInfo::new(widget())];
        assert_eq!(browse_link_default(URL, &two), URL);
        assert_eq!(browse_link_default(URL, &[]), URL);
    }
}
