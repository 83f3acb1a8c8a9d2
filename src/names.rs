//! Name decomposition helpers.
//!
//! Docker references arrive as `registry.example.com/team/app:1.2.3` and have
//! to be reduced to the image name Artifactory indexes. JVM artifacts built
//! for several Scala versions carry a binary-version suffix (`my-lib_2.13`)
//! that build tools want separated from the base name.

/// Strip a trailing image tag.
///
/// Truncates at the first `:`; a `:` at position 0 is not a tag separator.
pub fn remove_docker_version(artifact: &str) -> &str {
    match artifact.find(':') {
        Some(pos) if pos > 0 => &artifact[..pos],
        _ => artifact,
    }
}

/// Reduce a full Docker reference to the image name.
///
/// The tag is removed first. When the segment before the first `/` looks like
/// a registry host (it contains a `.`), the registry and any namespace are
/// dropped and only the image name is kept. References without a registry
/// host (`team/app`) are returned unchanged apart from the tag.
pub fn extract_artifact_from_full_docker_name(artifact: &str) -> &str {
    let without_version = remove_docker_version(artifact);
    match without_version.find('/') {
        Some(slash) if without_version[..slash].contains('.') => without_version
            .rsplit('/')
            .next()
            .unwrap_or(without_version),
        _ => without_version,
    }
}

/// An artifact name split around its Scala cross-build suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalaSplit<'a> {
    /// Name without the suffix
    pub base: &'a str,
    /// Binary version after the last `_`, if any
    pub scala_version: Option<&'a str>,
}

/// Split a Scala binary-version suffix off an artifact name.
///
/// The last `_`-delimited segment counts as a Scala version when it begins
/// with a digit or with `?` (the placeholder used by template snippets).
pub fn split_scala_version(artifact: &str) -> ScalaSplit<'_> {
    if let Some(pos) = artifact.rfind('_')
        && pos > 0
    {
        let suffix = &artifact[pos + 1..];
        if suffix.starts_with(|c: char| c.is_ascii_digit() || c == '?') {
            return ScalaSplit {
                base: &artifact[..pos],
                scala_version: Some(suffix),
            };
        }
    }
    ScalaSplit {
        base: artifact,
        scala_version: None,
    }
}

/// Directory part of a repository-internal file path.
///
/// `com/example/widget/1.0/widget-1.0.jar` becomes `com/example/widget/1.0`.
/// Returns `None` for files stored at the repository root.
pub fn display_path(file_path: &str) -> Option<String> {
    let trimmed = file_path.trim_start_matches('/');
    match trimmed.rfind('/') {
        Some(pos) if pos > 0 => Some(trimmed[..pos].to_string()),
        _ => None,
    }
}
