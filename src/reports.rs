//! Resolved-artifact reports
//!
//! Renders resolved artifacts and their snippets as plain text, Markdown or
//! JSON for the command line.

use serde::Serialize;

use crate::artifact::{ArtifactInfo, PackageType};
use crate::browse::{browse_repo_url, browse_version_url};
use crate::snippets::{GeneratedCode, SnippetKind, generate_package_managers_code};
use crate::utils::{format_date, format_size};

/// A resolved artifact together with the snippets to show for it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    #[serde(flatten)]
    pub info: ArtifactInfo,
    pub code: GeneratedCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browse_url: Option<String>,
}

impl ReportEntry {
    pub fn new(info: ArtifactInfo, classifier_variants: bool, template: bool) -> Self {
        let code = generate_package_managers_code(&info.lib, classifier_variants, template);
        Self {
            info,
            code,
            browse_url: None,
        }
    }

    /// Attach a deep link into the repository browser
    pub fn with_browse_url(mut self, artifactory_url: Option<&str>) -> Self {
        self.browse_url = artifactory_url.map(|url| browse_version_url(url, &self.info.lib));
        self
    }
}

/// Snippet kinds worth showing for a package type.
///
/// Unclassified and generic repositories get every kind.
pub fn snippet_kinds(package_type: Option<&PackageType>) -> &'static [SnippetKind] {
    match package_type {
        Some(p) if p.is_maven_like() => &[SnippetKind::Gradle, SnippetKind::Maven, SnippetKind::Sbt],
        Some(PackageType::Pypi) => &[SnippetKind::Pip],
        Some(PackageType::Npm) => &[SnippetKind::Npm, SnippetKind::Yarn],
        Some(PackageType::Nuget) => &[SnippetKind::Nuget],
        Some(PackageType::Docker) => &[SnippetKind::Dockerfile],
        _ => &SnippetKind::ALL,
    }
}

fn version_label(entry: &ReportEntry) -> &str {
    entry.info.lib.version.as_deref().unwrap_or("?")
}

fn coordinates(entry: &ReportEntry) -> String {
    let lib = &entry.info.lib;
    match lib.group.as_deref() {
        Some(group) => format!("{group}:{}", lib.artifact),
        None => lib.artifact.clone(),
    }
}

pub fn generate_text_report(entries: &[ReportEntry]) -> String {
    let mut lines = Vec::new();
    for entry in entries {
        let lib = &entry.info.lib;
        lines.push(format!("{} {}", coordinates(entry), version_label(entry)));
        lines.push(format!("  repo:          {}", lib.repo));
        if let Some(package_type) = &lib.package_type {
            lines.push(format!("  package type:  {package_type}"));
        }
        if let Some(scope) = &lib.scope {
            lines.push(format!("  scope:         {scope}"));
        }
        if lib.size.is_some() || lib.last_modified.is_some() {
            lines.push(format!("  size:          {}", format_size(lib.size)));
            lines.push(format!("  last modified: {}", format_date(lib.last_modified.as_ref())));
        }
        if let Some(stats) = lib.stats {
            lines.push(format!("  downloads:     {stats}"));
        }
        if let Some(url) = &entry.browse_url {
            lines.push(format!("  browse:        {url}"));
        }

        for kind in snippet_kinds(lib.package_type.as_ref()) {
            let text = entry.code.get(*kind);
            if text.is_empty() {
                continue;
            }
            lines.push(String::new());
            lines.push(format!("  [{}]", kind.label()));
            lines.extend(text.lines().map(|l| format!("    {l}")));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

pub fn generate_markdown_report(artifactory_url: Option<&str>, entries: &[ReportEntry]) -> String {
    let mut lines = vec![
        "# Artifact Versions".to_string(),
        String::new(),
        format!("**Date**: {}", chrono::Local::now().format("%Y-%m-%d")),
        String::new(),
    ];

    if entries.is_empty() {
        lines.push("## No artifacts resolved".to_string());
        return lines.join("\n");
    }

    lines.push("| Artifact | Version | Repository | Type | Size | Last modified |".to_string());
    lines.push("|----------|---------|------------|------|------|---------------|".to_string());
    for entry in entries {
        let lib = &entry.info.lib;
        let repo = match artifactory_url {
            Some(url) => format!("[{}]({})", lib.repo, browse_repo_url(url, lib)),
            None => lib.repo.clone(),
        };
        let version = match &entry.browse_url {
            Some(url) => format!("[{}]({url})", version_label(entry)),
            None => version_label(entry).to_string(),
        };
        lines.push(format!(
            "| {} | {} | {} | {} | {} | {} |",
            coordinates(entry),
            version,
            repo,
            lib.package_type
                .as_ref()
                .map(|p| p.as_str().to_string())
                .unwrap_or_else(|| "?".to_string()),
            format_size(lib.size),
            format_date(lib.last_modified.as_ref()),
        ));
    }

    for entry in entries {
        lines.push(String::new());
        lines.push(format!("## {}", coordinates(entry)));
        for kind in snippet_kinds(entry.info.lib.package_type.as_ref()) {
            let text = entry.code.get(*kind);
            if text.is_empty() {
                continue;
            }
            lines.push(String::new());
            lines.push(format!("### {}", kind.label()));
            lines.push(format!("```{}", kind.fence_language()));
            lines.push(text.trim_end().to_string());
            lines.push("```".to_string());
        }
    }

    lines.join("\n")
}

pub fn generate_json_report(entries: &[ReportEntry]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(entries)
}
