//! Dependency declaration snippets.
//!
//! Turns a [`LibraryArtifact`] into text that can be pasted into a build file
//! or run in a shell. Generation is a pure function of its inputs: nothing is
//! fetched and the same record always renders the same text.
//!
//! A missing version renders as an empty version field rather than failing,
//! so a library without a published release still gets usable templates.

use serde::Serialize;

use crate::artifact::LibraryArtifact;
use crate::names::split_scala_version;

/// Generated text per ecosystem
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeneratedCode {
    pub gradle: String,
    pub maven: String,
    pub sbt: String,
    pub pip: String,
    pub nuget: String,
    pub npm: String,
    pub yarn: String,
    pub dockerfile: String,
}

/// One ecosystem of [`GeneratedCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnippetKind {
    Gradle,
    Maven,
    Sbt,
    Pip,
    Nuget,
    Npm,
    Yarn,
    Dockerfile,
}

impl SnippetKind {
    pub const ALL: [SnippetKind; 8] = [
        SnippetKind::Gradle,
        SnippetKind::Maven,
        SnippetKind::Sbt,
        SnippetKind::Pip,
        SnippetKind::Nuget,
        SnippetKind::Npm,
        SnippetKind::Yarn,
        SnippetKind::Dockerfile,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SnippetKind::Gradle => "Gradle",
            SnippetKind::Maven => "Maven",
            SnippetKind::Sbt => "SBT",
            SnippetKind::Pip => "pip",
            SnippetKind::Nuget => "NuGet",
            SnippetKind::Npm => "npm",
            SnippetKind::Yarn => "Yarn",
            SnippetKind::Dockerfile => "Dockerfile",
        }
    }

    /// Info string for a Markdown code fence
    pub fn fence_language(self) -> &'static str {
        match self {
            SnippetKind::Gradle => "groovy",
            SnippetKind::Maven | SnippetKind::Nuget => "xml",
            SnippetKind::Sbt => "scala",
            SnippetKind::Pip => "text",
            SnippetKind::Npm => "json",
            SnippetKind::Yarn => "shell",
            SnippetKind::Dockerfile => "dockerfile",
        }
    }
}

impl GeneratedCode {
    pub fn get(&self, kind: SnippetKind) -> &str {
        match kind {
            SnippetKind::Gradle => &self.gradle,
            SnippetKind::Maven => &self.maven,
            SnippetKind::Sbt => &self.sbt,
            SnippetKind::Pip => &self.pip,
            SnippetKind::Nuget => &self.nuget,
            SnippetKind::Npm => &self.npm,
            SnippetKind::Yarn => &self.yarn,
            SnippetKind::Dockerfile => &self.dockerfile,
        }
    }
}

/// Build-tool scope derived from the declared scope
#[derive(Debug, Clone, PartialEq, Eq)]
struct ScopeMapping {
    gradle: &'static str,
    maven: String,
    sbt: &'static str,
}

/// Map a free-form scope onto Gradle configurations, Maven scopes and SBT
/// configurations. Matching is case-insensitive and by substring; rules are
/// applied in order, so `testRuntime` ends up as a runtime dependency.
fn scope_mapping(scope: Option<&str>) -> ScopeMapping {
    let mut mapping = ScopeMapping {
        gradle: "implementation",
        maven: "compile".to_string(),
        sbt: "",
    };
    let Some(scope) = scope.filter(|s| !s.is_empty()) else {
        return mapping;
    };

    mapping.maven = scope.to_string();
    let lower = scope.to_lowercase();
    if lower.contains("test") {
        mapping.gradle = "testImplementation";
        mapping.sbt = r#" % "test""#;
    }
    if lower.contains("provided") {
        mapping.gradle = "compileOnly";
        mapping.sbt = r#" % "provided""#;
    }
    if lower.contains("runtime") {
        mapping.gradle = "implementation";
        mapping.sbt = r#" % "runtime""#;
    }
    if lower.contains("classpath") {
        mapping.gradle = "classpath";
        mapping.maven = "compile".to_string();
    }
    if lower.contains("optional") {
        mapping.sbt = r#" % "optional""#;
    }
    mapping
}

/// Everything a JVM declaration needs, computed once per library
struct JvmContext<'a> {
    lib: &'a LibraryArtifact,
    group: &'a str,
    version: &'a str,
    base_artifact: &'a str,
    gradle_scala_suffix: String,
    sbt_scala_operator: &'static str,
    scope: ScopeMapping,
    packaging: String,
}

impl<'a> JvmContext<'a> {
    fn new(lib: &'a LibraryArtifact, replace_scala_version: bool) -> Self {
        let split = split_scala_version(&lib.artifact);
        let scala_version = split
            .scala_version
            .map(|v| if replace_scala_version { "?" } else { v });

        Self {
            lib,
            group: lib.group.as_deref().unwrap_or(""),
            version: lib.version.as_deref().unwrap_or(""),
            base_artifact: split.base,
            gradle_scala_suffix: scala_version.map(|v| format!("_{v}")).unwrap_or_default(),
            sbt_scala_operator: if scala_version.is_some() { "%" } else { "" },
            scope: scope_mapping(lib.scope.as_deref()),
            packaging: lib
                .packaging
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(|p| format!("@{p}"))
                .unwrap_or_default(),
        }
    }

    fn gradle(&self, classifier: Option<&str>) -> String {
        let coordinates = format!(
            "{}:{}{}:{}{}{}",
            self.group,
            self.base_artifact,
            self.gradle_scala_suffix,
            self.version,
            classifier.map(|c| format!(":{c}")).unwrap_or_default(),
            self.packaging,
        );
        match self.lib.transitive {
            Some(transitive) => format!(
                "{} (\"{coordinates}\") {{\n\ttransitive = {transitive}\n}}\n",
                self.scope.gradle
            ),
            None => format!("{} \"{coordinates}\"\n", self.scope.gradle),
        }
    }

    fn maven(&self, classifier: Option<&str>) -> String {
        let classifier = classifier
            .map(|c| format!("\n\t<classifier>{c}</classifier>"))
            .unwrap_or_default();
        format!(
            "<dependency>\n\t<groupId>{}</groupId>\n\t<artifactId>{}</artifactId>\n\t<version>{}</version>{}\n\t<scope>{}</scope>\n</dependency>\n",
            self.group, self.lib.artifact, self.version, classifier, self.scope.maven
        )
    }

    fn sbt(&self, classifier: Option<&str>) -> String {
        let classifier = classifier
            .map(|c| format!(" classifier \"{c}\""))
            .unwrap_or_default();
        format!(
            "\"{}\" {}% \"{}\" % \"{}\"{}{},\n",
            self.group,
            self.sbt_scala_operator,
            self.base_artifact,
            self.version,
            classifier,
            self.scope.sbt
        )
    }
}

fn npm_line(lib: &LibraryArtifact, version: &str) -> String {
    format!("\"{}\": \"^{version}\"", lib.artifact)
}

fn nuget_line(lib: &LibraryArtifact, version: &str) -> String {
    format!("<PackageReference Include=\"{}\" Version=\"{version}\" />", lib.artifact)
}

/// Append `line` to a block, newline-separated from what is already there
fn push_line(block: &mut String, line: &str) {
    if !block.is_empty() {
        block.push('\n');
    }
    block.push_str(line);
}

/// Generate snippets for every supported ecosystem.
///
/// With `generate_classifier_variants` set and classifiers declared, one
/// JVM/NuGet/npm block is emitted per classifier; otherwise one block without
/// classifier. The yarn command never varies and is emitted once. `replace_scala_version` swaps a detected Scala suffix for the
/// `?` placeholder to produce version-independent templates.
pub fn generate_package_managers_code(
    lib: &LibraryArtifact,
    generate_classifier_variants: bool,
    replace_scala_version: bool,
) -> GeneratedCode {
    let ctx = JvmContext::new(lib, replace_scala_version);
    let version = ctx.version;

    let mut code = GeneratedCode {
        pip: format!("{}=={version}\n", lib.artifact),
        dockerfile: format!(
            "FROM {}:{}",
            lib.artifact_full_name.as_deref().unwrap_or(&lib.artifact),
            lib.version.as_deref().unwrap_or("latest")
        ),
        ..Default::default()
    };

    if generate_classifier_variants && !lib.classifiers.is_empty() {
        for classifier in &lib.classifiers {
            code.gradle.push_str(&ctx.gradle(Some(classifier)));
            code.maven.push_str(&ctx.maven(Some(classifier)));
            code.sbt.push_str(&ctx.sbt(Some(classifier)));
            push_line(&mut code.nuget, &nuget_line(lib, version));
            push_line(&mut code.npm, &npm_line(lib, version));
        }
    } else {
        code.gradle = ctx.gradle(None);
        code.maven = ctx.maven(None);
        code.sbt = ctx.sbt(None);
        code.nuget = nuget_line(lib, version);
        code.npm = npm_line(lib, version);
    }
    code.yarn = format!("yarn add {}", lib.artifact);

    code
}
