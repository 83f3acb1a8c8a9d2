//! Artifactory libver - latest-version lookup for catalog entities
//!
//! This crate resolves the latest published version of a package stored in a
//! JFrog Artifactory repository and renders ready-to-paste dependency
//! declarations (Gradle, Maven, SBT, pip, NuGet, npm, Yarn, Dockerfile).

pub mod artifact;
pub mod auth;
pub mod browse;
pub mod config;
pub mod entity;
pub mod error;
pub mod library_info;
pub mod names;
pub mod registries;
pub mod reports;
pub mod snippets;
pub mod utils;

pub use artifact::{ArtifactInfo, LibraryArtifact, PackageType};
pub use error::{LibverError, Result};
pub use library_info::LibraryInfoBuilder;
pub use snippets::{GeneratedCode, generate_package_managers_code};
