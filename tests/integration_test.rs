//! End-to-end resolution against a mocked Artifactory proxy

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use artifactory_libver::PackageType;
use artifactory_libver::config::Config;
use artifactory_libver::entity::{ENTITY_ARTIFACT, ENTITY_GROUP, ENTITY_REPO, Entity};
use artifactory_libver::error::LibverError;
use artifactory_libver::library_info::{LibraryInfoBuilder, successful};
use artifactory_libver::registries::http_client::create_shared_client;

const PROXY: &str = "/api/proxy/artifactory-proxy";

fn config_for(server: &MockServer) -> Config {
    Config::from_json(Some(json!({
        "jfrog": { "artifactory": { "url": "https://acme.jfrog.io" } },
        "backend": { "baseUrl": server.uri() }
    })))
    .unwrap()
}

fn builder_for(server: &MockServer) -> LibraryInfoBuilder {
    let http = create_shared_client().expect("Failed to create client");
    LibraryInfoBuilder::new(&config_for(server), http).unwrap()
}

fn entity(name: &str, repo: &str, group: Option<&str>, artifact: &str) -> Entity {
    let mut entity = Entity::new(name)
        .with_annotation(ENTITY_REPO, repo)
        .with_annotation(ENTITY_ARTIFACT, artifact);
    if let Some(group) = group {
        entity = entity.with_annotation(ENTITY_GROUP, group);
    }
    entity
}

async fn mount_repository(server: &MockServer, key: &str, package_type: &str) {
    Mock::given(method("GET"))
        .and(path(format!("{PROXY}/artifactory/api/repositories/{key}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "key": key,
            "packageType": package_type,
            "rclass": "local"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_maven_entity_end_to_end() {
    let server = MockServer::start().await;
    mount_repository(&server, "libs-release", "maven").await;
    Mock::given(method("GET"))
        .and(path(format!("{PROXY}/artifactory/api/search/latestVersion")))
        .and(query_param("g", "com.example"))
        .and(query_param("a", "widget"))
        .and(query_param("repos", "libs-release"))
        .respond_with(ResponseTemplate::new(200).set_body_string("3.4.1"))
        .expect(1)
        .mount(&server)
        .await;

    let info = builder_for(&server)
        .build(&entity("widget-service", "libs-release", Some("com.example"), "widget"))
        .await
        .unwrap();

    assert_eq!(info.lib.version.as_deref(), Some("3.4.1"));
    assert_eq!(info.lib.package_type, Some(PackageType::Maven));
    assert!(info.code().maven.contains("<version>3.4.1</version>"));
    assert_eq!(info.code().gradle, "implementation \"com.example:widget:3.4.1\"\n");
}

#[tokio::test]
async fn test_token_is_sent_as_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PROXY}/artifactory/api/repositories/libs-release")))
        .and(header("authorization", "Bearer s3cr3t-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "key": "libs-release",
            "packageType": "Maven"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{PROXY}/artifactory/api/search/latestVersion")))
        .and(header("authorization", "Bearer s3cr3t-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("1.0.0"))
        .mount(&server)
        .await;

    let info = builder_for(&server)
        .with_token("s3cr3t-token")
        .build(&entity("svc", "libs-release", Some("com.example"), "widget"))
        .await
        .unwrap();

    assert_eq!(info.lib.version.as_deref(), Some("1.0.0"));
}

#[tokio::test]
async fn test_no_release_is_not_an_error() {
    let server = MockServer::start().await;
    mount_repository(&server, "libs-release", "Maven").await;
    Mock::given(method("GET"))
        .and(path(format!("{PROXY}/artifactory/api/search/latestVersion")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let info = builder_for(&server)
        .build(&entity("svc", "libs-release", Some("com.example"), "unreleased"))
        .await
        .unwrap();

    assert_eq!(info.lib.version, None);
    assert_eq!(info.lib.package_type, Some(PackageType::Maven));
    assert!(info.code().maven.contains("<version></version>"));
}

#[tokio::test]
async fn test_unknown_repository_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PROXY}/artifactory/api/repositories/typo-release")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{PROXY}/artifactory/api/search/latestVersion")))
        .respond_with(ResponseTemplate::new(200).set_body_string("9.9.9"))
        .expect(0)
        .mount(&server)
        .await;

    let err = builder_for(&server)
        .build(&entity("svc", "typo-release", Some("com.example"), "widget"))
        .await
        .unwrap_err();

    assert!(matches!(err, LibverError::RepositoryNotFound(ref key) if key == "typo-release"));
}

#[tokio::test]
async fn test_upstream_error_message_passes_through() {
    let server = MockServer::start().await;
    mount_repository(&server, "libs-release", "maven").await;
    Mock::given(method("GET"))
        .and(path(format!("{PROXY}/artifactory/api/search/latestVersion")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "errors": [{ "status": 401, "message": "Bad credentials" }]
        })))
        .mount(&server)
        .await;

    let err = builder_for(&server)
        .build(&entity("svc", "libs-release", Some("com.example"), "widget"))
        .await
        .unwrap_err();

    assert!(matches!(err, LibverError::Upstream { .. }));
    assert!(err.to_string().contains("Bad credentials"));
}

#[tokio::test]
async fn test_missing_repository_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let entity = Entity::new("svc").with_annotation(ENTITY_ARTIFACT, "widget");
    let err = builder_for(&server).build(&entity).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Repository definition is required for JFrog artifact widget"
    );
}

#[tokio::test]
async fn test_pypi_picks_highest_version() {
    let server = MockServer::start().await;
    mount_repository(&server, "pypi-local", "Pypi").await;
    Mock::given(method("GET"))
        .and(path(format!("{PROXY}/artifactory/api/search/prop")))
        .and(query_param("pypi.name", "requests"))
        .and(query_param("repos", "pypi-local"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "uri": "a", "properties": { "pypi.version": ["2.9.0"] } },
                { "uri": "b", "properties": { "pypi.name": ["requests"] } },
                { "uri": "c", "properties": { "pypi.version": ["2.31.0"] } },
                { "uri": "d", "properties": { "pypi.version": ["2.10.1"] } }
            ]
        })))
        .mount(&server)
        .await;

    let info = builder_for(&server)
        .build(&entity("svc", "pypi-local", None, "requests"))
        .await
        .unwrap();

    assert_eq!(info.lib.version.as_deref(), Some("2.31.0"));
    assert_eq!(info.lib.package_type, Some(PackageType::Pypi));
    assert_eq!(info.code().pip, "requests==2.31.0\n");
}

#[tokio::test]
async fn test_docker_name_is_normalized() {
    let server = MockServer::start().await;
    mount_repository(&server, "docker-local", "Docker").await;
    Mock::given(method("POST"))
        .and(path(format!("{PROXY}/metadata/api/v1/query")))
        .and(body_partial_json(json!({
            "variables": { "filter": { "packageId": "docker://app" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "versions": { "edges": [{ "node": {
                "name": "1.2.3",
                "modified": "2024-03-02T11:30:00.000Z",
                "repos": [{ "name": "docker-local", "leadFilePath": "app/1.2.3/manifest.json" }],
                "size": "1048576",
                "stats": { "downloadCount": 7 }
            }}]}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let info = builder_for(&server)
        .build(&entity("svc", "docker-local", None, "registry.example.com/team/app:1.0.0"))
        .await
        .unwrap();

    assert_eq!(info.lib.artifact, "app");
    assert_eq!(
        info.lib.artifact_full_name.as_deref(),
        Some("registry.example.com/team/app")
    );
    assert_eq!(info.lib.version.as_deref(), Some("1.2.3"));
    assert_eq!(info.lib.size, Some(1_048_576));
    assert_eq!(info.lib.stats, Some(7));
    assert_eq!(info.lib.file_path.as_deref(), Some("app/1.2.3"));
    assert_eq!(info.code().dockerfile, "FROM registry.example.com/team/app:1.2.3");
}

#[tokio::test]
async fn test_npm_uses_metadata_service() {
    let server = MockServer::start().await;
    mount_repository(&server, "npm-local", "npm").await;
    Mock::given(method("POST"))
        .and(path(format!("{PROXY}/metadata/api/v1/query")))
        .and(body_partial_json(json!({
            "variables": { "filter": { "packageId": "npm://left-pad" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "versions": { "edges": [{ "node": { "name": "1.3.0" } }] } }
        })))
        .mount(&server)
        .await;

    let info = builder_for(&server)
        .build(&entity("svc", "npm-local", None, "left-pad"))
        .await
        .unwrap();

    assert_eq!(info.lib.version.as_deref(), Some("1.3.0"));
    assert_eq!(info.code().npm, "\"left-pad\": \"^1.3.0\"");
}

#[tokio::test]
async fn test_helm_uses_metadata_service() {
    let server = MockServer::start().await;
    mount_repository(&server, "helm-local", "Helm").await;
    Mock::given(method("POST"))
        .and(path(format!("{PROXY}/metadata/api/v1/query")))
        .and(body_partial_json(json!({
            "variables": { "filter": { "packageId": "helm://ingress" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "versions": { "edges": [{ "node": { "name": "4.2.0" } }] } }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{PROXY}/artifactory/api/search/latestVersion")))
        .respond_with(ResponseTemplate::new(200).set_body_string("0.0.1"))
        .expect(0)
        .mount(&server)
        .await;

    let info = builder_for(&server)
        .build(&entity("svc", "helm-local", None, "ingress"))
        .await
        .unwrap();

    assert_eq!(info.lib.version.as_deref(), Some("4.2.0"));
    assert_eq!(info.lib.package_type, Some(PackageType::Helm));
}

#[tokio::test]
async fn test_batch_tolerates_failures() {
    let server = MockServer::start().await;
    mount_repository(&server, "libs-release", "maven").await;
    Mock::given(method("GET"))
        .and(path(format!("{PROXY}/artifactory/api/repositories/gone")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{PROXY}/artifactory/api/search/latestVersion")))
        .and(query_param("a", "widget"))
        .respond_with(ResponseTemplate::new(200).set_body_string("3.4.1"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{PROXY}/artifactory/api/search/latestVersion")))
        .and(query_param("a", "gadget"))
        .respond_with(ResponseTemplate::new(200).set_body_string("0.9.0"))
        .mount(&server)
        .await;

    let entities = vec![
        entity("widget-service", "libs-release", Some("com.example"), "widget"),
        entity("broken", "gone", Some("com.example"), "widget"),
        Entity::new("unannotated").with_annotation(ENTITY_ARTIFACT, "orphan"),
        entity("gadget-service", "libs-release", Some("com.example"), "gadget"),
    ];

    let outcomes = builder_for(&server).build_all(&entities).await;
    assert_eq!(outcomes.len(), 4);
    assert_eq!(outcomes[0].entity, "widget-service");
    assert!(outcomes[0].result.is_ok());
    assert!(matches!(
        outcomes[1].result,
        Err(LibverError::RepositoryNotFound(_))
    ));
    assert!(matches!(
        outcomes[2].result,
        Err(LibverError::MissingRepository { .. })
    ));

    let infos = successful(outcomes);
    let versions: Vec<_> = infos
        .iter()
        .map(|info| info.lib.version.as_deref().unwrap_or(""))
        .collect();
    assert_eq!(versions, vec!["3.4.1", "0.9.0"]);
}
