#![allow(non_snake_case)]

use super::*;
use bytes::Bytes;
use std::sync::Arc;
use uuid::Uuid;
use wristkit_core::{AppClusterStorage, BuildId, Diagnostics, Metadata, ProjectConfig};
use wristkit_stream::{collect, from_records};

fn context(config: ProjectConfig) -> ManifestContext {
    ManifestContext::new(Arc::new(config), BuildId::new(1), Diagnostics::new())
}

fn entry(path: &str, component: ComponentType) -> FileRecord {
    FileRecord::buffer(path, Bytes::from_static(b"code")).with_metadata(Metadata {
        component: Some(component),
        entry_point: true,
        ..Metadata::default()
    })
}

async fn build(records: Vec<FileRecord>, config: ProjectConfig) -> BuildResult<CompanionManifest> {
    let records = collect(companion_manifest(from_records(records), context(config))).await?;
    let manifest = records.last().unwrap();
    assert_eq!(manifest.path(), "manifest.json");
    Ok(serde_json::from_slice(manifest.bytes().unwrap()).unwrap())
}

#[tokio::test]
async fn companion_manifest___companion_and_settings___both_listed() {
    let manifest = build(
        vec![
            entry("companion.js", ComponentType::Companion),
            entry("settings.js", ComponentType::Settings),
        ],
        ProjectConfig::new(Uuid::nil(), "Timer"),
    )
    .await
    .unwrap();

    assert_eq!(manifest.manifest_version, 2);
    assert_eq!(manifest.companion.unwrap().main, "companion.js");
    assert_eq!(manifest.settings.unwrap().main, "settings.js");
    assert_eq!(manifest.api_version, "1.0.0");
    assert!(manifest.app_clusters.is_none());
}

#[tokio::test]
async fn companion_manifest___settings_only___accepted() {
    let manifest = build(
        vec![entry("settings.js", ComponentType::Settings)],
        ProjectConfig::new(Uuid::nil(), "Timer"),
    )
    .await
    .unwrap();

    assert!(manifest.companion.is_none());
    assert!(manifest.settings.is_some());
}

#[tokio::test]
async fn companion_manifest___no_roles___fatal() {
    let result = build(
        vec![FileRecord::buffer("other.js", Bytes::new())],
        ProjectConfig::new(Uuid::nil(), "Timer"),
    )
    .await;

    assert!(matches!(result, Err(BuildError::Fatal { .. })));
}

#[tokio::test]
async fn companion_manifest___two_companion_entries___fatal() {
    let result = build(
        vec![
            entry("companion.js", ComponentType::Companion),
            entry("companion2.js", ComponentType::Companion),
        ],
        ProjectConfig::new(Uuid::nil(), "Timer"),
    )
    .await;

    let message = result.unwrap_err().to_string();
    assert!(message.contains("Multiple entry points"));
    assert!(message.contains("companion2.js"));
}

#[tokio::test]
async fn companion_manifest___device_entry___fatal() {
    let result = build(
        vec![
            entry("companion.js", ComponentType::Companion),
            entry("app/index.js", ComponentType::Device),
        ],
        ProjectConfig::new(Uuid::nil(), "Timer"),
    )
    .await;

    assert!(result.unwrap_err().to_string().contains("app/index.js"));
}

#[tokio::test]
async fn companion_manifest___cluster_storage___included() {
    let profile = Uuid::from_u128(7);
    let mut config = ProjectConfig::new(Uuid::nil(), "Timer");
    config.app_cluster_storage = Some(AppClusterStorage {
        app_clusters: vec!["shared".to_string()],
        developer_profile_id: Some(profile),
    });

    let manifest = build(vec![entry("companion.js", ComponentType::Companion)], config)
        .await
        .unwrap();

    assert_eq!(manifest.app_clusters, Some(vec!["shared".to_string()]));
    assert_eq!(manifest.developer_profile_id, Some(profile.to_string()));
}
