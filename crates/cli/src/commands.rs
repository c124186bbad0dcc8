//! Subcommand implementations.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crawler_core::{
    BatchStore, CatalogRun, ChromeDocument, Config, DetailRun, Document, JsonFileCheckpoint,
    LinkSet, PersistenceSession, RunError,
};

/// Store statistics printed by `crawler stats`.
#[derive(Debug, Serialize)]
struct Stats {
    contents: u64,
    revisits: u64,
}

pub async fn links(config: &Config) -> Result<()> {
    let mut session = open_session(config)?;
    let doc = match connect(config).await {
        Ok(doc) => doc,
        Err(e) => {
            release_session(session);
            return Err(e);
        }
    };

    let run = CatalogRun::new(config.catalog.clone(), config.scroll.clone());
    let link_checkpoint = JsonFileCheckpoint::<LinkSet>::new(&config.checkpoint.link_set_path);
    let batches = BatchStore::new(&config.checkpoint.batch_dir);

    let result = run
        .run(&doc, &mut session, &link_checkpoint, &batches)
        .await;

    release_document(&doc).await;
    release_session(session);

    print_json(&result.context("Catalog run failed")?)
}

pub async fn details(config: &Config) -> Result<()> {
    let mut session = open_session(config)?;
    let doc = match connect(config).await {
        Ok(doc) => doc,
        Err(e) => {
            release_session(session);
            return Err(e);
        }
    };

    let run = DetailRun::new(config.detail.clone(), config.catalog.excluded_urls.clone());
    let cursor = JsonFileCheckpoint::<u64>::new(&config.checkpoint.cursor_path);
    let batches = BatchStore::new(&config.checkpoint.batch_dir);

    let result = run.run(&doc, &mut session, &cursor, &batches).await;

    release_document(&doc).await;
    release_session(session);

    print_json(&result.context("Detail run failed")?)
}

pub fn stats(config: &Config) -> Result<()> {
    let session = open_session(config)?;
    let stats = Stats {
        contents: session.count()?,
        revisits: session.revisit_count()?,
    };
    release_session(session);
    print_json(&stats)
}

fn open_session(config: &Config) -> Result<PersistenceSession> {
    let session = PersistenceSession::open(&config.database.path)
        .map_err(|e| RunError::setup("content store", e))?;
    Ok(session)
}

async fn connect(config: &Config) -> Result<ChromeDocument> {
    match &config.browser.devtools_url {
        Some(url) => info!("Attaching to browser at {}", url),
        None => info!("Launching browser (headless: {})", config.browser.headless),
    }
    let doc = ChromeDocument::connect(&config.browser)
        .await
        .map_err(|e| RunError::setup("browser", e))?;
    Ok(doc)
}

async fn release_document(doc: &ChromeDocument) {
    if let Err(e) = doc.close().await {
        warn!("Failed to close browser session: {}", e);
    }
}

fn release_session(session: PersistenceSession) {
    if let Err(e) = session.close() {
        warn!("Failed to close content store: {}", e);
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crawler_core::load_config_from_str;

    fn config_with_db(path: &std::path::Path) -> Config {
        let mut config = load_config_from_str(
            r#"
[catalog]
root_url = "https://example.com/feed"
"#,
        )
        .unwrap();
        config.database.path = path.to_path_buf();
        config
    }

    #[test]
    fn test_unopenable_store_is_setup_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = config_with_db(&temp_dir.path().join("missing").join("contents.db"));

        let err = open_session(&config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RunError>(),
            Some(RunError::Setup(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_browser_is_setup_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = config_with_db(&temp_dir.path().join("contents.db"));
        config.browser.devtools_url = Some("ws://127.0.0.1:1/devtools/browser/none".to_string());
        config.browser.request_timeout_secs = 2;

        let err = connect(&config).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RunError>(),
            Some(RunError::Setup(reason)) if reason.starts_with("browser")
        ));
    }
}
