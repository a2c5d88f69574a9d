//! Import and export of the goal tree.
//!
//! The document functions work on strings and return `DomainResult`. The
//! `*_file` wrappers read or write a path and only report success,
//! logging the reason of a failure.

pub mod ics;
pub mod xml;

pub use ics::{export_ics, render_calendar, IcsScope};
pub use xml::{export_xml, import_xml, insert_records, parse_document, replace_with_xml, GoalRecord};

use std::path::Path;
use tracing::{error, info};

use crate::domain::ports::GoalRepository;
use crate::services::goal_service::GoalService;

/// Write the XML document to `path`.
pub async fn export_xml_file<R: GoalRepository>(service: &GoalService<R>, path: &Path) -> bool {
    let result = async {
        let xml = export_xml(service).await?;
        tokio::fs::write(path, xml).await?;
        Ok::<_, crate::domain::errors::DomainError>(())
    }
    .await;

    match result {
        Ok(()) => {
            info!(path = %path.display(), "XML export written");
            true
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "XML export failed");
            false
        }
    }
}

/// Import the XML document at `path` into the store.
pub async fn import_xml_file<R: GoalRepository>(service: &GoalService<R>, path: &Path) -> bool {
    let result = async {
        let xml = tokio::fs::read_to_string(path).await?;
        import_xml(service, &xml).await
    }
    .await;

    match result {
        Ok(count) => {
            info!(path = %path.display(), goals = count, "XML import finished");
            true
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "XML import failed");
            false
        }
    }
}

/// Write the calendar for `scope` to `path`.
pub async fn export_ics_file<R: GoalRepository>(service: &GoalService<R>, path: &Path, scope: IcsScope) -> bool {
    let result = async {
        let ics = export_ics(service, scope).await?;
        tokio::fs::write(path, ics).await?;
        Ok::<_, crate::domain::errors::DomainError>(())
    }
    .await;

    match result {
        Ok(()) => {
            info!(path = %path.display(), scope = scope.as_str(), "calendar export written");
            true
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "calendar export failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryGoalRepository, InMemoryImageStore};
    use crate::domain::models::Goal;
    use std::sync::Arc;

    fn setup_service() -> GoalService<InMemoryGoalRepository> {
        GoalService::new(Arc::new(InMemoryGoalRepository::new()), Arc::new(InMemoryImageStore::new()))
    }

    #[tokio::test]
    async fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("goals.xml");

        let source = setup_service();
        let root = source.insert(Goal::new("Root", ""), None).await.unwrap();
        source.insert(Goal::new("Child", ""), Some(root)).await.unwrap();
        assert!(export_xml_file(&source, &path).await);

        let target = setup_service();
        assert!(import_xml_file(&target, &path).await);
        assert_eq!(target.collect_all_post_order().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failures_report_false() {
        let dir = tempfile::tempdir().unwrap();
        let service = setup_service();

        assert!(!import_xml_file(&service, &dir.path().join("missing.xml")).await);

        let broken = dir.path().join("broken.xml");
        tokio::fs::write(&broken, "<mango><goal>").await.unwrap();
        assert!(!import_xml_file(&service, &broken).await);

        let unwritable = dir.path().join("no-such-dir").join("out.ics");
        assert!(!export_ics_file(&service, &unwritable, IcsScope::All).await);
    }
}
