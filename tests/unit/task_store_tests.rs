/*!
 * Tests for job registration, cache semantics and progress
 */

use std::sync::Arc;
use doctran::task::{ProgressTracker, TaskStatus, TaskStore};

#[test]
fn test_create_withSameRequestTwice_shouldOnlyHitAfterCompletion() {
    let store = TaskStore::new();
    let (first, cached) = store.create("https://files/a", "contract.docx", "en", "zh");
    assert!(!cached);

    let (pending_dup, cached) = store.create("https://files/a", "contract.docx", "en", "zh");
    assert!(!cached);
    assert_ne!(pending_dup, first);

    store.update_status(&first, TaskStatus::Processing, None);
    store.update_status(&first, TaskStatus::Completed, None);

    let (hit, cached) = store.create("https://files/b", "contract.docx", "en", "zh");
    assert!(cached);
    assert_eq!(hit, first);
}

#[test]
fn test_create_withOtherLanguagePair_shouldMiss() {
    let store = TaskStore::new();
    let (first, _) = store.create("u", "contract.docx", "en", "zh");
    store.update_status(&first, TaskStatus::Processing, None);
    store.update_status(&first, TaskStatus::Completed, None);

    let (_, cached) = store.create("u", "contract.docx", "en", "fr");
    assert!(!cached);
}

#[test]
fn test_update_status_afterCompleted_shouldRepointCache() {
    let store = TaskStore::new();
    let (first, _) = store.create("u", "a.pdf", "en", "zh");
    store.update_status(&first, TaskStatus::Failed, Some("disk full".into()));

    let (second, _) = store.create("u", "a.pdf", "en", "zh");
    store.update_status(&second, TaskStatus::Processing, None);
    store.update_status(&second, TaskStatus::Completed, None);

    let (hit, cached) = store.create("u", "a.pdf", "en", "zh");
    assert!(cached);
    assert_eq!(hit, second);
}

#[test]
fn test_report_forFailedTask_shouldExposeMessageOnly() {
    let store = TaskStore::new();
    let (id, _) = store.create("u", "a.pdf", "en", "zh");
    store.update_status(&id, TaskStatus::Failed, Some("Malformed PDF: bad xref".into()));

    let report = store.report(&id).unwrap();
    assert_eq!(report.status, TaskStatus::Failed);
    assert_eq!(report.error_message.as_deref(), Some("Malformed PDF: bad xref"));
    assert!(report.download_url.is_empty());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["status"], "failed");
}

#[test]
fn test_progress_tracker_shouldNeverDecreaseOrExceedHundred() {
    let store = Arc::new(TaskStore::new());
    let (id, _) = store.create("u", "a.docx", "en", "zh");
    let mut tracker = ProgressTracker::new(store.clone(), id.clone());
    tracker.set_total(7);

    let mut last = 0;
    for _ in 0..10 {
        let percent = tracker.update(1);
        assert!(percent >= last);
        assert!(percent <= 100);
        assert_eq!(store.get(&id).unwrap().progress, percent);
        last = percent;
    }
    assert_eq!(last, 100);
}
