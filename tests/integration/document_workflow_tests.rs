/*!
 * End-to-end translation of DOCX and PDF documents against a mock provider
 */

use std::sync::Arc;

use doctran::document::model::{ContainerKind, Layout};
use doctran::document::{Document, DocxDocument, PdfDocument, StructuredDocument, WalkerConfig};
use doctran::providers::mock::MockProvider;
use doctran::task::{TaskStatus, TaskStore};
use doctran::translation::TranslationPreferences;
use doctran::Controller;

use crate::common;

fn texts_of(layout: &Layout, kind: ContainerKind) -> Vec<String> {
    layout
        .containers_of(kind)
        .flat_map(|(_, container)| container.paragraph_ids())
        .map(|paragraph| layout.paragraph_text(paragraph))
        .collect()
}

#[tokio::test]
async fn test_process_job_withDocx_shouldTranslateEveryContainer() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let store = Arc::new(TaskStore::new());
    let mock = MockProvider::working();
    let controller = Controller::new(common::mock_client(mock.clone()), store.clone());

    let document = Document::open(&common::sample_docx(), "report.docx").unwrap();
    let (task_id, _) = store.create("file:///report.docx", "report.docx", "en", "zh");
    let output = dir.path().join("translated_report.docx");

    let path = controller
        .process_job(&task_id, document, &TranslationPreferences::default(), &output)
        .await
        .unwrap();
    assert_eq!(path, output);
    assert_eq!(mock.request_count(), 6);

    let translated = DocxDocument::from_bytes(&std::fs::read(&output).unwrap()).unwrap();
    let layout = translated.layout();
    assert_eq!(
        texts_of(layout, ContainerKind::Body),
        vec!["[TR] Quarterly results", "[TR] Summary follows."]
    );
    assert_eq!(texts_of(layout, ContainerKind::Table), vec!["[TR] Revenue", "[TR] Costs"]);
    assert_eq!(texts_of(layout, ContainerKind::Header), vec!["[TR] Confidential"]);
    assert_eq!(texts_of(layout, ContainerKind::Footer), vec!["[TR] Page one"]);

    // the bold run keeps its formatting and its share of the text
    assert_eq!(layout.runs.len(), 7);
    assert!(layout.runs[0].style.bold);
    assert!(!layout.runs[1].style.bold);
    assert_eq!(layout.runs[0].text, "[TR] Quarter");
    assert_eq!(layout.runs[1].text, "ly results");

    let report = store.report(&task_id).unwrap();
    assert_eq!(report.status, TaskStatus::Completed);
    assert_eq!(report.progress, 100);
    assert_eq!(report.download_url, format!("/api/download/{}/translated_report.docx", task_id));
}

#[tokio::test]
async fn test_process_job_withOneFailingUnit_shouldCompleteWithSourceText() {
    let dir = common::create_temp_dir().unwrap();
    let store = Arc::new(TaskStore::new());
    let controller = Controller::new(common::mock_client(MockProvider::failing_on("Costs")), store.clone());

    let document = Document::open(&common::sample_docx(), "report.docx").unwrap();
    let (task_id, _) = store.create("u", "report.docx", "en", "zh");
    let output = dir.path().join("out.docx");
    controller
        .process_job(&task_id, document, &TranslationPreferences::default(), &output)
        .await
        .unwrap();

    let translated = DocxDocument::from_bytes(&std::fs::read(&output).unwrap()).unwrap();
    assert_eq!(texts_of(translated.layout(), ContainerKind::Table), vec!["[TR] Revenue", "Costs"]);
    assert_eq!(store.get(&task_id).unwrap().status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_process_job_withTablesExcluded_shouldLeaveCellsUntouched() {
    let dir = common::create_temp_dir().unwrap();
    let store = Arc::new(TaskStore::new());
    let controller = Controller::new(common::mock_client(MockProvider::working()), store.clone())
        .with_walker_config(WalkerConfig { include_tables: false, ..WalkerConfig::default() });

    let document = Document::open(&common::sample_docx(), "report.docx").unwrap();
    let (task_id, _) = store.create("u", "report.docx", "en", "zh");
    let output = dir.path().join("out.docx");
    controller
        .process_job(&task_id, document, &TranslationPreferences::default(), &output)
        .await
        .unwrap();

    let translated = DocxDocument::from_bytes(&std::fs::read(&output).unwrap()).unwrap();
    assert_eq!(texts_of(translated.layout(), ContainerKind::Table), vec!["Revenue", "Costs"]);
}

#[tokio::test]
async fn test_process_job_withPdf_shouldRewriteTextBlocks() {
    let dir = common::create_temp_dir().unwrap();
    let store = Arc::new(TaskStore::new());
    let controller = Controller::new(common::mock_client(MockProvider::working()), store.clone());

    let bytes = common::sample_pdf(&[(700, "Hello world."), (600, "Second paragraph")]);
    let document = Document::open(&bytes, "notes.pdf").unwrap();
    assert_eq!(document.extract(&WalkerConfig::default()).len(), 2);

    let (task_id, _) = store.create("u", "notes.pdf", "en", "fr");
    let output = dir.path().join("out.pdf");
    controller
        .process_job(&task_id, document, &TranslationPreferences::new("en", "fr"), &output)
        .await
        .unwrap();

    let translated = PdfDocument::from_bytes(&std::fs::read(&output).unwrap(), false).unwrap();
    let texts: Vec<&str> = translated.layout().runs.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["[TR] Hello world.", "[TR] Second paragraph"]);
    assert_eq!(store.get(&task_id).unwrap().status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_process_job_withUnwritableOutput_shouldFailTask() {
    let dir = common::create_temp_dir().unwrap();
    let store = Arc::new(TaskStore::new());
    let controller = Controller::new(common::mock_client(MockProvider::working()), store.clone());

    let document = Document::open(&common::sample_docx(), "report.docx").unwrap();
    let (task_id, _) = store.create("u", "report.docx", "en", "zh");

    // the temp directory itself is not a writable file path
    let result = controller
        .process_job(&task_id, document, &TranslationPreferences::default(), dir.path())
        .await;
    assert!(result.is_err());

    let report = store.report(&task_id).unwrap();
    assert_eq!(report.status, TaskStatus::Failed);
    assert!(report.error_message.unwrap().contains("Persistence error"));
    assert!(report.download_url.is_empty());
}
