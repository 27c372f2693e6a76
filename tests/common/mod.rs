/*!
 * Common test utilities for the doctran test suite
 */

#![allow(dead_code)]

use anyhow::Result;
use lopdf::content::{Content, Operation};
use lopdf::{Object, Stream, dictionary};
use std::io::{Cursor, Write};
use std::sync::Arc;
use tempfile::TempDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use doctran::providers::mock::MockProvider;
use doctran::translation::{RateGateConfig, RetryPolicy, TranslationClient, TranslationOptions};

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Route `log` output through the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Options that keep tests fast: no pacing and immediate retries
pub fn fast_options() -> TranslationOptions {
    TranslationOptions {
        temperature: 0.3,
        gate: RateGateConfig {
            max_concurrent: 4,
            min_interval: std::time::Duration::ZERO,
        },
        retry: RetryPolicy {
            max_attempts: 2,
            base_delay: std::time::Duration::from_millis(1),
            max_delay: std::time::Duration::from_millis(2),
            jitter: false,
        },
        chunk_size: 3,
    }
}

/// A client over the given mock
pub fn mock_client(provider: MockProvider) -> TranslationClient {
    TranslationClient::new(Arc::new(provider), fast_options())
}

/// Build a WordprocessingML package from raw part contents
pub fn docx_package(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    writer.start_file("[Content_Types].xml", options).unwrap();
    writer.write_all(b"<?xml version=\"1.0\"?><Types/>").unwrap();
    for (name, content) in parts {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Paragraph markup from (text, bold) runs
pub fn w_paragraph(runs: &[(&str, bool)]) -> String {
    let mut xml = String::from("<w:p>");
    for (text, bold) in runs {
        xml.push_str("<w:r>");
        if *bold {
            xml.push_str("<w:rPr><w:b/></w:rPr>");
        }
        xml.push_str(&format!("<w:t xml:space=\"preserve\">{}</w:t></w:r>", text));
    }
    xml.push_str("</w:p>");
    xml
}

/// A report with a styled body paragraph, a 2x1 table, one header and one footer
pub fn sample_docx() -> Vec<u8> {
    let body = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{ns}"><w:body>{p1}<w:tbl><w:tr><w:tc>{c1}</w:tc><w:tc>{c2}</w:tc></w:tr></w:tbl>{p2}</w:body></w:document>"#,
        ns = W_NS,
        p1 = w_paragraph(&[("Quarterly ", true), ("results", false)]),
        c1 = w_paragraph(&[("Revenue", false)]),
        c2 = w_paragraph(&[("Costs", false)]),
        p2 = w_paragraph(&[("Summary follows.", false)]),
    );
    let header = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:hdr xmlns:w="{}">{}</w:hdr>"#,
        W_NS,
        w_paragraph(&[("Confidential", false)])
    );
    let footer = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:ftr xmlns:w="{}">{}</w:ftr>"#,
        W_NS,
        w_paragraph(&[("Page one", false)])
    );

    docx_package(&[
        ("word/document.xml", &body),
        ("word/header1.xml", &header),
        ("word/footer1.xml", &footer),
    ])
}

/// One-page PDF with a text block per entry, top to bottom
pub fn sample_pdf(lines: &[(i64, &str)]) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = Vec::new();
    for (y, text) in lines {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
        operations.push(Operation::new("Td", vec![72.into(), Object::Integer(*y)]));
        operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
        operations.push(Operation::new("ET", vec![]));
    }
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}
