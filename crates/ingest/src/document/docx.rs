use std::fs::File;
use std::path::Path;

use docx_rs::{read_docx, Docx, Paragraph, Run};
use serde_json::Value;

use super::{ExtractionError, PageContent, WriteError};

/// Paragraph text joined by newlines. docx-rs exposes the parsed document as
/// JSON; each top-level paragraph becomes one line.
pub fn extract_docx(bytes: &[u8]) -> Result<Vec<PageContent>, ExtractionError> {
    let docx = read_docx(bytes).map_err(|e| ExtractionError::DocxError(e.to_string()))?;
    let json: Value = serde_json::from_str(&docx.json())
        .map_err(|e| ExtractionError::DocxError(format!("JSON parsing error: {e}")))?;

    let mut lines = Vec::new();
    if let Some(children) = json
        .get("document")
        .and_then(|d| d.get("children"))
        .and_then(Value::as_array)
    {
        for child in children {
            if child.get("type").and_then(Value::as_str) != Some("paragraph") {
                continue;
            }
            let mut line = String::new();
            collect_text(child, &mut line);
            lines.push(line);
        }
    }

    let text = lines.join("\n");
    Ok(vec![PageContent {
        page_number: 1,
        text: text.trim().to_string(),
    }])
}

/// Depth-first walk over `data.children`, appending text and tab nodes.
fn collect_text(node: &Value, out: &mut String) {
    match node.get("type").and_then(Value::as_str) {
        Some("text") => {
            if let Some(text) = node.pointer("/data/text").and_then(Value::as_str) {
                out.push_str(text);
            }
            return;
        }
        Some("tab") => {
            out.push('\t');
            return;
        }
        _ => {}
    }
    if let Some(children) = node.pointer("/data/children").and_then(Value::as_array) {
        for child in children {
            collect_text(child, out);
        }
    }
}

/// One paragraph per non-blank input line.
pub fn write_docx(text: &str, path: &Path) -> Result<(), WriteError> {
    let docx = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .fold(Docx::new(), |docx, line| {
            docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)))
        });

    let file = File::create(path)?;
    docx.build()
        .pack(file)
        .map_err(|e| WriteError::DocxError(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_nested_runs_and_tabs() {
        let para = serde_json::json!({
            "type": "paragraph",
            "data": { "children": [
                { "type": "run", "data": { "children": [
                    { "type": "text", "data": { "text": "Net" } },
                    { "type": "tab" },
                    { "type": "text", "data": { "text": "30" } }
                ]}},
                { "type": "run", "data": { "children": [
                    { "type": "text", "data": { "text": " days" } }
                ]}}
            ]}
        });
        let mut line = String::new();
        collect_text(&para, &mut line);
        assert_eq!(line, "Net\t30 days");
    }

    #[test]
    fn unreadable_docx_is_an_error() {
        let err = extract_docx(b"PK not really a zip").unwrap_err();
        assert!(matches!(err, ExtractionError::DocxError(_)));
    }
}
