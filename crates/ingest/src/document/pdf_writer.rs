//! Plain-text to PDF rendering: Courier 11pt on US-Letter with 1-inch
//! margins, word-wrapped lines, and a half-line gap between paragraphs.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use super::WriteError;

pub const PAGE_WIDTH: i64 = 612;
pub const PAGE_HEIGHT: i64 = 792;
pub const MARGIN: i64 = 72;
pub const FONT_SIZE: i64 = 11;
pub const LINE_HEIGHT: i64 = 14;
pub const PARAGRAPH_GAP: i64 = LINE_HEIGHT / 2;
/// Courier glyphs are 0.6 em wide: 6.6pt at 11pt, so 70 fit in 468pt.
pub const MAX_LINE_CHARS: usize = 70;

/// A line of text at a baseline `y` (points from the bottom edge).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedLine {
    pub y: i64,
    pub text: String,
}

/// Wrap a paragraph's words into lines of at most `MAX_LINE_CHARS`
/// characters. Words longer than a line are hard-split.
fn wrap_paragraph(paragraph: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in paragraph.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for piece in chars.chunks(MAX_LINE_CHARS) {
            let piece_len = piece.len();
            let needed = if current_len == 0 { piece_len } else { current_len + 1 + piece_len };
            if needed > MAX_LINE_CHARS && current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(piece);
            current_len += piece_len;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Lay out `text` into pages of placed lines. Paragraphs are separated by
/// blank lines in the input.
pub fn layout_pages(text: &str) -> Vec<Vec<PlacedLine>> {
    let top = PAGE_HEIGHT - MARGIN;
    let mut pages = Vec::new();
    let mut page = Vec::new();
    let mut y = top;

    for paragraph in text.split("\n\n") {
        for line in wrap_paragraph(paragraph) {
            if y < MARGIN {
                pages.push(std::mem::take(&mut page));
                y = top;
            }
            page.push(PlacedLine { y, text: line });
            y -= LINE_HEIGHT;
        }
        y -= PARAGRAPH_GAP;
    }
    if !page.is_empty() || pages.is_empty() {
        pages.push(page);
    }
    pages
}

/// Encode for the WinAnsi font encoding. Typographic quotes and dashes are
/// mapped; anything else outside Latin-1 becomes `?`.
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2026}' => 0x85,
            '\u{20AC}' => 0x80,
            '\t' => b' ',
            c if (c as u32) < 0x80 && !c.is_control() => c as u8,
            c if (0xA0..=0xFF).contains(&(c as u32)) => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

fn page_content(lines: &[PlacedLine]) -> Content {
    let mut operations = Vec::with_capacity(lines.len() * 5);
    for line in lines {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![Object::Name(b"F1".to_vec()), Object::Integer(FONT_SIZE)],
        ));
        operations.push(Operation::new(
            "Td",
            vec![Object::Integer(MARGIN), Object::Integer(line.y)],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(to_win_ansi(&line.text))],
        ));
        operations.push(Operation::new("ET", vec![]));
    }
    Content { operations }
}

/// Render `text` and save it as a PDF at `path`.
pub fn write_pdf(text: &str, path: &Path) -> Result<(), WriteError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids = Vec::new();
    for lines in layout_pages(text) {
        let encoded = page_content(&lines)
            .encode()
            .map_err(|e| WriteError::PdfError(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    doc.save(path).map_err(|e| WriteError::PdfError(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_at_line_width() {
        let paragraph = vec!["word"; 30].join(" ");
        let lines = wrap_paragraph(&paragraph);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= MAX_LINE_CHARS));
        assert_eq!(lines.join(" "), paragraph);
    }

    #[test]
    fn hard_splits_overlong_words() {
        let word = "x".repeat(MAX_LINE_CHARS * 2 + 5);
        let lines = wrap_paragraph(&format!("a {word}"));
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "a");
        assert_eq!(lines[3].len(), 5);
    }

    #[test]
    fn paragraphs_are_separated_by_gap() {
        let pages = layout_pages("First.\n\nSecond.");
        assert_eq!(pages.len(), 1);
        let top = PAGE_HEIGHT - MARGIN;
        assert_eq!(pages[0][0], PlacedLine { y: top, text: "First.".into() });
        assert_eq!(pages[0][1].y, top - LINE_HEIGHT - PARAGRAPH_GAP);
    }

    #[test]
    fn breaks_pages_below_bottom_margin() {
        let text = vec!["line"; 100].join("\n\n");
        let pages = layout_pages(&text);
        assert!(pages.len() > 1);
        for page in &pages {
            assert!(page.iter().all(|l| l.y >= MARGIN && l.y <= PAGE_HEIGHT - MARGIN));
        }
        assert_eq!(pages.iter().map(Vec::len).sum::<usize>(), 100);
    }

    #[test]
    fn encodes_typographic_punctuation() {
        assert_eq!(to_win_ansi("\u{201C}Fee\u{201D} \u{2013} \u{00E9}"), vec![0x93, b'F', b'e', b'e', 0x94, b' ', 0x96, b' ', 0xE9]);
        assert_eq!(to_win_ansi("\u{4E2D}"), vec![b'?']);
    }
}
