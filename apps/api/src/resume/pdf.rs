//! Renders the rewritten resume as a downloadable PDF.
//!
//! A4 page, Helvetica 12pt, a centred title on the first page, and plain text
//! wrapped to the body width and paginated. Geometry is kept in millimetres and
//! converted to PDF points when drawing.

use anyhow::anyhow;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::errors::AppError;

pub const IMPROVED_RESUME_TITLE: &str = "AI Improved Resume Suggestion";
pub const IMPROVED_RESUME_FILENAME: &str = "Improved_Resume.pdf";

const PT_PER_MM: f32 = 72.0 / 25.4;
const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const FONT_SIZE_PT: f32 = 12.0;
const TITLE_Y_MM: f32 = 10.0;
const BODY_X_MM: f32 = 15.0;
const BODY_TOP_MM: f32 = 20.0;
const BODY_BOTTOM_MM: f32 = 280.0;
const BODY_WIDTH_MM: f32 = 180.0;
const LINE_HEIGHT_MM: f32 = 7.0;

// ────────────────────────────────────────────────────────────────────────────
// Helvetica metrics
// ────────────────────────────────────────────────────────────────────────────

/// Helvetica advance widths in 1/1000 em for ASCII 0x20..=0x7E.
/// Index = (char as usize) - 32.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,      // 'p'..'~'
];
const DEFAULT_WIDTH: u16 = 556;

fn char_width_mm(c: char) -> f32 {
    let units = match c as u32 {
        code @ 0x20..=0x7E => HELVETICA_WIDTHS[(code - 0x20) as usize],
        0x2022 => 350,
        _ => DEFAULT_WIDTH,
    };
    units as f32 / 1000.0 * FONT_SIZE_PT / PT_PER_MM
}

fn text_width_mm(text: &str) -> f32 {
    text.chars().map(char_width_mm).sum()
}

/// WinAnsi bytes for a line. Characters outside the encoding become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
            0x2013 => 0x96,
            0x2014 => 0x97,
            0x2018 => 0x91,
            0x2019 => 0x92,
            0x201C => 0x93,
            0x201D => 0x94,
            0x2022 => 0x95,
            0x2026 => 0x85,
            _ => b'?',
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Layout
// ────────────────────────────────────────────────────────────────────────────

/// Greedy word wrap to `max_width_mm`. Source line breaks are kept, blank
/// lines included; words wider than a line are split by character.
pub fn wrap_text(text: &str, max_width_mm: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.replace('\r', "").replace('\t', "    ").split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if text_width_mm(&candidate) <= max_width_mm {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            for c in word.chars() {
                let overflows = text_width_mm(&current) + char_width_mm(c) > max_width_mm;
                if !current.is_empty() && overflows {
                    lines.push(std::mem::take(&mut current));
                }
                current.push(c);
            }
        }
        lines.push(current);
    }

    lines
}

/// Splits lines into pages. A line starts a new page once the next baseline
/// would fall below the body bottom.
pub fn paginate(lines: Vec<String>) -> Vec<Vec<String>> {
    let mut pages = vec![Vec::new()];
    let mut y = BODY_TOP_MM;

    for line in lines {
        if y > BODY_BOTTOM_MM {
            pages.push(Vec::new());
            y = BODY_TOP_MM;
        }
        if let Some(page) = pages.last_mut() {
            page.push(line);
        }
        y += LINE_HEIGHT_MM;
    }

    pages
}

fn pt(mm: f32) -> Object {
    Object::Integer((mm * PT_PER_MM).round() as i64)
}

/// Text drawn with its baseline `top_mm` below the top edge.
fn text_at(ops: &mut Vec<Operation>, text: &str, x_mm: f32, top_mm: f32) {
    ops.push(Operation::new(
        "Tm",
        vec![
            Object::Integer(1),
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(1),
            pt(x_mm),
            pt(PAGE_HEIGHT_MM - top_mm),
        ],
    ));
    ops.push(Operation::new("Tj", vec![Object::string_literal(win_ansi(text))]));
}

fn page_content(lines: &[String], with_title: bool) -> Content {
    let mut ops = vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec!["F1".into(), Object::Integer(FONT_SIZE_PT as i64)],
        ),
    ];

    if with_title {
        let x = (PAGE_WIDTH_MM - text_width_mm(IMPROVED_RESUME_TITLE)) / 2.0;
        text_at(&mut ops, IMPROVED_RESUME_TITLE, x, TITLE_Y_MM);
    }

    let mut y = BODY_TOP_MM;
    for line in lines {
        if !line.is_empty() {
            text_at(&mut ops, line, BODY_X_MM, y);
        }
        y += LINE_HEIGHT_MM;
    }

    ops.push(Operation::new("ET", vec![]));
    Content { operations: ops }
}

fn pdf_error(e: impl std::fmt::Display) -> AppError {
    AppError::Internal(anyhow!("Failed to render PDF: {e}"))
}

/// Builds the "Improved Resume" PDF from the rewritten resume text.
pub fn render_improved_resume(text: &str) -> Result<Vec<u8>, AppError> {
    let pages = paginate(wrap_text(text, BODY_WIDTH_MM));

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for (index, lines) in pages.iter().enumerate() {
        let content = page_content(lines, index == 0).encode().map_err(pdf_error)?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                pt(PAGE_WIDTH_MM),
                pt(PAGE_HEIGHT_MM),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).map_err(pdf_error)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_text(doc: &Document, page_number: u32) -> String {
        let page_id = doc.get_pages()[&page_number];
        String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
    }

    #[test]
    fn test_wrap_keeps_breaks_and_fits_width() {
        let long = "Led the migration of a large React codebase to TypeScript ".repeat(6);
        let text = format!("Jane Doe\n\n{long}");
        let lines = wrap_text(&text, BODY_WIDTH_MM);

        assert_eq!(lines[0], "Jane Doe");
        assert_eq!(lines[1], "");
        assert!(lines.len() > 3);
        assert!(lines.iter().all(|l| text_width_mm(l) <= BODY_WIDTH_MM));
        assert_eq!(lines[2..].join(" "), long.trim());
    }

    #[test]
    fn test_wrap_splits_overlong_words() {
        let word = "x".repeat(400);
        let lines = wrap_text(&word, BODY_WIDTH_MM);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn test_paginate_fits_38_lines_per_page() {
        let lines: Vec<String> = (0..80).map(|i| format!("line {i}")).collect();
        let pages = paginate(lines);
        let sizes: Vec<usize> = pages.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![38, 38, 4]);
        assert_eq!(pages[1][0], "line 38");
    }

    #[test]
    fn test_win_ansi_maps_typography_and_replaces_the_rest() {
        assert_eq!(win_ansi("a\u{2022}b\u{2014}é"), vec![b'a', 0x95, b'b', 0x97, 0xE9]);
        assert_eq!(win_ansi("日本"), b"??".to_vec());
    }

    #[test]
    fn test_render_produces_paginated_pdf_with_title() {
        let text = (0..50)
            .map(|i| format!("- Achievement number {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let bytes = render_improved_resume(&text).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
        let first = page_text(&doc, 1);
        assert!(first.contains("(AI Improved Resume Suggestion) Tj"));
        assert!(first.contains("(- Achievement number 0) Tj"));
        let second = page_text(&doc, 2);
        assert!(!second.contains("AI Improved Resume Suggestion"));
        assert!(second.contains("(- Achievement number 49) Tj"));
    }
}
