//! Shared fixture builders for integration tests.
//!
//! PDFs are created programmatically using lopdf: Letter-sized pages with
//! Helvetica as `/F1`.

#![allow(dead_code)]

use lopdf::{Document, Object, ObjectId, Stream, dictionary};

/// Build a PDF with one page per content stream.
pub fn pdf_with_pages(contents: &[Vec<u8>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids: Vec<Object> = Vec::new();
    for content in contents {
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.clone()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => contents.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save test PDF");
    buf
}

/// A page showing `text` once, 12pt, near the top.
pub fn text_page(text: &str) -> Vec<u8> {
    format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET").into_bytes()
}

pub fn blank_page() -> Vec<u8> {
    Vec::new()
}

/// A page with a ruled grid whose top-left corner is at (50, 700) in PDF
/// space, 100pt wide columns and 20pt high rows, each cell holding the
/// given text.
pub fn ruled_table_page(rows: &[&[&str]]) -> Vec<u8> {
    let (left, top, col_w, row_h) = (50.0, 700.0, 100.0, 20.0);
    let cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    let right = left + col_w * cols as f64;
    let bottom = top - row_h * rows.len() as f64;

    let mut ops = String::from("0.5 w\n");
    for r in 0..=rows.len() {
        let y = top - row_h * r as f64;
        ops.push_str(&format!("{left} {y} m {right} {y} l S\n"));
    }
    for c in 0..=cols {
        let x = left + col_w * c as f64;
        ops.push_str(&format!("{x} {top} m {x} {bottom} l S\n"));
    }
    for (r, row) in rows.iter().enumerate() {
        for (c, text) in row.iter().enumerate() {
            let x = left + col_w * c as f64 + 5.0;
            let y = top - row_h * r as f64 - 15.0;
            ops.push_str(&format!("BT /F1 10 Tf {x} {y} Td ({text}) Tj ET\n"));
        }
    }
    ops.into_bytes()
}

/// Four preamble pages followed by `body`.
pub fn report(body: Vec<Vec<u8>>) -> Vec<u8> {
    let mut pages = vec![
        text_page("Annual Report"),
        text_page("Contents"),
        blank_page(),
        blank_page(),
    ];
    pages.extend(body);
    pdf_with_pages(&pages)
}
