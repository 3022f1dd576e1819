use std::path::Path;

use reportgrid::{PageOffset, PageTables, TableExtractor, TableRows};

use crate::cli::{OutputFormat, Tolerances};
use crate::page_range::parse_page_numbers;
use crate::shared::{build_settings, open_pdf};

pub fn run(
    file: &Path,
    pages: &str,
    format: &OutputFormat,
    tolerances: &Tolerances,
) -> Result<(), i32> {
    let pdf = open_pdf(file)?;
    let offset = PageOffset::default();
    let counted = offset.counted_pages(pdf.page_count()).len();
    let page_numbers = parse_page_numbers(pages, counted).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;

    let extractor = TableExtractor::new(offset, build_settings(tolerances));
    let result = extractor.extract_tables(&pdf, &page_numbers);
    for warning in &result.warnings {
        eprintln!("Warning: {warning}");
    }

    match format {
        OutputFormat::Text => {
            write_grid(&result.value);
            Ok(())
        }
        OutputFormat::Json => write_json(&result.value),
    }
}

fn write_grid(page_tables: &[PageTables]) {
    for page in page_tables {
        for (i, table) in page.tables.iter().enumerate() {
            println!("--- Table {} (page {}) ---", i + 1, page.page_number);
            print_table(table);
            println!();
        }
    }
}

fn print_table(table: &TableRows) {
    let col_count = table.iter().map(Vec::len).max().unwrap_or(0);
    let text_rows: Vec<Vec<&str>> = table
        .iter()
        .map(|row| {
            let mut texts: Vec<&str> = row.iter().map(|c| c.as_deref().unwrap_or("")).collect();
            texts.resize(col_count, "");
            texts
        })
        .collect();

    let mut col_widths = vec![1usize; col_count];
    for row in &text_rows {
        for (ci, text) in row.iter().enumerate() {
            col_widths[ci] = col_widths[ci].max(text.chars().count());
        }
    }

    for row in &text_rows {
        let cells: Vec<String> = row
            .iter()
            .zip(&col_widths)
            .map(|(text, &width)| format!("{text:<width$}"))
            .collect();
        println!("| {} |", cells.join(" | "));
    }
}

fn write_json(page_tables: &[PageTables]) -> Result<(), i32> {
    let json = serde_json::to_string_pretty(page_tables).map_err(|e| {
        eprintln!("Error: JSON serialization failed: {e}");
        1
    })?;
    println!("{json}");
    Ok(())
}
