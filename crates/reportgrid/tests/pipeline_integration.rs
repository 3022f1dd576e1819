//! End-to-end tests: PDF bytes → keyword pages → tables → workbook.

mod common;

use common::{blank_page, pdf_with_pages, report, ruled_table_page, text_page};
use reportgrid::xlsx::read_workbook;
use reportgrid::{
    CellValue, CollectingNotifier, ExtractionJob, NamedBlob, PageOffset, PageTextScanner, Pdf,
    ReportError, build_workbook, extract_tables, find_keyword_pages,
};

#[test]
fn keyword_on_first_counted_page() {
    let bytes = pdf_with_pages(&[
        blank_page(),
        blank_page(),
        blank_page(),
        blank_page(),
        text_page("Revenue"),
        text_page("Costs"),
    ]);
    let pdf = Pdf::open(&bytes, None).unwrap();
    assert_eq!(pdf.page_count(), 6);

    let result = find_keyword_pages(&pdf, "Revenue");
    assert_eq!(result.value, vec![1]);
    assert!(result.is_clean());
}

#[test]
fn matching_ignores_case() {
    let pdf = Pdf::open(&report(vec![text_page("Costs"), text_page("TOTAL REVENUE")]), None).unwrap();
    assert_eq!(find_keyword_pages(&pdf, "revenue").value, vec![2]);
}

#[test]
fn preamble_pages_are_never_scanned() {
    let bytes = pdf_with_pages(&[
        text_page("Revenue"),
        text_page("Revenue"),
        text_page("Revenue"),
        text_page("Revenue"),
    ]);
    let pdf = Pdf::open(&bytes, None).unwrap();
    assert!(find_keyword_pages(&pdf, "Revenue").value.is_empty());
}

#[test]
fn empty_keyword_finds_nothing() {
    let pdf = Pdf::open(&report(vec![text_page("Revenue")]), None).unwrap();
    assert!(find_keyword_pages(&pdf, "").value.is_empty());
}

#[test]
fn page_numbers_stay_within_counted_range() {
    let body: Vec<Vec<u8>> = (0..5).map(|_| text_page("Staff")).collect();
    let pdf = Pdf::open(&report(body), None).unwrap();
    let pages = find_keyword_pages(&pdf, "staff").value;
    assert_eq!(pages, vec![1, 2, 3, 4, 5]);
    let max = (pdf.page_count() - 4) as u32;
    assert!(pages.iter().all(|&p| (1..=max).contains(&p)));
}

#[test]
fn custom_offset_shifts_numbering() {
    let pdf = Pdf::open(&report(vec![text_page("Revenue")]), None).unwrap();
    let scanner = PageTextScanner::new(PageOffset::new(0));
    assert_eq!(scanner.find_keyword_pages(&pdf, "Revenue").value, vec![5]);
}

#[test]
fn garbage_is_a_document_error() {
    let err = Pdf::open(b"this is not a pdf", None).unwrap_err();
    assert!(matches!(err, ReportError::Document(_)));
}

#[test]
fn tables_on_adjusted_pages() {
    let bytes = report(vec![
        text_page("Introduction"),
        ruled_table_page(&[&["Year", "Staff"], &["2020", "15"], &["2021", "18"]]),
    ]);
    let pdf = Pdf::open(&bytes, None).unwrap();

    let pages = find_keyword_pages(&pdf, "staff").value;
    assert_eq!(pages, vec![2]);

    let result = extract_tables(&pdf, &pages);
    assert!(result.is_clean());
    assert_eq!(result.value.len(), 1);
    assert_eq!(result.value[0].page_number, 2);
    assert_eq!(
        result.value[0].tables,
        vec![vec![
            vec![Some("Year".to_string()), Some("Staff".to_string())],
            vec![Some("2020".to_string()), Some("15".to_string())],
            vec![Some("2021".to_string()), Some("18".to_string())],
        ]]
    );
}

#[test]
fn pages_without_tables_are_omitted() {
    let pdf = Pdf::open(&report(vec![text_page("Staff")]), None).unwrap();
    let result = extract_tables(&pdf, &[1]);
    assert!(result.value.is_empty());
    assert!(result.is_clean());
}

#[test]
fn out_of_range_page_is_warned_and_skipped() {
    let pdf = Pdf::open(&report(vec![text_page("Staff")]), None).unwrap();
    let result = extract_tables(&pdf, &[9]);
    assert!(result.value.is_empty());
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].page, Some(12));
}

#[test]
fn workbook_holds_transposed_tables() {
    let bytes = report(vec![ruled_table_page(&[
        &["Year", "Staff"],
        &["2020", "15"],
        &["2021", "18"],
    ])]);
    let pdf = Pdf::open(&bytes, None).unwrap();
    let tables = extract_tables(&pdf, &[1]).value;

    let mut notifier = CollectingNotifier::default();
    let cursor = build_workbook(&tables, &mut notifier).unwrap();
    assert_eq!(notifier.messages.len(), 1);

    let wb = read_workbook(cursor.get_ref()).unwrap();
    assert_eq!(wb.sheet_names(), vec!["Page_1_Table_1"]);
    let sheet = wb.sheet("Page_1_Table_1").unwrap();
    assert_eq!(
        sheet.rows,
        vec![
            vec![CellValue::from("Year"), "2020".into(), "2021".into()],
            vec![CellValue::from("Staff"), "15".into(), "18".into()],
        ]
    );
}

#[test]
fn job_combines_documents_and_skips_broken_ones() {
    let first = report(vec![ruled_table_page(&[&["Staff", "10"]])]);
    let second = report(vec![
        text_page("Nothing here"),
        ruled_table_page(&[&["Staff", "20"]]),
    ]);
    let blobs = vec![
        NamedBlob::new("first.pdf", first),
        NamedBlob::new("broken.pdf", b"garbage bytes".to_vec()),
        NamedBlob::new("second.pdf", second),
    ];

    let mut notifier = CollectingNotifier::default();
    let result = ExtractionJob::default()
        .run(&blobs, "Staff", "extracted_tables.xlsx", &mut notifier)
        .unwrap();
    assert_eq!(result.value.filename, "extracted_tables.xlsx");
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].document.as_deref(), Some("broken.pdf"));

    let wb = read_workbook(&result.value.bytes).unwrap();
    assert_eq!(wb.sheet_names(), vec!["Page_1_Table_1", "Page_2_Table_1"]);
    assert!(notifier.messages.iter().any(|m| m.contains("[1]")));
    assert!(notifier.messages.iter().any(|m| m.contains("[2]")));
}

#[test]
fn same_page_in_two_documents_shares_one_sheet() {
    let a = report(vec![ruled_table_page(&[&["Staff", "10"], &["Total", "12"]])]);
    let b = report(vec![ruled_table_page(&[&["Staff", "20"]])]);
    let blobs = vec![NamedBlob::new("a.pdf", a), NamedBlob::new("b.pdf", b)];

    let mut notifier = CollectingNotifier::default();
    let result = ExtractionJob::default()
        .run(&blobs, "Staff", "out.xlsx", &mut notifier)
        .unwrap();
    assert!(result.is_clean());

    let wb = read_workbook(&result.value.bytes).unwrap();
    assert_eq!(wb.sheet_names(), vec!["Page_1_Table_1"]);
    assert_eq!(
        wb.sheet("Page_1_Table_1").unwrap().rows,
        vec![
            vec![CellValue::from("Staff"), "Total".into()],
            vec![CellValue::from("20"), "12".into()],
        ]
    );
    let written = notifier
        .messages
        .iter()
        .filter(|m| m.contains("wrote sheet Page_1_Table_1"))
        .count();
    assert_eq!(written, 2);
}
