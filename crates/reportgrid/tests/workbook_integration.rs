//! Filter and merge over workbook blobs and files.

use reportgrid::xlsx::{read_workbook, write_workbook};
use reportgrid::{
    CellValue, MERGED_SHEET_NAME, NamedBlob, ReportError, Sheet, Workbook, XLSX_MIME,
    combine_and_deduplicate, filter_sheets, run_filter, run_merge,
};

fn row(cells: &[&str]) -> Vec<CellValue> {
    cells.iter().map(|&c| CellValue::from(c)).collect()
}

fn xlsx(sheets: Vec<(&str, Vec<Vec<CellValue>>)>) -> Vec<u8> {
    let mut wb = Workbook::new();
    for (name, rows) in sheets {
        wb.add_sheet(Sheet::with_rows(name, rows)).unwrap();
    }
    write_workbook(&wb).unwrap().into_inner()
}

fn extracted_report() -> Vec<u8> {
    xlsx(vec![
        ("Page_3_Table_1", vec![row(&["從業員工", "2020"]), row(&["人數", "1200"])]),
        ("Page_3_Table_2", vec![row(&["營收", "2020"])]),
        ("Page_9_Table_1", vec![row(&["員工人數", "800"])]),
    ])
}

#[test]
fn run_filter_keeps_matching_sheets_per_workbook() {
    let blobs = vec![
        NamedBlob::new("tsmc.xlsx", extracted_report()),
        NamedBlob::new("uploads/mxic.xlsx", extracted_report()),
    ];
    let deliveries = run_filter(&blobs, "從業員工,員工人數").unwrap();
    assert_eq!(deliveries.len(), 2);
    assert_eq!(deliveries[0].filename, "tsmc_filtered.xlsx");
    assert_eq!(deliveries[1].filename, "mxic_filtered.xlsx");
    assert_eq!(deliveries[0].mime, XLSX_MIME);

    let wb = read_workbook(&deliveries[0].bytes).unwrap();
    assert_eq!(wb.sheet_names(), vec!["Page_3_Table_1", "Page_9_Table_1"]);
}

#[test]
fn keywords_are_not_trimmed() {
    let blobs = vec![NamedBlob::new("a.xlsx", extracted_report())];
    let deliveries = run_filter(&blobs, "營收, 從業員工").unwrap();
    let wb = read_workbook(&deliveries[0].bytes).unwrap();
    assert_eq!(wb.sheet_names(), vec!["Page_3_Table_2"]);
}

#[test]
fn zero_matches_give_an_empty_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.xlsx");
    std::fs::write(&path, extracted_report()).unwrap();
    let out = filter_sheets(&path, &["no such text"]).unwrap();
    assert!(read_workbook(&std::fs::read(out).unwrap()).unwrap().is_empty());
}

#[test]
fn merge_scenario_drops_denylist_and_duplicates() {
    let first = xlsx(vec![(
        "Sheet1",
        vec![
            row(&["Name", "Value"]),
            row(&["A", "1"]),
            row(&["A", "1"]),
            row(&["B", "截至 2020"]),
        ],
    )]);
    let second = xlsx(vec![(
        "Sheet1",
        vec![row(&["Name", "Value"]), row(&["A", "1"]), row(&["C", "2"])],
    )]);
    let delivery = run_merge(
        &[NamedBlob::new("a.xlsx", first), NamedBlob::new("b.xlsx", second)],
        "combined.xlsx",
    )
    .unwrap();
    assert_eq!(delivery.filename, "combined.xlsx");

    let wb = read_workbook(&delivery.bytes).unwrap();
    let sheet = wb.sheet(MERGED_SHEET_NAME).unwrap();
    assert_eq!(&sheet.rows[1..], &[row(&["A", "1"]), row(&["C", "2"])]);
}

#[test]
fn merged_output_has_no_markers_or_repeats() {
    let first = xlsx(vec![
        (
            "Page_1_Table_1",
            vec![
                row(&["", "2020", "2021"]),
                row(&["男", "10", "12"]),
                row(&["女", "8", "9"]),
                row(&["月底人數", "18", "21"]),
            ],
        ),
        ("Page_2_Table_1", vec![row(&["", "2020", "2021"]), row(&["男", "10", "12"])]),
    ]);
    let cursor = combine_and_deduplicate(&[first.clone(), first.clone()]).unwrap();
    let wb = read_workbook(cursor.get_ref()).unwrap();
    let sheet = wb.sheet(MERGED_SHEET_NAME).unwrap();

    assert_eq!(sheet.rows[0], vec![CellValue::Empty, "2020".into(), "2021".into()]);
    let data = &sheet.rows[1..];
    assert_eq!(data.len(), 2);
    for (i, a) in data.iter().enumerate() {
        assert!(a.iter().all(|c| {
            let s = c.to_string();
            !s.contains("截至") && !s.contains("月底")
        }));
        assert!(data[i + 1..].iter().all(|b| a != b));
    }
}

#[test]
fn merge_is_all_or_nothing() {
    let err = run_merge(
        &[
            NamedBlob::new("a.xlsx", extracted_report()),
            NamedBlob::new("b.xlsx", b"broken".to_vec()),
        ],
        "out.xlsx",
    )
    .unwrap_err();
    assert!(matches!(err, ReportError::Document(_)));
}
