mod common;

use biblio_assistant::{
    biblio::{parse_prediction, ReferenceRow},
    workbook::{
        writer::column_letters, Cell, SheetTable, Workbook, WorkbookError, PREDICTIONS_SHEET,
    },
};
use common::{references, workbook, HONG_KONG_REPLY};

#[test]
fn reads_title_and_abstract_by_header() {
    let bytes = workbook(&[(
        "Refs",
        vec![
            vec!["Year", "Abstract", "Title"],
            vec!["2019", "First abstract", "First title"],
            vec!["2020", "Second abstract", "Second title"],
        ],
    )]);
    let rows = Workbook::from_bytes(bytes).read_references().unwrap();
    assert_eq!(
        rows,
        vec![
            ReferenceRow::new("First title", "First abstract"),
            ReferenceRow::new("Second title", "Second abstract"),
        ]
    );
}

#[test]
fn blank_rows_are_skipped() {
    let bytes = references(&[("A", "a"), ("", ""), ("B", "b")]);
    let rows = Workbook::from_bytes(bytes).read_references().unwrap();
    let titles: Vec<_> = rows.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B"]);
}

#[test]
fn numbered_references_keep_sheet_rows() {
    let bytes = references(&[("A", "a"), ("", ""), ("B", "b")]);
    let rows = Workbook::from_bytes(bytes).read_numbered_references().unwrap();
    let numbers: Vec<_> = rows.iter().map(|(row, _)| *row).collect();
    assert_eq!(numbers, vec![2, 4]);
    assert_eq!(rows[1].1.title, "B");
}

#[test]
fn missing_abstract_column_is_reported() {
    let bytes = workbook(&[("Sheet1", vec![vec!["Title"], vec!["Only a title"]])]);
    let err = Workbook::from_bytes(bytes).read_references().unwrap_err();
    assert!(matches!(err, WorkbookError::MissingColumn(ref c) if c == "Abstract"));
}

#[test]
fn garbage_bytes_fail_to_open() {
    let err = Workbook::from_bytes(b"not a zip".to_vec())
        .read_references()
        .unwrap_err();
    assert!(matches!(err, WorkbookError::Open(_)));
}

#[test]
fn appended_sheet_keeps_existing_sheets() {
    let bytes = workbook(&[
        ("Sheet1", vec![vec!["Title", "Abstract"], vec!["T", "A"]]),
        ("Notes", vec![vec!["kept & untouched"]]),
    ]);
    let mut book = Workbook::from_bytes(bytes);
    let table = SheetTable::from_predictions(&[parse_prediction(HONG_KONG_REPLY).unwrap()]);
    book.append_sheet(PREDICTIONS_SHEET, &table).unwrap();

    assert_eq!(
        book.sheet_names().unwrap(),
        vec!["Sheet1", "Notes", PREDICTIONS_SHEET]
    );
    assert_eq!(
        book.sheet_rows("Notes").unwrap(),
        vec![vec!["kept & untouched".to_string()]]
    );
    assert_eq!(
        book.read_references().unwrap(),
        vec![ReferenceRow::new("T", "A")]
    );

    let rows = book.sheet_rows(PREDICTIONS_SHEET).unwrap();
    assert_eq!(
        rows[0],
        vec![
            "Objeto de Análise",
            "Metodologia",
            "Escala de Análise",
            "País",
            "Política/prática",
            "Classificação",
        ]
    );
    assert_eq!(
        rows[1],
        vec![
            "Prática educacional",
            "Entrevistas",
            "Local",
            "Hong Kong",
            "Prática",
            "4"
        ]
    );
}

#[test]
fn duplicate_sheet_name_is_rejected() {
    let mut book = Workbook::from_bytes(references(&[("T", "A")]));
    let table = SheetTable {
        headers: vec!["x".into()],
        rows: vec![vec![Cell::Number(1.0)]],
    };
    book.append_sheet("Extra", &table).unwrap();
    let err = book.append_sheet("Extra", &table).unwrap_err();
    assert!(matches!(err, WorkbookError::SheetExists(ref name) if name == "Extra"));
}

#[test]
fn sheet_names_clash_ignoring_case() {
    let bytes = workbook(&[
        ("Sheet1", vec![vec!["Title", "Abstract"], vec!["T", "A"]]),
        ("predictions", vec![vec!["old"]]),
    ]);
    let mut book = Workbook::from_bytes(bytes);
    assert!(book.has_sheet(PREDICTIONS_SHEET).unwrap());

    let table = SheetTable::from_predictions(&[parse_prediction(HONG_KONG_REPLY).unwrap()]);
    let err = book.append_sheet(PREDICTIONS_SHEET, &table).unwrap_err();
    assert!(matches!(err, WorkbookError::SheetExists(_)));
    assert_eq!(book.sheet_names().unwrap(), vec!["Sheet1", "predictions"]);
}

#[test]
fn control_characters_are_dropped_from_text_cells() {
    let mut book = Workbook::from_bytes(references(&[("T", "A")]));
    let table = SheetTable {
        headers: vec!["País".into()],
        rows: vec![vec![Cell::Text("Hong\u{1}Kong\u{FFFF}".into())]],
    };
    book.append_sheet("Cleaned", &table).unwrap();
    let rows = book.sheet_rows("Cleaned").unwrap();
    assert_eq!(rows[1][0], "HongKong");
}

#[test]
fn text_cells_are_escaped() {
    let mut book = Workbook::from_bytes(references(&[("T", "A")]));
    let table = SheetTable {
        headers: vec!["a<b".into(), "c".into()],
        rows: vec![vec![Cell::Text("\"quoted\" & <tagged>".into()), Cell::Empty]],
    };
    book.append_sheet("Escaped", &table).unwrap();
    let rows = book.sheet_rows("Escaped").unwrap();
    assert_eq!(rows[0], vec!["a<b", "c"]);
    assert_eq!(rows[1][0], "\"quoted\" & <tagged>");
}

#[test]
fn column_letters_follow_spreadsheet_order() {
    assert_eq!(column_letters(0), "A");
    assert_eq!(column_letters(5), "F");
    assert_eq!(column_letters(25), "Z");
    assert_eq!(column_letters(26), "AA");
    assert_eq!(column_letters(701), "ZZ");
    assert_eq!(column_letters(702), "AAA");
}
