mod common;

use common::{init_logger, random_record};
use super_csv::{
    core::cell::CellValue,
    item::csv::{csv_reader::CsvListReaderBuilder, csv_writer::CsvListWriterBuilder},
    prefs::{CsvPreference, EmptyColumnParsing, comment::CommentStartsWith, quote::QuoteMode},
};

const RECORDS: usize = 200;

fn encode(records: &[Vec<Option<String>>], preference: &CsvPreference) -> Vec<u8> {
    let writer = CsvListWriterBuilder::new()
        .preference(preference.clone())
        .from_writer(Vec::new());
    for record in records {
        let values: Vec<CellValue> = record.iter().cloned().map(CellValue::from).collect();
        writer.write(&values).unwrap();
    }
    writer.into_inner().unwrap()
}

fn decode(bytes: &[u8], preference: &CsvPreference) -> Vec<Vec<Option<String>>> {
    let reader = CsvListReaderBuilder::new()
        .preference(preference.clone())
        .from_reader(bytes);
    let mut records = Vec::new();
    while let Some(record) = reader.read().unwrap() {
        records.push(record);
    }
    records
}

fn assert_round_trip(preference: CsvPreference) {
    init_logger();
    let records: Vec<Vec<Option<String>>> = (0..RECORDS).map(|_| random_record()).collect();

    let encoded = encode(&records, &preference);
    let decoded = decode(&encoded, &preference);

    assert_eq!(
        decoded,
        records,
        "round trip failed for {:?} on:\n{}",
        preference,
        String::from_utf8_lossy(&encoded)
    );
}

#[test]
fn standard_preference_should_round_trip() {
    assert_round_trip(CsvPreference::standard());
}

#[test]
fn excel_preference_should_round_trip() {
    assert_round_trip(CsvPreference::excel());
}

#[test]
fn excel_north_europe_preference_should_round_trip() {
    assert_round_trip(CsvPreference::excel_north_europe());
}

#[test]
fn tab_preference_should_round_trip() {
    assert_round_trip(CsvPreference::tab());
}

#[test]
fn surrounding_spaces_policy_should_round_trip() {
    let preference = CsvPreference::excel()
        .to_builder()
        .surrounding_spaces_need_quotes(true)
        .build()
        .unwrap();

    assert_round_trip(preference);
}

#[test]
fn backslash_escaping_should_round_trip() {
    let preference = CsvPreference::excel()
        .to_builder()
        .quote_escape_char('\\')
        .build()
        .unwrap();

    assert_round_trip(preference);
}

#[test]
fn comment_lookalike_rows_should_round_trip() {
    let preference = CsvPreference::standard()
        .to_builder()
        .skip_comments(CommentStartsWith::new("#").unwrap())
        .build()
        .unwrap();

    assert_round_trip(preference);
}

#[test]
fn always_quoting_should_round_trip() {
    let preference = CsvPreference::excel()
        .to_builder()
        .quote_mode(QuoteMode::Always)
        .build()
        .unwrap();

    assert_round_trip(preference);
}

#[test]
fn empty_strings_should_round_trip_when_read_as_empty() {
    let preference = CsvPreference::excel()
        .to_builder()
        .empty_column_parsing(EmptyColumnParsing::AsEmptyString)
        .build()
        .unwrap();
    let records = vec![
        vec![Some(String::new()), None, Some("x".to_string())],
        vec![None, Some(String::new())],
    ];

    let encoded = encode(&records, &preference);

    assert_eq!(String::from_utf8(encoded.clone()).unwrap(), "\"\",,x\n,\"\"\n");
    assert_eq!(decode(&encoded, &preference), records);
}

#[test]
fn encoder_output_should_parse_identically_with_csv_crate() {
    let preference = CsvPreference::standard();
    let records: Vec<Vec<Option<String>>> = (0..RECORDS).map(|_| random_record()).collect();

    let encoded = encode(&records, &preference);
    let mut oracle = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(encoded.as_slice());
    let parsed: Vec<Vec<String>> = oracle
        .records()
        .map(|record| record.unwrap().iter().map(str::to_string).collect())
        .collect();

    let expected: Vec<Vec<String>> = records
        .iter()
        .map(|record| record.iter().map(|cell| cell.clone().unwrap_or_default()).collect())
        .collect();
    assert_eq!(parsed, expected);
}
