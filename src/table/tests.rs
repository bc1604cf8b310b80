//! Table-level scenarios: ingestion, lookup, summaries and export

use super::episodes::unique_column_names;
use super::*;
use crate::text::{QueryList, RawField};

fn cols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn row(cells: &[&str]) -> Vec<RawField> {
    cells.iter().map(|c| RawField::from_cell(c)).collect()
}

fn three_episodes() -> EpisodeTable {
    let raw = RawTable::new(cols(&["Title", "Description", "Important Words"]))
        .with_row(row(&["Ep 1", "Cats", "cats, kittens"]))
        .with_row(row(&["Ep 2", "Dogs", "dogs"]))
        .with_row(row(&["Ep 3", "Birds", ""]));
    EpisodeTable::from_raw(raw).unwrap()
}

// === Scenario: ingestion validates required columns ===

#[test]
fn missing_description_is_rejected() {
    let raw = RawTable::new(cols(&["Title", "Notes"])).with_row(row(&["Ep 1", "x"]));
    let err = EpisodeTable::from_raw(raw).unwrap_err();
    assert_eq!(err, SchemaError::MissingColumns(vec!["Description".to_string()]));
    assert!(err.to_string().starts_with("CSV must contain columns: Title, Description"));
}

#[test]
fn missing_both_required_columns_lists_both() {
    let err = EpisodeTable::from_raw(RawTable::new(cols(&["Name"]))).unwrap_err();
    assert_eq!(
        err,
        SchemaError::MissingColumns(vec!["Title".to_string(), "Description".to_string()])
    );
}

#[test]
fn duplicate_titles_are_rejected() {
    let raw = RawTable::new(cols(&["Title", "Description"]))
        .with_row(row(&["Ep 1", "a"]))
        .with_row(row(&["Ep 1", "b"]));
    assert_eq!(
        EpisodeTable::from_raw(raw).unwrap_err(),
        SchemaError::DuplicateTitle("Ep 1".to_string())
    );
}

#[test]
fn blank_titles_do_not_count_as_duplicates() {
    let raw = RawTable::new(cols(&["Title", "Description"]))
        .with_row(row(&["", "a"]))
        .with_row(row(&["", "b"]));
    assert_eq!(EpisodeTable::from_raw(raw).unwrap().len(), 2);
}

// === Scenario: header names are made unique ===

#[test]
fn trailing_blank_headers_are_named_by_position() {
    let raw = read_csv("Title,Description,,\nEp 1,Cats,,\n".as_bytes()).unwrap();
    let table = EpisodeTable::from_raw(raw).unwrap();
    assert_eq!(
        table.columns(),
        &cols(&[
            "Title",
            "Description",
            "Unnamed: 2",
            "Unnamed: 3",
            "Analyzed",
            "No of Queries",
            "Added Queries",
        ])
    );
    assert_eq!(table.find("Ep 1").unwrap().description, "Cats");

    let csv = String::from_utf8(table.to_csv().unwrap()).unwrap();
    assert!(csv.starts_with("Title,Description,Unnamed: 2,Unnamed: 3,Analyzed"));
}

#[test]
fn repeated_headers_get_numeric_suffixes() {
    let raw = RawTable::new(cols(&["Title", "Description", "Notes", "Notes", "Title"]))
        .with_row(row(&["Ep 1", "Cats", "a", "b", "shadow"]));
    let table = EpisodeTable::from_raw(raw).unwrap();

    assert_eq!(&table.columns()[..5], &cols(&["Title", "Description", "Notes", "Notes.1", "Title.1"])[..]);
    let record = table.find("Ep 1").unwrap();
    assert_eq!(record.cell("Notes"), "a");
    assert_eq!(record.cell("Notes.1"), "b");
    assert_eq!(record.cell("Title.1"), "shadow");
}

#[test]
fn suffixes_skip_names_already_taken() {
    assert_eq!(
        unique_column_names(cols(&["A", "A", "A.1", ""])),
        cols(&["A", "A.1", "A.1.1", "Unnamed: 3"])
    );
}

// === Scenario: tracking columns are backfilled ===

#[test]
fn tracking_columns_are_appended_with_defaults() {
    let table = three_episodes();
    assert_eq!(
        table.columns(),
        &cols(&[
            "Title",
            "Description",
            "Important Words",
            "Analyzed",
            "No of Queries",
            "Added Queries"
        ])[..]
    );
    for record in table.records() {
        assert!(!record.analyzed);
        assert_eq!(record.query_count(), 0);
        assert_eq!(record.added_queries(), "");
    }
}

#[test]
fn existing_tracking_columns_keep_their_position_and_values() {
    let raw = RawTable::new(cols(&["Added Queries", "Title", "Analyzed", "Description"]))
        .with_row(row(&["a,b", "Ep 1", "True", "Cats"]));
    let table = EpisodeTable::from_raw(raw).unwrap();
    assert_eq!(
        table.columns(),
        &cols(&["Added Queries", "Title", "Analyzed", "Description", "No of Queries"])[..]
    );
    let record = table.find("Ep 1").unwrap();
    assert!(record.analyzed);
    assert_eq!(record.added_queries(), "a,b");
}

// === Scenario: lookup and summaries ===

#[test]
fn find_matches_exact_titles_only() {
    let table = three_episodes();
    assert!(table.find("Ep 2").is_some());
    assert!(table.find("ep 2").is_none());
    assert!(table.find(" Ep 2").is_none());
}

#[test]
fn analysis_summary_uses_one_based_positions() {
    let mut table = three_episodes();
    table.find_mut("Ep 1").unwrap().analyzed = true;
    table.find_mut("Ep 3").unwrap().analyzed = true;

    let summary = table.analysis_summary();
    assert_eq!(summary.analyzed_episodes, vec![1, 3]);
    assert_eq!(summary.not_analyzed_episodes, vec![2]);
    assert_eq!(summary.total_episodes, 3);
    assert_eq!(summary.analyzed_count, 2);
    assert_eq!(summary.not_analyzed_count, 1);
    assert_eq!(table.pending_count(), 1);
}

#[test]
fn display_rows_follow_table_order() {
    let mut table = three_episodes();
    table
        .find_mut("Ep 2")
        .unwrap()
        .set_queries(&QueryList::parse("dog podcast"));
    let rows = table.display_rows();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1].title, "Ep 2");
    assert_eq!(rows[1].query_count, 1);
    assert_eq!(rows[1].added_queries, "dog podcast");
}

#[test]
fn important_words_presence_drives_download_readiness() {
    assert!(three_episodes().has_important_words());
    let raw = RawTable::new(cols(&["Title", "Description", "Important Words 1"]));
    assert!(!EpisodeTable::from_raw(raw).unwrap().has_important_words());
}

// === Scenario: export keeps uploaded columns ===

#[test]
fn export_preserves_extra_columns_and_mutations() {
    let data = "Host,Title,Description,Important Words 1\n\
                Sam,Ep 1,Cats,\"['cat', 'kitten']\"\n\
                Alex,Ep 2,Dogs,\n";
    let mut table = EpisodeTable::from_raw(read_csv(data.as_bytes()).unwrap()).unwrap();
    {
        let record = table.find_mut("Ep 1").unwrap();
        record.analyzed = true;
        record.set_queries(&QueryList::parse("cat podcast,kitten podcast"));
    }

    let csv = String::from_utf8(table.to_csv().unwrap()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "Host,Title,Description,Important Words 1,Analyzed,No of Queries,Added Queries"
    );
    assert_eq!(
        lines[1],
        "Sam,Ep 1,Cats,\"['cat', 'kitten']\",True,2,\"cat podcast,kitten podcast\""
    );
    assert_eq!(lines[2], "Alex,Ep 2,Dogs,,False,0,");
}

#[test]
fn exported_csv_reingests_to_the_same_table() {
    let mut table = three_episodes();
    table
        .find_mut("Ep 3")
        .unwrap()
        .set_queries(&QueryList::parse("bird podcast,birding"));
    table.find_mut("Ep 3").unwrap().analyzed = true;

    let csv = table.to_csv().unwrap();
    let again = EpisodeTable::from_raw(read_csv(csv.as_slice()).unwrap()).unwrap();
    assert_eq!(again, table);
}
