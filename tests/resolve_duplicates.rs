use helpdesk_merge::{config::Config, dataset::load_dataset, report::FileStatus, resolve::Resolver};
use serde_json::{json, Value};
use std::fs;

#[test]
fn empty_source_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("agg");
    let target = tmp.path().join("resolved");
    fs::create_dir_all(&source).unwrap();
    fs::write(source.join("notes.txt"), "ignored").unwrap();

    let summary = Resolver::new(&Config::default()).run(&source, &target).unwrap();

    assert!(summary.is_none());
    assert!(!target.exists());
}

#[test]
fn missing_source_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let res = Resolver::new(&Config::default())
        .run(&tmp.path().join("nope"), &tmp.path().join("out"));
    assert!(res.is_err());
}

#[test]
fn invalid_file_does_not_stop_siblings() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("agg");
    let target = tmp.path().join("resolved");
    fs::create_dir_all(&source).unwrap();
    fs::write(
        source.join("incidents.json"),
        serde_json::to_string(&json!({
            "1": {"category_id": "12"},
            "2": {"category_id": "20"},
            "3": {"category_id": "4"}
        }))
        .unwrap(),
    )
    .unwrap();
    fs::write(source.join("broken.json"), "[1, 2").unwrap();
    fs::write(
        source.join("users.json"),
        serde_json::to_string(&json!({"u1": {"name": "ann"}})).unwrap(),
    )
    .unwrap();

    let summary = Resolver::new(&Config::default())
        .run(&source, &target)
        .unwrap()
        .expect("files were found");

    let names: Vec<&str> = summary.results.iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(names, ["broken.json", "incidents.json", "users.json"]);

    assert_eq!(summary.results[0].status, FileStatus::Error);
    assert!(summary.results[0].error.is_some());
    assert_eq!(summary.results[1].status, FileStatus::Success);
    assert_eq!(summary.results[1].total_entries, 3);
    assert_eq!(summary.results[1].adjustments_made, 2);
    assert_eq!(summary.results[2].adjustments_made, 0);

    assert_eq!(summary.totals.files_processed, 2);
    assert_eq!(summary.totals.files_with_errors, 1);
    assert_eq!(summary.totals.total_adjustments, 2);

    let incidents = load_dataset(&target.join("incidents.json")).unwrap();
    assert_eq!(incidents["1"]["category_id"], "2");
    assert_eq!(incidents["2"]["category_id"], "17");
    assert_eq!(incidents["3"]["category_id"], "4");
    assert!(!target.join("broken.json").exists());

    // sources stay untouched
    let original = load_dataset(&source.join("incidents.json")).unwrap();
    assert_eq!(original["1"]["category_id"], "12");
}

#[test]
fn summary_file_layout() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("agg");
    let target = tmp.path().join("resolved");
    fs::create_dir_all(&source).unwrap();
    fs::write(source.join("tasks.json"), r#"{"t1": {"category_id": "13"}}"#).unwrap();
    fs::write(source.join("bad.json"), "nope").unwrap();

    Resolver::new(&Config::default()).run(&source, &target).unwrap();

    let raw = fs::read_to_string(target.join("_category_resolution_summary.json")).unwrap();
    let summary: Value = serde_json::from_str(&raw).unwrap();
    let body = &summary["processing_summary"];
    assert_eq!(body["source_directory"], source.display().to_string());
    assert_eq!(body["target_directory"], target.display().to_string());
    assert_eq!(
        body["adjustment_rules"],
        json!({
            "category_id_11_12_13": "decrease by 10",
            "category_id_greater_than_13": "decrease by 3",
            "category_id_other": "no change"
        })
    );
    assert_eq!(
        body["results"][1],
        json!({
            "filename": "tasks.json",
            "total_entries": 1,
            "adjustments_made": 1,
            "status": "success"
        })
    );
    assert_eq!(body["results"][0]["status"], "error");
    assert_eq!(body["results"][0]["total_entries"], 0);
    assert_eq!(
        body["totals"],
        json!({"files_processed": 1, "files_with_errors": 1, "total_adjustments": 1})
    );
}
