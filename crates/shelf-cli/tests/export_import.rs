mod common;
use common::TestEnv;
use predicates::prelude::*;

#[test]
fn backup_roundtrip_into_fresh_store() {
    let t1 = TestEnv::new();
    t1.seed(3);
    t1.bin().args(["tag", "add", "p1", "keep"]).assert().success();
    let backup = t1.path("backup.json");
    t1.bin()
        .arg("export")
        .arg(&backup)
        .assert()
        .success()
        .stdout(predicate::str::contains("exported 3 posts"));

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&backup).unwrap()).unwrap();
    assert_eq!(raw["version"], 1);
    assert!(raw["exportedAt"].is_string());
    assert_eq!(raw["tweets"].as_array().unwrap().len(), 3);

    let t2 = TestEnv::new();
    t2.add("p2", "someone", "already here");
    t2.bin()
        .arg("import")
        .arg(&backup)
        .assert()
        .success()
        .stdout(predicate::str::contains("imported 2, skipped 1 duplicates"));
    let v = t2.json(&["list", "--tag", "keep", "--json"]);
    assert_eq!(v[0]["id"], "p1");
    // local copy of p2 wins
    let v = t2.json(&["search", "already", "--json"]);
    assert_eq!(v[0]["id"], "p2");
}

#[test]
fn mirror_export_is_a_bare_array() {
    let t = TestEnv::new();
    t.seed(2);
    let mirror = t.path("tweets.json");
    t.bin()
        .args(["export", "--mirror"])
        .arg(&mirror)
        .assert()
        .success();
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&mirror).unwrap()).unwrap();
    assert_eq!(raw.as_array().unwrap().len(), 2);

    let other = TestEnv::new();
    other
        .bin()
        .args(["import", "--mirror"])
        .arg(&mirror)
        .assert()
        .success()
        .stdout(predicate::str::contains("imported 2, skipped 0"));
}

#[test]
fn import_reports_invalid_entries() {
    let t = TestEnv::new();
    let path = t.path("partial.json");
    std::fs::write(
        &path,
        r#"{"version": 1, "tweets": [{"tweetId": "legacy", "text": "old"}, {"text": "no id"}]}"#,
    )
    .unwrap();
    t.bin()
        .arg("import")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "imported 1, skipped 0 duplicates, ignored 1 invalid entries",
        ));
    let v = t.json(&["list", "--json"]);
    assert_eq!(v[0]["id"], "legacy");
}

#[test]
fn bad_backups_are_refused() {
    let t = TestEnv::new();
    let cases = [
        (r#"{"tweets": []}"#, "invalid backup file"),
        (r#"{"version": 2, "tweets": [{"id": "1"}]}"#, "unsupported backup version: 2"),
        (r#"{"version": 1, "tweets": [{"text": "x"}]}"#, "no valid items"),
    ];
    for (i, (body, msg)) in cases.iter().enumerate() {
        let path = t.path(&format!("bad{i}.json"));
        std::fs::write(&path, body).unwrap();
        t.bin()
            .arg("import")
            .arg(&path)
            .assert()
            .failure()
            .stderr(predicate::str::contains(*msg));
    }
    let v = t.json(&["list", "--json"]);
    assert!(v.as_array().unwrap().is_empty());
}
