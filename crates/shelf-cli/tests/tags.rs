mod common;
use common::TestEnv;
use predicates::prelude::*;

#[test]
fn tag_add_ls_rm_flow() {
    let t = TestEnv::new();
    t.add("1", "alice", "tag me");
    t.add("2", "bob", "untagged");

    t.bin()
        .args(["tag", "add", "1", "rust", "news", "rust"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1: rust, news"));

    let ls = t.stdout(&["tag", "ls", "1"]);
    assert_eq!(ls.lines().collect::<Vec<_>>(), ["rust", "news"]);

    let v = t.json(&["list", "--tag", "rust", "--json"]);
    let arr = v.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["id"], "1");

    // tags are searchable
    let v = t.json(&["search", "news", "--json"]);
    assert_eq!(v.as_array().unwrap().len(), 1);

    t.bin().args(["tag", "rm", "1", "rust"]).assert().success();
    let ls = t.stdout(&["tag", "ls", "1"]);
    assert!(!ls.lines().any(|l| l == "rust"));
    assert!(ls.lines().any(|l| l == "news"));
}

#[test]
fn catalogue_is_sorted_and_unique() {
    let t = TestEnv::new();
    t.add("1", "a", "one");
    t.add("2", "b", "two");
    t.bin().args(["tag", "add", "1", "zeta", "alpha"]).assert().success();
    t.bin().args(["tag", "add", "2", "alpha", "mid"]).assert().success();
    let ls = t.stdout(&["tag", "ls"]);
    assert_eq!(ls.lines().collect::<Vec<_>>(), ["alpha", "mid", "zeta"]);
}

#[test]
fn tagging_unknown_post_fails() {
    let t = TestEnv::new();
    t.bin()
        .args(["tag", "add", "ghost", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("item not found: ghost"));
}
