#![allow(dead_code)]
use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
    _dir: TempDir,
    pub store: PathBuf,
    pub cfg: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = dir.path().join("config");
        std::fs::create_dir_all(&cfg).expect("cfg dir");
        let store = dir.path().join("shelf.json");
        Self {
            _dir: dir,
            store,
            cfg,
        }
    }

    pub fn bin(&self) -> Command {
        let mut cmd = Command::cargo_bin("shelf").unwrap();
        cmd.env("XDG_CONFIG_HOME", &self.cfg);
        cmd.env_remove("SHELF_LOG");
        cmd.arg("--store").arg(&self.store);
        cmd
    }

    /// Saves a post through `shelf add`.
    pub fn add(&self, id: &str, author: &str, text: &str) {
        self.bin()
            .args(["add", id, "--author", author, text])
            .assert()
            .success();
    }

    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let out = self
            .bin()
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).unwrap()
    }

    pub fn stdout(&self, args: &[&str]) -> String {
        let out = self
            .bin()
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        String::from_utf8(out).unwrap()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.cfg.join(name)
    }

    /// Writes `count` posts straight into the store file, newest first.
    pub fn seed(&self, count: usize) {
        let tweets: Vec<serde_json::Value> = (0..count)
            .rev()
            .map(|i| {
                serde_json::json!({
                    "id": format!("p{i}"),
                    "url": format!("https://x.com/someone/status/p{i}"),
                    "author": "someone",
                    "text": format!("post number {i}"),
                    "savedAt": format!("2024-01-01T{:02}:{:02}:00Z", i / 60, i % 60),
                    "tags": [],
                    "note": "",
                    "status": "unread",
                })
            })
            .collect();
        let doc = serde_json::json!({ "tweets": tweets });
        std::fs::write(&self.store, serde_json::to_vec_pretty(&doc).unwrap()).unwrap();
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
