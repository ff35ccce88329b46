use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use tempfile::TempDir;

const SEP: char = '\u{1f}';

fn hzs_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("hzs");
    path
}

/// Create a minimal collection database: three decks (one nested), one
/// note type, four notes, and review history for two cards.
async fn setup_collection(path: &Path) {
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
        .unwrap()
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(options).await.unwrap();

    let schema = [
        "CREATE TABLE decks (id INTEGER PRIMARY KEY, name TEXT NOT NULL)",
        "CREATE TABLE fields (ntid INTEGER NOT NULL, ord INTEGER NOT NULL, name TEXT NOT NULL, \
         PRIMARY KEY (ntid, ord))",
        "CREATE TABLE notes (id INTEGER PRIMARY KEY, mid INTEGER NOT NULL, flds TEXT NOT NULL)",
        "CREATE TABLE cards (id INTEGER PRIMARY KEY, nid INTEGER NOT NULL, \
         did INTEGER NOT NULL, queue INTEGER NOT NULL)",
        "CREATE TABLE revlog (id INTEGER PRIMARY KEY, cid INTEGER NOT NULL)",
    ];
    for statement in schema {
        sqlx::query(statement).execute(&pool).await.unwrap();
    }

    for (id, name) in [
        (1, "Chinese".to_string()),
        (2, format!("Chinese{}HSK1", SEP)),
        (3, "Japanese".to_string()),
    ] {
        sqlx::query("INSERT INTO decks (id, name) VALUES (?, ?)")
            .bind(id)
            .bind(name)
            .execute(&pool)
            .await
            .unwrap();
    }

    for (ord, name) in ["Hanzi", "Pinyin", "Meaning"].into_iter().enumerate() {
        sqlx::query("INSERT INTO fields (ntid, ord, name) VALUES (10, ?, ?)")
            .bind(ord as i64)
            .bind(name)
            .execute(&pool)
            .await
            .unwrap();
    }

    let notes = [
        (101, format!("你好{}ni hao{}hello", SEP, SEP)),
        (102, format!("学习{}xue xi{}study", SEP, SEP)),
        (103, format!("猫{}mao{}cat", SEP, SEP)),
        (104, format!("日本{}riben{}Japan", SEP, SEP)),
    ];
    for (id, flds) in notes {
        sqlx::query("INSERT INTO notes (id, mid, flds) VALUES (?, 10, ?)")
            .bind(id)
            .bind(flds)
            .execute(&pool)
            .await
            .unwrap();
    }

    // Card 203 is suspended (queue -1); card 202 is new (queue 0).
    let cards = [
        (201, 101, 1, 2),
        (202, 102, 2, 0),
        (203, 103, 1, -1),
        (204, 104, 3, 1),
    ];
    for (id, nid, did, queue) in cards {
        sqlx::query("INSERT INTO cards (id, nid, did, queue) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(nid)
            .bind(did)
            .bind(queue)
            .execute(&pool)
            .await
            .unwrap();
    }

    for (id, cid) in [(1_700_000_000_000_i64, 201), (1_700_000_100_000_i64, 204)] {
        sqlx::query("INSERT INTO revlog (id, cid) VALUES (?, ?)")
            .bind(id)
            .bind(cid)
            .execute(&pool)
            .await
            .unwrap();
    }

    pool.close().await;
}

fn write_datasets(root: &Path) {
    let datasets = root.join("datasets");
    fs::create_dir_all(&datasets).unwrap();
    fs::write(
        datasets.join("hsk30-chars.csv"),
        "Hanzi,Level,Traditional\n\
         你,1,你\n\
         好,1,好\n\
         学,1,學\n\
         习,1,習\n\
         世,2,世\n\
         界,2,界\n\
         鼎,7-9,鼎\n",
    )
    .unwrap();
    fs::write(
        datasets.join("mega_hanzi_compilation.csv"),
        "simplified,traditional,frequency_junda\n\
         你,你,20\n\
         日,日,400\n\
         本,本,600\n",
    )
    .unwrap();
}

fn write_config(root: &Path, frequency_path: &str) -> PathBuf {
    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let config_content = format!(
        r#"[collection]
path = "{root}/collection.anki2"

[datasets]
hsk2021 = "{root}/datasets/hsk30-chars.csv"
frequency = "{frequency}"

[[selection]]
deck = "Chinese"
fields = "sort"
include_subdecks = true
"#,
        root = root.display(),
        frequency = frequency_path,
    );
    let config_path = config_dir.join("hanzi.toml");
    fs::write(&config_path, config_content).unwrap();
    config_path
}

async fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    setup_collection(&root.join("collection.anki2")).await;
    write_datasets(&root);
    let frequency = format!("{}/datasets/mega_hanzi_compilation.csv", root.display());
    let config_path = write_config(&root, &frequency);

    (tmp, config_path)
}

fn run_hzs(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = hzs_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run hzs binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[tokio::test]
async fn decks_lists_normalized_names() {
    let (_tmp, config_path) = setup_test_env().await;

    let (stdout, stderr, success) = run_hzs(&config_path, &["decks"]);
    assert!(success, "decks failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Chinese"));
    assert!(stdout.contains("Chinese::HSK1"));
    assert!(stdout.contains("Japanese"));
    // Japanese deck was reviewed; the nested deck never was.
    assert!(stdout.contains("never"));
}

#[tokio::test]
async fn fields_lists_note_fields_with_sort_marker() {
    let (_tmp, config_path) = setup_test_env().await;

    let (stdout, _, success) = run_hzs(&config_path, &["fields", "Chinese"]);
    assert!(success);
    assert!(stdout.contains("1  Hanzi"));
    assert!(stdout.contains("(sort field)"));
    assert!(stdout.contains("2  Pinyin"));
    assert!(stdout.contains("3  Meaning"));
}

#[tokio::test]
async fn fields_unknown_deck_fails() {
    let (_tmp, config_path) = setup_test_env().await;

    let (_, stderr, success) = run_hzs(&config_path, &["fields", "Korean"]);
    assert!(!success);
    assert!(stderr.contains("unknown deck"));
}

#[tokio::test]
async fn stats_summary_counts() {
    let (_tmp, config_path) = setup_test_env().await;

    let (stdout, stderr, success) = run_hzs(&config_path, &["stats"]);
    assert!(success, "stats failed: stdout={}, stderr={}", stdout, stderr);
    // Sort field of decks Chinese + Chinese::HSK1: 你好学习; the suspended
    // 猫 card is excluded. Only 你好 (note of the reviewed card) counts as
    // reviewed.
    assert!(stdout.contains("Total Hanzi:  4"));
    assert!(stdout.contains("Reviewed:     2 (50.0%)"));
    assert!(stdout.contains("HSK (2021) Band 1"));
    assert!(!stdout.contains("WARNING"));
}

#[tokio::test]
async fn stats_json_report() {
    let (_tmp, config_path) = setup_test_env().await;

    let (stdout, _, success) = run_hzs(&config_path, &["stats", "--json"]);
    assert!(success);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(report["total"], 4);
    assert_eq!(report["reviewed"], 2);
    assert_eq!(report["skipped"].as_array().unwrap().len(), 0);

    let categories = report["categories"].as_array().unwrap();
    // All 19 categories are present in JSON, even empty ones.
    assert_eq!(categories.len(), 19);

    let band1 = categories
        .iter()
        .find(|c| c["name"] == "HSK (2021) Band 1")
        .unwrap();
    // 你好学习 plus the traditional variants 學習 = size 6.
    assert_eq!(band1["category_size"], 6);
    assert_eq!(band1["present_count"], 4);
    assert_eq!(band1["reviewed_count"], 2);

    let top500 = categories.iter().find(|c| c["name"] == "Top 500").unwrap();
    // {你, 日}; only 你 is in the selected decks.
    assert_eq!(top500["category_size"], 2);
    assert_eq!(top500["present_count"], 1);
    assert_eq!(top500["reviewed_count"], 1);
}

#[tokio::test]
async fn stats_ad_hoc_deck_all_fields() {
    let (_tmp, config_path) = setup_test_env().await;

    let (stdout, _, success) = run_hzs(
        &config_path,
        &["stats", "--deck", "Japanese", "--fields", "all", "--json"],
    );
    assert!(success);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    // 日本, both reviewed (the Japanese card has review history).
    assert_eq!(report["total"], 2);
    assert_eq!(report["reviewed"], 2);
}

#[tokio::test]
async fn stats_is_deterministic() {
    let (_tmp, config_path) = setup_test_env().await;

    let (stdout1, _, _) = run_hzs(&config_path, &["stats", "--json"]);
    let (stdout2, _, _) = run_hzs(&config_path, &["stats", "--json"]);
    assert_eq!(stdout1, stdout2);
}

#[tokio::test]
async fn stats_survives_missing_frequency_dataset() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();
    setup_collection(&root.join("collection.anki2")).await;
    write_datasets(&root);
    let config_path = write_config(&root, "/nonexistent/frequency.csv");

    let (stdout, stderr, success) = run_hzs(&config_path, &["stats", "--json"]);
    assert!(success, "stats failed: stderr={}", stderr);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    // Frequency categories degrade to empty; HSK categories still work.
    let categories = report["categories"].as_array().unwrap();
    let top500 = categories.iter().find(|c| c["name"] == "Top 500").unwrap();
    assert_eq!(top500["category_size"], 0);
    let band1 = categories
        .iter()
        .find(|c| c["name"] == "HSK (2021) Band 1")
        .unwrap();
    assert_eq!(band1["category_size"], 6);
}

#[tokio::test]
async fn detail_partitions_a_category() {
    let (_tmp, config_path) = setup_test_env().await;

    let (stdout, _, success) = run_hzs(
        &config_path,
        &["detail", "HSK (2021) Band 1", "--json"],
    );
    assert!(success);
    let detail: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(detail["category"], "HSK (2021) Band 1");
    assert_eq!(detail["reviewed"], serde_json::json!(["你", "好"]));
    assert_eq!(detail["present_unreviewed"], serde_json::json!(["习", "学"]));
    assert_eq!(detail["absent"], serde_json::json!(["學", "習"]));
}

#[tokio::test]
async fn detail_human_output() {
    let (_tmp, config_path) = setup_test_env().await;

    let (stdout, _, success) = run_hzs(&config_path, &["detail", "Top 500"]);
    assert!(success);
    assert!(stdout.contains("Top 500 — 2 characters"));
    assert!(stdout.contains("Reviewed (1):"));
    assert!(stdout.contains("Not in deck (1):"));
}

#[tokio::test]
async fn detail_unknown_category_fails_loudly() {
    let (_tmp, config_path) = setup_test_env().await;

    let (_, stderr, success) = run_hzs(&config_path, &["detail", "TestBand"]);
    assert!(!success);
    assert!(stderr.contains("unknown category"));
}

#[tokio::test]
async fn missing_collection_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();
    write_datasets(&root);
    let frequency = format!("{}/datasets/mega_hanzi_compilation.csv", root.display());
    let config_path = write_config(&root, &frequency);

    let (_, stderr, success) = run_hzs(&config_path, &["stats"]);
    assert!(!success);
    assert!(stderr.contains("collection database not found"));
}
