//! CLI integration tests
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("beanpress")
}

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn word(traditional: &str, pronunciation: &str, gloss: &str, level: u32) -> serde_json::Value {
    json!({
        "traditional": traditional,
        "pronunciation": pronunciation,
        "gloss": gloss,
        "difficulty_level": level,
    })
}

/// A cache directory that already holds every lesson, so `build` never goes online.
fn warm_cache() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let metadata = json!({
        "title": "The Tortoise and the Hare",
        "chinese_title": "龜兔賽跑",
        "url": "https://mandarinbean.com/the-tortoise-and-the-hare/",
        "category_tag": "Culture",
        "difficulty_tag": "HSK4",
    });

    let mut collection = metadata.clone();
    collection["main_text"] = json!(["烏龜和兔子賽跑。", "兔子，很驕傲。"]);
    collection["vocabulary"] = json!([
        word("烏龜", "wū guī", "tortoise (HSK6)", 6),
        word("賽跑", "sàipǎo", "race (HSK5)", 5),
        word("驕傲", "jiāo'ào", "proud (HSK5)", 5),
        word("睡著", "shuìzháo", "to fall asleep (HSK4)", 4),
        word("堅持", "jiānchí", "to persist (HSK5)", 5),
    ]);

    std::fs::write(tmp.path().join("article_metadata.json"), json!([metadata]).to_string()).unwrap();
    std::fs::write(tmp.path().join("final_text.json"), json!([collection]).to_string()).unwrap();
    tmp
}

#[test]
fn test_cli_article_file_input() {
    cmd()
        .args(["article", &get_fixture_path("lesson.html")])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("烏龜和兔子賽跑。\n兔子，很驕傲。\n"))
        .stdout(predicate::str::contains("睡著 (shuìzháo): To Fall Asleep\n"))
        .stdout(predicate::str::contains("(completed action)").not());
}

#[test]
fn test_cli_article_stdin_input() {
    let html = std::fs::read_to_string(get_fixture_path("lesson.html")).unwrap();

    cmd()
        .args(["article", "-"])
        .write_stdin(html)
        .assert()
        .success()
        .stdout(predicate::str::contains("堅持到底。"));
}

#[test]
fn test_cli_article_min_level() {
    cmd()
        .args(["article", "--min-level", "6", &get_fixture_path("lesson.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("烏龜 (wū guī): Tortoise"))
        .stdout(predicate::str::contains("賽跑 (sàipǎo): Race").not());
}

#[test]
fn test_cli_article_json() {
    let output = cmd()
        .args(["article", "--json", &get_fixture_path("lesson.html")])
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["chinese_title"], "龜兔賽跑");
    assert_eq!(value["main_text"].as_array().unwrap().len(), 5);
    assert_eq!(value["vocabulary"][0]["traditional"], "烏龜");
}

#[test]
fn test_cli_article_nonexistent_file() {
    cmd()
        .args(["article", "/nonexistent/lesson.html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn test_cli_build_from_cache_markdown() {
    let cache = warm_cache();
    let output = cache.path().join("book.md");

    cmd()
        .args(["build", "-f", "markdown", "--column-capacity", "2"])
        .args(["--cache-dir", cache.path().to_str().unwrap()])
        .args(["-o", output.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("1 lessons written to"));

    let markdown = std::fs::read_to_string(&output).unwrap();
    assert!(markdown.starts_with("# 龜兔賽跑\n\n## The Tortoise and the Hare - (Culture - HSK4)\n\n"));
    assert!(markdown.contains("### Vocabulary (1/2)"));
    assert!(markdown.contains("| 烏龜 (wū guī): Tortoise | 驕傲 (jiāo'ào): Proud |\n"));
    assert!(markdown.contains("| 堅持 (jiānchí): To Persist |  |\n"));
}

#[test]
fn test_cli_build_from_cache_docx() {
    let cache = warm_cache();
    let output = cache.path().join("book.docx");

    cmd()
        .args(["build", "--cache-dir", cache.path().to_str().unwrap()])
        .args(["-o", output.to_str().unwrap()])
        .assert()
        .success();

    let bytes = std::fs::read(&output).unwrap();
    assert_eq!(&bytes[..2], b"PK");
}

#[test]
fn test_cli_build_corrupted_cache() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("article_metadata.json"), "not json").unwrap();

    cmd()
        .args(["build", "--cache-dir", tmp.path().to_str().unwrap()])
        .args(["-o", tmp.path().join("book.docx").to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to harvest lessons"));
}

#[test]
fn test_cli_build_zero_capacity() {
    let cache = warm_cache();

    cmd()
        .args(["build", "--column-capacity", "0", "--cache-dir", cache.path().to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn test_cli_invalid_format() {
    cmd()
        .args(["build", "-f", "pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid format"));
}

#[test]
fn test_cli_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("article"));
}

#[test]
fn test_cli_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("beanpress"));
}
