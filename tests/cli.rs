use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

fn docqa_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("docqa");
    path
}

/// Three one-chunk documents whose sorted order is apples, cars, pie.
fn setup_docs() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let docs = tmp.path().join("docs");
    fs::create_dir_all(&docs).unwrap();
    fs::write(docs.join("a_apples.txt"), "apples grow on trees").unwrap();
    fs::write(docs.join("b_cars.txt"), "cars need fuel").unwrap();
    fs::write(docs.join("c_pie.txt"), "apple pie recipe").unwrap();
    tmp
}

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("docqa.toml");
    fs::write(&path, content).unwrap();
    path
}

fn run_docqa(args: &[&str]) -> (String, String, bool) {
    let binary = docqa_binary();
    let output = Command::new(&binary)
        .args(args)
        .env_remove("OPENAI_API_KEY")
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run docqa binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn path_str(p: &Path) -> &str {
    p.to_str().unwrap()
}

#[test]
fn test_help() {
    let (stdout, _, success) = run_docqa(&["--help"]);
    assert!(success);
    assert!(stdout.contains("ask"));
    assert!(stdout.contains("retrieve"));
    assert!(stdout.contains("chunk"));
    assert!(stdout.contains("chat"));
}

#[test]
fn test_retrieve_best_chunk_first() {
    let tmp = setup_docs();
    let docs = tmp.path().join("docs");
    let (stdout, stderr, success) = run_docqa(&[
        "retrieve",
        "where do apples grow?",
        path_str(&docs),
        "--top-k",
        "1",
    ]);
    assert!(success, "retrieve failed: {}", stderr);
    assert_eq!(stdout.trim_end(), "apples grow on trees");
}

#[test]
fn test_retrieve_joins_with_blank_line() {
    let tmp = setup_docs();
    let docs = tmp.path().join("docs");
    let (stdout, stderr, success) = run_docqa(&[
        "retrieve",
        "apple pie",
        path_str(&docs),
        "--top-k",
        "2",
    ]);
    assert!(success, "retrieve failed: {}", stderr);
    assert_eq!(stdout.trim_end(), "apple pie recipe\n\napples grow on trees");
}

#[test]
fn test_retrieve_top_k_zero_is_empty() {
    let tmp = setup_docs();
    let docs = tmp.path().join("docs");
    let (stdout, _, success) = run_docqa(&["retrieve", "apples", path_str(&docs), "--top-k", "0"]);
    assert!(success);
    assert_eq!(stdout.trim(), "");
}

#[test]
fn test_retrieve_empty_question_keeps_pool_order() {
    let tmp = setup_docs();
    let docs = tmp.path().join("docs");
    let (stdout, _, success) = run_docqa(&["retrieve", "", path_str(&docs), "--top-k", "2"]);
    assert!(success);
    assert_eq!(stdout.trim_end(), "apples grow on trees\n\ncars need fuel");
}

#[test]
fn test_retrieve_json_hits() {
    let tmp = setup_docs();
    let docs = tmp.path().join("docs");
    let (stdout, stderr, success) = run_docqa(&[
        "retrieve",
        "where do apples grow?",
        path_str(&docs),
        "--json",
    ]);
    assert!(success, "retrieve --json failed: {}", stderr);

    let hits: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let hits = hits.as_array().unwrap();
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0]["rank"], 1);
    assert_eq!(hits[0]["index"], 0);
    assert_eq!(hits[0]["text"], "apples grow on trees");
    assert!(hits[0]["document"].as_str().unwrap().ends_with("a_apples.txt"));
    assert!(hits[0]["score"].as_f64().unwrap() > 0.0);
    assert_eq!(hits[1]["score"].as_f64().unwrap(), 0.0);
}

#[test]
fn test_retrieve_with_sources() {
    let tmp = setup_docs();
    let file = tmp.path().join("docs/b_cars.txt");
    let (stdout, _, success) = run_docqa(&["retrieve", "fuel", path_str(&file), "--sources"]);
    assert!(success);
    let first = stdout.lines().next().unwrap();
    assert!(first.starts_with("[source: "), "got: {}", stdout);
    assert!(first.ends_with("b_cars.txt]"));
    assert!(stdout.contains("cars need fuel"));
}

fn retrieve_top_one(paths: &[PathBuf], weighting: &str) -> String {
    let mut args = vec!["retrieve", "the zebra"];
    args.extend(paths.iter().map(|p| path_str(p)));
    args.extend(["--top-k", "1", "--weighting", weighting]);
    let (stdout, stderr, success) = run_docqa(&args);
    assert!(success, "retrieve failed: {}", stderr);
    stdout.trim_end().to_string()
}

#[test]
fn test_retrieve_tfidf_weighting() {
    let tmp = TempDir::new().unwrap();
    let texts = ["the the the the", "the zebra dog cow pig hen", "the end", "the bird"];
    let paths: Vec<PathBuf> = texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let path = tmp.path().join(format!("{}.txt", i));
            fs::write(&path, text).unwrap();
            path
        })
        .collect();

    // "the" is in every document, so only tfidf lets the rare term win.
    assert_eq!(retrieve_top_one(&paths, "tf"), "the the the the");
    assert_eq!(retrieve_top_one(&paths, "tfidf"), "the zebra dog cow pig hen");
}

#[test]
fn test_unknown_weighting_rejected() {
    let tmp = setup_docs();
    let docs = tmp.path().join("docs");
    let (_, stderr, success) =
        run_docqa(&["retrieve", "apples", path_str(&docs), "--weighting", "bm25"]);
    assert!(!success);
    assert!(stderr.contains("bm25"));
}

#[test]
fn test_missing_path_fails() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope.txt");
    let (_, stderr, success) = run_docqa(&["retrieve", "anything", path_str(&missing)]);
    assert!(!success);
    assert!(stderr.contains("No such file or directory"));
}

#[test]
fn test_chunk_counts() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("long.txt");
    fs::write(&file, "x".repeat(2500)).unwrap();

    let (stdout, stderr, success) = run_docqa(&["chunk", path_str(&file)]);
    assert!(success, "chunk failed: {}", stderr);
    assert!(stdout.contains("2500 characters, 3 chunks"), "got: {}", stdout);
    assert!(stdout.contains("total: 1 documents, 3 chunks, 0 skipped"));
}

#[test]
fn test_chunk_json_windows() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("alpha.txt");
    fs::write(&file, "abcdefghijklmnop").unwrap();

    let (stdout, stderr, success) = run_docqa(&[
        "chunk",
        path_str(&file),
        "--chunk-size",
        "10",
        "--overlap",
        "2",
        "--json",
    ]);
    assert!(success, "chunk --json failed: {}", stderr);

    let dumps: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(dumps[0]["char_count"], 16);
    assert_eq!(dumps[0]["chunks"], serde_json::json!(["abcdefghij", "ijklmnop"]));
}

#[test]
fn test_chunk_rejects_overlap_not_below_size() {
    let tmp = setup_docs();
    let docs = tmp.path().join("docs");
    let (_, stderr, success) = run_docqa(&[
        "chunk",
        path_str(&docs),
        "--chunk-size",
        "10",
        "--overlap",
        "10",
    ]);
    assert!(!success);
    assert!(stderr.contains("overlap"));
}

#[test]
fn test_flags_override_config_before_validation() {
    let tmp = setup_docs();
    let config = write_config(tmp.path(), "[chunking]\nchunk_size = 100\noverlap = 150\n");
    let file = tmp.path().join("docs/a_apples.txt");

    let (stdout, stderr, success) = run_docqa(&[
        "--config",
        path_str(&config),
        "chunk",
        path_str(&file),
        "--chunk-size",
        "300",
    ]);
    assert!(success, "chunk failed: {}", stderr);
    assert!(stdout.contains("total: 1 documents, 1 chunks, 0 skipped"));

    let (_, stderr, success) =
        run_docqa(&["--config", path_str(&config), "chunk", path_str(&file)]);
    assert!(!success);
    assert!(stderr.contains("overlap (150) must be less than chunk_size (100)"));
}

#[test]
fn test_config_weighting_matches_flag_names() {
    let tmp = setup_docs();
    let config = write_config(tmp.path(), "[retrieval]\nweighting = \"tf-idf\"\ntop_k = 1\n");
    let docs = tmp.path().join("docs");
    let (stdout, stderr, success) = run_docqa(&[
        "--config",
        path_str(&config),
        "retrieve",
        "where do apples grow?",
        path_str(&docs),
    ]);
    assert!(success, "retrieve failed: {}", stderr);
    assert_eq!(stdout.trim_end(), "apples grow on trees");
}

#[test]
fn test_invalid_config_fails() {
    let tmp = setup_docs();
    let config = write_config(tmp.path(), "[chunking]\nchunk_size = 0\n");
    let docs = tmp.path().join("docs");
    let (_, stderr, success) = run_docqa(&[
        "--config",
        path_str(&config),
        "retrieve",
        "apples",
        path_str(&docs),
    ]);
    assert!(!success);
    assert!(stderr.contains("chunk_size"));
}

#[test]
fn test_bad_document_skipped_with_warning() {
    let tmp = setup_docs();
    let good = tmp.path().join("docs/a_apples.txt");
    let bad = tmp.path().join("broken.pdf");
    fs::write(&bad, "not really a pdf").unwrap();

    let (stdout, stderr, success) =
        run_docqa(&["retrieve", "apples", path_str(&bad), path_str(&good)]);
    assert!(success, "retrieve failed: {}", stderr);
    assert!(stderr.contains("Warning: skipped"));
    assert_eq!(stderr.matches("broken.pdf").count(), 1, "got: {}", stderr);
    assert_eq!(stdout.trim_end(), "apples grow on trees");
}

#[test]
fn test_unsupported_file_skipped() {
    let tmp = setup_docs();
    let image = tmp.path().join("photo.png");
    fs::write(&image, [0x89, b'P', b'N', b'G']).unwrap();
    let good = tmp.path().join("docs/b_cars.txt");

    let (stdout, stderr, success) = run_docqa(&["chunk", path_str(&image), path_str(&good)]);
    assert!(success);
    assert!(stderr.contains("unsupported document type"));
    assert!(stdout.contains("total: 1 documents, 1 chunks, 1 skipped"));
}

#[test]
fn test_ask_without_documents() {
    let tmp = TempDir::new().unwrap();
    let bad = tmp.path().join("broken.pdf");
    fs::write(&bad, "garbage").unwrap();

    let (stdout, _, success) = run_docqa(&["ask", "anything?", path_str(&bad)]);
    assert!(success);
    assert_eq!(stdout.trim(), "No documents available.");
}

#[test]
fn test_ask_without_api_key_fails() {
    let tmp = setup_docs();
    let docs = tmp.path().join("docs");
    let (_, stderr, success) = run_docqa(&["ask", "where do apples grow?", path_str(&docs)]);
    assert!(!success);
    assert!(stderr.contains("OPENAI_API_KEY"), "got: {}", stderr);
}

#[test]
fn test_ask_rejects_blank_question() {
    let tmp = setup_docs();
    let docs = tmp.path().join("docs");
    let (_, stderr, success) = run_docqa(&["ask", "   ", path_str(&docs)]);
    assert!(!success);
    assert!(stderr.contains("Please enter a question."));
}

#[test]
fn test_ask_with_disabled_synthesis_fails() {
    let tmp = setup_docs();
    let config = write_config(tmp.path(), "[synthesis]\nprovider = \"disabled\"\n");
    let docs = tmp.path().join("docs");
    let (stdout, stderr, success) = run_docqa(&[
        "--config",
        path_str(&config),
        "ask",
        "where do apples grow?",
        path_str(&docs),
    ]);
    assert!(!success);
    assert!(stdout.is_empty());
    assert!(stderr.contains("disabled"), "got: {}", stderr);
}

#[test]
fn test_chat_survives_provider_errors() {
    let tmp = setup_docs();
    let config = write_config(tmp.path(), "[synthesis]\nprovider = \"disabled\"\n");
    let docs = tmp.path().join("docs");

    let mut child = Command::new(docqa_binary())
        .args(["--config", path_str(&config), "chat", path_str(&docs)])
        .env_remove("OPENAI_API_KEY")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"where do apples grow?\n\nwhat about cars?\nexit\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "chat failed: {}", stderr);
    assert!(stderr.contains("Loaded 3 documents (3 chunks)"));
    assert_eq!(stderr.matches("answer synthesis is disabled").count(), 2);
    assert!(stderr.contains("Please enter a question."));
}
