use super::*;
use std::io::Write as _;

fn write_log(dir: &tempfile::TempDir, id: &str, content: &str) -> PathBuf {
    let path = dir.path().join(format!("{id}.log"));
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(content.as_bytes()).unwrap();
    path
}

fn append_log(dir: &tempfile::TempDir, id: &str, content: &str) {
    let path = dir.path().join(format!("{id}.log"));
    let mut f = std::fs::OpenOptions::new().append(true).open(path).unwrap();
    f.write_all(content.as_bytes()).unwrap();
}

#[test]
fn missing_log_returns_none() {
    let dir = tempfile::tempdir().unwrap();
    let reader = LogReader::new(dir.path(), 100);
    assert_eq!(reader.read_new_content("ghost").unwrap(), None);
}

#[test]
fn existing_empty_log_returns_empty_string() {
    let dir = tempfile::tempdir().unwrap();
    write_log(&dir, "t1", "");
    let reader = LogReader::new(dir.path(), 100);
    assert_eq!(reader.read_new_content("t1").unwrap(), Some(String::new()));
}

#[test]
fn second_read_only_sees_appended_bytes() {
    let dir = tempfile::tempdir().unwrap();
    write_log(&dir, "t1", "line one\n");
    let reader = LogReader::new(dir.path(), 100);

    let first = reader.read_new_content("t1").unwrap().unwrap();
    assert_eq!(first, "line one\n");

    append_log(&dir, "t1", "line two\n");
    let second = reader.read_new_content("t1").unwrap().unwrap();
    assert_eq!(second, "line two\n");
}

#[test]
fn truncation_resets_offset_to_zero() {
    let dir = tempfile::tempdir().unwrap();
    write_log(&dir, "t1", "a very long first line that will be truncated\n");
    let reader = LogReader::new(dir.path(), 100);
    reader.read_new_content("t1").unwrap();

    write_log(&dir, "t1", "short\n");
    let after = reader.read_new_content("t1").unwrap().unwrap();
    assert_eq!(after, "short\n");
}

#[test]
fn circular_buffer_evicts_oldest_beyond_capacity() {
    let mut buf = CircularLineBuffer::new(2);
    buf.push_text("one\ntwo\nthree\n");
    assert_eq!(buf.join(), "two\nthree");
}

#[test]
fn empty_lines_are_skipped() {
    let mut buf = CircularLineBuffer::new(10);
    buf.push_text("one\n\n\ntwo\n");
    assert_eq!(buf.join(), "one\ntwo");
}

#[test]
fn matches_idle_pattern_never_raises_on_no_match() {
    let dir = tempfile::tempdir().unwrap();
    let reader = LogReader::new(dir.path(), 10);
    reader.update_buffer("t1", "still working\n");
    let re = Regex::new(r"^\$\s*$").unwrap();
    assert!(!reader.matches_idle_pattern("t1", &re));
}

#[test]
fn sync_and_check_returns_buffer_only_on_match() {
    let dir = tempfile::tempdir().unwrap();
    write_log(&dir, "t1", "working...\n");
    let reader = LogReader::new(dir.path(), 10);
    let re = Regex::new(r"\$\s*$").unwrap();

    assert_eq!(reader.sync_and_check("t1", &re).unwrap(), None);

    append_log(&dir, "t1", "done $");
    let result = reader.sync_and_check("t1", &re).unwrap();
    assert!(result.unwrap().contains("done $"));
}

proptest::proptest! {
    /// Join output never holds more than `capacity` lines, whatever text
    /// arrives across however many `push_text` calls.
    #[test]
    fn circular_buffer_never_exceeds_capacity(
        capacity in 1usize..20,
        chunks in proptest::collection::vec("[a-z]{0,8}", 0..30),
    ) {
        let mut buf = CircularLineBuffer::new(capacity);
        for chunk in &chunks {
            buf.push_text(&format!("{chunk}\n"));
        }
        let lines = buf.join();
        let line_count = if lines.is_empty() { 0 } else { lines.split('\n').count() };
        proptest::prop_assert!(line_count <= capacity);
    }
}

#[test]
fn reset_terminal_forgets_offset_and_buffer() {
    let dir = tempfile::tempdir().unwrap();
    write_log(&dir, "t1", "hello\n");
    let reader = LogReader::new(dir.path(), 10);
    reader.read_new_content("t1").unwrap();
    reader.update_buffer("t1", "hello\n");
    assert!(!reader.buffer_contents("t1").is_empty());

    reader.reset_terminal("t1");
    assert_eq!(reader.buffer_contents("t1"), "");
    // offset also forgotten: re-reading the whole file from scratch.
    let content = reader.read_new_content("t1").unwrap().unwrap();
    assert_eq!(content, "hello\n");
}
