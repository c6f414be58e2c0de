use super::*;

#[test]
fn installs_a_single_file() {
    let src_dir = tempfile::tempdir().expect("src dir");
    let store_dir = tempfile::tempdir().expect("store dir");

    let profile = src_dir.path().join("reviewer.md");
    std::fs::write(&profile, "# reviewer profile").expect("write profile");

    let args = InstallArgs { source: profile.clone(), provider: None, store: store_dir.path().to_path_buf() };
    assert_eq!(run(args), 0);

    let installed = store_dir.path().join("reviewer.md");
    assert_eq!(std::fs::read_to_string(installed).expect("read installed"), "# reviewer profile");
}

#[test]
fn installs_a_directory_recursively() {
    let src_dir = tempfile::tempdir().expect("src dir");
    let store_dir = tempfile::tempdir().expect("store dir");

    let bundle = src_dir.path().join("bundle");
    std::fs::create_dir_all(bundle.join("nested")).expect("mkdir");
    std::fs::write(bundle.join("top.md"), "top").expect("write top");
    std::fs::write(bundle.join("nested").join("inner.md"), "inner").expect("write inner");

    let args = InstallArgs { source: bundle, provider: Some("codex".to_string()), store: store_dir.path().to_path_buf() };
    assert_eq!(run(args), 0);

    assert_eq!(std::fs::read_to_string(store_dir.path().join("bundle/top.md")).expect("top"), "top");
    assert_eq!(std::fs::read_to_string(store_dir.path().join("bundle/nested/inner.md")).expect("inner"), "inner");
}

#[test]
fn missing_source_file_returns_error_code() {
    let store_dir = tempfile::tempdir().expect("store dir");
    let args =
        InstallArgs { source: PathBuf::from("/does/not/exist.md"), provider: None, store: store_dir.path().to_path_buf() };
    assert_eq!(run(args), 1);
}
