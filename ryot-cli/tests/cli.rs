use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

const COUNTER: &str = r#"pragma: "1.0.0";
class contract Counter {
    pub storage count(id: uint64): uint64;

    pub func add(a: uint64, b: uint64): uint64 {
        return (a + b);
    }

    pub func get(id: uint64): uint64 {
        return count(id);
    }
}
"#;

fn ryot() -> Command {
    Command::cargo_bin("ryot-cli").expect("binary exists")
}

#[test]
fn compiles_file_into_three_artifacts() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("counter.ry");
    fs::write(&input_path, COUNTER).expect("write input");
    let out_dir = dir.path().join("out");

    ryot()
        .arg("--input")
        .arg(&input_path)
        .arg("--out-dir")
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Compiled Counter"));

    for name in ["abi.json", "bytecode.ryc", "bytecode.rybc"] {
        assert!(out_dir.join(name).exists(), "{name} was not created");
    }
    let rybc = fs::read(out_dir.join("bytecode.rybc")).expect("read rybc");
    assert_eq!(&rybc[..4], b"RYBC");
}

#[test]
fn emits_only_the_selected_artifact() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("counter.ry");
    fs::write(&input_path, COUNTER).expect("write input");
    let out_dir = dir.path().join("out");

    ryot()
        .arg("--input")
        .arg(&input_path)
        .arg("--out-dir")
        .arg(&out_dir)
        .arg("--emit")
        .arg("abi")
        .assert()
        .success();

    let abi = fs::read_to_string(out_dir.join("abi.json")).expect("read abi");
    assert!(abi.contains("\"name\": \"add\""));
    assert!(!out_dir.join("bytecode.ryc").exists());
    assert!(!out_dir.join("bytecode.rybc").exists());
}

#[test]
fn prints_disassembly_from_stdin() {
    let dir = tempdir().expect("tempdir");

    ryot()
        .arg("--out-dir")
        .arg(dir.path())
        .arg("--print")
        .write_stdin(COUNTER)
        .assert()
        .success()
        .stdout(predicate::str::contains("; ABI: Counter"))
        .stdout(predicate::str::contains("LOAD_ARG   0"));
}

#[test]
fn compiles_every_file_in_a_directory() {
    let dir = tempdir().expect("tempdir");
    let src = dir.path().join("src");
    fs::create_dir_all(&src).expect("mkdir");
    fs::write(src.join("counter.ry"), COUNTER).expect("write");
    fs::write(
        src.join("math.ry"),
        "pragma: \"1.0.0\";\nclass contract Math {\n    pub func one(): uint64 { return 1; }\n}\n",
    )
    .expect("write");
    let out_dir = dir.path().join("out");

    ryot()
        .arg("--input")
        .arg(&src)
        .arg("--out-dir")
        .arg(&out_dir)
        .assert()
        .success();

    assert!(out_dir.join("counter/bytecode.rybc").exists());
    assert!(out_dir.join("math/abi.json").exists());
}

#[test]
fn same_named_files_in_different_directories_keep_separate_artifacts() {
    let dir = tempdir().expect("tempdir");
    let src = dir.path().join("src");
    fs::create_dir_all(src.join("a")).expect("mkdir");
    fs::create_dir_all(src.join("b")).expect("mkdir");
    fs::write(
        src.join("a/token.ry"),
        "pragma: \"1.0.0\";\nclass contract Alpha {\n    pub func one(): uint64 { return 1; }\n}\n",
    )
    .expect("write");
    fs::write(
        src.join("b/token.ry"),
        "pragma: \"1.0.0\";\nclass contract Beta {\n    pub func two(): uint64 { return 2; }\n}\n",
    )
    .expect("write");
    let out_dir = dir.path().join("out");

    ryot()
        .arg("--input")
        .arg(&src)
        .arg("--out-dir")
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Compiled Alpha"))
        .stdout(predicate::str::contains("Compiled Beta"));

    let alpha = fs::read_to_string(out_dir.join("a/token/bytecode.ryc")).expect("read alpha");
    let beta = fs::read_to_string(out_dir.join("b/token/bytecode.ryc")).expect("read beta");
    assert!(alpha.starts_with("; ABI: Alpha\n"));
    assert!(beta.starts_with("; ABI: Beta\n"));
    assert!(!out_dir.join("token").exists());
}

#[test]
fn reports_version_mismatch() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("old.ry");
    fs::write(&input_path, "pragma: \"0.9.0\";\nclass contract Old {}\n").expect("write");
    let out_dir = dir.path().join("out");

    ryot()
        .arg("--input")
        .arg(&input_path)
        .arg("--out-dir")
        .arg(&out_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "compiler version mismatch: expected 1.0.0, got 0.9.0",
        ));

    assert!(!out_dir.exists(), "no artifacts should be written on failure");
}

#[test]
fn reports_parse_diagnostics() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("broken.ry");
    fs::write(&input_path, "pragma: \"1.0.0\";\nclass contract {}\n").expect("write");

    ryot()
        .arg("--input")
        .arg(&input_path)
        .arg("--out-dir")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "expected next token to be IDENT, got LBRACE",
        ));
}
