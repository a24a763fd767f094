use assert_cmd::Command;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("bookshelf-cli").unwrap();
    cmd.env_remove("BOOKSHELF_ENV")
        .env_remove("BOOKSHELF_CONFIG_DIR")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_subcommands() {
    let output = cli().arg("--help").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    for command in ["serve", "init-db", "show-config"] {
        assert!(stdout.contains(command), "missing {command} in help");
    }
}

#[test]
fn show_config_prints_layered_settings() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("base.toml"),
        "[server]\nport = 9123\n\n[database]\nurl = \"sqlite::memory:\"\n",
    )
    .unwrap();

    let output = cli()
        .arg("--config-dir")
        .arg(dir.path())
        .arg("show-config")
        .output()
        .unwrap();
    assert!(output.status.success());

    let settings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(settings["server"]["port"], 9123);
    assert_eq!(settings["database"]["url"], "sqlite::memory:");
    assert_eq!(settings["environment"], "local");
}

#[test]
fn unknown_environment_fails() {
    let dir = tempfile::tempdir().unwrap();

    cli()
        .arg("--config-dir")
        .arg(dir.path())
        .args(["--env", "qa", "show-config"])
        .assert()
        .failure();
}

#[test]
fn init_db_creates_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("books.db");
    std::fs::write(
        dir.path().join("base.toml"),
        format!("[database]\nurl = \"sqlite:{}\"\n", db_path.display()),
    )
    .unwrap();

    cli()
        .arg("--config-dir")
        .arg(dir.path())
        .arg("init-db")
        .assert()
        .success();

    assert!(db_path.exists());
}
