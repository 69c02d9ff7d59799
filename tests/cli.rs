//! End-to-end tests for the `edp` binary. Editors are shell scripts.

mod util;

use assert_fs::prelude::*;
use predicates::prelude::*;
use util::{CHANGED, CONTENTS, Fixture};

#[test]
fn which_splits_editor_on_spaces()
{
    let fx = Fixture::new();

    fx.edp()
        .env("EDITOR", "   edit  -p  -a   ")
        .arg("which")
        .assert()
        .success()
        .stdout("edit -p -a\n");
}

#[test]
fn which_falls_back_to_vi()
{
    let fx = Fixture::new();

    fx.edp()
        .arg("which")
        .assert()
        .success()
        .stdout("vi\n");

    fx.edp()
        .env("EDITOR", "")
        .arg("which")
        .assert()
        .success()
        .stdout("vi\n");
}

#[test]
fn which_prefers_flag_then_config()
{
    let fx = Fixture::new();
    fx.root
        .child("editprompt.toml")
        .write_str("editor = \"nano -w\"\n")
        .unwrap();

    fx.edp()
        .env("EDITOR", "emacs")
        .arg("which")
        .assert()
        .success()
        .stdout("nano -w\n");

    fx.edp()
        .env("EDITOR", "emacs")
        .args(["which", "--editor", "hx"])
        .assert()
        .success()
        .stdout("hx\n");
}

#[test]
fn missing_file_fails()
{
    let fx = Fixture::new();

    fx.edp()
        .args(["edit", "absent.txt", "--editor", "true"])
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("error: cannot stat"))
        .stderr(predicate::str::contains("absent.txt"));
}

#[test]
fn completions_print_to_stdout()
{
    let fx = Fixture::new();

    fx.edp()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("edp"));
}

#[test]
fn dry_run_launches_nothing()
{
    let fx = Fixture::new();

    fx.edp()
        .args(["--dry-run", "edit", "target.txt", "--editor", "false", "--utf8"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DRY RUN"))
        .stdout(predicate::str::contains("Editor: false"))
        .stdout(predicate::str::contains("Checks: utf8"));

    assert_eq!(fx.read_target(), CONTENTS);
}

#[test]
fn init_writes_config()
{
    let fx = Fixture::new();

    fx.edp()
        .arg("init")
        .assert()
        .success();

    fx.root
        .child("editprompt.toml")
        .assert(predicate::str::contains("temp_prefix = \"editprompt-\""));

    fx.edp()
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[cfg(unix)]
mod scripted
{
    use super::*;

    #[test]
    fn valid_change_is_committed()
    {
        let fx = Fixture::new();
        let editor = fx.editor_script("ed.sh", &format!("printf '{CHANGED}' > \"$1\""));

        fx.edp()
            .args(["edit", "target.txt", "--utf8", "--editor"])
            .arg(&editor)
            .assert()
            .success()
            .stdout(predicate::str::contains("Updated"));

        assert_eq!(fx.read_target(), CHANGED);
        assert!(fx.leftover_temp_files().is_empty());
    }

    #[test]
    fn editor_params_come_before_path()
    {
        let fx = Fixture::new();
        // $1 is the param, $2 the temp file
        let editor = fx.editor_script("ed.sh", "printf '%s' \"$1\" > \"$2\"");

        fx.edp()
            .args(["edit", "target.txt", "--editor"])
            .arg(format!("{editor}  replaced"))
            .assert()
            .success();

        assert_eq!(fx.read_target(), "replaced");
    }

    #[test]
    fn unchanged_reports_no_changes()
    {
        let fx = Fixture::new();

        // A failing check proves validation never runs for unchanged content
        fx.edp()
            .args(["edit", "target.txt", "--editor", "true", "--check", "false"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No changes"));

        assert_eq!(fx.read_target(), CONTENTS);
        assert!(fx.leftover_temp_files().is_empty());
    }

    #[test]
    fn rejected_change_leaves_original()
    {
        let fx = Fixture::new();
        let editor = fx.editor_script("ed.sh", &format!("printf '{CHANGED}' > \"$1\""));
        let check = fx.editor_script("check.sh", "echo invalid >&2; exit 1");

        fx.edp()
            .args(["edit", "target.txt", "--editor"])
            .arg(&editor)
            .arg("--check")
            .arg(&check)
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid"));

        assert_eq!(fx.read_target(), CONTENTS);
        assert!(fx.leftover_temp_files().is_empty());
    }

    #[test]
    fn empty_content_rejected_by_non_empty()
    {
        let fx = Fixture::new();
        let editor = fx.editor_script("ed.sh", ": > \"$1\"");

        fx.edp()
            .args(["edit", "target.txt", "--non-empty", "--editor"])
            .arg(&editor)
            .assert()
            .failure()
            .stderr(predicate::str::contains("content is empty"));

        assert_eq!(fx.read_target(), CONTENTS);
    }

    #[test]
    fn editor_failure_leaves_original()
    {
        let fx = Fixture::new();
        let editor = fx.editor_script("ed.sh", &format!("printf '{CHANGED}' > \"$1\"; exit 3"));

        fx.edp()
            .args(["edit", "target.txt", "--editor"])
            .arg(&editor)
            .assert()
            .failure()
            .stderr(predicate::str::contains("exited with"));

        assert_eq!(fx.read_target(), CONTENTS);
        assert!(fx.leftover_temp_files().is_empty());
    }

    #[test]
    fn editor_from_env_is_used()
    {
        let fx = Fixture::new();
        let editor = fx.editor_script("ed.sh", &format!("printf '{CHANGED}' > \"$1\""));

        fx.edp()
            .env("EDITOR", &editor)
            .args(["edit", "target.txt"])
            .assert()
            .success();

        assert_eq!(fx.read_target(), CHANGED);
    }

    #[test]
    fn atomic_commit_keeps_mode()
    {
        use std::os::unix::fs::PermissionsExt;

        let fx = Fixture::new();
        std::fs::set_permissions(fx.target(), std::fs::Permissions::from_mode(0o640)).unwrap();
        let editor = fx.editor_script("ed.sh", &format!("printf '{CHANGED}' > \"$1\""));

        fx.edp()
            .args(["edit", "target.txt", "--atomic", "--editor"])
            .arg(&editor)
            .assert()
            .success();

        assert_eq!(fx.read_target(), CHANGED);
        let mode = std::fs::metadata(fx.target())
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o640);
    }
}
