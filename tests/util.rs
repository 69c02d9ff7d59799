//! Shared test utilities for integration tests
//!
//! Builds a fixture directory with a target file, a private temp dir and
//! small shell scripts that stand in for an interactive editor.

#![allow(dead_code)]

use assert_cmd::Command;
use assert_fs::prelude::*;
use std::path::PathBuf;

pub const CONTENTS: &str = "Hello!";
pub const CHANGED: &str = "Hello world!";

/// Fixture root holding `target.txt` and an isolated `tmp/`
pub struct Fixture
{
    pub root: assert_fs::TempDir,
}

impl Fixture
{
    pub fn new() -> Self
    {
        let root = assert_fs::TempDir::new().expect("tempdir");
        root.child("target.txt")
            .write_str(CONTENTS)
            .expect("write target");
        root.child("tmp")
            .create_dir_all()
            .expect("create tmp dir");
        Self { root }
    }

    pub fn target(&self) -> PathBuf
    {
        self.root
            .path()
            .join("target.txt")
    }

    pub fn read_target(&self) -> String
    {
        std::fs::read_to_string(self.target()).expect("read target")
    }

    /// Write a shell script that acts as the editor and return the
    /// command line running it. `$1` is the temp file path.
    pub fn editor_script(
        &self,
        name: &str,
        body: &str,
    ) -> String
    {
        let script = self
            .root
            .child(name);
        script
            .write_str(&format!("{body}\n"))
            .expect("write script");

        // Run through `sh` so the script never needs the exec bit
        format!("sh {}", script.path().display())
    }

    /// Names left in the private temp dir
    pub fn leftover_temp_files(&self) -> Vec<String>
    {
        std::fs::read_dir(self.root.path().join("tmp"))
            .expect("read tmp")
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect()
    }

    /// `edp` running in the fixture root with a clean environment
    pub fn edp(&self) -> Command
    {
        let mut cmd = Command::cargo_bin("edp").expect("binary");
        cmd.current_dir(self.root.path())
            .env("TMPDIR", self.root.path().join("tmp"))
            .env_remove("EDITOR")
            .env_remove("EDITPROMPT_EDITOR")
            .env_remove("EDITPROMPT_COMMIT")
            .env_remove("EDITPROMPT_TEMP_PREFIX")
            .env_remove("EDITPROMPT_LOG")
            .arg("--no-color");
        cmd
    }
}
