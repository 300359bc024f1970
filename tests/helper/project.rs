//! Temporary project directory utilities

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// A temporary directory holding a package.json and a pnpm-lock.yaml
pub struct ProjectDir {
    dir: TempDir,
}

impl ProjectDir {
    pub fn new(manifest: &str, lockfile: &str) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), manifest).unwrap();
        fs::write(dir.path().join("pnpm-lock.yaml"), lockfile).unwrap();
        Self { dir }
    }

    pub fn manifest(&self) -> PathBuf {
        self.dir.path().join("package.json")
    }

    pub fn lockfile(&self) -> PathBuf {
        self.dir.path().join("pnpm-lock.yaml")
    }
}
