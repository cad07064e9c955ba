//! Directory layout for an unpacked XAPK bundle.

use std::path::{Path, PathBuf};

/// A split APK inside the bundle and the subdirectory it is unzipped into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedApk {
    pub file_name: String,
    pub subdir: String,
}

/// Where the bundle is unzipped, and which nested APKs get their own directory.
#[derive(Debug, Clone)]
pub struct XapkLayout {
    extract_dir: PathBuf,
    nested: Vec<NestedApk>,
}

impl XapkLayout {
    /// Layout with no nested APKs: only the outer bundle is unzipped.
    pub fn new(extract_dir: impl Into<PathBuf>) -> Self {
        Self {
            extract_dir: extract_dir.into(),
            nested: Vec::new(),
        }
    }

    /// The usual split set for an arm64 bundle of `package`: the native
    /// config split into `config_arm64_v8a`, and the base APK into `base_subdir`.
    pub fn standard(
        extract_dir: impl Into<PathBuf>,
        package: &str,
        base_subdir: impl Into<String>,
    ) -> Self {
        Self::new(extract_dir)
            .with_nested("config.arm64_v8a.apk", "config_arm64_v8a")
            .with_nested(format!("{}.apk", package), base_subdir)
    }

    /// Also unzip `file_name` (found at the top of the bundle) into `subdir`.
    pub fn with_nested(mut self, file_name: impl Into<String>, subdir: impl Into<String>) -> Self {
        self.nested.push(NestedApk {
            file_name: file_name.into(),
            subdir: subdir.into(),
        });
        self
    }

    pub fn extract_dir(&self) -> &Path {
        &self.extract_dir
    }

    pub fn nested(&self) -> &[NestedApk] {
        &self.nested
    }

    /// Path of the nested APK after the bundle has been unzipped.
    pub fn source(&self, apk: &NestedApk) -> PathBuf {
        self.extract_dir.join(&apk.file_name)
    }

    /// Directory the nested APK is unzipped into.
    pub fn destination(&self, apk: &NestedApk) -> PathBuf {
        self.extract_dir.join(&apk.subdir)
    }
}
