//! XAPK unpacking: unzip the bundle, then unzip known split APKs into
//! their own subdirectories for downstream asset extraction.

mod layout;

pub use layout::{NestedApk, XapkLayout};

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// What `unpack_xapk` did with each nested APK.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnpackReport {
    /// Subdirectories that were populated.
    pub extracted: Vec<PathBuf>,
    /// Nested APKs listed in the layout but absent from the bundle.
    pub missing: Vec<String>,
    /// Nested APKs that were present but could not be unzipped, with the error.
    pub failed: Vec<(String, String)>,
}

/// Unzip every entry of `archive` into `dest` (created if absent).
/// Returns the number of entries in the archive.
pub fn extract_zip(archive: &Path, dest: &Path) -> Result<usize> {
    let file = File::open(archive)
        .with_context(|| format!("failed to open archive: {}", archive.display()))?;
    let mut zip = zip::ZipArchive::new(file)
        .with_context(|| format!("failed to read zip archive: {}", archive.display()))?;

    fs::create_dir_all(dest)
        .with_context(|| format!("failed to create directory: {}", dest.display()))?;

    let entries = zip.len();
    zip.extract(dest).with_context(|| {
        format!("failed to extract {} to {}", archive.display(), dest.display())
    })?;
    tracing::info!(entries, "extracted {} to {}", archive.display(), dest.display());
    Ok(entries)
}

/// Unzip `bundle` into the layout's extraction directory, then each nested APK
/// into its subdirectory. A missing or broken nested APK is logged and
/// reported; only a failure on the outer bundle is an error.
pub fn unpack_xapk(bundle: &Path, layout: &XapkLayout) -> Result<UnpackReport> {
    extract_zip(bundle, layout.extract_dir())?;

    let mut report = UnpackReport::default();
    for apk in layout.nested() {
        let source = layout.source(apk);
        if !source.is_file() {
            tracing::warn!("{} not found in {}", apk.file_name, layout.extract_dir().display());
            report.missing.push(apk.file_name.clone());
            continue;
        }
        let dest = layout.destination(apk);
        match extract_zip(&source, &dest) {
            Ok(_) => report.extracted.push(dest),
            Err(e) => {
                tracing::warn!("failed to extract {}: {:#}", apk.file_name, e);
                report.failed.push((apk.file_name.clone(), format!("{:#}", e)));
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::CompressionMethod;

    fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut w = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            let opts = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
            w.start_file(*name, opts).unwrap();
            w.write_all(data).unwrap();
        }
        w.finish().unwrap().into_inner()
    }

    #[test]
    fn extract_zip_writes_entries() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("a.zip");
        fs::write(
            &archive,
            zip_bytes(&[("manifest.json", b"{}"), ("assets/data.bin", b"\x01\x02")]),
        )
        .unwrap();

        let out = dir.path().join("out");
        assert_eq!(extract_zip(&archive, &out).unwrap(), 2);
        assert_eq!(fs::read(out.join("manifest.json")).unwrap(), b"{}");
        assert_eq!(fs::read(out.join("assets/data.bin")).unwrap(), b"\x01\x02");
    }

    #[test]
    fn extract_zip_rejects_non_zip() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("broken.xapk");
        fs::write(&archive, b"<html>challenge page</html>").unwrap();
        let err = extract_zip(&archive, &dir.path().join("out")).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to read zip archive"));
    }

    #[test]
    fn unpack_xapk_extracts_nested_and_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        let base = zip_bytes(&[("classes.dex", b"dex"), ("assets/bin/Data/data.unity3d", b"unity")]);
        let config = zip_bytes(&[("lib/arm64-v8a/libil2cpp.so", b"elf")]);
        let bundle = dir.path().join("com.example.game.xapk");
        fs::write(
            &bundle,
            zip_bytes(&[
                ("manifest.json", b"{}"),
                ("com.example.game.apk", &base),
                ("config.arm64_v8a.apk", &config),
                ("broken.apk", b"not a zip"),
            ]),
        )
        .unwrap();

        let extract_dir = dir.path().join("jp_extracted");
        let layout = XapkLayout::standard(&extract_dir, "com.example.game", "base_apk")
            .with_nested("UnityDataAssetPack.apk", "UnityDataAssetPack")
            .with_nested("broken.apk", "broken");

        let report = unpack_xapk(&bundle, &layout).unwrap();

        assert_eq!(
            report.extracted,
            vec![extract_dir.join("config_arm64_v8a"), extract_dir.join("base_apk")]
        );
        assert_eq!(report.missing, vec!["UnityDataAssetPack.apk".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "broken.apk");
        assert_eq!(
            fs::read(extract_dir.join("config_arm64_v8a/lib/arm64-v8a/libil2cpp.so")).unwrap(),
            b"elf"
        );
        assert_eq!(
            fs::read(extract_dir.join("base_apk/assets/bin/Data/data.unity3d")).unwrap(),
            b"unity"
        );
    }

    #[test]
    fn unpack_xapk_fails_on_missing_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let layout = XapkLayout::new(dir.path().join("out"));
        assert!(unpack_xapk(&dir.path().join("nope.xapk"), &layout).is_err());
    }
}
