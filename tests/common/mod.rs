#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

pub const PAGE: &[u8] = b"<html><head><title>Lesson</title></head><body></body></html>";

pub fn write_zip(dir: &Path, name: &str, files: &[(&str, &[u8])]) -> PathBuf {
    let zip_path = dir.join(name);
    let file = fs::File::create(&zip_path).expect("zip file should be created");
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for (entry_name, content) in files {
        writer
            .start_file(entry_name.to_string(), options)
            .expect("entry should start");
        writer.write_all(content).expect("entry should be written");
    }
    writer.finish().expect("zip should finish");
    zip_path
}

/// Manifest exported by an authoring tool that points at a page it never
/// shipped and carries no SCO flag.
pub fn broken_export_manifest() -> String {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest identifier="export_42" version="1"
    xmlns="http://www.imsproject.org/xsd/imscp_rootv1p1p2">
  <organizations default="ORG">
    <organization identifier="ORG">
      <title>Workplace Safety</title>
      <item identifier="I1" identifierref="R1"><title>Module 1</title></item>
    </organization>
  </organizations>
  <resources>
    <resource identifier="R1" type="webcontent" href="missing.html">
      <file href="missing.html"/>
    </resource>
  </resources>
</manifest>
"#
    .to_string()
}

pub fn read_entry(archive: &Path, name: &str) -> String {
    scormfix_lib::services::archive::read_entry_to_string(archive, name, u64::MAX)
        .expect("entry should be readable")
}
