use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize the test logger once per process.
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Create a ZIP at `dir/name` holding the given `(entry name, content)` pairs.
pub fn create_test_zip(dir: &Path, name: &str, files: &[(&str, &[u8])]) -> PathBuf {
    let zip_path = dir.join(name);
    let file = fs::File::create(&zip_path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options =
        zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    for (entry_name, content) in files {
        writer.start_file(entry_name.to_string(), options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap();
    zip_path
}

/// Manifest with one resource; `scorm_type` controls the `adlcp:scormtype` attribute.
pub fn manifest_xml(href: &str, scorm_type: Option<&str>) -> String {
    let scorm_attr = scorm_type
        .map(|t| format!(r#" adlcp:scormtype="{t}""#))
        .unwrap_or_default();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest identifier="course_1" version="1.0"
    xmlns="http://www.imsproject.org/xsd/imscp_rootv1p1p2"
    xmlns:adlcp="http://www.adlnet.org/xsd/adlcp_rootv1p2">
  <metadata>
    <schema>ADL SCORM</schema>
    <schemaversion>1.2</schemaversion>
  </metadata>
  <organizations default="org_1">
    <organization identifier="org_1">
      <title>Safety Basics</title>
      <item identifier="item_1" identifierref="res_1">
        <title>Lesson 1</title>
      </item>
    </organization>
  </organizations>
  <resources>
    <resource identifier="res_1" type="webcontent"{scorm_attr} href="{href}">
      <file href="{href}"/>
    </resource>
  </resources>
</manifest>
"#
    )
}

/// Count non-overlapping occurrences of `needle` in the file at `path`.
pub fn count_in_file(path: &Path, needle: &str) -> usize {
    fs::read_to_string(path).unwrap().matches(needle).count()
}
