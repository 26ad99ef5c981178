//! Structural repair of course packages.
//!
//! A package is extracted into a private working directory, its manifest is
//! brought into shape by an ordered list of idempotent fixes, the launch page
//! receives the API shim, and the tree is repacked into a new archive. The
//! source archive is never modified. Running the engine on its own output
//! applies no further repairs.

pub mod launch;
mod types;

pub use types::RepairReport;

use crate::services::archive;
use crate::services::config::EngineSettings;
use crate::services::instrument::{self, snippets};
use crate::services::manifest::builder::{
    default_organization, sco_resource, DEFAULT_ORGANIZATION_ID, DEFAULT_RESOURCE_ID,
};
use crate::services::manifest::model::{Organizations, Resources};
use crate::services::manifest::{
    find_manifest_in_tree, ManifestBuilder, ManifestDocument, MANIFEST_FILE_NAME,
};
use crate::types::{Package, PackageError};
use launch::PLACEHOLDER_HREF;
use std::fs;
use std::path::{Path, PathBuf};
use types::RepairLog;

/// Repair `package` and write the result to `output`.
///
/// Never fails: errors come back as `success: false` and leave nothing at
/// `output`. A package without any HTML page still repairs, with a warning and
/// no launch file.
pub fn repair_package(
    package: &Package,
    output: &Path,
    settings: &EngineSettings,
) -> RepairReport {
    match run_repair(package, output, settings) {
        Ok(report) => {
            log::info!(
                "Repaired {} with {} fix(es) into {}",
                package.file_name(),
                report.repairs.len(),
                output.display()
            );
            report
        }
        Err(e) => {
            log::error!("Repair of {} failed: {e}", package.file_name());
            RepairReport::failed(&e)
        }
    }
}

fn run_repair(
    package: &Package,
    output: &Path,
    settings: &EngineSettings,
) -> Result<RepairReport, PackageError> {
    // Removed on drop, whichever way this function returns
    let work = tempfile::Builder::new()
        .prefix("scormfix-repair-")
        .tempdir()?;
    let root = work.path();

    archive::extract_zip(&package.source_path, root).map_err(PackageError::FilesystemFailure)?;

    let mut log = RepairLog::default();
    let (manifest_path, mut document) =
        load_or_create_manifest(root, package, settings, &mut log)?;
    let base_dir = manifest_path.parent().unwrap_or(root).to_path_buf();

    if document.ensure_adlcp_namespace() {
        log.fixed("Added adlcp namespace declaration".to_string());
    }

    let added = document.ensure_schema_metadata(&settings.default_schema_version);
    if !added.is_empty() {
        log.fixed(format!("Added schema metadata ({})", added.join(", ")));
    }

    let launch_target =
        repair_resources(&mut document, &base_dir, &package.stem(), settings, &mut log);

    if let Some((href, path)) = &launch_target {
        if instrument::is_html_path(path) {
            let shim = snippets::api_shim_snippet(&settings.shim_url);
            let injected = instrument::inject_file(path, &[shim])
                .map_err(PackageError::FilesystemFailure)?;
            if injected > 0 {
                log.fixed(format!("Injected API shim into {href}"));
            }
        }
    }

    let xml = document.to_xml().map_err(PackageError::FilesystemFailure)?;
    fs::write(&manifest_path, xml)?;

    archive::pack_directory(root, output).map_err(PackageError::FilesystemFailure)?;

    Ok(RepairReport {
        success: true,
        repairs: log.repairs,
        launch_file: launch_target.map(|(href, _)| href),
        warnings: log.warnings,
        output_path: Some(output.to_path_buf()),
        error: None,
    })
}

/// Steps 1 and 2: use the existing manifest when it parses, otherwise build
/// a fresh one next to it (or at the package root when there is none).
fn load_or_create_manifest(
    root: &Path,
    package: &Package,
    settings: &EngineSettings,
    log: &mut RepairLog,
) -> Result<(PathBuf, ManifestDocument), PackageError> {
    let Some(path) = find_manifest_in_tree(root) else {
        let (document, found) = synthesize_manifest(root, package, settings);
        log.fixed(match found {
            Some(href) => format!("Created missing imsmanifest.xml (launch file: {href})"),
            None => "Created missing imsmanifest.xml (no launch file found)".to_string(),
        });
        return Ok((root.join(MANIFEST_FILE_NAME), document));
    };

    let bytes = fs::read(&path)?;
    let text = String::from_utf8_lossy(&bytes);
    match ManifestDocument::parse(&text) {
        Ok(document) => Ok((path, document)),
        Err(PackageError::MalformedManifest(reason)) => {
            let base_dir = path.parent().unwrap_or(root);
            let (document, found) = synthesize_manifest(base_dir, package, settings);
            log.fixed(match found {
                Some(href) => {
                    format!("Rebuilt malformed imsmanifest.xml ({reason}); launch file: {href}")
                }
                None => {
                    format!("Rebuilt malformed imsmanifest.xml ({reason}); no launch file found")
                }
            });
            Ok((path, document))
        }
        Err(e) => Err(e),
    }
}

/// Fresh single-SCO manifest. The second value is the launch file that was
/// found; `None` means the placeholder href was used.
fn synthesize_manifest(
    base_dir: &Path,
    package: &Package,
    settings: &EngineSettings,
) -> (ManifestDocument, Option<String>) {
    let found = launch::find_launch_file(base_dir, &settings.launch_candidates)
        .map(|path| launch::relative_href(base_dir, &path));

    let document = ManifestBuilder::new(found.as_deref().unwrap_or(PLACEHOLDER_HREF))
        .title(&package.stem())
        .schema_version(&settings.default_schema_version)
        .build();
    (document, found)
}

/// Step 5: the first resource must exist, be SCO-typed and point at a real
/// file. Returns the resolved launch href and its path on disk.
fn repair_resources(
    document: &mut ManifestDocument,
    base_dir: &Path,
    fallback_title: &str,
    settings: &EngineSettings,
    log: &mut RepairLog,
) -> Option<(String, PathBuf)> {
    let scorm_type_attr = document.scorm_type_attr();

    if document.primary_resource().is_none() {
        let href = launch::find_launch_file(base_dir, &settings.launch_candidates)
            .map(|path| launch::relative_href(base_dir, &path))
            .unwrap_or_else(|| PLACEHOLDER_HREF.to_string());

        document
            .resources
            .get_or_insert_with(Resources::default)
            .resources
            .push(sco_resource(DEFAULT_RESOURCE_ID, &href, scorm_type_attr));
        log.fixed(format!("Created resources block with SCO resource ({href})"));

        if document.organization_count() == 0 {
            let title = document
                .title()
                .unwrap_or_else(|| fallback_title.to_string());
            let organizations = document
                .organizations
                .get_or_insert_with(Organizations::default);
            if !organizations.attributes.contains("default") {
                organizations
                    .attributes
                    .set("default", DEFAULT_ORGANIZATION_ID);
            }
            organizations
                .organizations
                .push(default_organization(&title, DEFAULT_RESOURCE_ID));
            log.fixed("Added default organization".to_string());
        }
    }

    let resource = document.primary_resource_mut()?;

    if resource.scorm_type().is_none() {
        resource.attributes.set(scorm_type_attr, "sco");
        log.fixed("Set SCO type on primary resource".to_string());
    }

    let current = resource.href().map(str::to_string);
    let resolved = current
        .as_deref()
        .and_then(|href| launch::resolve_href(base_dir, href));
    if let (Some(href), Some(path)) = (&current, resolved) {
        return Some((href.clone(), path));
    }

    match launch::find_launch_file(base_dir, &settings.launch_candidates) {
        Some(path) => {
            let href = launch::relative_href(base_dir, &path);
            resource.set_href(&href);
            match current {
                Some(old) => log.fixed(format!("Fixed broken launch file: '{old}' -> '{href}'")),
                None => log.fixed(format!("Set missing launch file: '{href}'")),
            }
            Some((href, path))
        }
        None => {
            log.warn(format!(
                "{}; manifest href left as '{}'",
                PackageError::UnresolvableLaunchFile,
                current.as_deref().unwrap_or_default()
            ));
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/repair_tests.rs"]
mod tests;
