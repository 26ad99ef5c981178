use super::AppContext;
use crate::services::analyzer::AnalysisReport;
use crate::services::pipeline::{self, InstrumentReport, PlayOutcome};
use crate::services::repair::{repair_package, RepairReport};
use crate::services::storage::derived_archive_name;
use std::path::Path;

pub fn analyze(ctx: &AppContext, archive: &Path) -> AnalysisReport {
    pipeline::analyze_path(archive, &ctx.settings)
}

pub fn repair(ctx: &AppContext, archive: &Path, output: Option<&Path>) -> RepairReport {
    match output {
        Some(output) => match pipeline::open_package(archive, &ctx.settings) {
            Ok(package) => repair_package(&package, output, &ctx.settings),
            Err(e) => RepairReport::failed(&e),
        },
        None => pipeline::repair_to_storage(archive, &ctx.layout, &ctx.settings),
    }
}

pub fn instrument(ctx: &AppContext, archive: &Path) -> InstrumentReport {
    pipeline::instrument_to_storage(archive, &ctx.layout, &ctx.settings)
}

pub fn play(ctx: &AppContext, archive: &Path) -> PlayOutcome {
    let output = ctx
        .layout
        .repaired_dir()
        .join(derived_archive_name(archive, &ctx.settings.repaired_suffix));
    pipeline::repair_and_play(archive, &output, &ctx.store, &ctx.settings)
}
