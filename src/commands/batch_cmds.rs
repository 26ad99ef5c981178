use super::AppContext;
use crate::cli::BatchArgs;
use crate::services::batch::{self, BatchMode, BatchOptions, BatchOutcome};
use crate::types::PackageError;

pub fn run_batch(ctx: &AppContext, args: &BatchArgs) -> Result<BatchOutcome, PackageError> {
    let options = BatchOptions {
        mode: if args.repair {
            BatchMode::Repair
        } else {
            BatchMode::Analyze
        },
        parallel: args.parallel,
    };
    batch::run_batch(&args.folder, options, &ctx.store, &ctx.settings)
}
