pub mod errors;
pub mod package;

pub use errors::{PackageError, PackageResult};
pub use package::Package;
