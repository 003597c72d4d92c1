//! Download package assembly.

mod assembler;
mod error;

pub use assembler::{PackageAssembler, PackageOutcome, PackageSettings};
pub use error::PackageError;
