//! Package-document (OPF) location and parsing.

mod locator;
mod parser;

pub use locator::{CONTAINER_PATH, DEFAULT_PACKAGE_PATH, locate_package_document};
pub use parser::{PackageDoc, parse_package};
