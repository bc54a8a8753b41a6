/// Filesystem discovery of source documents.
pub mod fs;
