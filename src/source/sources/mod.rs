/// JSON document source backed by a single file.
pub mod json_file;
