pub mod languages;
pub mod paths;

pub use languages::language_for_path;
pub use paths::{decode_project_dir, validate_file_size};
