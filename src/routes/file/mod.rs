mod handler;
mod model;

pub use handler::{create_file, delete_file, read_file, read_files, update_file};
pub use model::FilesPublic;
