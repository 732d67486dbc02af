mod file_set;
mod types;

pub use file_set::{Rejection, StagedFileSet};
pub use types::{Category, StagedFile};
