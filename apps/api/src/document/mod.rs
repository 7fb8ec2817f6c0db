// Document Model: the CV data structure and its pure mutation operations.
// No validation happens here; required fields and formats are the wizard's concern.

pub mod commands;
pub mod models;
pub mod mutations;
pub mod skills;

pub use commands::{apply_all, EditCommand};
pub use models::CVDocument;
