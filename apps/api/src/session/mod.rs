// Edit sessions: one document, its history, section layout and template per user.

pub mod editor;
pub mod handlers;
pub mod store;

pub use editor::{EditSession, SessionView};
pub use store::SessionStore;
