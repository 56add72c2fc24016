pub mod editor;
pub mod types;

pub use editor::{load_session, PendingSave, SessionEditor};
pub use types::{EditableSet, FieldValue, Session, SessionEntry, SetField};
