//! Operations behind the screens other than the workout editor.
//!
//! Each command validates its input before touching the service and
//! returns `LiftLogError`; the shell decides how to report it.

pub mod auth;
pub mod exercises;
pub mod history;
pub mod stats;
pub mod templates;
