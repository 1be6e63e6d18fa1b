//! # dissector-tweak
//!
//! The library injected into iOS applications.
//!
//! On load it reads the Dissector preferences, loads the debugger they ask
//! for, and re-checks them every time the application becomes active. When
//! a debugger cannot be swapped in place it asks the user to restart the
//! application.
//!
//! Everything outside [`ios`] is platform independent and is what the
//! tests exercise.

#![allow(unsafe_code)] // Objective-C runtime calls

#[cfg(target_os = "ios")]
pub mod ios;
pub mod session;

use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;

pub use session::Session;

static SESSION: Lazy<Mutex<Option<Session>>> = Lazy::new(|| Mutex::new(None));

/// Make `session` the process-wide session, returning the previous one.
pub fn install(session: Session) -> Option<Session>
{
    SESSION.lock().unwrap_or_else(PoisonError::into_inner).replace(session)
}

/// Remove the process-wide session.
pub fn uninstall() -> Option<Session>
{
    SESSION.lock().unwrap_or_else(PoisonError::into_inner).take()
}

/// Run `f` against the installed session, if there is one.
pub fn with_session<R>(f: impl FnOnce(&mut Session) -> R) -> Option<R>
{
    SESSION.lock().unwrap_or_else(PoisonError::into_inner).as_mut().map(f)
}
