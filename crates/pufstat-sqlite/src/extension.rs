//! Loadable-extension entry point.
//!
//! SQLite's `load_extension("libsqlite_puf")` resolves
//! `sqlite3_extension_init` and hands it the host connection.

use std::os::raw::{c_char, c_int};

use log::debug;
use rusqlite::{Connection, ffi};

/// # Safety
///
/// Must only be called by SQLite's extension loader, which passes a valid
/// connection handle, error-message slot and API routine table.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlite3_extension_init(
    db: *mut ffi::sqlite3,
    pz_err_msg: *mut *mut c_char,
    p_api: *mut ffi::sqlite3_api_routines,
) -> c_int {
    unsafe { Connection::extension_init2(db, pz_err_msg, p_api, init) }
}

fn init(db: Connection) -> rusqlite::Result<bool> {
    crate::register_functions(&db)?;
    debug!("PUF extension loaded");
    // Not persistent: functions are registered again on every load.
    Ok(false)
}
