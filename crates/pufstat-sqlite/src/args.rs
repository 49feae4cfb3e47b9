use rusqlite::functions::Context;
use rusqlite::types::ValueRef;
use rusqlite::{Error, Result};

/// Response bytes of argument `idx`, or `None` for SQL `NULL`.
///
/// `TEXT` is read as its raw bytes, the way SQLite itself hands a text value
/// to `sqlite3_value_blob`. Numbers are rejected.
pub(crate) fn response_arg<'a>(
    ctx: &'a Context<'_>,
    idx: usize,
    fn_name: &str,
) -> Result<Option<&'a [u8]>> {
    match ctx.get_raw(idx) {
        ValueRef::Null => Ok(None),
        ValueRef::Blob(bytes) | ValueRef::Text(bytes) => Ok(Some(bytes)),
        ValueRef::Integer(_) | ValueRef::Real(_) => Err(user_error(format!(
            "{fn_name}(): argument {} must be a BLOB, got a number",
            idx + 1
        ))),
    }
}

pub(crate) fn user_error<E>(err: E) -> Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
{
    Error::UserFunctionError(err.into())
}
