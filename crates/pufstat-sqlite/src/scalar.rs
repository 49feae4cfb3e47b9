//! Per-row functions: `HW`, `FHW`, `HD`, `FHD`, `entropy`.

use pufstat_core::{
    fractional_hamming_distance, fractional_hamming_weight, hamming_distance, hamming_weight,
    shannon_entropy,
};
use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::{Connection, Result};

use crate::args::{response_arg, user_error};

pub(crate) fn register(db: &Connection, flags: FunctionFlags) -> Result<()> {
    db.create_scalar_function("HW", 1, flags, |ctx| {
        Ok(response_arg(ctx, 0, "HW")?.map(|v| hamming_weight(v) as i64))
    })?;

    db.create_scalar_function("FHW", 1, flags, |ctx| {
        Ok(response_arg(ctx, 0, "FHW")?.and_then(fractional_hamming_weight))
    })?;

    db.create_scalar_function("HD", 2, flags, |ctx| {
        let Some((a, b)) = response_pair(ctx, "HD")? else {
            return Ok(None);
        };
        let dist = hamming_distance(a, b).map_err(user_error)?;
        Ok(Some(dist as i64))
    })?;

    db.create_scalar_function("FHD", 2, flags, |ctx| {
        let Some((a, b)) = response_pair(ctx, "FHD")? else {
            return Ok(None);
        };
        fractional_hamming_distance(a, b).map_err(user_error)
    })?;

    db.create_scalar_function("entropy", 1, flags, |ctx| {
        Ok(response_arg(ctx, 0, "entropy")?.and_then(shannon_entropy))
    })?;

    Ok(())
}

/// Both arguments, or `None` when either is `NULL`.
fn response_pair<'a>(
    ctx: &'a Context<'_>,
    fn_name: &str,
) -> Result<Option<(&'a [u8], &'a [u8])>> {
    let a = response_arg(ctx, 0, fn_name)?;
    let b = response_arg(ctx, 1, fn_name)?;
    Ok(a.zip(b))
}
