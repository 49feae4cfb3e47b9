//! Aggregates `bitaliasing(v)` and `reliability(ref, v)`.
//!
//! Each returns one packed `f64` per bit of the response, or `NULL` when no
//! non-null row reached the step function. A row whose length differs from
//! the first one aborts the statement.

use log::warn;
use pufstat_core::{BitAliasing, PufError, Reliability, encode_f64_vector};
use rusqlite::functions::{Aggregate, Context, FunctionFlags};
use rusqlite::{Connection, Result};

use crate::args::{response_arg, user_error};

pub(crate) fn register(db: &Connection, flags: FunctionFlags) -> Result<()> {
    db.create_aggregate_function("bitaliasing", 1, flags, BitAliasingFn)?;
    db.create_aggregate_function("reliability", 2, flags, ReliabilityFn)?;
    Ok(())
}

struct BitAliasingFn;

impl Aggregate<BitAliasing, Option<Vec<u8>>> for BitAliasingFn {
    fn init(&self, _ctx: &mut Context<'_>) -> Result<BitAliasing> {
        Ok(BitAliasing::new())
    }

    fn step(&self, ctx: &mut Context<'_>, acc: &mut BitAliasing) -> Result<()> {
        let Some(response) = response_arg(ctx, 0, "bitaliasing")? else {
            return Ok(());
        };
        acc.push(response)
            .map_err(|err| rejected("bitaliasing", acc.samples(), err))
    }

    fn finalize(
        &self,
        _ctx: &mut Context<'_>,
        acc: Option<BitAliasing>,
    ) -> Result<Option<Vec<u8>>> {
        Ok(acc
            .and_then(|acc| acc.finish())
            .map(|profile| encode_f64_vector(&profile)))
    }
}

struct ReliabilityFn;

impl Aggregate<Reliability, Option<Vec<u8>>> for ReliabilityFn {
    fn init(&self, _ctx: &mut Context<'_>) -> Result<Reliability> {
        Ok(Reliability::new())
    }

    fn step(&self, ctx: &mut Context<'_>, acc: &mut Reliability) -> Result<()> {
        let reference = response_arg(ctx, 0, "reliability")?;
        let sample = response_arg(ctx, 1, "reliability")?;
        let (Some(reference), Some(sample)) = (reference, sample) else {
            return Ok(());
        };
        acc.push(reference, sample)
            .map_err(|err| rejected("reliability", acc.samples(), err))
    }

    fn finalize(
        &self,
        _ctx: &mut Context<'_>,
        acc: Option<Reliability>,
    ) -> Result<Option<Vec<u8>>> {
        Ok(acc
            .and_then(|acc| acc.finish())
            .map(|profile| encode_f64_vector(&profile)))
    }
}

fn rejected(fn_name: &str, accepted: u64, err: PufError) -> rusqlite::Error {
    warn!("{fn_name}(): rejecting row after {accepted} accepted: {err}");
    user_error(err)
}
