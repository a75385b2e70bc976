//! Argument validation shared by setter handlers.

use std::ops::RangeInclusive;

use crate::scpi::ScpiError;
use crate::scpi::params::{NOT_NUMERIC, NumericForms, SubCommand, check_numeric, parse_float};

use super::tables::{SWITCH, TokenTable, value_for};

/// Parameter at `position`, or `MISSING_PARAM`.
pub(super) fn nth(parameters: &[SubCommand], position: usize) -> Result<&SubCommand, ScpiError> {
    parameters.get(position).ok_or(ScpiError::MissingParameter)
}

/// Enumerated token at `position`.
pub(super) fn token(
    parameters: &[SubCommand],
    position: usize,
    table: TokenTable,
) -> Result<i32, ScpiError> {
    value_for(table, &nth(parameters, position)?.head)
}

/// `ON`/`OFF` at `position`.
pub(super) fn switch(parameters: &[SubCommand], position: usize) -> Result<bool, ScpiError> {
    Ok(token(parameters, position, SWITCH)? != 0)
}

/// One-based index into a fixed domain, returned zero-based.
pub(super) fn index(text: &str, domain: RangeInclusive<usize>) -> Result<usize, ScpiError> {
    let number = check_numeric(text, NumericForms::DECIMAL);
    if number == NOT_NUMERIC {
        return Err(ScpiError::DataType);
    }
    let value = usize::try_from(number).map_err(|_| ScpiError::DataOutOfRange)?;
    if !domain.contains(&value) {
        return Err(ScpiError::DataOutOfRange);
    }
    Ok(value - domain.start())
}

/// Integer within `range`, in any of `forms`.
pub(super) fn integer(
    text: &str,
    forms: NumericForms,
    range: RangeInclusive<i64>,
) -> Result<i64, ScpiError> {
    let value = check_numeric(text, forms);
    if value == NOT_NUMERIC {
        return Err(ScpiError::DataType);
    }
    if !range.contains(&value) {
        return Err(ScpiError::NumericData);
    }
    Ok(value)
}

/// Floating-point literal within `range`.
pub(super) fn float(text: &str, range: RangeInclusive<f64>) -> Result<f64, ScpiError> {
    let value = parse_float(text).ok_or(ScpiError::DataType)?;
    if !range.contains(&value) {
        return Err(ScpiError::NumericData);
    }
    Ok(value)
}
