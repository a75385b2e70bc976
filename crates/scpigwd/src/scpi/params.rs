//! Parameter tail parsing and numeric literal helpers.
//!
//! Nothing here fails: malformed numbers come back as [`NOT_NUMERIC`] or
//! `false`, and handlers decide which SCPI error that deserves.

/// Sentinel returned by the integer helpers for malformed input.
pub(crate) const NOT_NUMERIC: i64 = -1;

/// One whitespace-separated parameter, split at its first embedded `:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SubCommand {
    pub(crate) head: String,
    pub(crate) tail: Option<String>,
}

impl SubCommand {
    /// The token as the client typed it.
    pub(crate) fn original(&self) -> String {
        self.tail
            .as_ref()
            .map_or_else(|| self.head.clone(), |tail| format!("{}:{tail}", self.head))
    }
}

/// Splits a residual tail into ordered parameters.
///
/// `X:Y` with both sides present becomes `head = X, tail = Some(Y)`; every
/// other token is kept whole as the head.
pub(crate) fn pre_parse_parameters(tail: &str) -> Vec<SubCommand> {
    tail.split_whitespace()
        .map(|token| match token.split_once(':') {
            Some((head, rest)) if !head.is_empty() && !rest.is_empty() => SubCommand {
                head: head.to_owned(),
                tail: Some(rest.to_owned()),
            },
            _ => SubCommand {
                head: token.to_owned(),
                tail: None,
            },
        })
        .collect()
}

/// Radix prefixes an integer parameter may carry besides plain decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NumericForms {
    hex: bool,
    binary: bool,
}

impl NumericForms {
    /// Decimal digits only.
    pub(crate) const DECIMAL: Self = Self {
        hex: false,
        binary: false,
    };
    /// Decimal, `#H` hexadecimal and `#B` binary.
    pub(crate) const BASED: Self = Self {
        hex: true,
        binary: true,
    };
}

/// Parses a non-negative integer, returning [`NOT_NUMERIC`] when malformed.
pub(crate) fn check_numeric(token: &str, forms: NumericForms) -> i64 {
    let (digits, radix) = match split_radix(token) {
        Some((b'H', digits)) if forms.hex => (digits, 16),
        Some((b'B', digits)) if forms.binary => (digits, 2),
        Some(_) => return NOT_NUMERIC,
        None => (token, 10),
    };
    parse_unsigned(digits, radix)
}

/// Parses a hexadecimal literal with an optional `#H` prefix.
pub(crate) fn ascii_to_hex_sdh(token: &str) -> i64 {
    let digits = match split_radix(token) {
        Some((b'H', digits)) => digits,
        Some(_) => return NOT_NUMERIC,
        None => token,
    };
    parse_unsigned(digits, 16)
}

/// Accepts decimal and scientific floating-point literals: `5`, `-0.5`,
/// `.25`, `1.0e-3`.
pub(crate) fn is_float_e(token: &str) -> bool {
    let (mantissa, exponent) = split_exponent(token);
    is_decimal(mantissa) && exponent.is_none_or(is_exponent)
}

/// Accepts SDH-style mantissa/exponent literals such as `1E-3` or
/// `1.5E-06`; the exponent is mandatory.
pub(crate) fn is_float_sdh(token: &str) -> bool {
    let (mantissa, exponent) = split_exponent(token);
    is_decimal(mantissa) && exponent.is_some_and(is_exponent)
}

/// Parses a float accepted by either literal form.
pub(crate) fn parse_float(token: &str) -> Option<f64> {
    if is_float_e(token) || is_float_sdh(token) {
        token.parse().ok()
    } else {
        None
    }
}

/// Re-joins parameters with single spaces, truncated to `max_len` characters.
pub(crate) fn join_free_text(parameters: &[SubCommand], max_len: usize) -> String {
    let joined = parameters
        .iter()
        .map(SubCommand::original)
        .collect::<Vec<_>>()
        .join(" ");
    joined.chars().take(max_len).collect()
}

fn split_radix(token: &str) -> Option<(u8, &str)> {
    let rest = token.strip_prefix('#')?;
    let marker = rest.bytes().next()?.to_ascii_uppercase();
    Some((marker, rest.get(1..).unwrap_or_default()))
}

fn parse_unsigned(digits: &str, radix: u32) -> i64 {
    if digits.is_empty() || !digits.chars().all(|digit| digit.is_digit(radix)) {
        return NOT_NUMERIC;
    }
    i64::from_str_radix(digits, radix).unwrap_or(NOT_NUMERIC)
}

fn split_exponent(token: &str) -> (&str, Option<&str>) {
    token.find(['e', 'E']).map_or((token, None), |index| {
        let (mantissa, exponent) = token.split_at(index);
        (mantissa, exponent.get(1..))
    })
}

fn is_decimal(mantissa: &str) -> bool {
    let unsigned = mantissa
        .strip_prefix(['+', '-'])
        .unwrap_or(mantissa);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
    !(whole.is_empty() && fraction.is_empty()) && digits(whole) && digits(fraction)
}

fn is_exponent(exponent: &str) -> bool {
    let digits = exponent
        .strip_prefix(['+', '-'])
        .unwrap_or(exponent);
    !digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit())
}
