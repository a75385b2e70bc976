//! Token tables between engine enumeration values and SCPI text.

use scpi_engine::codes::{alarm, clock, error_mode, error_type, interface, mapping, pattern};

use crate::scpi::ScpiError;

/// Static `(engine value, canonical SCPI token)` pairs.
pub(crate) type TokenTable = &'static [(i32, &'static str)];

pub(crate) const INTERFACES: TokenTable = &[
    (interface::OTU1, "OTU1"),
    (interface::OTU2, "OTU2"),
    (interface::OTU2E, "OTU2E"),
    (interface::OTU1E, "OTU1E"),
    (interface::OTU2F, "OTU2F"),
    (interface::OTU1F, "OTU1F"),
    (interface::OTU3, "OTU3"),
    (interface::OTU4, "OTU4"),
    (interface::STM16, "STM16"),
    (interface::STM64, "STM64"),
    (interface::OC48, "OC48"),
    (interface::OC192, "OC192"),
];

pub(crate) const CLOCKS: TokenTable = &[
    (clock::INTERNAL, "INT"),
    (clock::LOOP, "LOOP"),
    (clock::EXTERNAL, "EXT"),
];

pub(crate) const ERROR_TYPES: TokenTable = &[
    (error_type::FAS, "FAS"),
    (error_type::MFAS, "MFAS"),
    (error_type::OTU_BIP8, "OTUBIP8"),
    (error_type::OTU_BEI, "OTUBEI"),
    (error_type::ODU_BIP8, "ODUBIP8"),
    (error_type::ODU_BEI, "ODUBEI"),
    (error_type::FEC_CORRECTABLE, "FECCORR"),
    (error_type::FEC_UNCORRECTABLE, "FECUNCORR"),
    (error_type::TCM1_BIP8, "TCM1BIP8"),
    (error_type::TCM2_BIP8, "TCM2BIP8"),
    (error_type::TCM3_BIP8, "TCM3BIP8"),
    (error_type::PATTERN_BIT, "BIT"),
];

pub(crate) const ERROR_MODES: TokenTable = &[
    (error_mode::OFF, "OFF"),
    (error_mode::RATE, "RATE"),
    (error_mode::CONTINUOUS, "CONT"),
];

pub(crate) const ALARMS: TokenTable = &[
    (alarm::LOS, "LOS"),
    (alarm::LOF, "LOF"),
    (alarm::OOF, "OOF"),
    (alarm::LOM, "LOM"),
    (alarm::OOM, "OOM"),
    (alarm::OTU_AIS, "OTUAIS"),
    (alarm::OTU_IAE, "OTUIAE"),
    (alarm::OTU_BDI, "OTUBDI"),
    (alarm::ODU_AIS, "ODUAIS"),
    (alarm::ODU_OCI, "ODUOCI"),
    (alarm::ODU_LCK, "ODULCK"),
    (alarm::ODU_BDI, "ODUBDI"),
    (alarm::OPU_PLM, "OPUPLM"),
    (alarm::OPU_CSF, "OPUCSF"),
];

pub(crate) const MAPPINGS: TokenTable = &[
    (mapping::PRBS, "PRBS"),
    (mapping::NULL, "NULL"),
    (mapping::ODU0_ODU1, "ODU0ODU1"),
    (mapping::ODU1_ODU2, "ODU1ODU2"),
    (mapping::ODU0_ODU2, "ODU0ODU2"),
    (mapping::ODUFLEX_ODU2, "ODUFLEXODU2"),
    (mapping::ODU2_ODU3, "ODU2ODU3"),
    (mapping::ODU2_ODU4, "ODU2ODU4"),
    (mapping::STM16_OTU1, "STM16OTU1"),
    (mapping::STM64_OTU2, "STM64OTU2"),
    (mapping::GFP, "GFP"),
];

pub(crate) const PATTERNS: TokenTable = &[
    (pattern::PRBS31, "PRBS31"),
    (pattern::PRBS31_INV, "PRBS31INV"),
    (pattern::PRBS23, "PRBS23"),
    (pattern::PRBS23_INV, "PRBS23INV"),
    (pattern::PRBS15, "PRBS15"),
    (pattern::PRBS9, "PRBS9"),
    (pattern::ALL_ZERO, "ALLZERO"),
    (pattern::ALL_ONE, "ALLONE"),
    (pattern::USER, "USER"),
];

pub(crate) const SWITCH: TokenTable = &[(0, "OFF"), (1, "ON")];

pub(crate) const OFFSET_TARGETS: TokenTable = &[(0, "LINE"), (1, "CLIENT")];

/// Canonical token for an engine value; values outside the table are not
/// representable in a response.
pub(crate) fn token_for(table: TokenTable, value: i32) -> Result<&'static str, ScpiError> {
    table
        .iter()
        .find(|(key, _)| *key == value)
        .map(|(_, token)| *token)
        .ok_or(ScpiError::InvalidResults)
}

/// Engine value for a client token.
///
/// Matching ignores case. An exact spelling wins; otherwise the first token
/// the input is a prefix of.
pub(crate) fn value_for(table: TokenTable, input: &str) -> Result<i32, ScpiError> {
    if input.is_empty() {
        return Err(ScpiError::IllegalParameterValue);
    }
    let exact = table
        .iter()
        .find(|(_, token)| token.eq_ignore_ascii_case(input));
    let prefix = || {
        table.iter().find(|(_, token)| {
            token
                .as_bytes()
                .get(..input.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(input.as_bytes()))
        })
    };
    exact
        .or_else(prefix)
        .map(|(value, _)| *value)
        .ok_or(ScpiError::IllegalParameterValue)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::interfaces(INTERFACES)]
    #[case::clocks(CLOCKS)]
    #[case::error_types(ERROR_TYPES)]
    #[case::error_modes(ERROR_MODES)]
    #[case::alarms(ALARMS)]
    #[case::mappings(MAPPINGS)]
    #[case::patterns(PATTERNS)]
    #[case::switch(SWITCH)]
    #[case::offset_targets(OFFSET_TARGETS)]
    fn canonical_tokens_round_trip(#[case] table: TokenTable) {
        for (value, token) in table {
            let parsed = value_for(table, token).expect("known token");
            assert_eq!(parsed, *value, "token {token}");
            assert_eq!(token_for(table, parsed), Ok(*token));
        }
    }

    #[rstest]
    #[case::lower_case(CLOCKS, "loop", clock::LOOP)]
    #[case::exact_beats_longer(INTERFACES, "otu2", interface::OTU2)]
    #[case::first_prefix(INTERFACES, "OTU", interface::OTU1)]
    #[case::prefix(INTERFACES, "STM6", interface::STM64)]
    #[case::pattern_exact(PATTERNS, "PRBS31", pattern::PRBS31)]
    fn resolves_client_tokens(
        #[case] table: TokenTable,
        #[case] input: &str,
        #[case] expected: i32,
    ) {
        assert_eq!(value_for(table, input), Ok(expected));
    }

    #[rstest]
    #[case::unknown("FOOBAR")]
    #[case::longer_than_token("OTU2EX")]
    #[case::empty("")]
    fn rejects_unknown_tokens(#[case] input: &str) {
        assert_eq!(
            value_for(INTERFACES, input),
            Err(ScpiError::IllegalParameterValue)
        );
    }

    #[test]
    fn unknown_engine_values_are_invalid_results() {
        assert_eq!(token_for(CLOCKS, 99), Err(ScpiError::InvalidResults));
    }
}
