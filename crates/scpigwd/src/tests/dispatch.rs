//! Command dispatch against the simulated engine, without sockets.

use rstest::{fixture, rstest};
use scpi_engine::codes::{alarm, error_type};
use scpi_engine::memory::{InstrumentState, SharedInstrument};
use scpi_engine::records::{AlarmLed, AlarmStatus, ErrorCount, OhCaptureSettings, TcmStats};

use crate::session::{Dispatcher, Session};

use super::support::detached_session;

struct Bench {
    instrument: SharedInstrument,
    dispatcher: Dispatcher,
    session: Session,
}

impl Bench {
    fn run(&mut self, line: &str) -> Option<String> {
        self.dispatcher.dispatch(&mut self.session, line)
    }

    fn query(&mut self, line: &str) -> String {
        self.run(line)
            .unwrap_or_else(|| panic!("{line} produced no response"))
    }

    fn set(&mut self, line: &str) {
        assert_eq!(self.run(line), None, "{line} should be silent");
    }

    fn update(&self, change: impl FnOnce(&mut InstrumentState)) {
        self.instrument.with(change).expect("instrument state");
    }

    fn state<T>(&self, read: impl FnOnce(&mut InstrumentState) -> T) -> T {
        self.instrument.with(read).expect("instrument state")
    }
}

#[fixture]
fn bench() -> Bench {
    let instrument = SharedInstrument::default();
    let (dispatcher, session) = detached_session(&instrument);
    Bench {
        instrument,
        dispatcher,
        session,
    }
}

#[rstest]
fn clock_defaults_to_internal(mut bench: Bench) {
    assert_eq!(bench.query("TX:CLOCK?"), "INT");
}

#[rstest]
fn keywords_ignore_case(mut bench: Bench) {
    assert_eq!(bench.query("tx:clock?"), "INT");
    assert_eq!(bench.query("Tx:InTerFace?"), "OTU2");
}

#[rstest]
fn clock_setting_is_idempotent(mut bench: Bench) {
    bench.set("TX:CLOCK LOOP");
    bench.set("TX:CLOCK LOOP");
    assert_eq!(bench.query("TX:CLOCK?"), "LOOP");
}

#[rstest]
fn error_rate_is_reported_in_scientific_form(mut bench: Bench) {
    bench.set("TX:ERR:RATE 1.0e-3");
    assert_eq!(bench.query("TX:ERR:RATE?"), "1.00e-03");
}

#[rstest]
#[case::unknown_token("TX:INT BOGUS", "+E1003,\"Illegal parameter value\"")]
#[case::missing_argument("TX:CLOCK", "+E1002,\"Missing parameter\"")]
#[case::unknown_command("TX:NOPE?", "+E1001,\"Command not found\"")]
#[case::short_form_too_short("TX:A:TYPE?", "+E1001,\"Command not found\"")]
#[case::trailing_keyword_on_query("TX:CLOCK:BOGUS?", "+E1001,\"Command not found\"")]
#[case::trailing_keyword_on_setter("TX:CLOCK:BOGUS LOOP", "+E1001,\"Command not found\"")]
#[case::keyword_past_alarm("RES:AL:LOS:EXTRA?", "+E1001,\"Command not found\"")]
#[case::rate_out_of_range("TX:ERR:RATE 0.5", "+E1005,\"Numeric data error\"")]
#[case::rate_not_numeric("TX:ERR:RATE fast", "+E1004,\"Data type error\"")]
fn rejected_commands_render_error_lines(
    mut bench: Bench,
    #[case] line: &str,
    #[case] expected: &str,
) {
    assert_eq!(bench.query(line), expected);
}

#[rstest]
fn short_and_long_forms_reach_the_same_handler(mut bench: Bench) {
    bench.set("TX:AL:TYPE LOF");
    assert_eq!(bench.query("TX:ALARM:TYPE?"), "LOF");
    bench.set("TX:ALARM:MODE ON");
    assert_eq!(bench.query("TX:AL:MODE?"), "ON");
}

#[rstest]
fn alarm_led_follows_the_engine(mut bench: Bench) {
    assert_eq!(bench.query("RES:AL:LOS?"), "OFF");
    bench.update(|state| {
        state.otn_stats.alarms.insert(
            alarm::LOS,
            AlarmStatus {
                led: AlarmLed {
                    is_red: true,
                    was_red: true,
                },
                seconds: 3,
            },
        );
    });
    assert_eq!(bench.query("RES:AL:LOS?"), "ON");
}

#[rstest]
fn alarm_aliases_map_to_engine_alarms(mut bench: Bench) {
    bench.update(|state| {
        let active = AlarmStatus {
            led: AlarmLed {
                is_red: true,
                was_red: true,
            },
            seconds: 1,
        };
        state.otn_stats.alarms.insert(alarm::OTU_AIS, active);
        state.otn_stats.alarms.insert(alarm::ODU_LCK, active);
    });
    assert_eq!(bench.query("RES:AL:AIS?"), "ON");
    assert_eq!(bench.query("RES:AL:LCK?"), "ON");
    assert_eq!(bench.query("RES:AL:BDI?"), "OFF");
}

#[rstest]
fn alarm_history_reports_latched_state_and_seconds(mut bench: Bench) {
    bench.update(|state| {
        state.otn_stats.alarms.insert(
            alarm::LOF,
            AlarmStatus {
                led: AlarmLed {
                    is_red: false,
                    was_red: true,
                },
                seconds: 12,
            },
        );
    });
    assert_eq!(bench.query("RES:AL:HIST? LOF"), "ON,12");
    assert_eq!(bench.query("RES:AL:HIST? LOS"), "OFF,0");
}

#[rstest]
fn trailing_keyword_leaves_state_untouched(mut bench: Bench) {
    assert_eq!(
        bench.query("TX:CLOCK:BOGUS LOOP"),
        "+E1001,\"Command not found\""
    );
    assert_eq!(bench.query("TX:CLOCK?"), "INT");
}

#[rstest]
#[case::query("TX:INT?")]
#[case::error("TX:CLOCK:BOGUS?")]
#[case::rejected_parameter("TX:ERR:RATE fast")]
fn repeated_commands_answer_byte_for_byte(mut bench: Bench, #[case] line: &str) {
    let first = bench.run(line).expect("first response");
    let second = bench.run(line).expect("second response");
    assert_eq!(first.as_bytes(), second.as_bytes());
}

#[rstest]
fn repeated_queries_interleave_with_errors_identically(mut bench: Bench) {
    let script = ["TX:INT?", "TX:NOPE?", "RES:AL:LOS?", "TX:INT BOGUS"];
    let mut first = Vec::new();
    let mut second = Vec::new();
    for line in script {
        first.extend(bench.run(line).expect("response").into_bytes());
    }
    for line in script {
        second.extend(bench.run(line).expect("response").into_bytes());
    }
    assert_eq!(first, second);
    assert!(
        String::from_utf8_lossy(&first).contains("+E1001,\"Command not found\""),
        "error line missing"
    );
}

#[rstest]
fn line_offset_resolves_through_the_residual(mut bench: Bench) {
    bench.set("TX:FREQOFF:LINE 5.0");
    assert_eq!(bench.query("TX:FREQOFF:LINE?"), "5.000,0.000,0,0.000");
    assert_eq!(bench.query("TX:FREQOFF:CLI?"), "0.000,0.000,0,0.000");
}

#[rstest]
fn client_offset_accepts_a_sweep(mut bench: Bench) {
    bench.set("TX:FREQOFF:CLI -2.5 -10 20 0.5");
    assert_eq!(bench.query("TX:FREQOFF:CLI?"), "-2.500,-10.000,20,0.500");
}

#[rstest]
fn offsets_are_bounded(mut bench: Bench) {
    assert_eq!(
        bench.query("TX:FREQOFF:LINE 150"),
        "+E1005,\"Numeric data error\""
    );
    assert_eq!(
        bench.query("TX:FREQOFF:LINE 1 1 20"),
        "+E1002,\"Missing parameter\""
    );
}

#[rstest]
fn msi_slots_are_written_together(mut bench: Bench) {
    bench.set("TX:MSI 1:#H41 32:7");
    assert_eq!(bench.query("TX:MSI? 1"), "65");
    assert_eq!(bench.query("TX:MSI? 32"), "7");
    let listing = bench.query("TX:MSI?");
    assert!(listing.starts_with("65,0,"), "listing {listing}");
    assert_eq!(listing.split(',').count(), 32);
}

#[rstest]
#[case::slot_zero("TX:MSI 0:1", "+E1006,\"Data out of range\"")]
#[case::slot_past_end("TX:MSI? 33", "+E1006,\"Data out of range\"")]
#[case::missing_value("TX:MSI 3", "+E1002,\"Missing parameter\"")]
#[case::value_too_large("TX:MSI 3:256", "+E1005,\"Numeric data error\"")]
fn msi_arguments_are_validated(mut bench: Bench, #[case] line: &str, #[case] expected: &str) {
    assert_eq!(bench.query(line), expected);
}

#[rstest]
fn rejected_msi_update_leaves_every_slot_untouched(mut bench: Bench) {
    assert_eq!(
        bench.query("TX:MSI 1:9 40:1"),
        "+E1006,\"Data out of range\""
    );
    assert_eq!(bench.query("TX:MSI? 1"), "0");
}

#[rstest]
fn overhead_bytes_use_one_based_positions(mut bench: Bench) {
    bench.set("TX:OH:BYTE 2 3 #H5A");
    assert_eq!(bench.query("TX:OH:BYTE? 2 3"), "#H5A");
    assert_eq!(bench.state(|state| state.otn_settings.oh_bytes[16 + 2]), 0x5A);
    assert_eq!(
        bench.query("TX:OH:BYTE? 5 1"),
        "+E1006,\"Data out of range\""
    );
}

#[rstest]
fn aps_bytes_sit_in_row_four(mut bench: Bench) {
    bench.set("TX:OH:ODU:APS #H01020304");
    assert_eq!(bench.query("TX:OH:ODU:APS?"), "#H01020304");
    assert_eq!(bench.query("TX:OH:BYTE? 4 5"), "#H01");
    assert_eq!(bench.query("TX:OH:BYTE? 4 8"), "#H04");
}

#[rstest]
fn tcm_levels_are_toggled_individually(mut bench: Bench) {
    bench.set("TX:TCM:ENAB 3 ON");
    assert_eq!(bench.query("TX:TCM:ENAB? 3"), "ON");
    assert_eq!(bench.query("TX:TCM:ENAB? 2"), "OFF");
    assert_eq!(
        bench.query("TX:TCM:ENAB? 7"),
        "+E1006,\"Data out of range\""
    );
}

#[rstest]
fn trail_trace_text_is_unquoted_and_truncated(mut bench: Bench) {
    bench.set("TX:TTI:SAPI \"HELLO WORLD\"");
    assert_eq!(bench.query("TX:TTI:SAPI?"), "HELLO WORLD");
    bench.set("TX:TTI:DAPI ABCDEFGHIJKLMNOPQRSTUVWXYZ");
    assert_eq!(bench.query("TX:TTI:DAPI?"), "ABCDEFGHIJKLMNO");
}

#[rstest]
fn trail_trace_text_must_be_printable_ascii(mut bench: Bench) {
    assert_eq!(
        bench.query("TX:TTI:OPER caf\u{e9}"),
        "+E1003,\"Illegal parameter value\""
    );
    assert_eq!(bench.query("TX:TTI:OPER"), "+E1002,\"Missing parameter\"");
}

#[rstest]
fn inserted_errors_are_counted(mut bench: Bench) {
    bench.set("TX:ERR:INS FAS");
    bench.set("TX:ERR:INS");
    assert_eq!(
        bench.state(|state| state.inserted_errors.clone()),
        [error_type::FAS, error_type::OTU_BIP8]
    );
    assert_eq!(bench.query("RES:ERR:COUN? FAS"), "1");
}

#[rstest]
fn error_rates_and_fec_counters_are_reported(mut bench: Bench) {
    bench.update(|state| {
        state.otn_stats.errors.insert(
            error_type::ODU_BIP8,
            ErrorCount {
                count: 40,
                rate: 2.5e-9,
            },
        );
        state.otn_stats.fec_corrected = 17;
        state.otn_stats.fec_uncorrected = 2;
    });
    assert_eq!(bench.query("RES:ERR:RATE? ODUBIP8"), "2.50e-09");
    assert_eq!(bench.query("RES:ERR:COUN? ODUBIP8"), "40");
    assert_eq!(bench.query("RES:FEC:CORR?"), "17");
    assert_eq!(bench.query("RES:FEC:UNC?"), "2");
}

#[rstest]
fn tcm_bei_results_are_per_level(mut bench: Bench) {
    bench.update(|state| {
        state.otn_stats.tcm[2] = TcmStats {
            bei_count: 7,
            bei_average: 1.25,
        };
    });
    assert_eq!(bench.query("RES:TCM3:BEI:COUN?"), "7");
    assert_eq!(bench.query("RES:TCM3:BEI:AVE?"), "1.250");
    assert_eq!(bench.query("RES:TCM1:BEI:COUN?"), "0");
}

#[rstest]
#[case::above_deepest_level("RES:ODTU:COUN? 4", "+E1006,\"Data out of range\"")]
#[case::not_a_number("RES:ODTU:OCI? two", "+E1004,\"Data type error\"")]
#[case::missing_level("RES:ODTU:OCI?", "+E1002,\"Missing parameter\"")]
fn odtu_levels_are_validated(mut bench: Bench, #[case] line: &str, #[case] expected: &str) {
    assert_eq!(bench.query(line), expected);
}

#[rstest]
fn odtu_results_are_read_per_level(mut bench: Bench) {
    bench.update(|state| {
        state.odtu[2].bip_count = 9;
        state.odtu[2].oci.is_red = true;
    });
    assert_eq!(bench.query("RES:ODTU:COUN? 2"), "9");
    assert_eq!(bench.query("RES:ODTU:OCI? 2"), "ON");
    assert_eq!(bench.query("RES:ODTU:OCI? 0"), "OFF");
}

#[rstest]
fn sdt_threshold_is_bounded_and_arming_resets_duration(mut bench: Bench) {
    assert_eq!(bench.query("RES:SDT:THR?"), "50.000");
    assert_eq!(
        bench.query("RES:SDT:THR 2500"),
        "+E1005,\"Numeric data error\""
    );
    bench.set("RES:SDT:THR 100");
    assert_eq!(bench.query("RES:SDT:THR?"), "100.000");

    bench.update(|state| state.otn_stats.sdt_duration_ms = 12.5);
    assert_eq!(bench.query("RES:SDT:DUR?"), "12.500");
    bench.set("RES:SDT:ARM");
    assert!(bench.state(|state| state.otn_stats.sdt_armed));
    assert_eq!(bench.query("RES:SDT:DUR?"), "0.000");
}

#[rstest]
fn overhead_capture_is_forwarded_zero_based(mut bench: Bench) {
    bench.set("RES:OH:CAP 2 5 16");
    assert_eq!(
        bench.state(|state| state.oh_capture),
        Some(OhCaptureSettings {
            row: 1,
            column: 4,
            frames: 16,
        })
    );
    bench.set("RES:OH:CAP 1 1");
    assert_eq!(bench.state(|state| state.oh_capture.map(|capture| capture.frames)), Some(1));
    assert_eq!(
        bench.query("RES:OH:CAP 1 1 0"),
        "+E1005,\"Numeric data error\""
    );
}

#[rstest]
fn elapsed_time_is_reported(mut bench: Bench) {
    bench.update(|state| state.otn_stats.elapsed_seconds = 3600);
    assert_eq!(bench.query("RES:ELAP?"), "3600");
}

#[rstest]
fn optics_readings_need_a_fitted_module(mut bench: Bench) {
    assert_eq!(bench.query("PHY:RX:POW?"), "-3.500");
    assert_eq!(bench.query("PHY:MOD?"), "SIMULATED SFP+");

    bench.update(|state| state.phy_stats.module_present = false);
    assert_eq!(bench.query("PHY:RX:POW?"), "+E1010,\"Hardware missing\"");
    assert_eq!(bench.query("PHY:LAS ON"), "+E1010,\"Hardware missing\"");
    bench.set("PHY:LAS OFF");
    assert_eq!(bench.query("PHY:LAS?"), "OFF");
}

#[rstest]
fn laser_can_be_switched_on_with_a_module(mut bench: Bench) {
    bench.set("PHY:LAS ON");
    assert_eq!(bench.query("PHY:LAS?"), "ON");
}

#[rstest]
fn identification_and_session_queries(mut bench: Bench) {
    let identity = bench.query("*IDN?");
    assert!(
        identity.starts_with("SIMULATED,OTN-ENGINE,0000000,"),
        "identity {identity}"
    );
    assert_eq!(bench.query("SYST:VERS?"), "1999.0");
    assert_eq!(bench.query("SYST:SESS?"), "1,TCP,ANONYMOUS");
}

#[rstest]
fn reset_restores_default_settings(mut bench: Bench) {
    bench.set("TX:CLOCK EXT");
    bench.set("*RST");
    assert_eq!(bench.query("TX:CLOCK?"), "INT");
}

#[rstest]
fn close_marks_the_session(mut bench: Bench) {
    bench.set("CLOSE");
    assert!(bench.session.close_requested());
}

#[rstest]
fn client_log_text_is_accepted(mut bench: Bench) {
    bench.set("SYST:LOG calibration run 4");
    assert_eq!(bench.query("SYST:LOG"), "+E1002,\"Missing parameter\"");
}

#[rstest]
fn engine_login_gates_instrument_commands(mut bench: Bench) {
    bench.update(|state| state.credentials = Some((b"admin".to_vec(), b"secret".to_vec())));

    let refused = "+E1009,\"Command invalid for current configuration\"";
    assert_eq!(bench.query("TX:CLOCK?"), refused);
    assert_eq!(bench.query("*RST"), refused);
    assert_eq!(bench.query("*IDN?"), refused);
    assert_eq!(bench.query("SYST:VERS?"), refused);
    assert_eq!(bench.query("SYST:SESS?"), refused);

    assert_eq!(
        bench.query("LOGIN admin wrong"),
        "+E1003,\"Illegal parameter value\""
    );
    assert_eq!(bench.query("TX:CLOCK?"), refused);

    bench.set("LOGIN admin secret");
    assert_eq!(bench.query("TX:CLOCK?"), "INT");
    assert!(bench.query("*IDN?").starts_with("SIMULATED"));
    assert_eq!(bench.query("SYST:SESS?"), "1,TCP,AUTHENTICATED");
    assert_eq!(bench.session.username(), Some(b"admin".as_slice()));
    assert_eq!(bench.state(|state| state.active_logins), 1);

    bench.set("LOGOUT");
    assert_eq!(bench.query("TX:CLOCK?"), refused);
    assert_eq!(bench.state(|state| state.active_logins), 0);
}

#[rstest]
fn engines_without_credentials_accept_anonymous_sessions(mut bench: Bench) {
    bench.set("TX:PATT PRBS23");
    assert_eq!(bench.query("TX:PATT?"), "PRBS23");
    assert!(!bench.session.is_authenticated());
}
