//! Command keywords and their mandatory-prefix rule.

use std::fmt;

/// One colon-delimited segment of a registered command path.
///
/// The template spelling encodes the short form through letter case: the
/// letters before the first lower-case letter are mandatory, the rest may be
/// omitted. `ALarm` accepts `AL` through `ALARM`; `TCM1` must be typed whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Keyword {
    spelling: String,
    mandatory: usize,
}

impl Keyword {
    /// Parses a template segment; `None` when it is empty or not ASCII.
    pub(crate) fn parse(template: &str) -> Option<Self> {
        if template.is_empty() || !template.is_ascii() || template.contains(char::is_whitespace) {
            return None;
        }
        let mandatory = template
            .bytes()
            .position(|byte| byte.is_ascii_lowercase())
            .unwrap_or(template.len());
        if mandatory == 0 {
            return None;
        }
        Some(Self {
            spelling: template.to_ascii_uppercase(),
            mandatory,
        })
    }

    /// Full upper-case spelling.
    pub(crate) fn spelling(&self) -> &str {
        &self.spelling
    }

    /// Length of the mandatory short form.
    pub(crate) const fn mandatory(&self) -> usize {
        self.mandatory
    }

    /// True when `input` is a case-insensitive prefix at least as long as the
    /// short form.
    pub(crate) fn matches(&self, input: &str) -> bool {
        input.len() >= self.mandatory
            && self
                .spelling
                .as_bytes()
                .get(..input.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(input.as_bytes()))
    }

    /// True when `input` is the full spelling.
    pub(crate) fn matches_exactly(&self, input: &str) -> bool {
        self.spelling.eq_ignore_ascii_case(input)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (short, long) = self.spelling.split_at(self.mandatory);
        write!(formatter, "{short}{}", long.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::mixed("ALarm", "ALARM", 2)]
    #[case::all_upper("BURSTPERIOD", "BURSTPERIOD", 11)]
    #[case::common_command("*IDN", "*IDN", 4)]
    #[case::digit_suffix("TCM1", "TCM1", 4)]
    #[case::late_lowercase("FREQOFFset", "FREQOFFSET", 7)]
    fn parses_mandatory_prefix(
        #[case] template: &str,
        #[case] spelling: &str,
        #[case] mandatory: usize,
    ) {
        let keyword = Keyword::parse(template).expect("valid template");
        assert_eq!(keyword.spelling(), spelling);
        assert_eq!(keyword.mandatory(), mandatory);
        assert_eq!(keyword.to_string(), template);
    }

    #[rstest]
    #[case::empty("")]
    #[case::leading_lowercase("alarm")]
    #[case::whitespace("AL arm")]
    #[case::non_ascii("ÄLarm")]
    fn rejects_malformed_templates(#[case] template: &str) {
        assert!(Keyword::parse(template).is_none());
    }

    #[rstest]
    #[case::short_form("AL", true)]
    #[case::partial("ala", true)]
    #[case::long_form("Alarm", true)]
    #[case::too_short("A", false)]
    #[case::too_long("ALARMS", false)]
    #[case::different("ALX", false)]
    fn matches_by_prefix(#[case] input: &str, #[case] expected: bool) {
        let keyword = Keyword::parse("ALarm").expect("valid template");
        assert_eq!(keyword.matches(input), expected);
    }

    #[test]
    fn all_upper_keywords_need_full_spelling() {
        let keyword = Keyword::parse("CLOCK").expect("valid template");
        assert!(keyword.matches("clock"));
        assert!(!keyword.matches("CLO"));
    }
}
