//! Environment-driven proptest run profile.
//!
//! `PROGTEST_CASES` overrides the number of cases per property and
//! `PATHWISE_PBT_FORK` toggles forked execution. Invalid overrides are
//! logged and ignored.

use std::env;

/// Variable overriding the number of proptest cases.
pub const CASES_ENV: &str = "PROGTEST_CASES";
/// Variable toggling forked proptest execution.
pub const FORK_ENV: &str = "PATHWISE_PBT_FORK";

/// Case count and fork policy for a property suite.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProptestRunProfile {
    cases: u32,
    fork: bool,
}

impl ProptestRunProfile {
    /// Reads the profile from the process environment.
    ///
    /// # Examples
    /// ```
    /// use pathwise_test_support::profile::ProptestRunProfile;
    ///
    /// let profile = ProptestRunProfile::load(32, false);
    /// assert!(profile.cases() > 0);
    /// ```
    #[must_use]
    pub fn load(default_cases: u32, default_fork: bool) -> Self {
        Self::from_lookup(default_cases, default_fork, |key| env::var(key).ok())
    }

    /// Builds the profile from an arbitrary variable lookup.
    ///
    /// # Examples
    /// ```
    /// use pathwise_test_support::profile::{CASES_ENV, ProptestRunProfile};
    ///
    /// let profile = ProptestRunProfile::from_lookup(32, false, |key| {
    ///     (key == CASES_ENV).then(|| "500".to_owned())
    /// });
    /// assert_eq!(profile.cases(), 500);
    /// assert!(!profile.fork());
    /// ```
    #[must_use]
    pub fn from_lookup(
        default_cases: u32,
        default_fork: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        Self {
            cases: override_or(CASES_ENV, lookup(CASES_ENV), default_cases, parse_cases),
            fork: override_or(FORK_ENV, lookup(FORK_ENV), default_fork, parse_flag),
        }
    }

    /// Returns the number of cases per property.
    #[must_use]
    #[rustfmt::skip]
    pub const fn cases(&self) -> u32 { self.cases }

    /// Returns whether cases run in forked subprocesses.
    #[must_use]
    #[rustfmt::skip]
    pub const fn fork(&self) -> bool { self.fork }
}

fn override_or<T>(
    key: &'static str,
    raw: Option<String>,
    default: T,
    parse: fn(&str) -> Result<T, &'static str>,
) -> T {
    let Some(raw) = raw else {
        return default;
    };
    parse(raw.trim()).unwrap_or_else(|reason| {
        tracing::warn!(env = key, raw = %raw, reason, "ignoring invalid proptest override");
        default
    })
}

fn parse_cases(raw: &str) -> Result<u32, &'static str> {
    match raw.parse::<u32>() {
        Ok(0) => Err("case count must be positive"),
        Ok(cases) => Ok(cases),
        Err(_) => Err("case count must be an unsigned integer"),
    }
}

fn parse_flag(raw: &str) -> Result<bool, &'static str> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err("expected true/false, 1/0, yes/no, or on/off"),
    }
}
