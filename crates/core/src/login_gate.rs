//! Login timestamps and the one-hour session rule.
//!
//! On login the session records a `last_login` timestamp. Every index-page
//! view re-reads it: within an hour the visitor stays logged in, past an hour
//! the session is logged out and the visitor is told why.

use chrono::{NaiveDateTime, TimeDelta};

/// Session key holding the login timestamp.
pub const LAST_LOGIN_KEY: &str = "last_login";

/// Message shown when a stale session is logged out.
pub const EXPIRED_MESSAGE: &str = "Your last login was more than one hour ago";

/// Text shown in place of a login time when nobody is logged in.
pub const LOGGED_OUT_TEXT: &str = "You are logged out";

/// Storage format for the timestamp (fractional seconds included).
const STORED_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Parse format; the fractional part is dropped before parsing.
const PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Outcome of checking a session's login timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    /// No usable timestamp in the session.
    LoggedOut,
    /// Logged in, timestamp within the window.
    Active {
        /// When the login happened.
        since: NaiveDateTime,
    },
    /// Logged in more than the window ago; the session must be ended.
    Expired {
        /// When the login happened.
        since: NaiveDateTime,
    },
}

impl LoginState {
    /// Message to show for this state, if any.
    #[must_use]
    pub const fn message(&self) -> Option<&'static str> {
        match self {
            Self::Expired { .. } => Some(EXPIRED_MESSAGE),
            Self::LoggedOut | Self::Active { .. } => None,
        }
    }

    /// Whether the session should be ended.
    #[must_use]
    pub const fn must_log_out(&self) -> bool {
        matches!(self, Self::Expired { .. })
    }
}

/// The session expiry rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginGate {
    window: TimeDelta,
}

impl Default for LoginGate {
    fn default() -> Self {
        Self::new(TimeDelta::seconds(Self::DEFAULT_WINDOW_SECS))
    }
}

impl LoginGate {
    /// One hour.
    pub const DEFAULT_WINDOW_SECS: i64 = 3600;

    /// Create a gate with a custom window.
    #[must_use]
    pub const fn new(window: TimeDelta) -> Self {
        Self { window }
    }

    /// Length of the login window.
    #[must_use]
    pub const fn window(&self) -> TimeDelta {
        self.window
    }

    /// Format a login time for storage in the session.
    #[must_use]
    pub fn stamp(at: NaiveDateTime) -> String {
        at.format(STORED_FORMAT).to_string()
    }

    /// Parse a stored timestamp, ignoring anything after the first `.`.
    #[must_use]
    pub fn parse_stamp(raw: &str) -> Option<NaiveDateTime> {
        let whole_seconds = raw.split('.').next().unwrap_or(raw);
        NaiveDateTime::parse_from_str(whole_seconds.trim(), PARSE_FORMAT).ok()
    }

    /// Decide the state of a session given its raw `last_login` value.
    ///
    /// A session is expired only when strictly more than the window has
    /// elapsed. An unparseable timestamp counts as logged out.
    #[must_use]
    pub fn evaluate(&self, last_login: Option<&str>, now: NaiveDateTime) -> LoginState {
        let Some(since) = last_login.and_then(Self::parse_stamp) else {
            return LoginState::LoggedOut;
        };
        if now - since > self.window {
            LoginState::Expired { since }
        } else {
            LoginState::Active { since }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, PARSE_FORMAT).unwrap()
    }

    #[test]
    fn test_stamp_roundtrip_drops_fraction() {
        let login = at("2026-03-01 10:00:00") + TimeDelta::milliseconds(250);
        let stamp = LoginGate::stamp(login);
        assert!(stamp.starts_with("2026-03-01 10:00:00."));
        assert_eq!(LoginGate::parse_stamp(&stamp), Some(at("2026-03-01 10:00:00")));
    }

    #[test]
    fn test_missing_timestamp_is_logged_out() {
        let gate = LoginGate::default();
        assert_eq!(
            gate.evaluate(None, at("2026-03-01 10:00:00")),
            LoginState::LoggedOut
        );
    }

    #[test]
    fn test_garbage_timestamp_is_logged_out() {
        let gate = LoginGate::default();
        assert_eq!(
            gate.evaluate(Some("yesterday"), at("2026-03-01 10:00:00")),
            LoginState::LoggedOut
        );
    }

    #[test]
    fn test_within_window_stays_active() {
        let gate = LoginGate::default();
        let state = gate.evaluate(Some("2026-03-01 10:00:00.123"), at("2026-03-01 10:59:59"));
        assert!(matches!(state, LoginState::Active { .. }));
        assert!(!state.must_log_out());
        assert_eq!(state.message(), None);
    }

    #[test]
    fn test_exactly_one_hour_is_still_active() {
        let gate = LoginGate::default();
        let state = gate.evaluate(Some("2026-03-01 10:00:00"), at("2026-03-01 11:00:00"));
        assert!(matches!(state, LoginState::Active { .. }));
    }

    #[test]
    fn test_past_window_expires() {
        let gate = LoginGate::default();
        let state = gate.evaluate(Some("2026-03-01 10:00:00"), at("2026-03-01 11:00:01"));
        assert_eq!(
            state,
            LoginState::Expired {
                since: at("2026-03-01 10:00:00")
            }
        );
        assert!(state.must_log_out());
        assert_eq!(state.message(), Some(EXPIRED_MESSAGE));
    }

    #[test]
    fn test_custom_window() {
        let gate = LoginGate::new(TimeDelta::seconds(60));
        let state = gate.evaluate(Some("2026-03-01 10:00:00"), at("2026-03-01 10:01:01"));
        assert!(state.must_log_out());
    }
}
