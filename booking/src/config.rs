//! Configuration management for the booking engine.
//!
//! Loads configuration from environment variables with defaults. Unlike a
//! missing variable, a malformed value is an error.

use crate::wizard::{DEFAULT_BOOKING_WINDOW_DAYS, DEFAULT_PAYMENT_DELAY};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default file name prefix for exported tickets
pub const DEFAULT_TICKET_PREFIX: &str = "reel-revival-ticket";

/// Default selector of the confirmation region
pub const DEFAULT_TICKET_SELECTOR: &str = "#booking-confirmation";

/// Default page URL used in share links
pub const DEFAULT_SHARE_PAGE_URL: &str = "https://reel-revival.app/booking";

/// Invalid configuration value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Value could not be parsed
    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
        /// What was expected
        reason: &'static str,
    },
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Simulated payment processing time
    pub payment_delay: Duration,
    /// Number of bookable days, starting today
    pub booking_window_days: u32,
    /// File name prefix for exported tickets
    pub ticket_prefix: String,
    /// Selector of the confirmation region
    pub ticket_selector: String,
    /// Directory exported tickets are written to
    pub output_dir: PathBuf,
    /// Page URL included in share links
    pub share_page_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            payment_delay: DEFAULT_PAYMENT_DELAY,
            booking_window_days: DEFAULT_BOOKING_WINDOW_DAYS,
            ticket_prefix: DEFAULT_TICKET_PREFIX.to_string(),
            ticket_selector: DEFAULT_TICKET_SELECTOR.to_string(),
            output_dir: PathBuf::from("tickets"),
            share_page_url: DEFAULT_SHARE_PAGE_URL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to a malformed value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to a malformed value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let payment_delay = match lookup("MARQUEE_PAYMENT_DELAY_MS") {
            Some(value) => Duration::from_millis(
                value
                    .trim()
                    .parse()
                    .map_err(|_| invalid("MARQUEE_PAYMENT_DELAY_MS", value, "expected milliseconds"))?,
            ),
            None => defaults.payment_delay,
        };

        let booking_window_days = match lookup("MARQUEE_BOOKING_WINDOW_DAYS") {
            Some(value) => value
                .trim()
                .parse()
                .ok()
                .filter(|days| *days >= 1)
                .ok_or_else(|| {
                    invalid("MARQUEE_BOOKING_WINDOW_DAYS", value, "expected a positive day count")
                })?,
            None => defaults.booking_window_days,
        };

        Ok(Self {
            payment_delay,
            booking_window_days,
            ticket_prefix: lookup("MARQUEE_TICKET_PREFIX").unwrap_or(defaults.ticket_prefix),
            ticket_selector: lookup("MARQUEE_TICKET_SELECTOR").unwrap_or(defaults.ticket_selector),
            output_dir: lookup("MARQUEE_OUTPUT_DIR").map_or(defaults.output_dir, PathBuf::from),
            share_page_url: lookup("MARQUEE_SHARE_PAGE_URL").unwrap_or(defaults.share_page_url),
        })
    }
}

fn invalid(var: &'static str, value: String, reason: &'static str) -> ConfigError {
    ConfigError::Invalid { var, value, reason }
}
