//! Dependencies of the wizard reducer.

use crate::bookings::BookingStore;
use crate::catalog::Catalog;
use crate::config::Config;
use marquee_core::environment::Clock;
use std::sync::Arc;
use std::time::Duration;

/// Default simulated payment processing time
pub const DEFAULT_PAYMENT_DELAY: Duration = Duration::from_millis(1500);

/// Default number of bookable days, starting today
pub const DEFAULT_BOOKING_WINDOW_DAYS: u32 = 7;

/// Environment for the wizard reducer
#[derive(Clone)]
pub struct WizardEnvironment {
    /// Theaters and movies
    pub catalog: Arc<Catalog>,
    /// Where confirmed bookings go
    pub bookings: Arc<BookingStore>,
    /// Source of "today" and booking timestamps
    pub clock: Arc<dyn Clock>,
    /// Simulated payment processing time
    pub payment_delay: Duration,
    /// Number of bookable days, starting today
    pub booking_window_days: u32,
}

impl WizardEnvironment {
    /// Creates an environment with default timings
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, bookings: Arc<BookingStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            catalog,
            bookings,
            clock,
            payment_delay: DEFAULT_PAYMENT_DELAY,
            booking_window_days: DEFAULT_BOOKING_WINDOW_DAYS,
        }
    }

    /// Apply timings from configuration
    #[must_use]
    pub fn with_config(mut self, config: &Config) -> Self {
        self.payment_delay = config.payment_delay;
        self.booking_window_days = config.booking_window_days;
        self
    }
}
