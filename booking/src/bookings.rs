//! In-memory, append-only store of confirmed bookings.

use crate::types::{BookingDraft, BookingId, BookingStatus, ConfirmedBooking};
use marquee_core::environment::Clock;
use rand::Rng;
use std::sync::{Arc, Mutex, PoisonError};

/// Alphabet of booking ids
const TOKEN_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of booking ids
pub const TOKEN_LENGTH: usize = 12;

/// Source of booking id tokens
pub trait TokenSource: Send + Sync {
    /// Draw a fresh token
    fn token(&self) -> String;
}

/// Tokens of [`TOKEN_LENGTH`] characters over `[0-9A-Z]`, drawn from the
/// thread-local CSPRNG
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomTokens;

impl TokenSource for RandomTokens {
    fn token(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..TOKEN_LENGTH)
            .map(|_| char::from(TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())]))
            .collect()
    }
}

/// Append-only list of confirmed bookings for the session
///
/// There are no update or delete operations. Ids are unique per store.
pub struct BookingStore {
    clock: Arc<dyn Clock>,
    tokens: Arc<dyn TokenSource>,
    bookings: Mutex<Vec<ConfirmedBooking>>,
}

impl BookingStore {
    /// Create an empty store with random ids
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_tokens(clock, Arc::new(RandomTokens))
    }

    /// Create an empty store drawing ids from `tokens`
    #[must_use]
    pub fn with_tokens(clock: Arc<dyn Clock>, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            clock,
            tokens,
            bookings: Mutex::new(Vec::new()),
        }
    }

    /// Confirm a draft: assign an id and timestamp, append, return the record
    pub fn create_booking(&self, draft: BookingDraft) -> ConfirmedBooking {
        let mut bookings = self.bookings.lock().unwrap_or_else(PoisonError::into_inner);

        let id = loop {
            let token = self.tokens.token();
            if bookings.iter().all(|booking| booking.id.as_str() != token) {
                break BookingId::new(token);
            }
            tracing::debug!("Booking id collision, drawing again");
        };

        let booking = ConfirmedBooking {
            id,
            details: draft,
            created_at: self.clock.now(),
            status: BookingStatus::Confirmed,
        };
        bookings.push(booking.clone());

        metrics::counter!("bookings.confirmed").increment(1);
        tracing::info!(
            booking_id = %booking.id,
            theater = %booking.theater().name,
            attendees = booking.attendees(),
            "Booking confirmed"
        );
        booking
    }

    /// Find a booking by id
    #[must_use]
    pub fn get_booking_by_id(&self, id: &BookingId) -> Option<ConfirmedBooking> {
        self.bookings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|booking| &booking.id == id)
            .cloned()
    }

    /// Every booking, in creation order
    #[must_use]
    pub fn all_bookings(&self) -> Vec<ConfirmedBooking> {
        self.bookings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of bookings
    #[must_use]
    pub fn len(&self) -> usize {
        self.bookings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing has been booked yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for BookingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingStore")
            .field("bookings", &self.len())
            .finish_non_exhaustive()
    }
}
