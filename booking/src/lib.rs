//! # Marquee Booking
//!
//! Private screening bookings for the Reel Revival theaters.
//!
//! A customer browses the [`catalog`], picks a theater and walks the booking
//! [`wizard`]: date and time, regular or private screening, movie or their own
//! content, contact details, then a simulated payment. The confirmed booking
//! lands in the [`bookings`] store and can be exported or shared as a
//! [`ticket`].
//!
//! The wizard is a [`marquee_core::reducer::Reducer`]; hosts drive it through
//! a [`marquee_runtime::Store`]:
//!
//! ```ignore
//! let env = WizardEnvironment::new(catalog, bookings, clock).with_config(&config);
//! let store = Store::new(WizardState::new(), WizardReducer::new(), env);
//!
//! store.send(WizardAction::Enter { theater_id, suggested_movie: None }).await?;
//! store.send(WizardAction::SelectTime("10:00 AM".into())).await?;
//! // ...
//! let mut payment = store.send(WizardAction::SelectPayment(PaymentMethod::Card)).await?;
//! payment.wait().await;
//! ```

pub mod bookings;
pub mod catalog;
pub mod config;
pub mod session;
pub mod ticket;
pub mod types;
pub mod wizard;

pub use bookings::{BookingStore, RandomTokens, TokenSource};
pub use catalog::Catalog;
pub use config::{Config, ConfigError};
pub use session::{BrowsingSession, RouteError, View};
pub use types::{
    BookingDraft, BookingId, BookingStatus, Category, ConfirmedBooking, ContactDetails,
    ContentType, Industry, Movie, MovieId, PaymentMethod, PrivateContent, Screening,
    ScreeningSlot, ScreeningType, Theater, TheaterId,
};
pub use wizard::{
    DetailsForm, PrivateContentForm, WizardAction, WizardEnvironment, WizardError, WizardReducer,
    WizardState, WizardStep,
};
