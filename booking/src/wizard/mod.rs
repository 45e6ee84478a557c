//! Booking wizard: a reducer over a tagged-variant step state.
//!
//! Run it in a [`marquee_runtime::Store`] so the payment delay executes and
//! can be cancelled:
//!
//! ```ignore
//! let store = Store::new(WizardState::new(), WizardReducer::new(), env);
//! store.send(WizardAction::Enter { theater_id, suggested_movie: None }).await?;
//! store.send(WizardAction::SelectTime("10:00 AM".into())).await?;
//! ```

mod actions;
mod environment;
mod reducer;
mod types;


pub use actions::{DetailsForm, PrivateContentForm, WizardAction};
pub use environment::{DEFAULT_BOOKING_WINDOW_DAYS, DEFAULT_PAYMENT_DELAY, WizardEnvironment};
pub use reducer::{PAYMENT_TIMER, WizardReducer};
pub use types::{Flow, Step, WizardError, WizardState, WizardStep};
