//! Booking wizard reducer.
//!
//! Regular path: `time → screeningType → movie → details → payment → confirmation`.
//! Private path: `time → screeningType → privateContent → details → payment → confirmation`.
//!
//! Selecting a payment method schedules `PaymentSettled` after the configured
//! delay as a cancellable effect under [`PAYMENT_TIMER`]. Leaving the payment
//! step cancels it; a `PaymentSettled` that arrives anyway is ignored.

use super::actions::{DetailsForm, PrivateContentForm, WizardAction};
use super::environment::WizardEnvironment;
use super::types::{Flow, Step, WizardError, WizardState};
use crate::types::{
    BookingDraft, ContactDetails, ContentType, PrivateContent, Screening, ScreeningSlot,
    ScreeningType, Theater,
};
use chrono::Days;
use marquee_core::effect::{Effect, EffectId};
use marquee_core::{reducer::Reducer, smallvec, SmallVec};

/// Id of the simulated payment delay
pub const PAYMENT_TIMER: EffectId = EffectId::new("wizard.payment");

type Effects = SmallVec<[Effect<WizardAction>; 4]>;

/// Reducer for the booking wizard
#[derive(Clone, Debug, Default)]
pub struct WizardReducer;

impl WizardReducer {
    /// Creates a new `WizardReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Applies `action`, returning `Ok(None)` for a stale action that is dropped
    /// without touching the state.
    #[allow(clippy::too_many_lines)] // One arm per action
    fn apply(
        state: &mut WizardState,
        action: WizardAction,
        env: &WizardEnvironment,
    ) -> Result<Option<Effects>, WizardError> {
        let action_name = action.name();

        if let WizardAction::Enter {
            theater_id,
            suggested_movie,
        } = action
        {
            if state.is_processing_payment() {
                return Err(WizardError::PaymentInProgress);
            }
            let Some(theater) = env.catalog.theater(theater_id).cloned() else {
                state.flow = None;
                return Err(WizardError::TheaterNotFound(theater_id));
            };

            let today = env.clock.now().date_naive();
            let available_dates = (0..env.booking_window_days)
                .filter_map(|offset| today.checked_add_days(Days::new(offset.into())))
                .collect();
            let suggested_movie = suggested_movie.and_then(|id| {
                let movie = env.catalog.movie(id).cloned();
                if movie.is_none() {
                    tracing::debug!(movie_id = %id, "Dropping unknown suggested movie");
                }
                movie
            });

            tracing::debug!(theater_id = %theater_id, %today, "Entered booking flow");
            state.flow = Some(Flow {
                theater,
                available_dates,
                suggested_movie,
                step: Step::Time { date: today },
            });
            return Ok(Some(SmallVec::new()));
        }

        if action == WizardAction::Exit {
            let cancel = state.is_processing_payment();
            if state.flow.take().is_some() {
                tracing::debug!("Left booking flow");
            }
            return Ok(Some(if cancel {
                smallvec![Effect::Cancel(PAYMENT_TIMER)]
            } else {
                SmallVec::new()
            }));
        }

        let Some(flow) = state.flow.as_mut() else {
            if action == WizardAction::PaymentSettled {
                tracing::debug!("Ignoring payment settlement outside a booking flow");
                return Ok(None);
            }
            return Err(WizardError::NoActiveBooking);
        };
        let not_available = WizardError::NotAvailable {
            step: flow.step.kind(),
            action: action_name,
        };

        let mut effects = Effects::new();
        let next = match (&flow.step, action) {
            (Step::Time { .. }, WizardAction::SelectDate(date)) => {
                if !flow.available_dates.contains(&date) {
                    return Err(WizardError::DateOutsideWindow { date });
                }
                Step::Time { date }
            },
            (Step::Time { date }, WizardAction::SelectTime(time)) => {
                if !flow.theater.offers(&time) {
                    return Err(WizardError::TimeUnavailable { time });
                }
                Step::ScreeningType {
                    slot: ScreeningSlot { date: *date, time },
                }
            },
            (Step::ScreeningType { slot }, WizardAction::ChooseScreeningType(kind)) => {
                let slot = slot.clone();
                match kind {
                    ScreeningType::Regular => Step::Movie { slot },
                    ScreeningType::Private => Step::PrivateContent { slot },
                }
            },
            (Step::ScreeningType { slot }, WizardAction::Back) => Step::Time { date: slot.date },
            (Step::Movie { slot }, WizardAction::SelectMovie(id)) => {
                let movie = env
                    .catalog
                    .movie(id)
                    .cloned()
                    .ok_or(WizardError::MovieNotFound(id))?;
                Step::Details {
                    slot: slot.clone(),
                    screening: Screening::Regular { movie },
                }
            },
            (Step::PrivateContent { slot }, WizardAction::SubmitPrivateContent(form)) => {
                let content = validate_private_content(&form)?;
                Step::Details {
                    slot: slot.clone(),
                    screening: Screening::Private { content },
                }
            },
            (Step::Movie { slot } | Step::PrivateContent { slot }, WizardAction::Back) => {
                Step::ScreeningType { slot: slot.clone() }
            },
            (Step::Details { slot, screening }, WizardAction::SubmitDetails(form)) => {
                let (contact, attendees) = validate_details(&form, &flow.theater)?;
                Step::Payment {
                    slot: slot.clone(),
                    screening: screening.clone(),
                    contact,
                    attendees,
                    processing: None,
                }
            },
            (Step::Details { slot, screening }, WizardAction::Back) => {
                let slot = slot.clone();
                match screening.screening_type() {
                    ScreeningType::Regular => Step::Movie { slot },
                    ScreeningType::Private => Step::PrivateContent { slot },
                }
            },
            (
                Step::Payment {
                    slot,
                    screening,
                    contact,
                    attendees,
                    processing,
                },
                WizardAction::SelectPayment(method),
            ) => {
                if processing.is_some() {
                    return Err(WizardError::PaymentInProgress);
                }
                tracing::debug!(%method, delay = ?env.payment_delay, "Processing payment");
                effects.push(
                    Effect::Delay {
                        duration: env.payment_delay,
                        action: Box::new(WizardAction::PaymentSettled),
                    }
                    .cancellable(PAYMENT_TIMER),
                );
                Step::Payment {
                    slot: slot.clone(),
                    screening: screening.clone(),
                    contact: contact.clone(),
                    attendees: *attendees,
                    processing: Some(method),
                }
            },
            (
                Step::Payment {
                    slot,
                    screening,
                    contact,
                    attendees,
                    processing: Some(method),
                },
                WizardAction::PaymentSettled,
            ) => {
                let booking = env.bookings.create_booking(BookingDraft {
                    theater: flow.theater.clone(),
                    slot: slot.clone(),
                    screening: screening.clone(),
                    contact: contact.clone(),
                    attendees: *attendees,
                    payment_method: *method,
                });
                tracing::info!(booking_id = %booking.id, "Booking wizard complete");
                Step::Confirmation { booking }
            },
            (Step::Payment { slot, screening, processing, .. }, WizardAction::Back) => {
                if processing.is_some() {
                    effects.push(Effect::Cancel(PAYMENT_TIMER));
                }
                Step::Details {
                    slot: slot.clone(),
                    screening: screening.clone(),
                }
            },
            (_, WizardAction::PaymentSettled) => {
                tracing::debug!(step = %flow.step.kind(), "Ignoring stale payment settlement");
                return Ok(None);
            },
            _ => return Err(not_available),
        };

        tracing::debug!(from = %flow.step.kind(), to = %next.kind(), "Wizard step");
        flow.step = next;
        Ok(Some(effects))
    }
}

fn required(value: &str, field: &'static str) -> Result<String, WizardError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(WizardError::MissingField(field));
    }
    Ok(value.to_string())
}

fn validate_private_content(form: &PrivateContentForm) -> Result<PrivateContent, WizardError> {
    let content_type = required(&form.content_type, "content type")?;
    let title = required(&form.content_title, "content title")?;
    let duration = required(&form.content_duration, "content duration")?;
    let description = required(&form.content_description, "content description")?;

    let content_type = content_type
        .parse::<ContentType>()
        .map_err(|error| WizardError::UnknownContentType(error.0))?;

    Ok(PrivateContent {
        content_type,
        title,
        duration,
        description,
    })
}

fn validate_details(
    form: &DetailsForm,
    theater: &Theater,
) -> Result<(ContactDetails, u32), WizardError> {
    let contact = ContactDetails {
        name: required(&form.name, "name")?,
        email: required(&form.email, "email")?,
        phone: required(&form.phone, "phone")?,
    };

    let attendees = u32::try_from(form.attendees)
        .ok()
        .filter(|count| (1..=theater.capacity).contains(count))
        .ok_or(WizardError::AttendeesOutOfRange {
            requested: form.attendees,
            capacity: theater.capacity,
        })?;

    Ok((contact, attendees))
}

impl Reducer for WizardReducer {
    type State = WizardState;
    type Action = WizardAction;
    type Environment = WizardEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let action_name = action.name();
        match Self::apply(state, action, env) {
            Ok(Some(effects)) => {
                state.last_error = None;
                effects
            },
            Ok(None) => SmallVec::new(),
            Err(error) => {
                tracing::warn!(action = action_name, %error, "Rejected wizard input");
                state.last_error = Some(error);
                SmallVec::new()
            },
        }
    }
}
