//! Wizard state and validation errors.
//!
//! Each step variant carries exactly the data collected so far, so a step can
//! only be reached once everything before it is filled in.

use crate::types::{
    ConfirmedBooking, ContactDetails, Movie, MovieId, PaymentMethod, Screening, ScreeningSlot,
    ScreeningType, Theater, TheaterId,
};
use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

/// Names of the wizard steps
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WizardStep {
    /// Date and time
    Time,
    /// Regular or private
    ScreeningType,
    /// Movie selection (regular)
    Movie,
    /// Content form (private)
    PrivateContent,
    /// Contact details and attendees
    Details,
    /// Payment method
    Payment,
    /// Booking confirmed
    Confirmation,
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Time => "time",
            Self::ScreeningType => "screeningType",
            Self::Movie => "movie",
            Self::PrivateContent => "privateContent",
            Self::Details => "details",
            Self::Payment => "payment",
            Self::Confirmation => "confirmation",
        };
        f.write_str(name)
    }
}

/// Rejected wizard input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    /// Entered with an id missing from the catalog
    #[error("Theater {0} not found")]
    TheaterNotFound(TheaterId),

    /// Selected a movie missing from the catalog
    #[error("Movie {0} not found")]
    MovieNotFound(MovieId),

    /// Time not offered by the theater
    #[error("{time} is not an available time for this theater")]
    TimeUnavailable {
        /// Requested time
        time: String,
    },

    /// Date outside the booking window
    #[error("{date} is outside the booking window")]
    DateOutsideWindow {
        /// Requested date
        date: NaiveDate,
    },

    /// A required form field is blank
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Content type id outside the closed set
    #[error("Unknown content type: {0}")]
    UnknownContentType(String),

    /// Attendee count outside `1..=capacity`
    #[error("Attendees must be between 1 and {capacity}, got {requested}")]
    AttendeesOutOfRange {
        /// Submitted count
        requested: i64,
        /// Theater capacity
        capacity: u32,
    },

    /// A payment is already being processed
    #[error("Payment is already in progress")]
    PaymentInProgress,

    /// No booking flow is active
    #[error("No booking in progress")]
    NoActiveBooking,

    /// The action does not apply to the current step
    #[error("{action} is not available at the {step} step")]
    NotAvailable {
        /// Current step
        step: WizardStep,
        /// Rejected action
        action: &'static str,
    },
}

/// Progress through the steps, with the data collected so far
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Choosing a time; `date` is the selected day of the window
    Time {
        /// Selected date
        date: NaiveDate,
    },
    /// Choosing regular or private
    ScreeningType {
        /// Chosen slot
        slot: ScreeningSlot,
    },
    /// Choosing a catalog movie
    Movie {
        /// Chosen slot
        slot: ScreeningSlot,
    },
    /// Describing private content
    PrivateContent {
        /// Chosen slot
        slot: ScreeningSlot,
    },
    /// Entering contact details
    Details {
        /// Chosen slot
        slot: ScreeningSlot,
        /// Movie or content
        screening: Screening,
    },
    /// Choosing and processing payment
    Payment {
        /// Chosen slot
        slot: ScreeningSlot,
        /// Movie or content
        screening: Screening,
        /// Contact details
        contact: ContactDetails,
        /// Validated attendee count
        attendees: u32,
        /// Method being processed, if payment has started
        processing: Option<PaymentMethod>,
    },
    /// Done
    Confirmation {
        /// The confirmed booking
        booking: ConfirmedBooking,
    },
}

impl Step {
    /// Name of this step
    #[must_use]
    pub const fn kind(&self) -> WizardStep {
        match self {
            Self::Time { .. } => WizardStep::Time,
            Self::ScreeningType { .. } => WizardStep::ScreeningType,
            Self::Movie { .. } => WizardStep::Movie,
            Self::PrivateContent { .. } => WizardStep::PrivateContent,
            Self::Details { .. } => WizardStep::Details,
            Self::Payment { .. } => WizardStep::Payment,
            Self::Confirmation { .. } => WizardStep::Confirmation,
        }
    }
}

/// An active booking flow for one theater
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Flow {
    /// Theater being booked
    pub theater: Theater,
    /// Dates offered by the time step, starting today
    pub available_dates: Vec<NaiveDate>,
    /// Movie carried over from the gallery, shown as a suggestion
    pub suggested_movie: Option<Movie>,
    /// Current step
    pub step: Step,
}

/// State of the booking wizard
#[derive(Clone, Debug, Default)]
pub struct WizardState {
    /// Active flow, `None` before entering or after exiting
    pub flow: Option<Flow>,
    /// Error from the last rejected input, cleared by the next accepted one
    pub last_error: Option<WizardError>,
}

impl WizardState {
    /// Creates an empty wizard
    #[must_use]
    pub const fn new() -> Self {
        Self {
            flow: None,
            last_error: None,
        }
    }

    /// Current step, `None` outside a flow
    #[must_use]
    pub fn step(&self) -> Option<WizardStep> {
        self.flow.as_ref().map(|flow| flow.step.kind())
    }

    /// Theater being booked
    #[must_use]
    pub fn theater(&self) -> Option<&Theater> {
        self.flow.as_ref().map(|flow| &flow.theater)
    }

    /// Dates offered by the time step
    #[must_use]
    pub fn available_dates(&self) -> &[NaiveDate] {
        self.flow
            .as_ref()
            .map_or(&[], |flow| flow.available_dates.as_slice())
    }

    /// Date currently selected on the time step
    #[must_use]
    pub fn selected_date(&self) -> Option<NaiveDate> {
        match self.flow.as_ref().map(|flow| &flow.step) {
            Some(Step::Time { date }) => Some(*date),
            _ => self.slot().map(|slot| slot.date),
        }
    }

    /// Suggested movie for the movie step
    #[must_use]
    pub fn suggested_movie(&self) -> Option<&Movie> {
        self.flow.as_ref().and_then(|flow| flow.suggested_movie.as_ref())
    }

    /// Chosen date and time, once the time step is done
    #[must_use]
    pub fn slot(&self) -> Option<&ScreeningSlot> {
        match &self.flow.as_ref()?.step {
            Step::Time { .. } => None,
            Step::ScreeningType { slot }
            | Step::Movie { slot }
            | Step::PrivateContent { slot }
            | Step::Details { slot, .. }
            | Step::Payment { slot, .. } => Some(slot),
            Step::Confirmation { booking } => Some(booking.slot()),
        }
    }

    /// Screening type, once it follows from the step
    #[must_use]
    pub fn screening_type(&self) -> Option<ScreeningType> {
        match &self.flow.as_ref()?.step {
            Step::Movie { .. } => Some(ScreeningType::Regular),
            Step::PrivateContent { .. } => Some(ScreeningType::Private),
            _ => self.screening().map(Screening::screening_type),
        }
    }

    /// Movie or content, once chosen
    #[must_use]
    pub fn screening(&self) -> Option<&Screening> {
        match &self.flow.as_ref()?.step {
            Step::Details { screening, .. } | Step::Payment { screening, .. } => Some(screening),
            Step::Confirmation { booking } => Some(booking.screening()),
            _ => None,
        }
    }

    /// True while the simulated payment is running
    #[must_use]
    pub fn is_processing_payment(&self) -> bool {
        matches!(
            self.flow.as_ref().map(|flow| &flow.step),
            Some(Step::Payment {
                processing: Some(_),
                ..
            })
        )
    }

    /// The confirmed booking, on the confirmation step
    #[must_use]
    pub fn booking(&self) -> Option<&ConfirmedBooking> {
        match &self.flow.as_ref()?.step {
            Step::Confirmation { booking } => Some(booking),
            _ => None,
        }
    }
}
