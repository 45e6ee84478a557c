//! Wizard actions and raw form input.

use crate::types::{MovieId, PaymentMethod, ScreeningType, TheaterId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Private content form, as typed by the customer
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateContentForm {
    /// Content type id, e.g. `shortFilm`
    pub content_type: String,
    /// Title
    pub content_title: String,
    /// Running time
    pub content_duration: String,
    /// Description
    pub content_description: String,
}

/// Contact details form, as typed by the customer
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailsForm {
    /// Full name
    pub name: String,
    /// Email address
    pub email: String,
    /// Phone number
    pub phone: String,
    /// Attendee count; validated against the theater's capacity
    pub attendees: i64,
}

/// Actions for the booking wizard
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WizardAction {
    /// Start booking a theater
    Enter {
        /// Theater from the route
        theater_id: TheaterId,
        /// Movie picked in the gallery
        suggested_movie: Option<MovieId>,
    },
    /// Pick a day of the booking window
    SelectDate(NaiveDate),
    /// Pick one of the theater's times
    SelectTime(String),
    /// Regular or private
    ChooseScreeningType(ScreeningType),
    /// Pick a catalog movie
    SelectMovie(MovieId),
    /// Submit the private content form
    SubmitPrivateContent(PrivateContentForm),
    /// Submit contact details
    SubmitDetails(DetailsForm),
    /// Pay; starts the simulated processing delay
    SelectPayment(PaymentMethod),
    /// The processing delay elapsed
    PaymentSettled,
    /// Previous step
    Back,
    /// Leave the wizard and discard the draft
    Exit,
}

impl WizardAction {
    /// Short name for logs and errors
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Enter { .. } => "Enter",
            Self::SelectDate(_) => "SelectDate",
            Self::SelectTime(_) => "SelectTime",
            Self::ChooseScreeningType(_) => "ChooseScreeningType",
            Self::SelectMovie(_) => "SelectMovie",
            Self::SubmitPrivateContent(_) => "SubmitPrivateContent",
            Self::SubmitDetails(_) => "SubmitDetails",
            Self::SelectPayment(_) => "SelectPayment",
            Self::PaymentSettled => "PaymentSettled",
            Self::Back => "Back",
            Self::Exit => "Exit",
        }
    }
}
