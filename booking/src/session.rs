//! Browsing session: which view is shown and which movie was picked in the
//! gallery before the customer chose a theater.

use crate::catalog::Catalog;
use crate::types::{MovieId, ParseTheaterIdError, TheaterId};
use thiserror::Error;

/// Top-level views of the application
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    /// Landing page
    Home,
    /// Movie gallery
    Catalog,
    /// Booking wizard for a theater
    Booking(TheaterId),
}

/// Why a booking route could not be resolved
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The segment is not a theater id at all
    #[error(transparent)]
    Invalid(#[from] ParseTheaterIdError),

    /// Well-formed id with no theater behind it
    #[error("Theater {0} not found")]
    UnknownTheater(TheaterId),
}

impl View {
    /// Resolve the `:theaterId` segment of a booking route
    ///
    /// # Errors
    ///
    /// [`RouteError::Invalid`] for a malformed segment,
    /// [`RouteError::UnknownTheater`] for an id missing from `catalog`.
    pub fn booking(segment: &str, catalog: &Catalog) -> Result<Self, RouteError> {
        let id: TheaterId = segment.parse()?;
        if catalog.theater(id).is_none() {
            return Err(RouteError::UnknownTheater(id));
        }
        Ok(Self::Booking(id))
    }
}

/// Session state that outlives a single view
#[derive(Clone, Debug, Default)]
pub struct BrowsingSession {
    view: Option<View>,
    selected_movie: Option<MovieId>,
}

impl BrowsingSession {
    /// Fresh session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a movie picked in the gallery
    pub fn select_movie(&mut self, movie: MovieId) {
        self.selected_movie = Some(movie);
    }

    /// Movie picked in the gallery, if any
    #[must_use]
    pub const fn selected_movie(&self) -> Option<MovieId> {
        self.selected_movie
    }

    /// Current view
    #[must_use]
    pub const fn view(&self) -> Option<View> {
        self.view
    }

    /// Navigate to `view`
    ///
    /// Home and the gallery forget the selected movie. Entering the booking
    /// view returns it as the wizard's suggestion.
    pub fn enter(&mut self, view: View) -> Option<MovieId> {
        tracing::debug!(?view, "Entering view");
        self.view = Some(view);
        match view {
            View::Home | View::Catalog => {
                self.selected_movie = None;
                None
            },
            View::Booking(_) => self.selected_movie,
        }
    }
}
