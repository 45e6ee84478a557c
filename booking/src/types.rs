//! Domain types for the booking engine.
//!
//! Catalog entities (theaters, movies, content types), the screening a
//! booking is for, and the confirmed booking record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of a theater in the catalog
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TheaterId(u32);

impl TheaterId {
    /// Create a `TheaterId` from its numeric value
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the numeric value
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TheaterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A route segment that is not a theater id
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid theater id: {0:?}")]
pub struct ParseTheaterIdError(String);

impl FromStr for TheaterId {
    type Err = ParseTheaterIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| ParseTheaterIdError(s.to_string()))
    }
}

/// Identifier of a movie in the catalog
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(u32);

impl MovieId {
    /// Create a `MovieId` from its numeric value
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the numeric value
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier assigned to a booking at confirmation
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(String);

impl BookingId {
    /// Wrap an already generated token
    #[must_use]
    pub const fn new(token: String) -> Self {
        Self(token)
    }

    /// Get the token
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Catalog entities
// ============================================================================

/// A bookable venue with a flat rental price
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theater {
    /// Theater ID
    pub id: TheaterId,
    /// Display name
    pub name: String,
    /// Street address
    pub location: String,
    /// Seat count, the upper bound for attendees
    pub capacity: u32,
    /// Rental price in rupees, independent of the attendee count
    pub price: u64,
    /// Image URL
    pub image: String,
    /// Offered times of day, in display order
    pub available_times: Vec<String>,
}

impl Theater {
    /// Whether `time` is one of the offered times
    #[must_use]
    pub fn offers(&self, time: &str) -> bool {
        self.available_times.iter().any(|offered| offered == time)
    }
}

/// Film industry a movie belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Industry {
    /// Hollywood
    Hollywood,
    /// Bollywood
    Bollywood,
    /// Tollywood
    Tollywood,
}

impl Industry {
    /// All industries in catalog order
    pub const ALL: [Self; 3] = [Self::Hollywood, Self::Bollywood, Self::Tollywood];

    /// Lowercase tag
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hollywood => "hollywood",
            Self::Bollywood => "bollywood",
            Self::Tollywood => "tollywood",
        }
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog category: every movie, or one industry
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Category {
    /// Every movie
    #[default]
    All,
    /// Movies of one industry
    Industry(Industry),
}

impl Category {
    /// Whether a movie of `industry` belongs to this category
    #[must_use]
    pub fn includes(self, industry: Industry) -> bool {
        match self {
            Self::All => true,
            Self::Industry(only) => only == industry,
        }
    }
}

/// Unknown category name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown category: {0:?} (expected all, hollywood, bollywood or tollywood)")]
pub struct ParseCategoryError(String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "hollywood" => Ok(Self::Industry(Industry::Hollywood)),
            "bollywood" => Ok(Self::Industry(Industry::Bollywood)),
            "tollywood" => Ok(Self::Industry(Industry::Tollywood)),
            _ => Err(ParseCategoryError(s.to_string())),
        }
    }
}

/// A curated movie
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    /// Movie ID
    pub id: MovieId,
    /// Title
    pub title: String,
    /// Release year
    pub year: u16,
    /// Genres, comma separated
    pub genre: String,
    /// Poster URL
    pub poster: String,
    /// Industry tag
    pub industry: Industry,
}

/// Kind of user-supplied content for a private screening
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentType {
    /// Documentary
    Documentary,
    /// Short film
    ShortFilm,
    /// Feature film
    Feature,
    /// Animation
    Animation,
    /// Music video
    Music,
    /// Presentation
    Presentation,
    /// Anything else
    Other,
}

impl ContentType {
    /// Every content type, in display order
    pub const ALL: [Self; 7] = [
        Self::Documentary,
        Self::ShortFilm,
        Self::Feature,
        Self::Animation,
        Self::Music,
        Self::Presentation,
        Self::Other,
    ];

    /// Stable id, as submitted by forms
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Documentary => "documentary",
            Self::ShortFilm => "shortFilm",
            Self::Feature => "feature",
            Self::Animation => "animation",
            Self::Music => "music",
            Self::Presentation => "presentation",
            Self::Other => "other",
        }
    }

    /// Display name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Documentary => "Documentary",
            Self::ShortFilm => "Short Film",
            Self::Feature => "Feature Film",
            Self::Animation => "Animation",
            Self::Music => "Music Video",
            Self::Presentation => "Presentation",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A content type id that is not in the closed set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown content type: {0:?}")]
pub struct ParseContentTypeError(pub String);

impl FromStr for ContentType {
    type Err = ParseContentTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim();
        Self::ALL
            .into_iter()
            .find(|content_type| content_type.id() == id)
            .ok_or_else(|| ParseContentTypeError(id.to_string()))
    }
}

// ============================================================================
// Booking
// ============================================================================

/// Regular (curated movie) or private (user-supplied content) screening
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreeningType {
    /// A movie from the catalog
    Regular,
    /// The customer's own content
    Private,
}

impl fmt::Display for ScreeningType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regular => f.write_str("regular"),
            Self::Private => f.write_str("private"),
        }
    }
}

/// Content brought by the customer for a private screening
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateContent {
    /// Kind of content
    pub content_type: ContentType,
    /// Title
    pub title: String,
    /// Free-text running time, e.g. "90 minutes"
    pub duration: String,
    /// Description
    pub description: String,
}

/// What is being screened. Exactly one of movie or content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screeningType", rename_all = "lowercase")]
pub enum Screening {
    /// A catalog movie
    Regular {
        /// The movie
        movie: Movie,
    },
    /// Customer content
    Private {
        /// The content
        content: PrivateContent,
    },
}

impl Screening {
    /// Regular or private
    #[must_use]
    pub const fn screening_type(&self) -> ScreeningType {
        match self {
            Self::Regular { .. } => ScreeningType::Regular,
            Self::Private { .. } => ScreeningType::Private,
        }
    }

    /// Movie title or content title
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Regular { movie } => &movie.title,
            Self::Private { content } => &content.title,
        }
    }

    /// True for private screenings
    #[must_use]
    pub const fn is_private(&self) -> bool {
        matches!(self, Self::Private { .. })
    }
}

/// Date and time of day chosen for the screening
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningSlot {
    /// Calendar date
    pub date: NaiveDate,
    /// One of the theater's offered times
    pub time: String,
}

/// Contact information of the person booking
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    /// Full name
    pub name: String,
    /// Email address
    pub email: String,
    /// Phone number
    pub phone: String,
}

/// Simulated payment method
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Credit or debit card
    Card,
    /// `PhonePe`
    PhonePe,
    /// Paytm
    Paytm,
    /// Google Pay
    GPay,
}

impl PaymentMethod {
    /// Lowercase tag
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::PhonePe => "phonepe",
            Self::Paytm => "paytm",
            Self::GPay => "gpay",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown payment method name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown payment method: {0:?} (expected card, phonepe, paytm or gpay)")]
pub struct ParsePaymentMethodError(String);

impl FromStr for PaymentMethod {
    type Err = ParsePaymentMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "card" => Ok(Self::Card),
            "phonepe" => Ok(Self::PhonePe),
            "paytm" => Ok(Self::Paytm),
            "gpay" => Ok(Self::GPay),
            _ => Err(ParsePaymentMethodError(s.to_string())),
        }
    }
}

/// A complete booking, ready to be confirmed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    /// Theater being rented
    pub theater: Theater,
    /// Date and time
    pub slot: ScreeningSlot,
    /// Movie or private content
    pub screening: Screening,
    /// Contact details
    pub contact: ContactDetails,
    /// Number of attendees, within `1..=theater.capacity`
    pub attendees: u32,
    /// Payment method
    pub payment_method: PaymentMethod,
}

/// Booking status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Paid and confirmed
    Confirmed,
    /// Awaiting payment
    Pending,
    /// Cancelled
    Cancelled,
}

/// A booking after payment. Never mutated once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedBooking {
    /// Assigned id
    pub id: BookingId,
    /// The booked details
    #[serde(flatten)]
    pub details: BookingDraft,
    /// When the booking was confirmed
    pub created_at: DateTime<Utc>,
    /// Always `Confirmed` for bookings created by the store
    pub status: BookingStatus,
}

impl ConfirmedBooking {
    /// Theater being rented
    #[must_use]
    pub const fn theater(&self) -> &Theater {
        &self.details.theater
    }

    /// Movie or private content
    #[must_use]
    pub const fn screening(&self) -> &Screening {
        &self.details.screening
    }

    /// Date and time
    #[must_use]
    pub const fn slot(&self) -> &ScreeningSlot {
        &self.details.slot
    }

    /// Number of attendees
    #[must_use]
    pub const fn attendees(&self) -> u32 {
        self.details.attendees
    }

    /// Amount paid: the theater's flat price
    #[must_use]
    pub const fn total_amount(&self) -> u64 {
        self.details.theater.price
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn theater_id_parses_route_segments() {
        assert_eq!("3".parse::<TheaterId>().unwrap(), TheaterId::new(3));
        assert!("abc".parse::<TheaterId>().is_err());
        assert!("-1".parse::<TheaterId>().is_err());
    }

    #[test]
    fn content_type_ids_round_trip() {
        for content_type in ContentType::ALL {
            assert_eq!(content_type.id().parse::<ContentType>().unwrap(), content_type);
        }
        assert_eq!(
            "film".parse::<ContentType>().unwrap_err(),
            ParseContentTypeError("film".to_string())
        );
    }

    #[test]
    fn content_type_serializes_as_id() {
        assert_eq!(
            serde_json::to_string(&ContentType::ShortFilm).unwrap(),
            "\"shortFilm\""
        );
    }

    #[test]
    fn category_parsing() {
        assert_eq!("All".parse::<Category>().unwrap(), Category::All);
        assert_eq!(
            "tollywood".parse::<Category>().unwrap(),
            Category::Industry(Industry::Tollywood)
        );
        assert!("kollywood".parse::<Category>().is_err());
        assert!(Category::All.includes(Industry::Bollywood));
        assert!(!Category::Industry(Industry::Hollywood).includes(Industry::Bollywood));
    }

    #[test]
    fn payment_method_parsing() {
        assert_eq!("GPay".parse::<PaymentMethod>().unwrap(), PaymentMethod::GPay);
        assert!("cash".parse::<PaymentMethod>().is_err());
    }
}
