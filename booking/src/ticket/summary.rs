//! Plain-text renderings of a confirmed booking.

use crate::types::{ConfirmedBooking, Screening};
use std::fmt::Write;

/// Text shared alongside a booking
#[must_use]
pub fn share_text(booking: &ConfirmedBooking) -> String {
    let what = if booking.screening().is_private() {
        "a private screening"
    } else {
        "tickets"
    };
    let slot = booking.slot();
    format!(
        "I just booked {what} for {title} at {theater}!\nDate: {date}\nTime: {time}\n\nBook your own exclusive theater experience at Reel Revival!",
        title = booking.screening().title(),
        theater = booking.theater().name,
        date = slot.date,
        time = slot.time,
    )
}

/// Title for native share surfaces
#[must_use]
pub fn share_title(booking: &ConfirmedBooking) -> String {
    match booking.screening() {
        Screening::Private { .. } => "My Private Screening at Reel Revival".to_string(),
        Screening::Regular { movie } => format!("My {} at Reel Revival", movie.title),
    }
}

/// The plain-text ticket
#[must_use]
pub fn ticket_text(booking: &ConfirmedBooking) -> String {
    let mut text = String::from(
        "REEL REVIVAL - BOOKING CONFIRMATION\n---------------------------------\n",
    );
    let slot = booking.slot();

    // Writing to a String cannot fail.
    let _ = writeln!(text, "Booking ID: {}", booking.id);
    let _ = writeln!(text, "Theater: {}", booking.theater().name);
    match booking.screening() {
        Screening::Regular { movie } => {
            let _ = writeln!(text, "Movie: {}", movie.title);
        },
        Screening::Private { content } => {
            let _ = writeln!(text, "Content: {}", content.title);
            let _ = writeln!(text, "Content Type: {}", content.content_type.name());
        },
    }
    let _ = writeln!(text, "Date: {}", slot.date);
    let _ = writeln!(text, "Time: {}", slot.time);
    let _ = writeln!(text, "Attendees: {}", booking.attendees());
    let _ = writeln!(text, "Total Amount: {}", format_rupees(booking.total_amount()));
    text
}

/// `₹` followed by the amount with thousands separators
#[must_use]
pub fn format_rupees(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("₹{grouped}")
}
