//! Headless drawing of the confirmation ticket.
//!
//! Hosts with a real display rasterize their own confirmation view. Without
//! one, [`TicketCard`] draws a ticket-shaped bitmap: a header band coloured by
//! screening type, a perforated stub, one seat mark per attendee and a
//! barcode derived from the booking id.

use crate::types::{ConfirmedBooking, ScreeningType};
use image::{Rgba, RgbaImage};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 280;
const STUB_X: u32 = 480;
const HEADER_HEIGHT: u32 = 56;
const MARGIN: u32 = 24;

const PAPER: Rgba<u8> = Rgba([253, 246, 227, 255]);
const INK: Rgba<u8> = Rgba([33, 24, 20, 255]);
const BURGUNDY: Rgba<u8> = Rgba([128, 0, 32, 255]);
const GOLD: Rgba<u8> = Rgba([212, 175, 55, 255]);

/// Renders a confirmed booking as a ticket bitmap
#[derive(Clone, Copy, Debug, Default)]
pub struct TicketCard;

impl TicketCard {
    /// Width and height of rendered tickets
    pub const DIMENSIONS: (u32, u32) = (WIDTH, HEIGHT);

    /// Draw `booking`
    #[must_use]
    pub fn render(booking: &ConfirmedBooking) -> RgbaImage {
        let mut card = RgbaImage::from_pixel(WIDTH, HEIGHT, PAPER);

        let accent = match booking.screening().screening_type() {
            ScreeningType::Regular => BURGUNDY,
            ScreeningType::Private => GOLD,
        };
        fill(&mut card, 0, 0, WIDTH, HEADER_HEIGHT, accent);

        // Perforation between body and stub
        for y in (HEADER_HEIGHT..HEIGHT).step_by(8) {
            fill(&mut card, STUB_X, y, 2, 4, INK);
        }

        draw_seats(&mut card, booking.attendees(), booking.theater().capacity, accent);
        draw_barcode(&mut card, booking.id.as_str().as_bytes());
        card
    }
}

/// One mark per attendee, filled proportionally to the theater's capacity
fn draw_seats(card: &mut RgbaImage, attendees: u32, capacity: u32, accent: Rgba<u8>) {
    const COLUMNS: u32 = 20;
    const ROWS: u32 = 5;
    const CELL: u32 = 20;

    let cells = COLUMNS * ROWS;
    let filled = if capacity == 0 {
        0
    } else {
        (u64::from(attendees) * u64::from(cells)).div_ceil(u64::from(capacity))
    };

    for index in 0..cells {
        let x = MARGIN + (index % COLUMNS) * CELL;
        let y = HEADER_HEIGHT + MARGIN + (index / COLUMNS) * CELL;
        if u64::from(index) < filled {
            fill(card, x, y, CELL - 6, CELL - 6, accent);
        } else {
            outline(card, x, y, CELL - 6, CELL - 6, INK);
        }
    }
}

/// Vertical bars on the stub, one per bit of the id
fn draw_barcode(card: &mut RgbaImage, id: &[u8]) {
    let top = HEADER_HEIGHT + MARGIN;
    let height = HEIGHT - top - MARGIN;
    let columns = (STUB_X + 4 + MARGIN..WIDTH - MARGIN).zip(
        id.iter()
            .flat_map(|byte| (0..8).map(move |bit| byte & (0x80 >> bit) != 0)),
    );

    for (x, set) in columns {
        if set {
            fill(card, x, top, 1, height, INK);
        }
    }
}

fn fill(card: &mut RgbaImage, x: u32, y: u32, width: u32, height: u32, colour: Rgba<u8>) {
    for py in y..(y + height).min(card.height()) {
        for px in x..(x + width).min(card.width()) {
            card.put_pixel(px, py, colour);
        }
    }
}

fn outline(card: &mut RgbaImage, x: u32, y: u32, width: u32, height: u32, colour: Rgba<u8>) {
    fill(card, x, y, width, 1, colour);
    fill(card, x, y + height - 1, width, 1, colour);
    fill(card, x, y, 1, height, colour);
    fill(card, x + width - 1, y, 1, height, colour);
}
