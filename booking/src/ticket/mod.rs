//! Ticket output for confirmed bookings.
//!
//! - [`summary`]: share text and the plain-text ticket
//! - [`surface`]: host surfaces the confirmation region is rasterized from
//! - [`card`]: headless ticket drawing
//! - [`export`]: PDF, PNG and Word artifacts
//! - [`share`]: platform links and native share

pub mod card;
pub mod export;
pub mod pdf;
pub mod share;
pub mod summary;
pub mod surface;

pub use card::TicketCard;
pub use export::{
    Artifact, ArtifactSink, DirectorySink, ExportError, ExportFormat, ExportedTicket, MemorySink,
    ParseExportFormatError, TicketExporter,
};
pub use share::{
    Attachment, LinkOpener, NativeShare, ShareError, ShareOutcome, SharePlatform, ShareRequest,
    TicketSharer, share_link,
};
pub use summary::{format_rupees, share_text, share_title, ticket_text};
pub use surface::{RasterizeError, RenderedRegions, TicketSurface};
