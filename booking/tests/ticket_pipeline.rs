//! Ticket export and sharing against in-memory host surfaces

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use chrono::NaiveDate;
use futures::future::BoxFuture;
use marquee_booking::ticket::{
    ArtifactSink, DirectorySink, ExportError, ExportFormat, LinkOpener, MemorySink, NativeShare,
    RasterizeError, RenderedRegions, ShareError, ShareOutcome, SharePlatform, ShareRequest,
    TicketCard, TicketExporter, TicketSharer, TicketSurface,
};
use marquee_booking::{
    BookingDraft, BookingStore, Catalog, ConfirmedBooking, ContactDetails, MovieId,
    PaymentMethod, Screening, ScreeningSlot, TheaterId,
};
use marquee_testing::test_clock;
use std::sync::{Arc, Mutex};

// ============================================================================
// Fixtures
// ============================================================================

const SELECTOR: &str = "#booking-confirmation";
const PAGE_URL: &str = "https://reel-revival.app/booking";
const PREFIX: &str = "reel-revival-ticket";

fn godfather_booking() -> ConfirmedBooking {
    let catalog = Catalog::seeded();
    BookingStore::new(Arc::new(test_clock())).create_booking(BookingDraft {
        theater: catalog.theater(TheaterId::new(1)).unwrap().clone(),
        slot: ScreeningSlot {
            date: NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            time: "10:00 AM".to_string(),
        },
        screening: Screening::Regular {
            movie: catalog.movie(MovieId::new(1)).unwrap().clone(),
        },
        contact: ContactDetails {
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            phone: "1234567890".to_string(),
        },
        attendees: 4,
        payment_method: PaymentMethod::Card,
    })
}

fn surface_for(booking: &ConfirmedBooking) -> Arc<RenderedRegions> {
    Arc::new(RenderedRegions::new().with_region(SELECTOR, TicketCard::render(booking)))
}

#[derive(Default)]
struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl LinkOpener for RecordingOpener {
    fn open(&self, url: &str) {
        self.opened.lock().unwrap().push(url.to_string());
    }
}

struct RecordingNative {
    reject: Option<String>,
    requests: Mutex<Vec<ShareRequest>>,
}

impl RecordingNative {
    fn accepting() -> Self {
        Self {
            reject: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn rejecting(reason: &str) -> Self {
        Self {
            reject: Some(reason.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl NativeShare for RecordingNative {
    fn share<'a>(&'a self, request: &'a ShareRequest) -> BoxFuture<'a, Result<(), String>> {
        self.requests.lock().unwrap().push(request.clone());
        let result = self.reject.clone().map_or(Ok(()), Err);
        Box::pin(async move { result })
    }
}

// ============================================================================
// Export
// ============================================================================

#[tokio::test]
async fn missing_region_fails_and_writes_nothing() {
    let sink = Arc::new(MemorySink::new());
    let exporter = TicketExporter::new(
        Arc::new(RenderedRegions::new()),
        sink.clone(),
        PREFIX,
    );

    let error = exporter
        .export(ExportFormat::Pdf, SELECTOR, None)
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        ExportError::Render(RasterizeError::RegionNotFound(ref selector)) if selector == SELECTOR
    ));
    assert!(sink.artifacts().is_empty());
}

#[tokio::test]
async fn image_export_decodes_to_the_rendered_ticket() {
    let booking = godfather_booking();
    let sink = Arc::new(MemorySink::new());
    let exporter = TicketExporter::new(surface_for(&booking), sink.clone(), PREFIX);

    let exported = exporter
        .export(ExportFormat::Image, SELECTOR, Some(&booking.id))
        .await
        .unwrap();

    let file_name = format!("{PREFIX}-{}.png", booking.id);
    assert_eq!(exported.file_name, file_name);
    assert_eq!(exported.location, format!("memory://{file_name}"));

    let artifact = sink.get(&file_name).unwrap();
    assert_eq!(artifact.mime_type, "image/png");
    let decoded = image::load_from_memory(&artifact.bytes).unwrap().to_rgba8();
    assert_eq!(decoded, TicketCard::render(&booking));
}

#[tokio::test]
async fn unsaved_bookings_are_named_new() {
    let booking = godfather_booking();
    let sink = Arc::new(MemorySink::new());
    let exporter = TicketExporter::new(surface_for(&booking), sink.clone(), PREFIX);

    let exported = exporter
        .export(ExportFormat::Word, SELECTOR, None)
        .await
        .unwrap();

    assert_eq!(exported.file_name, "reel-revival-ticket-new.doc");
    let artifact = sink.get("reel-revival-ticket-new.doc").unwrap();
    assert_eq!(artifact.mime_type, "application/msword");
    let html = String::from_utf8(artifact.bytes).unwrap();
    assert!(html.contains("<title>Reel Revival Ticket</title>"));
    assert!(html.contains("<img src=\"data:image/png;base64,"));
}

#[tokio::test]
async fn every_format_is_encoded_from_the_same_pixels() {
    let booking = godfather_booking();
    let sink = Arc::new(MemorySink::new());
    let exporter = TicketExporter::new(surface_for(&booking), sink.clone(), PREFIX);

    let exported = exporter
        .export_all(&ExportFormat::ALL, SELECTOR, Some(&booking.id))
        .await
        .unwrap();
    assert_eq!(exported.len(), 3);

    let artifacts = sink.artifacts();
    let png = &artifacts
        .iter()
        .find(|a| a.mime_type == "image/png")
        .unwrap()
        .bytes;
    let pdf = &artifacts
        .iter()
        .find(|a| a.mime_type == "application/pdf")
        .unwrap()
        .bytes;

    // The PDF embeds raw RGB samples; the card is fully opaque.
    let rgb: Vec<u8> = image::load_from_memory(png)
        .unwrap()
        .to_rgb8()
        .into_raw();
    assert!(pdf.windows(rgb.len()).any(|window| window == rgb.as_slice()));
}

#[tokio::test]
async fn directory_sink_receives_every_format() {
    let booking = godfather_booking();
    let dir = tempfile::tempdir().unwrap();
    let exporter = TicketExporter::new(
        surface_for(&booking),
        Arc::new(DirectorySink::new(dir.path())),
        PREFIX,
    );

    exporter
        .export_all(&ExportFormat::ALL, SELECTOR, Some(&booking.id))
        .await
        .unwrap();

    for extension in ["pdf", "png", "doc"] {
        let path = dir.path().join(format!("{PREFIX}-{}.{extension}", booking.id));
        assert!(std::fs::metadata(&path).unwrap().len() > 0, "{extension}");
    }
    let pdf = std::fs::read(dir.path().join(format!("{PREFIX}-{}.pdf", booking.id))).unwrap();
    assert!(pdf.starts_with(b"%PDF-1.4"));
}

struct FailingSink;

impl ArtifactSink for FailingSink {
    fn save<'a>(
        &'a self,
        _artifact: &'a marquee_booking::ticket::Artifact,
    ) -> BoxFuture<'a, std::io::Result<String>> {
        Box::pin(async {
            Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            ))
        })
    }
}

#[tokio::test]
async fn sink_failures_name_the_file() {
    let booking = godfather_booking();
    let exporter = TicketExporter::new(surface_for(&booking), Arc::new(FailingSink), PREFIX);

    let error = exporter
        .export(ExportFormat::Image, SELECTOR, None)
        .await
        .unwrap_err();

    match error {
        ExportError::Save { file_name, source } => {
            assert_eq!(file_name, "reel-revival-ticket-new.png");
            assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
        },
        other => panic!("expected a save error, got {other:?}"),
    }
}

// ============================================================================
// Share
// ============================================================================

#[tokio::test]
async fn email_share_opens_a_mailto_link() {
    let booking = godfather_booking();
    let opener = Arc::new(RecordingOpener::default());
    let sharer = TicketSharer::new(surface_for(&booking), opener.clone(), PAGE_URL, SELECTOR);

    let outcome = sharer.share(&SharePlatform::Email, &booking).await.unwrap();

    let ShareOutcome::Link(link) = outcome else {
        panic!("expected a link");
    };
    assert!(link.starts_with("mailto:?subject=My%20Booking%20at%20Reel%20Revival&body="));
    assert!(link.contains("The%20Godfather"));
    assert!(link.contains("Shiva%20Ganga"));
    assert_eq!(*opener.opened.lock().unwrap(), vec![link]);
}

#[tokio::test]
async fn whatsapp_share_encodes_the_summary() {
    let booking = godfather_booking();
    let opener = Arc::new(RecordingOpener::default());
    let sharer = TicketSharer::new(surface_for(&booking), opener.clone(), PAGE_URL, SELECTOR);

    let outcome = sharer
        .share(&"whatsapp".parse().unwrap(), &booking)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ShareOutcome::Link(
            "https://wa.me/?text=I%20just%20booked%20tickets%20for%20The%20Godfather%20at%20Shiva%20Ganga%21%0ADate%3A%202025-06-14%0ATime%3A%2010%3A00%20AM%0A%0ABook%20your%20own%20exclusive%20theater%20experience%20at%20Reel%20Revival%21"
                .to_string()
        )
    );
}

#[tokio::test]
async fn other_platforms_need_a_native_surface() {
    let booking = godfather_booking();
    let opener = Arc::new(RecordingOpener::default());
    let sharer = TicketSharer::new(surface_for(&booking), opener.clone(), PAGE_URL, SELECTOR);

    let error = sharer
        .share(&SharePlatform::Other("instagram".to_string()), &booking)
        .await
        .unwrap_err();

    assert_eq!(
        error,
        ShareError::Unsupported {
            platform: "instagram".to_string()
        }
    );
    assert!(opener.opened.lock().unwrap().is_empty());
}

#[tokio::test]
async fn native_share_attaches_the_ticket() {
    let booking = godfather_booking();
    let native = Arc::new(RecordingNative::accepting());
    let sharer = TicketSharer::new(
        surface_for(&booking),
        Arc::new(RecordingOpener::default()),
        PAGE_URL,
        SELECTOR,
    )
    .with_native(native.clone());

    let outcome = sharer
        .share(&SharePlatform::Other("native".to_string()), &booking)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ShareOutcome::Native {
            with_attachment: true
        }
    );

    let requests = native.requests.lock().unwrap();
    let request = &requests[0];
    assert_eq!(request.title, "My The Godfather at Reel Revival");
    assert_eq!(request.url, PAGE_URL);
    assert!(request.text.starts_with("I just booked tickets for The Godfather"));
    let attachment = request.attachment.as_ref().unwrap();
    assert_eq!(attachment.file_name, "ticket.png");
    assert_eq!(attachment.mime_type, "image/png");
    assert!(image::load_from_memory(&attachment.bytes).is_ok());
}

#[tokio::test]
async fn native_share_falls_back_to_text_when_rendering_fails() {
    let booking = godfather_booking();
    let native = Arc::new(RecordingNative::accepting());
    let sharer = TicketSharer::new(
        Arc::new(RenderedRegions::new()),
        Arc::new(RecordingOpener::default()),
        PAGE_URL,
        SELECTOR,
    )
    .with_native(native.clone());

    let outcome = sharer
        .share(&SharePlatform::Other("native".to_string()), &booking)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ShareOutcome::Native {
            with_attachment: false
        }
    );
    assert!(native.requests.lock().unwrap()[0].attachment.is_none());
}

#[tokio::test]
async fn native_rejection_is_reported() {
    let booking = godfather_booking();
    let sharer = TicketSharer::new(
        surface_for(&booking),
        Arc::new(RecordingOpener::default()),
        PAGE_URL,
        SELECTOR,
    )
    .with_native(Arc::new(RecordingNative::rejecting("dismissed")));

    let error = sharer
        .share(&SharePlatform::Other("native".to_string()), &booking)
        .await
        .unwrap_err();

    assert_eq!(error, ShareError::Rejected("dismissed".to_string()));
}

#[tokio::test]
async fn sharing_leaves_the_surface_untouched() {
    let booking = godfather_booking();
    let surface = surface_for(&booking);
    let sharer = TicketSharer::new(
        surface.clone(),
        Arc::new(RecordingOpener::default()),
        PAGE_URL,
        SELECTOR,
    )
    .with_native(Arc::new(RecordingNative::accepting()));

    sharer
        .share(&SharePlatform::Other("native".to_string()), &booking)
        .await
        .unwrap();

    assert_eq!(
        surface.rasterize(SELECTOR).await.unwrap(),
        TicketCard::render(&booking)
    );
}
