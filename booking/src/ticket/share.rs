//! Sharing a confirmed booking: platform links or the host's native share sheet.

use super::summary::{share_text, share_title};
use super::surface::TicketSurface;
use crate::types::ConfirmedBooking;
use futures::future::BoxFuture;
use image::ImageFormat;
use std::convert::Infallible;
use std::fmt;
use std::io::Cursor;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Subject line of email shares
pub const EMAIL_SUBJECT: &str = "My Booking at Reel Revival";

/// File name of the ticket image attached to native shares
pub const ATTACHMENT_NAME: &str = "ticket.png";

/// Where a booking is shared
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SharePlatform {
    /// WhatsApp web link
    WhatsApp,
    /// Facebook sharer
    Facebook,
    /// Twitter intent
    Twitter,
    /// `mailto:` link
    Email,
    /// Anything else, handled by the native share surface
    Other(String),
}

impl FromStr for SharePlatform {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "whatsapp" => Self::WhatsApp,
            "facebook" => Self::Facebook,
            "twitter" => Self::Twitter,
            "email" => Self::Email,
            _ => Self::Other(s.trim().to_string()),
        })
    }
}

impl fmt::Display for SharePlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WhatsApp => f.write_str("whatsapp"),
            Self::Facebook => f.write_str("facebook"),
            Self::Twitter => f.write_str("twitter"),
            Self::Email => f.write_str("email"),
            Self::Other(tag) => f.write_str(tag),
        }
    }
}

/// Share failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShareError {
    /// No link template and no native share surface
    #[error("Sharing to {platform} is not supported here")]
    Unsupported {
        /// Requested platform
        platform: String,
    },

    /// The native share surface refused or was dismissed
    #[error("Share was rejected: {0}")]
    Rejected(String),
}

/// Opens outbound links (a browser tab, a mail client)
pub trait LinkOpener: Send + Sync {
    /// Open `url`; fire-and-forget
    fn open(&self, url: &str);
}

/// Image attached to a native share
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    /// File name
    pub file_name: String,
    /// MIME type
    pub mime_type: &'static str,
    /// Encoded image
    pub bytes: Vec<u8>,
}

/// Payload handed to a native share surface
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareRequest {
    /// Title
    pub title: String,
    /// Summary text
    pub text: String,
    /// Booking page URL
    pub url: String,
    /// Rendered ticket, when rasterization succeeded
    pub attachment: Option<Attachment>,
}

/// Host share sheet
pub trait NativeShare: Send + Sync {
    /// Present `request`; an `Err` carries the host's reason
    fn share<'a>(&'a self, request: &'a ShareRequest) -> BoxFuture<'a, Result<(), String>>;
}

/// What a share did
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShareOutcome {
    /// A platform link was opened
    Link(String),
    /// The native surface accepted the share
    Native {
        /// Whether the ticket image went along
        with_attachment: bool,
    },
}

/// The platform link for `text`, if the platform has one
#[must_use]
pub fn share_link(platform: &SharePlatform, text: &str, page_url: &str) -> Option<String> {
    let text = urlencoding::encode(text);
    let page = urlencoding::encode(page_url);
    match platform {
        SharePlatform::WhatsApp => Some(format!("https://wa.me/?text={text}")),
        SharePlatform::Facebook => Some(format!(
            "https://www.facebook.com/sharer/sharer.php?u={page}&quote={text}"
        )),
        SharePlatform::Twitter => Some(format!(
            "https://twitter.com/intent/tweet?text={text}&url={page}"
        )),
        SharePlatform::Email => Some(format!(
            "mailto:?subject={}&body={text}",
            urlencoding::encode(EMAIL_SUBJECT)
        )),
        SharePlatform::Other(_) => None,
    }
}

/// Shares confirmed bookings through links or the native surface
#[derive(Clone)]
pub struct TicketSharer {
    surface: Arc<dyn TicketSurface>,
    opener: Arc<dyn LinkOpener>,
    native: Option<Arc<dyn NativeShare>>,
    page_url: String,
    selector: String,
}

impl TicketSharer {
    /// Sharer without a native share surface
    #[must_use]
    pub fn new(
        surface: Arc<dyn TicketSurface>,
        opener: Arc<dyn LinkOpener>,
        page_url: impl Into<String>,
        selector: impl Into<String>,
    ) -> Self {
        Self {
            surface,
            opener,
            native: None,
            page_url: page_url.into(),
            selector: selector.into(),
        }
    }

    /// Use `native` for platforms without a link template
    #[must_use]
    pub fn with_native(mut self, native: Arc<dyn NativeShare>) -> Self {
        self.native = Some(native);
        self
    }

    /// Share `booking` on `platform`
    ///
    /// # Errors
    ///
    /// [`ShareError::Unsupported`] when the platform has no link and there is
    /// no native surface; [`ShareError::Rejected`] when the native surface
    /// declines.
    #[tracing::instrument(skip(self, booking), fields(booking_id = %booking.id))]
    pub async fn share(
        &self,
        platform: &SharePlatform,
        booking: &ConfirmedBooking,
    ) -> Result<ShareOutcome, ShareError> {
        let text = share_text(booking);

        if let Some(link) = share_link(platform, &text, &self.page_url) {
            self.opener.open(&link);
            tracing::info!(%platform, "Opened share link");
            return Ok(ShareOutcome::Link(link));
        }

        let Some(native) = &self.native else {
            return Err(ShareError::Unsupported {
                platform: platform.to_string(),
            });
        };

        let request = ShareRequest {
            title: share_title(booking),
            text,
            url: self.page_url.clone(),
            attachment: self.attachment().await,
        };
        let with_attachment = request.attachment.is_some();

        native
            .share(&request)
            .await
            .map_err(ShareError::Rejected)?;
        tracing::info!(%platform, with_attachment, "Shared through native surface");
        Ok(ShareOutcome::Native { with_attachment })
    }

    async fn attachment(&self) -> Option<Attachment> {
        let bitmap = match self.surface.rasterize(&self.selector).await {
            Ok(bitmap) => bitmap,
            Err(error) => {
                tracing::debug!(%error, "Sharing without ticket image");
                return None;
            },
        };

        let mut png = Cursor::new(Vec::new());
        if let Err(error) = bitmap.write_to(&mut png, ImageFormat::Png) {
            tracing::debug!(%error, "Sharing without ticket image");
            return None;
        }
        Some(Attachment {
            file_name: ATTACHMENT_NAME.to_string(),
            mime_type: "image/png",
            bytes: png.into_inner(),
        })
    }
}
