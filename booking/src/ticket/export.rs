//! Ticket export: rasterize the confirmation region, encode, hand to a sink.

use super::pdf::encode_pdf;
use super::surface::{RasterizeError, TicketSurface};
use crate::types::BookingId;
use base64::Engine;
use futures::future::BoxFuture;
use image::{ImageFormat, RgbaImage};
use std::fmt;
use std::io::{self, Cursor};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Export failure. Nothing is written when rendering or encoding fails.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The region could not be rasterized
    #[error("Unable to render ticket: {0}")]
    Render(#[from] RasterizeError),

    /// The bitmap could not be encoded
    #[error("Failed to encode ticket: {0}")]
    Encode(#[from] image::ImageError),

    /// The sink refused the artifact
    #[error("Failed to save {file_name}: {source}")]
    Save {
        /// Artifact name
        file_name: String,
        /// Underlying error
        #[source]
        source: io::Error,
    },
}

/// Output format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// A4 PDF
    Pdf,
    /// PNG
    Image,
    /// HTML with an embedded PNG, opened by Word as a `.doc`
    Word,
}

impl ExportFormat {
    /// Every format
    pub const ALL: [Self; 3] = [Self::Pdf, Self::Image, Self::Word];

    /// File extension
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Image => "png",
            Self::Word => "doc",
        }
    }

    /// MIME type
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Image => "image/png",
            Self::Word => "application/msword",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => f.write_str("pdf"),
            Self::Image => f.write_str("image"),
            Self::Word => f.write_str("word"),
        }
    }
}

/// Unknown format name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown export format: {0:?} (expected pdf, image or word)")]
pub struct ParseExportFormatError(String);

impl FromStr for ExportFormat {
    type Err = ParseExportFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "image" | "png" => Ok(Self::Image),
            "word" | "doc" => Ok(Self::Word),
            _ => Err(ParseExportFormatError(s.to_string())),
        }
    }
}

/// An encoded ticket file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// File name, `<prefix>-<id>.<ext>`
    pub file_name: String,
    /// MIME type
    pub mime_type: &'static str,
    /// Encoded bytes
    pub bytes: Vec<u8>,
}

/// Where exported artifacts are delivered
pub trait ArtifactSink: Send + Sync {
    /// Store `artifact`, returning where it went
    fn save<'a>(&'a self, artifact: &'a Artifact) -> BoxFuture<'a, io::Result<String>>;
}

/// Writes artifacts into a directory
///
/// Each file is written to a temporary name and renamed into place, so a
/// reader never sees a partial ticket.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    /// Sink writing into `root`, created on first save
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ArtifactSink for DirectorySink {
    fn save<'a>(&'a self, artifact: &'a Artifact) -> BoxFuture<'a, io::Result<String>> {
        Box::pin(async move {
            tokio::fs::create_dir_all(&self.root).await?;
            let path = self.root.join(&artifact.file_name);
            let temp = self.root.join(format!(".{}.tmp", artifact.file_name));

            tokio::fs::write(&temp, &artifact.bytes).await?;
            if let Err(error) = tokio::fs::rename(&temp, &path).await {
                let _ = tokio::fs::remove_file(&temp).await;
                return Err(error);
            }
            Ok(path.display().to_string())
        })
    }
}

/// Keeps artifacts in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: Mutex<Vec<Artifact>>,
}

impl MemorySink {
    /// Empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything saved so far, in order
    #[must_use]
    pub fn artifacts(&self) -> Vec<Artifact> {
        self.artifacts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The artifact saved under `file_name`
    #[must_use]
    pub fn get(&self, file_name: &str) -> Option<Artifact> {
        self.artifacts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|artifact| artifact.file_name == file_name)
            .cloned()
    }
}

impl ArtifactSink for MemorySink {
    fn save<'a>(&'a self, artifact: &'a Artifact) -> BoxFuture<'a, io::Result<String>> {
        self.artifacts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(artifact.clone());
        let location = format!("memory://{}", artifact.file_name);
        Box::pin(async move { Ok(location) })
    }
}

/// A saved ticket
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedTicket {
    /// Format
    pub format: ExportFormat,
    /// File name
    pub file_name: String,
    /// Location reported by the sink
    pub location: String,
}

/// `<prefix>-<id|new>.<ext>`
#[must_use]
pub fn file_name(prefix: &str, format: ExportFormat, booking_id: Option<&BookingId>) -> String {
    let id = booking_id.map_or("new", BookingId::as_str);
    format!("{prefix}-{id}.{}", format.extension())
}

/// Encode `bitmap` in `format`
///
/// # Errors
///
/// Returns [`ExportError::Encode`] if PNG encoding fails.
pub fn encode(bitmap: &RgbaImage, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Image => encode_png(bitmap),
        ExportFormat::Pdf => Ok(encode_pdf(bitmap)),
        ExportFormat::Word => {
            let png = encode_png(bitmap)?;
            Ok(word_document(&png).into_bytes())
        },
    }
}

fn encode_png(bitmap: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut png = Cursor::new(Vec::new());
    bitmap.write_to(&mut png, ImageFormat::Png)?;
    Ok(png.into_inner())
}

fn word_document(png: &[u8]) -> String {
    let data = base64::engine::general_purpose::STANDARD.encode(png);
    format!(
        "<!DOCTYPE html>\n<html>\n  <head>\n    <title>Reel Revival Ticket</title>\n  </head>\n  <body>\n    <div>\n      <img src=\"data:image/png;base64,{data}\" alt=\"Ticket\" style=\"width: 100%;\" />\n    </div>\n  </body>\n</html>\n"
    )
}

/// Exports the confirmation region of a surface to a sink
#[derive(Clone)]
pub struct TicketExporter {
    surface: Arc<dyn TicketSurface>,
    sink: Arc<dyn ArtifactSink>,
    prefix: String,
}

impl TicketExporter {
    /// Exporter using `prefix` for file names
    #[must_use]
    pub fn new(
        surface: Arc<dyn TicketSurface>,
        sink: Arc<dyn ArtifactSink>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            surface,
            sink,
            prefix: prefix.into(),
        }
    }

    /// Export the region matching `selector` in one format
    ///
    /// # Errors
    ///
    /// See [`ExportError`]. Nothing reaches the sink unless encoding succeeded.
    pub async fn export(
        &self,
        format: ExportFormat,
        selector: &str,
        booking_id: Option<&BookingId>,
    ) -> Result<ExportedTicket, ExportError> {
        let mut exported = self.export_all(&[format], selector, booking_id).await?;
        Ok(exported.remove(0))
    }

    /// Rasterize once and export in every format of `formats`
    ///
    /// # Errors
    ///
    /// See [`ExportError`]. Every format is encoded before anything is saved.
    #[tracing::instrument(skip(self, booking_id), fields(booking_id = ?booking_id.map(BookingId::as_str)))]
    pub async fn export_all(
        &self,
        formats: &[ExportFormat],
        selector: &str,
        booking_id: Option<&BookingId>,
    ) -> Result<Vec<ExportedTicket>, ExportError> {
        let bitmap = self.surface.rasterize(selector).await.inspect_err(|error| {
            tracing::warn!(%error, "Ticket rasterization failed");
        })?;

        let artifacts = formats
            .iter()
            .map(|&format| {
                Ok((
                    format,
                    Artifact {
                        file_name: file_name(&self.prefix, format, booking_id),
                        mime_type: format.mime_type(),
                        bytes: encode(&bitmap, format)?,
                    },
                ))
            })
            .collect::<Result<Vec<_>, ExportError>>()?;

        let mut exported = Vec::with_capacity(artifacts.len());
        for (format, artifact) in artifacts {
            let location = self
                .sink
                .save(&artifact)
                .await
                .map_err(|source| ExportError::Save {
                    file_name: artifact.file_name.clone(),
                    source,
                })?;
            tracing::info!(%format, %location, "Ticket exported");
            exported.push(ExportedTicket {
                format,
                file_name: artifact.file_name,
                location,
            });
        }
        Ok(exported)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn file_names_use_the_id_or_new() {
        let id = BookingId::new("ABC123DEF456".to_string());
        assert_eq!(
            file_name("reel-revival-ticket", ExportFormat::Pdf, Some(&id)),
            "reel-revival-ticket-ABC123DEF456.pdf"
        );
        assert_eq!(
            file_name("reel-revival-ticket", ExportFormat::Word, None),
            "reel-revival-ticket-new.doc"
        );
        assert_eq!(
            file_name("t", ExportFormat::Image, None),
            "t-new.png"
        );
    }

    #[test]
    fn formats_parse_by_name_or_extension() {
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert_eq!("png".parse::<ExportFormat>().unwrap(), ExportFormat::Image);
        assert_eq!("word".parse::<ExportFormat>().unwrap(), ExportFormat::Word);
        assert!("docx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn word_document_embeds_the_png() {
        let bitmap = RgbaImage::new(2, 2);
        let html = String::from_utf8(encode(&bitmap, ExportFormat::Word).unwrap()).unwrap();
        let png = encode(&bitmap, ExportFormat::Image).unwrap();
        let data = base64::engine::general_purpose::STANDARD.encode(png);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(&format!("src=\"data:image/png;base64,{data}\"")));
    }

    #[tokio::test]
    async fn directory_sink_writes_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("tickets"));
        let artifact = Artifact {
            file_name: "ticket.png".to_string(),
            mime_type: "image/png",
            bytes: vec![1, 2, 3],
        };

        let location = sink.save(&artifact).await.unwrap();
        let path = dir.path().join("tickets").join("ticket.png");
        assert_eq!(location, path.display().to_string());
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
        assert!(!dir.path().join("tickets").join(".ticket.png.tmp").exists());
    }
}
