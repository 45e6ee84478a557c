//! Host display surface the ticket is rasterized from.

use futures::future::BoxFuture;
use image::RgbaImage;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;

/// Rasterization failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RasterizeError {
    /// Nothing on the surface matches the selector
    #[error("No region matches {0:?}")]
    RegionNotFound(String),

    /// The region exists but could not be drawn
    #[error("Failed to render region: {0}")]
    Render(String),
}

/// A surface that can draw one of its regions into a bitmap
///
/// Implemented by the host: a browser DOM, a native view hierarchy, or
/// [`RenderedRegions`] for headless use.
pub trait TicketSurface: Send + Sync {
    /// Rasterize the region matching `selector`
    fn rasterize<'a>(&'a self, selector: &'a str) -> BoxFuture<'a, Result<RgbaImage, RasterizeError>>;
}

/// In-memory surface of pre-rendered regions keyed by selector
#[derive(Debug, Default)]
pub struct RenderedRegions {
    regions: RwLock<HashMap<String, RgbaImage>>,
}

impl RenderedRegions {
    /// Empty surface
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`RenderedRegions::insert`]
    #[must_use]
    pub fn with_region(self, selector: impl Into<String>, bitmap: RgbaImage) -> Self {
        self.insert(selector, bitmap);
        self
    }

    /// Put `bitmap` on the surface under `selector`, replacing any previous region
    pub fn insert(&self, selector: impl Into<String>, bitmap: RgbaImage) {
        self.regions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(selector.into(), bitmap);
    }

    /// Take a region off the surface
    pub fn remove(&self, selector: &str) -> Option<RgbaImage> {
        self.regions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(selector)
    }
}

impl TicketSurface for RenderedRegions {
    fn rasterize<'a>(&'a self, selector: &'a str) -> BoxFuture<'a, Result<RgbaImage, RasterizeError>> {
        let result = self
            .regions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(selector)
            .cloned()
            .ok_or_else(|| RasterizeError::RegionNotFound(selector.to_string()))
            .and_then(|bitmap| {
                if bitmap.width() == 0 || bitmap.height() == 0 {
                    Err(RasterizeError::Render(format!("{selector:?} has no area")))
                } else {
                    Ok(bitmap)
                }
            });
        Box::pin(async move { result })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::Rgba;

    #[tokio::test]
    async fn rasterizes_registered_regions() {
        let surface = RenderedRegions::new()
            .with_region("#ticket", RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255])));

        let bitmap = surface.rasterize("#ticket").await.unwrap();
        assert_eq!(bitmap.dimensions(), (3, 2));

        assert_eq!(
            surface.rasterize("#other").await,
            Err(RasterizeError::RegionNotFound("#other".to_string()))
        );
    }

    #[tokio::test]
    async fn empty_regions_cannot_be_rendered() {
        let surface = RenderedRegions::new().with_region("#ticket", RgbaImage::new(0, 0));
        assert!(matches!(
            surface.rasterize("#ticket").await,
            Err(RasterizeError::Render(_))
        ));
    }

    #[tokio::test]
    async fn removed_regions_are_gone() {
        let surface = RenderedRegions::new().with_region("#ticket", RgbaImage::new(1, 1));
        assert!(surface.remove("#ticket").is_some());
        assert!(surface.rasterize("#ticket").await.is_err());
    }
}
