//! Single-page PDF containing the ticket bitmap.
//!
//! The page is A4 portrait. The bitmap is drawn from the top-left corner at
//! full page width, its height scaled to keep the aspect ratio. Pixels are
//! stored as an uncompressed RGB image `XObject`; transparency is composited
//! over white first.

use image::RgbaImage;
use std::fmt::Write as _;

/// A4 width in points
pub const PAGE_WIDTH: f64 = 595.28;

/// A4 height in points
pub const PAGE_HEIGHT: f64 = 841.89;

/// Height in points of `bitmap` drawn at full page width
#[must_use]
pub fn drawn_height(bitmap: &RgbaImage) -> f64 {
    if bitmap.width() == 0 {
        return 0.0;
    }
    f64::from(bitmap.height()) * PAGE_WIDTH / f64::from(bitmap.width())
}

/// Encode `bitmap` as a one-page PDF document
#[must_use]
pub fn encode_pdf(bitmap: &RgbaImage) -> Vec<u8> {
    let height = drawn_height(bitmap);
    let content = format!(
        "q\n{PAGE_WIDTH:.2} 0 0 {height:.2} 0 {y:.2} cm\n/Ticket Do\nQ\n",
        y = PAGE_HEIGHT - height
    );
    let pixels = rgb_over_white(bitmap);

    let mut pdf = PdfWriter::new();
    pdf.object(1, b"<< /Type /Catalog /Pages 2 0 R >>");
    pdf.object(2, b"<< /Type /Pages /Kids [3 0 R] /Count 1 >>");
    pdf.object(
        3,
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH:.2} {PAGE_HEIGHT:.2}] \
             /Resources << /XObject << /Ticket 5 0 R >> >> /Contents 4 0 R >>"
        )
        .as_bytes(),
    );
    pdf.stream(4, "", content.as_bytes());
    pdf.stream(
        5,
        &format!(
            "/Type /XObject /Subtype /Image /Width {} /Height {} \
             /ColorSpace /DeviceRGB /BitsPerComponent 8",
            bitmap.width(),
            bitmap.height()
        ),
        &pixels,
    );
    pdf.finish(1)
}

fn rgb_over_white(bitmap: &RgbaImage) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(bitmap.as_raw().len() / 4 * 3);
    for pixel in bitmap.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = u16::from(a);
        for channel in [r, g, b] {
            let blended = (u16::from(channel) * alpha + 255 * (255 - alpha) + 127) / 255;
            rgb.push(u8::try_from(blended).unwrap_or(u8::MAX));
        }
    }
    rgb
}

/// Appends numbered objects and tracks their offsets for the xref table
struct PdfWriter {
    out: Vec<u8>,
    offsets: Vec<(u32, usize)>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut out = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            out,
            offsets: Vec::new(),
        }
    }

    fn object(&mut self, number: u32, body: &[u8]) {
        self.offsets.push((number, self.out.len()));
        self.out
            .extend_from_slice(format!("{number} 0 obj\n").as_bytes());
        self.out.extend_from_slice(body);
        self.out.extend_from_slice(b"\nendobj\n");
    }

    fn stream(&mut self, number: u32, dictionary: &str, data: &[u8]) {
        let mut body = format!("<< {dictionary} /Length {} >>\nstream\n", data.len()).into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(b"\nendstream");
        self.object(number, &body);
    }

    fn finish(mut self, root: u32) -> Vec<u8> {
        self.offsets.sort_unstable_by_key(|(number, _)| *number);
        let size = self.offsets.len() + 1;
        let xref_offset = self.out.len();

        let mut xref = format!("xref\n0 {size}\n0000000000 65535 f \n");
        for (_, offset) in &self.offsets {
            let _ = writeln!(xref, "{offset:010} 00000 n ");
        }
        let _ = writeln!(
            xref,
            "trailer\n<< /Size {size} /Root {root} 0 R >>\nstartxref\n{xref_offset}\n%%EOF"
        );
        self.out.extend_from_slice(xref.as_bytes());
        self.out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::Rgba;

    fn text(pdf: &[u8]) -> String {
        String::from_utf8_lossy(pdf).into_owned()
    }

    #[test]
    fn drawn_at_full_width_keeping_aspect() {
        let bitmap = RgbaImage::new(200, 100);
        assert!((drawn_height(&bitmap) - PAGE_WIDTH / 2.0).abs() < 1e-9);

        let pdf = text(&encode_pdf(&bitmap));
        assert!(pdf.starts_with("%PDF-1.4"));
        assert!(pdf.contains("/MediaBox [0 0 595.28 841.89]"));
        assert!(pdf.contains("595.28 0 0 297.64 0 544.25 cm"));
        assert!(pdf.contains("/Width 200 /Height 100"));
        assert!(pdf.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let pdf = encode_pdf(&RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255])));

        let marker = pdf
            .windows(b"startxref\n".len())
            .rposition(|window| window == b"startxref\n")
            .unwrap();
        let tail = std::str::from_utf8(&pdf[marker..]).unwrap();
        let startxref: usize = tail.lines().nth(1).unwrap().parse().unwrap();
        let xref = std::str::from_utf8(&pdf[startxref..]).unwrap();
        assert!(xref.starts_with("xref\n0 6\n"));

        let entries: Vec<usize> = xref
            .lines()
            .skip(3)
            .take(5)
            .map(|line| line[..10].parse().unwrap())
            .collect();
        for (index, offset) in entries.into_iter().enumerate() {
            assert!(pdf[offset..].starts_with(format!("{} 0 obj", index + 1).as_bytes()));
        }
    }

    #[test]
    fn transparency_is_composited_over_white() {
        let bitmap = RgbaImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        assert_eq!(rgb_over_white(&bitmap), vec![255, 255, 255, 0, 0, 0]);
    }
}
