use std::io::Cursor;

use image::ImageReader;
use printpdf::{Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, Pt, RawImage, XObjectTransform};
use thiserror::Error;

use crate::pdf::fit::{FitError, PageSize, fit};

/// Drawing the image at 72 DPI makes one pixel worth one point,
/// so the scale factors below are plain point ratios.
const IMAGE_DPI: f32 = 72.0;

#[derive(Error, Debug)]
pub enum ImagePageError {
    #[error("Could not decode image. decoding_error=`{0}`")]
    BadImageDecoding(String),
    #[error(transparent)]
    InvalidDimensions(#[from] FitError),
}

/// Wrap a raster image into a single-page PDF of the given `page` size.
/// The image is scaled to fit the page, keeping its aspect ratio, and centered.
///
/// Returns the serialized single-page document.
pub fn image_to_pdf(bytes: &[u8], page: PageSize) -> Result<Vec<u8>, ImagePageError> {
    let (width_px, height_px) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImagePageError::BadImageDecoding(e.to_string()))?
        .into_dimensions()
        .map_err(|e| ImagePageError::BadImageDecoding(e.to_string()))?;

    let rect = fit(width_px as f32, height_px as f32, page)?;

    let mut warnings = Vec::new();
    let image = RawImage::decode_from_bytes(bytes, &mut warnings)
        .map_err(ImagePageError::BadImageDecoding)?;

    let mut doc_out = PdfDocument::new("Image Page");
    let image_id = doc_out.add_image(&image);

    // The rect is centered on both axes, so its offset from the top edge
    // equals its offset from the bottom edge where PDF puts the origin.
    let contents = vec![Op::UseXobject {
        id: image_id,
        transform: XObjectTransform {
            translate_x: Some(Pt(rect.x0)),
            translate_y: Some(Pt(rect.y0)),
            rotate: None,
            scale_x: Some(rect.width() / width_px as f32),
            scale_y: Some(rect.height() / height_px as f32),
            dpi: Some(IMAGE_DPI),
        },
    }];

    // printpdf::Mm expects mm
    let width_mm = Mm(page.width * 25.4 / 72.0);
    let height_mm = Mm(page.height * 25.4 / 72.0);
    let pdf_page = PdfPage::new(width_mm, height_mm, contents);

    let mut warnings = Vec::new();
    let pdf_bytes = doc_out
        .with_pages(vec![pdf_page])
        .save(&PdfSaveOptions::default(), &mut warnings);

    tracing::debug!(
        "Image placed on page. image={width_px}x{height_px} rect=[{}, {}, {}, {}]",
        rect.x0,
        rect.y0,
        rect.x1,
        rect.y1
    );

    Ok(pdf_bytes)
}
