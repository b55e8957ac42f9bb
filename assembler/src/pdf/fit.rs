use thiserror::Error;

/// Size of a PDF page in points (1 point = 1/72 in).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    /// ISO A4 rounded to whole points, the page every image is placed on.
    pub const A4: PageSize = PageSize {
        width: 595.0,
        height: 842.0,
    };

    pub fn ratio(&self) -> f32 {
        self.width / self.height
    }
}

/// Box on the destination page where the image gets drawn.
/// Coordinates are in points, `(x0, y0)` being the corner closest to the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl PlacementRect {
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum FitError {
    #[error("Image and page dimensions must be positive. image={image_width}x{image_height} page={page_width}x{page_height}")]
    InvalidDimensions {
        image_width: f32,
        image_height: f32,
        page_width: f32,
        page_height: f32,
    },
}

/// Scale an image of `image_width` x `image_height` pixels so it fits
/// entirely within `page`, keeping its aspect ratio, and center it.
///
/// Images relatively wider than the page take the full page width,
/// everything else (including an exact ratio match) takes the full height.
pub fn fit(image_width: f32, image_height: f32, page: PageSize) -> Result<PlacementRect, FitError> {
    let valid = |v: f32| v.is_finite() && v > 0.0;
    if ![image_width, image_height, page.width, page.height]
        .into_iter()
        .all(valid)
    {
        return Err(FitError::InvalidDimensions {
            image_width,
            image_height,
            page_width: page.width,
            page_height: page.height,
        });
    }

    let image_ratio = image_width / image_height;

    // Keep the strict comparison: at an exact ratio match we take the
    // height-constrained branch.
    let (new_width, new_height) = if image_ratio > page.ratio() {
        (page.width, page.width / image_ratio)
    } else {
        (page.height * image_ratio, page.height)
    };

    let offset_x = (page.width - new_width) / 2.0;
    let offset_y = (page.height - new_height) / 2.0;

    Ok(PlacementRect {
        x0: offset_x,
        y0: offset_y,
        x1: offset_x + new_width,
        y1: offset_y + new_height,
    })
}
