use anyhow::{Result, anyhow};
use clap::ValueEnum;
use image::{GrayImage, Luma, imageops};
use imageproc::morphology::{Mask, grayscale_dilate, grayscale_erode};

const FOREGROUND: u8 = 255;
const BACKGROUND: u8 = 0;

/// Largest radius a mask can hold (every cell within 254 pixels of the center)
pub const MAX_RADIUS: u32 = 253;

/// Shape of a structuring element, as chosen on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ElementShape {
    #[default]
    Ball,
    Box,
    Diamond,
}

/// Neighborhood shape used by the binary morphology filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuringElement {
    /// Digital disk: cells with `dx² + dy² <= (radius + 0.5)²`
    Ball(u32),
    /// Square of side `2 * radius + 1`
    Box(u32),
    /// City-block diamond of the given radius
    Diamond(u32),
}

impl StructuringElement {
    pub fn new(shape: ElementShape, radius: u32) -> Self {
        match shape {
            ElementShape::Ball => StructuringElement::Ball(radius),
            ElementShape::Box => StructuringElement::Box(radius),
            ElementShape::Diamond => StructuringElement::Diamond(radius),
        }
    }

    pub fn ball(radius: u32) -> Self {
        StructuringElement::Ball(radius)
    }

    pub fn boxed(radius: u32) -> Self {
        StructuringElement::Box(radius)
    }

    pub fn diamond(radius: u32) -> Self {
        StructuringElement::Diamond(radius)
    }

    pub fn shape(&self) -> ElementShape {
        match self {
            StructuringElement::Ball(_) => ElementShape::Ball,
            StructuringElement::Box(_) => ElementShape::Box,
            StructuringElement::Diamond(_) => ElementShape::Diamond,
        }
    }

    pub fn radius(&self) -> u32 {
        match self {
            StructuringElement::Ball(r)
            | StructuringElement::Box(r)
            | StructuringElement::Diamond(r) => *r,
        }
    }

    /// Radius 0 is a single pixel and leaves images unchanged
    pub fn validate(&self) -> Result<()> {
        if self.radius() > MAX_RADIUS {
            return Err(anyhow!(
                "Structuring element radius {} exceeds the maximum of {}",
                self.radius(),
                MAX_RADIUS
            ));
        }
        Ok(())
    }

    /// (dx, dy) offsets of the active cells relative to the center
    pub fn offsets(&self) -> Vec<(i32, i32)> {
        let r = self.radius() as i64;
        // (r + 0.5)² scaled by 4 to stay in integers
        let ball_limit = (2 * r + 1) * (2 * r + 1);
        let mut offsets = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                let inside = match self {
                    StructuringElement::Ball(_) => 4 * (dx * dx + dy * dy) <= ball_limit,
                    StructuringElement::Box(_) => true,
                    StructuringElement::Diamond(_) => dx.abs() + dy.abs() <= r,
                };
                if inside {
                    offsets.push((dx as i32, dy as i32));
                }
            }
        }
        offsets
    }

    /// Mask for the grayscale operators, centered on the element's origin
    pub fn mask(&self) -> Result<Mask> {
        self.validate()?;
        let r = self.radius();
        let side = 2 * r + 1;
        let mut cells = GrayImage::new(side, side);
        for (dx, dy) in self.offsets() {
            cells.put_pixel((dx + r as i32) as u32, (dy + r as i32) as u32, Luma([FOREGROUND]));
        }
        Ok(Mask::from_image(&cells, r as u8, r as u8))
    }
}

/// Binary morphological operation, as chosen on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Operation {
    #[default]
    Closing,
    Opening,
    Dilation,
    Erosion,
}

/// Binary morphological filter. Non-zero pixels are foreground, output is 0/255.
///
/// Pixels outside the image never change the result: dilation sees them as
/// background and erosion as foreground. A closing is computed on a copy
/// padded with background, so an object touching the border keeps its shape
/// instead of growing along the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryMorphology {
    Closing(StructuringElement),
    Opening(StructuringElement),
    Dilation(StructuringElement),
    Erosion(StructuringElement),
}

impl BinaryMorphology {
    pub fn new(operation: Operation, element: StructuringElement) -> Self {
        match operation {
            Operation::Closing => BinaryMorphology::Closing(element),
            Operation::Opening => BinaryMorphology::Opening(element),
            Operation::Dilation => BinaryMorphology::Dilation(element),
            Operation::Erosion => BinaryMorphology::Erosion(element),
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            BinaryMorphology::Closing(_) => Operation::Closing,
            BinaryMorphology::Opening(_) => Operation::Opening,
            BinaryMorphology::Dilation(_) => Operation::Dilation,
            BinaryMorphology::Erosion(_) => Operation::Erosion,
        }
    }

    pub fn element(&self) -> StructuringElement {
        match self {
            BinaryMorphology::Closing(e)
            | BinaryMorphology::Opening(e)
            | BinaryMorphology::Dilation(e)
            | BinaryMorphology::Erosion(e) => *e,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            BinaryMorphology::Closing(_) => "closing",
            BinaryMorphology::Opening(_) => "opening",
            BinaryMorphology::Dilation(_) => "dilation",
            BinaryMorphology::Erosion(_) => "erosion",
        }
    }

    /// Padding needed around an object so the filter sees real background on every side
    pub fn required_padding(&self) -> u32 {
        2 * self.element().radius() + 1
    }

    pub fn apply(&self, binary: &GrayImage) -> Result<GrayImage> {
        let element = self.element();
        element.validate()?;
        let binary = normalize(binary);
        if element.radius() == 0 {
            return Ok(binary);
        }

        let mask = element.mask()?;
        let border = self.required_padding();
        Ok(match self {
            BinaryMorphology::Closing(_) => {
                let padded = pad(&binary, border, BACKGROUND);
                let closed = grayscale_erode(&grayscale_dilate(&padded, &mask), &mask);
                unpad(&closed, border, binary.dimensions())
            }
            BinaryMorphology::Opening(_) => {
                let eroded = erode(&binary, &mask, border);
                dilate(&eroded, &mask, border)
            }
            BinaryMorphology::Dilation(_) => dilate(&binary, &mask, border),
            BinaryMorphology::Erosion(_) => erode(&binary, &mask, border),
        })
    }
}

fn dilate(binary: &GrayImage, mask: &Mask, border: u32) -> GrayImage {
    let padded = pad(binary, border, BACKGROUND);
    unpad(&grayscale_dilate(&padded, mask), border, binary.dimensions())
}

fn erode(binary: &GrayImage, mask: &Mask, border: u32) -> GrayImage {
    let padded = pad(binary, border, FOREGROUND);
    unpad(&grayscale_erode(&padded, mask), border, binary.dimensions())
}

fn normalize(binary: &GrayImage) -> GrayImage {
    GrayImage::from_fn(binary.width(), binary.height(), |x, y| {
        if binary.get_pixel(x, y)[0] != 0 {
            Luma([FOREGROUND])
        } else {
            Luma([BACKGROUND])
        }
    })
}

fn pad(image: &GrayImage, border: u32, fill: u8) -> GrayImage {
    let mut padded = GrayImage::from_pixel(
        image.width() + 2 * border,
        image.height() + 2 * border,
        Luma([fill]),
    );
    imageops::replace(&mut padded, image, border as i64, border as i64);
    padded
}

fn unpad(padded: &GrayImage, border: u32, (width, height): (u32, u32)) -> GrayImage {
    imageops::crop_imm(padded, border, border, width, height).to_image()
}
