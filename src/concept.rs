//! Compile-time checks on image dimensionality.
//!
//! The checks are evaluated when a generic function is instantiated, so a
//! mismatch is reported by the compiler and never reaches run time:
//!
//! ```
//! use image::GrayImage;
//! use labelmorph::concept::{check_dimension, check_same_dimension};
//!
//! let image = GrayImage::new(4, 4);
//! check_dimension::<_, 2>(&image);
//! check_same_dimension::<GrayImage, labelmorph::LabelMap>();
//! ```
//!
//! ```compile_fail
//! use image::GrayImage;
//! use labelmorph::concept::check_dimension;
//!
//! let image = GrayImage::new(4, 4);
//! check_dimension::<_, 3>(&image);
//! ```

use image::{ImageBuffer, Pixel};
use std::ops::Deref;

use crate::labelmap::LabelMap;

/// Number of spatial dimensions of an image type
pub trait ImageDimension {
    const DIMENSION: usize;
}

impl<P, C> ImageDimension for ImageBuffer<P, C>
where
    P: Pixel,
    C: Deref<Target = [P::Subpixel]>,
{
    const DIMENSION: usize = 2;
}

impl ImageDimension for LabelMap {
    const DIMENSION: usize = 2;
}

/// Fails to compile unless `I` has exactly `D` dimensions
pub fn check_dimension<I: ImageDimension, const D: usize>(_image: &I) {
    const { assert!(I::DIMENSION == D, "image does not have the expected dimension") }
}

/// Fails to compile unless `A` and `B` have the same number of dimensions
pub fn check_same_dimension<A: ImageDimension, B: ImageDimension>() {
    const { assert!(A::DIMENSION == B::DIMENSION, "image types differ in dimension") }
}

pub fn dimension_of<I: ImageDimension>(_image: &I) -> usize {
    I::DIMENSION
}
