use image::GrayImage;
use labelmorph::LabelMap;
use labelmorph::concept::{check_dimension, check_same_dimension, dimension_of};

const DIMENSION: usize = 2;

type ImageType = GrayImage;
type ImageType2 = LabelMap;

fn main() {
    let image = ImageType::new(8, 8);

    check_dimension::<ImageType, DIMENSION>(&image);
    check_same_dimension::<ImageType, ImageType2>();

    // Changing DIMENSION to 3 turns both calls above into compile errors.
    println!("ImageType has {} dimensions", dimension_of(&image));
}
