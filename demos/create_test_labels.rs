use image::{GrayImage, Luma};

fn main() -> anyhow::Result<()> {
    let mut img = GrayImage::new(64, 48);

    // Label 1: a block with two pinholes, closing with radius 1 fills them
    for y in 8..24 {
        for x in 8..24 {
            if (x, y) != (12, 12) && (x, y) != (18, 20) {
                img.put_pixel(x, y, Luma([1]));
            }
        }
    }

    // Label 2: a bar cut by a one-pixel gap (only its inner rows close)
    for x in 30..56 {
        if x != 42 {
            for y in 10..14 {
                img.put_pixel(x, y, Luma([2]));
            }
        }
    }

    // Label 3: a solid block
    for y in 30..42 {
        for x in 10..30 {
            img.put_pixel(x, y, Luma([3]));
        }
    }

    img.save("test_labels.png")?;
    println!("Created test_labels.png (64x48, labels 1-3)");
    Ok(())
}
