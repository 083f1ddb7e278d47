use image::GrayImage;
use imageproc::contours::{Contour, find_contours};

use crate::models::BoundingBox;

/// Bounding box of a contour's border points
fn bounding_rect(contour: &Contour<u32>) -> Option<BoundingBox> {
    let first = contour.points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);

    for p in &contour.points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    Some(BoundingBox::from_extents(min_x, min_y, max_x, max_y))
}

/// Find the outermost contours of a binary image and return their bounding
/// boxes ordered left to right.
///
/// Nested contours (holes and anything inside them) are ignored. Boxes that
/// share an x coordinate keep the order the contours were found in.
pub fn find_letter_regions(binary: &GrayImage) -> Vec<BoundingBox> {
    let mut regions: Vec<BoundingBox> = find_contours::<u32>(binary)
        .iter()
        .filter(|c| c.parent.is_none())
        .filter_map(bounding_rect)
        .collect();

    regions.sort_by_key(|r| r.x);
    regions
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn fill(img: &mut GrayImage, x: u32, y: u32, w: u32, h: u32) {
        for yy in y..y + h {
            for xx in x..x + w {
                img.put_pixel(xx, yy, Luma([255]));
            }
        }
    }

    #[test]
    fn test_regions_sorted_by_x() {
        let mut img = GrayImage::new(60, 40);
        // discovered top to bottom, so the rightmost blob comes first
        fill(&mut img, 45, 2, 5, 6);
        fill(&mut img, 25, 12, 4, 8);
        fill(&mut img, 5, 25, 6, 5);

        let regions = find_letter_regions(&img);
        assert_eq!(
            regions,
            vec![
                BoundingBox { x: 5, y: 25, width: 6, height: 5 },
                BoundingBox { x: 25, y: 12, width: 4, height: 8 },
                BoundingBox { x: 45, y: 2, width: 5, height: 6 },
            ]
        );
    }

    #[test]
    fn test_holes_are_not_regions() {
        let mut img = GrayImage::new(30, 30);
        fill(&mut img, 5, 5, 20, 20);
        for yy in 10..20 {
            for xx in 10..20 {
                img.put_pixel(xx, yy, Luma([0]));
            }
        }
        let regions = find_letter_regions(&img);
        assert_eq!(regions, vec![BoundingBox { x: 5, y: 5, width: 20, height: 20 }]);
    }

    #[test]
    fn test_blank_image_has_no_regions() {
        let img = GrayImage::new(20, 20);
        assert!(find_letter_regions(&img).is_empty());
    }
}
