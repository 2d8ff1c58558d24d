use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::geometry::{contour_area, convex_hull};
use imageproc::point::Point as PixelPoint;

use crate::detection::domain::blob::{Blob, Point};
use crate::detection::domain::blob_selector::BlobSelector;
use crate::detection::infrastructure::math::min_enclosing_circle;
use crate::segmentation::domain::mask::Mask;

/// Picks the largest external contour, then applies the area threshold.
///
/// `min_area` is checked only against the chosen region; it never takes part
/// in choosing among regions.
pub struct ContourBlobSelector {
    min_area: f64,
}

impl ContourBlobSelector {
    pub fn new(min_area: f64) -> Self {
        Self { min_area }
    }
}

/// Outer borders that are not nested inside another region.
fn external_contours(mask: &Mask) -> Vec<Vec<PixelPoint<i32>>> {
    find_contours::<i32>(mask.as_image())
        .into_iter()
        .filter(|c: &Contour<i32>| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| c.points)
        .collect()
}

/// Largest contour by area; on ties the first one found wins.
fn largest(contours: Vec<Vec<PixelPoint<i32>>>) -> Option<(Vec<PixelPoint<i32>>, f64)> {
    let mut best: Option<(Vec<PixelPoint<i32>>, f64)> = None;
    for contour in contours {
        let area = contour_area(&contour);
        match &best {
            Some((_, best_area)) if area <= *best_area => {}
            _ => best = Some((contour, area)),
        }
    }
    best
}

impl BlobSelector for ContourBlobSelector {
    fn select(&self, mask: &Mask) -> Option<Blob> {
        let (contour, area) = largest(external_contours(mask))?;
        if area < self.min_area {
            return None;
        }
        let circle = min_enclosing_circle(&convex_hull(contour));
        Some(Blob {
            area,
            center: Point::new(circle.cx as i32, circle.cy as i32),
            radius: circle.radius,
        })
    }
}
