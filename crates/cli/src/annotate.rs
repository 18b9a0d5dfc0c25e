use clap::ValueEnum;
use image::{Rgb, RgbImage};

use agelens_core::pipeline::result::FaceResult;

/// Which predictions the annotation labels carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DisplayMode {
    Age,
    Gender,
    Both,
}

const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const BOX_THICKNESS: i32 = 2;

/// Draw one rectangle per result onto the image.
///
/// Labels are not rasterized into the pixels; callers print them alongside
/// via [`label_for`].
pub fn annotate(image: &mut RgbImage, results: &[FaceResult]) {
    for result in results {
        draw_rectangle(image, result);
    }
}

/// The annotation label for one face under the given display mode.
pub fn label_for(result: &FaceResult, mode: DisplayMode) -> String {
    match mode {
        DisplayMode::Both => format!("{} - {:.2}", result.gender, result.age),
        DisplayMode::Gender => result.gender.to_string(),
        DisplayMode::Age => format!("{:.2}", result.age),
    }
}

fn draw_rectangle(image: &mut RgbImage, result: &FaceResult) {
    let b = &result.face_box;
    for t in 0..BOX_THICKNESS {
        draw_h_line(image, b.left, b.right, b.top + t);
        draw_h_line(image, b.left, b.right, b.bottom - 1 - t);
        draw_v_line(image, b.top, b.bottom, b.left + t);
        draw_v_line(image, b.top, b.bottom, b.right - 1 - t);
    }
}

fn draw_h_line(image: &mut RgbImage, x0: i32, x1: i32, y: i32) {
    if y < 0 || y >= image.height() as i32 {
        return;
    }
    for x in x0.max(0)..x1.min(image.width() as i32) {
        image.put_pixel(x as u32, y as u32, BOX_COLOR);
    }
}

fn draw_v_line(image: &mut RgbImage, y0: i32, y1: i32, x: i32) {
    if x < 0 || x >= image.width() as i32 {
        return;
    }
    for y in y0.max(0)..y1.min(image.height() as i32) {
        image.put_pixel(x as u32, y as u32, BOX_COLOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agelens_core::pipeline::result::Gender;
    use agelens_core::shared::face_box::FaceBox;

    fn result(top: i32, right: i32, bottom: i32, left: i32) -> FaceResult {
        FaceResult {
            face_box: FaceBox::new(top, right, bottom, left),
            gender: Gender::Female,
            age: 27.25,
        }
    }

    #[test]
    fn test_labels_per_mode() {
        let r = result(0, 10, 10, 0);
        assert_eq!(label_for(&r, DisplayMode::Both), "Female - 27.25");
        assert_eq!(label_for(&r, DisplayMode::Gender), "Female");
        assert_eq!(label_for(&r, DisplayMode::Age), "27.25");
    }

    #[test]
    fn test_rectangle_edges_are_painted() {
        let mut image = RgbImage::new(20, 20);
        annotate(&mut image, &[result(5, 15, 15, 5)]);

        assert_eq!(*image.get_pixel(10, 5), BOX_COLOR); // top edge
        assert_eq!(*image.get_pixel(10, 14), BOX_COLOR); // bottom edge
        assert_eq!(*image.get_pixel(5, 10), BOX_COLOR); // left edge
        assert_eq!(*image.get_pixel(14, 10), BOX_COLOR); // right edge
        assert_eq!(*image.get_pixel(10, 10), Rgb([0, 0, 0])); // interior
    }

    #[test]
    fn test_rectangle_clamped_to_image() {
        let mut image = RgbImage::new(10, 10);
        // Box extends past every edge; drawing must not panic.
        annotate(&mut image, &[result(-3, 14, 13, -2)]);
    }

    #[test]
    fn test_no_results_leaves_image_untouched() {
        let mut image = RgbImage::new(4, 4);
        annotate(&mut image, &[]);
        assert!(image.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }
}
