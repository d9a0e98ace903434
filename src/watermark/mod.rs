//! Procedural watermark overlay for exported images. Every random choice comes
//! from the caller's `Rng`.

mod canvas;

pub use canvas::{blend_pixel, Canvas, DrawState, Font, TextAlign, TextBaseline, Transform};

use image::RgbaImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const WHITE: [u8; 3] = [255, 255, 255];
const NEAR_BLACK: [u8; 3] = [0, 0, 0];
const LIGHT_GRAY: [u8; 3] = [200, 200, 200];
const LIGHT_BLUE: [u8; 3] = [180, 180, 255];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatermarkText {
  /// Used by the diagonal grid, the scatter pass and the border strips.
  pub primary: String,
  /// Shorter text for the offset grid.
  pub secondary: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatermarkPass {
  DiagonalGrid,
  OffsetGrid,
  CharacterScatter,
  NoiseDots,
  BorderStrips,
}

impl WatermarkPass {
  pub const ALL: [WatermarkPass; 5] = [
    WatermarkPass::DiagonalGrid,
    WatermarkPass::OffsetGrid,
    WatermarkPass::CharacterScatter,
    WatermarkPass::NoiseDots,
    WatermarkPass::BorderStrips,
  ];

  pub fn draw<R: Rng + ?Sized>(self, canvas: &mut Canvas<'_>, text: &WatermarkText, rng: &mut R) {
    match self {
      WatermarkPass::DiagonalGrid => diagonal_grid(canvas, &text.primary),
      WatermarkPass::OffsetGrid => offset_grid(canvas, &text.secondary),
      WatermarkPass::CharacterScatter => character_scatter(canvas, &text.primary, rng),
      WatermarkPass::NoiseDots => noise_dots(canvas, rng),
      WatermarkPass::BorderStrips => border_strips(canvas, &text.primary),
    }
  }
}

pub fn apply_watermark<R: Rng + ?Sized>(
  image: &RgbaImage,
  text: &WatermarkText,
  rng: &mut R,
) -> RgbaImage {
  let mut output = image.clone();
  if output.width() == 0 || output.height() == 0 {
    return output;
  }

  let mut canvas = Canvas::new(&mut output);
  for pass in WatermarkPass::ALL {
    canvas.scoped(|canvas| pass.draw(canvas, text, rng));
  }
  output
}

pub fn apply_watermark_unseeded(image: &RgbaImage, text: &WatermarkText) -> RgbaImage {
  apply_watermark(image, text, &mut StdRng::from_entropy())
}

fn dimensions(canvas: &Canvas<'_>) -> (f64, f64) {
  (f64::from(canvas.width()), f64::from(canvas.height()))
}

fn diagonal_grid(canvas: &mut Canvas<'_>, text: &str) {
  let (w, h) = dimensions(canvas);
  canvas.rotate((-35.0_f64).to_radians());
  canvas.set_font(Font::bold((w / 22.0).max(11.0)));
  canvas.set_text_align(TextAlign::Center);
  canvas.set_text_baseline(TextBaseline::Middle);

  let step_x = w / 2.8;
  let step_y = h / 5.0;
  let mut x = -w * 1.5;
  while x < w * 2.5 {
    let mut y = -h;
    while y < h * 2.0 {
      canvas.set_alpha(0.10);
      canvas.set_fill(NEAR_BLACK);
      canvas.fill_text(text, x + 2.0, y + 2.0);
      canvas.set_alpha(0.28);
      canvas.set_fill(WHITE);
      canvas.fill_text(text, x, y);
      y += step_y;
    }
    x += step_x;
  }
}

fn offset_grid(canvas: &mut Canvas<'_>, text: &str) {
  let (w, h) = dimensions(canvas);
  canvas.rotate((-15.0_f64).to_radians());
  canvas.set_font(Font::regular((w / 30.0).max(9.0)));
  canvas.set_text_align(TextAlign::Center);
  canvas.set_text_baseline(TextBaseline::Middle);
  canvas.set_alpha(0.15);
  canvas.set_fill(WHITE);

  let step_x = w / 3.5;
  let step_y = h / 7.0;
  let mut x = -w;
  while x < w * 2.0 {
    let mut y = -h * 0.5;
    while y < h * 2.0 {
      canvas.fill_text(text, x + step_x * 0.5, y + step_y * 0.5);
      y += step_y;
    }
    x += step_x;
  }
}

fn character_scatter<R: Rng + ?Sized>(canvas: &mut Canvas<'_>, text: &str, rng: &mut R) {
  let chars: Vec<char> = text.chars().collect();
  if chars.is_empty() {
    return;
  }
  let (w, h) = dimensions(canvas);
  let font_size = (w / 28.0).max(10.0);
  let cols = (w / (font_size * 2.5)).ceil().max(1.0) as usize;
  let rows = (h / (font_size * 3.5)).ceil().max(1.0) as usize;
  let jitter = font_size * 0.8;

  for row in 0..rows {
    for col in 0..cols {
      let ch = chars[(row * cols + col) % chars.len()];
      let cx = (col as f64 + 0.5) * (w / cols as f64) + (rng.gen::<f64>() - 0.5) * jitter;
      let cy = (row as f64 + 0.5) * (h / rows as f64) + (rng.gen::<f64>() - 0.5) * jitter;
      let rotation = (rng.gen::<f64>() - 0.5) * 0.6;
      let size = font_size + rng.gen::<f64>() * 4.0;
      let alpha = 0.12 + rng.gen::<f64>() * 0.10;
      let fill = if rng.gen_bool(0.5) { WHITE } else { LIGHT_GRAY };

      canvas.scoped(|canvas| {
        canvas.translate(cx, cy);
        canvas.rotate(rotation);
        canvas.set_font(Font::bold(size));
        canvas.set_alpha(alpha);
        canvas.set_fill(fill);
        canvas.set_text_align(TextAlign::Center);
        canvas.set_text_baseline(TextBaseline::Middle);
        canvas.fill_text(ch.encode_utf8(&mut [0; 4]), 0.0, 0.0);
      });
    }
  }
}

fn noise_dots<R: Rng + ?Sized>(canvas: &mut Canvas<'_>, rng: &mut R) {
  let (w, h) = dimensions(canvas);
  let count = (w * h * 0.015).floor() as usize;
  for _ in 0..count {
    let x = rng.gen::<f64>() * w;
    let y = rng.gen::<f64>() * h;
    let radius = rng.gen::<f64>() * 1.5 + 0.3;
    canvas.set_alpha(0.08 + rng.gen::<f64>() * 0.12);
    canvas.set_fill(if rng.gen_bool(0.5) { WHITE } else { LIGHT_BLUE });
    canvas.fill_circle(x, y, radius);
  }
}

fn border_strips(canvas: &mut Canvas<'_>, text: &str) {
  let (w, h) = dimensions(canvas);
  let font_size = (w / 35.0).max(8.0);
  canvas.set_font(Font::regular(font_size));
  canvas.set_text_align(TextAlign::Left);
  canvas.set_text_baseline(TextBaseline::Middle);
  canvas.set_alpha(0.20);
  canvas.set_fill(WHITE);

  let step = w / 4.0;
  let mut x = 0.0;
  while x < w {
    canvas.fill_text(text, x + 5.0, font_size + 3.0);
    canvas.fill_text(text, x + 5.0, h - font_size - 3.0);
    x += step;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::Rgba;

  fn text() -> WatermarkText {
    WatermarkText {
      primary: "TikTok : ainime.id".to_string(),
      secondary: "ainime.id".to_string(),
    }
  }

  fn source(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
      let red = (x * 3 % 200) as u8 + 20;
      let green = (y * 5 % 200) as u8 + 20;
      Rgba([red, green, 90, 255])
    })
  }

  fn run_single(pass: WatermarkPass, image: &RgbaImage, seed: u64) -> RgbaImage {
    let mut output = image.clone();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut canvas = Canvas::new(&mut output);
    canvas.scoped(|canvas| pass.draw(canvas, &text(), &mut rng));
    assert_eq!(canvas.state(), &DrawState::default());
    output
  }

  fn changed_rows(before: &RgbaImage, after: &RgbaImage) -> Vec<u32> {
    let mut rows: Vec<u32> = before
      .enumerate_pixels()
      .filter(|(x, y, pixel)| after.get_pixel(*x, *y) != *pixel)
      .map(|(_, y, _)| y)
      .collect();
    rows.dedup();
    rows
  }

  #[test]
  fn output_keeps_dimensions() {
    let image = source(120, 90);
    let output = apply_watermark(&image, &text(), &mut StdRng::seed_from_u64(1));
    assert_eq!(output.dimensions(), image.dimensions());
  }

  #[test]
  fn every_pass_changes_pixels() {
    let image = source(120, 90);
    for pass in WatermarkPass::ALL {
      let output = run_single(pass, &image, 9);
      assert_ne!(output, image, "{:?} left the image untouched", pass);
    }
  }

  #[test]
  fn diagonal_grid_covers_whole_image() {
    let image = source(160, 120);
    let output = run_single(WatermarkPass::DiagonalGrid, &image, 0);
    let rows = changed_rows(&image, &output);
    assert!(rows.first().copied().unwrap_or(u32::MAX) < 20);
    assert!(rows.last().copied().unwrap_or(0) > 100);
  }

  #[test]
  fn border_strips_touch_only_top_and_bottom_bands() {
    let image = source(140, 100);
    let output = run_single(WatermarkPass::BorderStrips, &image, 0);
    let rows = changed_rows(&image, &output);
    assert!(rows.iter().any(|y| *y < 20));
    assert!(rows.iter().any(|y| *y > 80));
    assert!(rows.iter().all(|y| *y < 20 || *y > 80));
  }

  #[test]
  fn noise_dots_scale_with_area() {
    let image = RgbaImage::from_pixel(100, 100, Rgba([10, 10, 10, 255]));
    let output = run_single(WatermarkPass::NoiseDots, &image, 4);
    let touched = image
      .enumerate_pixels()
      .filter(|(x, y, pixel)| output.get_pixel(*x, *y) != *pixel)
      .count();
    // 150 dots, each at least one pixel, overlapping at most a little.
    assert!(touched >= 100, "only {} pixels touched", touched);
  }

  #[test]
  fn same_seed_reproduces_overlay() {
    let image = source(80, 60);
    let first = apply_watermark(&image, &text(), &mut StdRng::seed_from_u64(42));
    let second = apply_watermark(&image, &text(), &mut StdRng::seed_from_u64(42));
    assert_eq!(first, second);
  }

  #[test]
  fn unseeded_runs_differ() {
    let image = source(80, 60);
    let first = apply_watermark_unseeded(&image, &text());
    let second = apply_watermark_unseeded(&image, &text());
    assert_ne!(first, second);
  }

  #[test]
  fn empty_image_is_returned_as_is() {
    let image = RgbaImage::new(0, 0);
    let output = apply_watermark(&image, &text(), &mut StdRng::seed_from_u64(1));
    assert_eq!(output.dimensions(), (0, 0));
  }
}
