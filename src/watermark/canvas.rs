//! Minimal 2D drawing context over an `RgbaImage`.

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgba, RgbaImage};

const GLYPH_SIZE: usize = 8;

/// Affine map `(x, y) -> (a*x + c*y + e, b*x + d*y + f)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
  a: f64,
  b: f64,
  c: f64,
  d: f64,
  e: f64,
  f: f64,
}

impl Transform {
  pub const IDENTITY: Transform = Transform {
    a: 1.0,
    b: 0.0,
    c: 0.0,
    d: 1.0,
    e: 0.0,
    f: 0.0,
  };

  pub fn rotation(radians: f64) -> Self {
    let (sin, cos) = radians.sin_cos();
    Self {
      a: cos,
      b: sin,
      c: -sin,
      d: cos,
      e: 0.0,
      f: 0.0,
    }
  }

  pub fn translation(x: f64, y: f64) -> Self {
    Self {
      e: x,
      f: y,
      ..Self::IDENTITY
    }
  }

  /// `self` applied after `inner`.
  pub fn then(&self, inner: &Transform) -> Transform {
    Transform {
      a: self.a * inner.a + self.c * inner.b,
      b: self.b * inner.a + self.d * inner.b,
      c: self.a * inner.c + self.c * inner.d,
      d: self.b * inner.c + self.d * inner.d,
      e: self.a * inner.e + self.c * inner.f + self.e,
      f: self.b * inner.e + self.d * inner.f + self.f,
    }
  }

  pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
    (
      self.a * x + self.c * y + self.e,
      self.b * x + self.d * y + self.f,
    )
  }

  pub fn inverse(&self) -> Option<Transform> {
    let det = self.a * self.d - self.b * self.c;
    if det.abs() < f64::EPSILON {
      return None;
    }
    let inv = 1.0 / det;
    Some(Transform {
      a: self.d * inv,
      b: -self.b * inv,
      c: -self.c * inv,
      d: self.a * inv,
      e: (self.c * self.f - self.d * self.e) * inv,
      f: (self.b * self.e - self.a * self.f) * inv,
    })
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
  Left,
  Center,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextBaseline {
  Top,
  Middle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Font {
  /// Glyph height in pixels. Glyphs are square.
  pub size: f64,
  pub bold: bool,
}

impl Font {
  pub fn regular(size: f64) -> Self {
    Self { size, bold: false }
  }

  pub fn bold(size: f64) -> Self {
    Self { size, bold: true }
  }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawState {
  pub transform: Transform,
  pub alpha: f64,
  pub fill: [u8; 3],
  pub font: Font,
  pub align: TextAlign,
  pub baseline: TextBaseline,
}

impl Default for DrawState {
  fn default() -> Self {
    Self {
      transform: Transform::IDENTITY,
      alpha: 1.0,
      fill: [0, 0, 0],
      font: Font::regular(10.0),
      align: TextAlign::Left,
      baseline: TextBaseline::Top,
    }
  }
}

pub struct Canvas<'a> {
  image: &'a mut RgbaImage,
  state: DrawState,
  saved: Vec<DrawState>,
}

impl<'a> Canvas<'a> {
  pub fn new(image: &'a mut RgbaImage) -> Self {
    Self {
      image,
      state: DrawState::default(),
      saved: Vec::new(),
    }
  }

  pub fn width(&self) -> u32 {
    self.image.width()
  }

  pub fn height(&self) -> u32 {
    self.image.height()
  }

  pub fn state(&self) -> &DrawState {
    &self.state
  }

  pub fn save(&mut self) {
    self.saved.push(self.state);
  }

  pub fn restore(&mut self) {
    if let Some(state) = self.saved.pop() {
      self.state = state;
    }
  }

  /// Nothing `draw` changes on the context outlives the call.
  pub fn scoped<F>(&mut self, draw: F)
  where
    F: FnOnce(&mut Canvas<'a>),
  {
    let depth = self.saved.len();
    self.save();
    draw(self);
    self.saved.truncate(depth + 1);
    self.restore();
  }

  pub fn rotate(&mut self, radians: f64) {
    self.state.transform = self.state.transform.then(&Transform::rotation(radians));
  }

  pub fn translate(&mut self, x: f64, y: f64) {
    self.state.transform = self.state.transform.then(&Transform::translation(x, y));
  }

  pub fn set_alpha(&mut self, alpha: f64) {
    self.state.alpha = alpha.clamp(0.0, 1.0);
  }

  pub fn set_fill(&mut self, fill: [u8; 3]) {
    self.state.fill = fill;
  }

  pub fn set_font(&mut self, font: Font) {
    self.state.font = font;
  }

  pub fn set_text_align(&mut self, align: TextAlign) {
    self.state.align = align;
  }

  pub fn set_text_baseline(&mut self, baseline: TextBaseline) {
    self.state.baseline = baseline;
  }

  fn fill_color(&self) -> Rgba<u8> {
    let [r, g, b] = self.state.fill;
    Rgba([r, g, b, (self.state.alpha * 255.0).round() as u8])
  }

  /// Device pixels are sampled back through the inverse transform so rotated
  /// text has no gaps.
  pub fn fill_text(&mut self, text: &str, x: f64, y: f64) {
    let glyphs: Vec<[u8; GLYPH_SIZE]> = text
      .chars()
      .map(|ch| {
        BASIC_FONTS
          .get(ch)
          .or_else(|| BASIC_FONTS.get('?'))
          .unwrap_or([0; GLYPH_SIZE])
      })
      .collect();
    if glyphs.is_empty() || self.image.width() == 0 || self.image.height() == 0 {
      return;
    }
    let Some(inverse) = self.state.transform.inverse() else {
      return;
    };

    let size = self.state.font.size.max(1.0);
    let scale = size / GLYPH_SIZE as f64;
    let text_width = size * glyphs.len() as f64;
    let left = match self.state.align {
      TextAlign::Left => x,
      TextAlign::Center => x - text_width / 2.0,
    };
    let top = match self.state.baseline {
      TextBaseline::Top => y,
      TextBaseline::Middle => y - size / 2.0,
    };

    let corners = [
      (left, top),
      (left + text_width, top),
      (left, top + size),
      (left + text_width, top + size),
    ]
    .map(|(cx, cy)| self.state.transform.apply(cx, cy));
    let max_x = f64::from(self.image.width() - 1);
    let max_y = f64::from(self.image.height() - 1);
    let (min_dx, max_dx) = pixel_span(corners.map(|corner| corner.0), max_x);
    let (min_dy, max_dy) = pixel_span(corners.map(|corner| corner.1), max_y);
    if min_dx > max_dx || min_dy > max_dy {
      return;
    }

    let color = self.fill_color();
    let bold = self.state.font.bold;
    for py in min_dy as u32..=max_dy as u32 {
      for px in min_dx as u32..=max_dx as u32 {
        let (u, v) = inverse.apply(f64::from(px) + 0.5, f64::from(py) + 0.5);
        let column = ((u - left) / scale).floor();
        let row = ((v - top) / scale).floor();
        if column < 0.0 || row < 0.0 || row >= GLYPH_SIZE as f64 {
          continue;
        }
        let column = column as usize;
        let Some(glyph) = glyphs.get(column / GLYPH_SIZE) else {
          continue;
        };
        let bits = glyph[row as usize];
        let bits = if bold { bits | (bits << 1) } else { bits };
        if (bits >> (column % GLYPH_SIZE)) & 1 == 0 {
          continue;
        }
        let dst = *self.image.get_pixel(px, py);
        self.image.put_pixel(px, py, blend_pixel(dst, color));
      }
    }
  }

  /// Filled circle at `(cx, cy)` in user space. Sub-pixel circles still mark
  /// the pixel nearest their center.
  pub fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64) {
    let width = self.image.width() as i64;
    let height = self.image.height() as i64;
    if width == 0 || height == 0 {
      return;
    }
    let (cx, cy) = self.state.transform.apply(cx, cy);
    let color = self.fill_color();

    let min_x = ((cx - radius).floor() as i64).clamp(0, width - 1);
    let max_x = ((cx + radius).ceil() as i64).clamp(0, width - 1);
    let min_y = ((cy - radius).floor() as i64).clamp(0, height - 1);
    let max_y = ((cy + radius).ceil() as i64).clamp(0, height - 1);
    let r2 = radius * radius;
    let mut covered = false;
    for y in min_y..=max_y {
      for x in min_x..=max_x {
        let dx = x as f64 + 0.5 - cx;
        let dy = y as f64 + 0.5 - cy;
        if dx * dx + dy * dy <= r2 {
          let dst = *self.image.get_pixel(x as u32, y as u32);
          self.image.put_pixel(x as u32, y as u32, blend_pixel(dst, color));
          covered = true;
        }
      }
    }

    if !covered {
      let x = (cx.floor() as i64).clamp(0, width - 1) as u32;
      let y = (cy.floor() as i64).clamp(0, height - 1) as u32;
      let dst = *self.image.get_pixel(x, y);
      self.image.put_pixel(x, y, blend_pixel(dst, color));
    }
  }
}

fn pixel_span(values: [f64; 4], max: f64) -> (f64, f64) {
  let low = values.into_iter().fold(f64::INFINITY, f64::min);
  let high = values.into_iter().fold(f64::NEG_INFINITY, f64::max);
  (low.floor().max(0.0), high.ceil().min(max))
}

pub fn blend_pixel(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
  let a = f64::from(src[3]) / 255.0;
  if a <= 0.0 {
    return dst;
  }
  let inv = 1.0 - a;
  let channel = |index: usize| {
    (f64::from(dst[index]) * inv + f64::from(src[index]) * a)
      .round()
      .clamp(0.0, 255.0) as u8
  };
  let out_a = (f64::from(dst[3]) + f64::from(src[3]) * (1.0 - f64::from(dst[3]) / 255.0))
    .round()
    .clamp(0.0, 255.0) as u8;
  Rgba([channel(0), channel(1), channel(2), out_a])
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::f64::consts::FRAC_PI_2;

  fn gray(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([128, 128, 128, 255]))
  }

  fn changed(before: &RgbaImage, after: &RgbaImage) -> Vec<(u32, u32)> {
    before
      .enumerate_pixels()
      .filter(|(x, y, pixel)| after.get_pixel(*x, *y) != *pixel)
      .map(|(x, y, _)| (x, y))
      .collect()
  }

  #[test]
  fn transform_inverse_round_trips_points() {
    let transform = Transform::translation(12.0, -3.0).then(&Transform::rotation(0.7));
    let inverse = transform.inverse().unwrap();
    let (x, y) = transform.apply(5.0, 9.0);
    let (u, v) = inverse.apply(x, y);
    assert!((u - 5.0).abs() < 1e-9);
    assert!((v - 9.0).abs() < 1e-9);
  }

  #[test]
  fn scoped_restores_every_field() {
    let mut image = gray(4, 4);
    let mut canvas = Canvas::new(&mut image);
    canvas.scoped(|canvas| {
      canvas.rotate(1.0);
      canvas.translate(3.0, 3.0);
      canvas.set_alpha(0.2);
      canvas.set_fill([255, 255, 255]);
      canvas.set_font(Font::bold(30.0));
      canvas.set_text_align(TextAlign::Center);
      canvas.set_text_baseline(TextBaseline::Middle);
      canvas.save();
    });
    assert_eq!(canvas.state(), &DrawState::default());
  }

  #[test]
  fn text_stays_inside_its_box() {
    let before = gray(40, 20);
    let mut image = before.clone();
    let mut canvas = Canvas::new(&mut image);
    canvas.set_fill([255, 255, 255]);
    canvas.set_font(Font::regular(8.0));
    canvas.fill_text("HI", 4.0, 6.0);

    let diff = changed(&before, &image);
    assert!(!diff.is_empty());
    for (x, y) in diff {
      assert!((4..20).contains(&x), "x = {}", x);
      assert!((6..14).contains(&y), "y = {}", y);
    }
  }

  #[test]
  fn centered_middle_text_straddles_anchor() {
    let before = gray(64, 64);
    let mut image = before.clone();
    let mut canvas = Canvas::new(&mut image);
    canvas.set_fill([0, 0, 0]);
    canvas.set_font(Font::regular(16.0));
    canvas.set_text_align(TextAlign::Center);
    canvas.set_text_baseline(TextBaseline::Middle);
    canvas.fill_text("M", 32.0, 32.0);

    let diff = changed(&before, &image);
    assert!(diff.iter().any(|(x, _)| *x < 32));
    assert!(diff.iter().any(|(x, _)| *x > 32));
    for (x, y) in diff {
      assert!((24..40).contains(&x), "x = {}", x);
      assert!((24..40).contains(&y), "y = {}", y);
    }
  }

  #[test]
  fn rotated_text_lands_in_rotated_region() {
    let before = gray(32, 32);
    let mut image = before.clone();
    let mut canvas = Canvas::new(&mut image);
    canvas.set_fill([255, 255, 255]);
    canvas.translate(16.0, 0.0);
    canvas.rotate(FRAC_PI_2);
    canvas.fill_text("II", 0.0, 0.0);

    // A quarter turn sends the run of text straight down from (16, 0).
    let diff = changed(&before, &image);
    assert!(!diff.is_empty());
    for (x, y) in diff {
      assert!((6..=16).contains(&x), "x = {}", x);
      assert!(y < 21, "y = {}", y);
    }
  }

  #[test]
  fn alpha_scales_blend() {
    let mut image = gray(8, 8);
    let mut canvas = Canvas::new(&mut image);
    canvas.set_fill([255, 255, 255]);
    canvas.set_alpha(0.5);
    canvas.fill_circle(4.0, 4.0, 2.0);
    let pixel = image.get_pixel(4, 4);
    assert!(pixel[0] > 180 && pixel[0] < 200);
    assert_eq!(pixel[3], 255);
  }

  #[test]
  fn tiny_circle_marks_one_pixel() {
    let before = gray(8, 8);
    let mut image = before.clone();
    let mut canvas = Canvas::new(&mut image);
    canvas.set_fill([255, 255, 255]);
    canvas.fill_circle(2.1, 5.9, 0.05);
    assert_eq!(changed(&before, &image), vec![(2, 5)]);
  }
}
