use serde::Serialize;

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Carousel {
  images: Vec<String>,
  active: Option<usize>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", content = "image", rename_all = "camelCase")]
pub enum CarouselClick {
  OpenViewer(String),
  Rotated,
  Ignored,
}

impl Carousel {
  pub fn new(images: Vec<String>) -> Self {
    let active = if images.is_empty() {
      None
    } else {
      Some((images.len() / 2).min(images.len() - 1))
    };
    Self { images, active }
  }

  pub fn images(&self) -> &[String] {
    &self.images
  }

  pub fn active_index(&self) -> Option<usize> {
    self.active
  }

  pub fn active_image(&self) -> Option<&str> {
    let index = self.active?;
    self.images.get(index).map(String::as_str)
  }

  pub fn click(&mut self, index: usize) -> CarouselClick {
    if index >= self.images.len() {
      return CarouselClick::Ignored;
    }
    if self.active == Some(index) {
      return CarouselClick::OpenViewer(self.images[index].clone());
    }

    let len = self.images.len();
    if len >= 3 {
      if index == 0 {
        self.images.rotate_right(1);
      } else if index == 2 {
        self.images.rotate_left(1);
      }
    } else if len == 2 && index == 0 {
      self.images.swap(0, 1);
    }

    self.active = if len > 1 { Some(1) } else { None };
    CarouselClick::Rotated
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn images(count: usize) -> Vec<String> {
    (1..=count).map(|n| format!("img-{}", n)).collect()
  }

  #[test]
  fn initial_active_is_middle() {
    assert_eq!(Carousel::new(Vec::new()).active_index(), None);
    assert_eq!(Carousel::new(images(1)).active_index(), Some(0));
    assert_eq!(Carousel::new(images(2)).active_index(), Some(1));
    assert_eq!(Carousel::new(images(3)).active_index(), Some(1));
  }

  #[test]
  fn two_images_render_both_with_one_active() {
    let mut carousel = Carousel::new(images(2));
    assert_eq!(carousel.images().len(), 2);
    assert_eq!(carousel.active_image(), Some("img-2"));

    assert_eq!(carousel.click(0), CarouselClick::Rotated);
    assert_eq!(carousel.images(), ["img-2", "img-1"]);
    assert_eq!(carousel.active_image(), Some("img-1"));
    assert_eq!(carousel.click(5), CarouselClick::Ignored);
  }

  #[test]
  fn three_images_rotate_toward_clicked_side() {
    let mut carousel = Carousel::new(images(3));
    carousel.click(0);
    assert_eq!(carousel.images(), ["img-3", "img-1", "img-2"]);
    assert_eq!(carousel.active_image(), Some("img-1"));

    carousel.click(2);
    assert_eq!(carousel.images(), ["img-1", "img-2", "img-3"]);
    assert_eq!(carousel.active_image(), Some("img-2"));
  }

  #[test]
  fn clicking_active_opens_viewer() {
    let mut carousel = Carousel::new(images(3));
    assert_eq!(
      carousel.click(1),
      CarouselClick::OpenViewer("img-2".to_string())
    );
    assert_eq!(carousel.images(), ["img-1", "img-2", "img-3"]);
  }
}
