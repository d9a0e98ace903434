use std::panic;
use std::thread;
use std::time::Duration;

use rand::Rng;

pub const PROGRESS_COMPLETE: u8 = 100;

#[derive(Clone, Copy, Debug)]
pub struct ProgressPacing {
  pub tick: Duration,
  /// Pause after reaching 100 before the viewer is revealed.
  pub hold: Duration,
}

impl Default for ProgressPacing {
  fn default() -> Self {
    Self {
      tick: Duration::from_millis(100),
      hold: Duration::from_millis(500),
    }
  }
}

pub fn next_progress<R: Rng + ?Sized>(current: u8, rng: &mut R) -> u8 {
  current
    .saturating_add(rng.gen_range(2..=11))
    .min(PROGRESS_COMPLETE)
}

/// Cosmetic loading bar. Reports every step, ending with exactly one 100.
pub fn run_progress<R, F>(pacing: ProgressPacing, rng: &mut R, mut on_progress: F)
where
  R: Rng + ?Sized,
  F: FnMut(u8),
{
  let mut progress = 0;
  while progress < PROGRESS_COMPLETE {
    thread::sleep(pacing.tick);
    progress = next_progress(progress, rng);
    on_progress(progress);
  }
  thread::sleep(pacing.hold);
}

/// The bar animates on the calling thread while `load` runs on a worker.
pub fn load_with_progress<T, L, F>(load: L, pacing: ProgressPacing, on_progress: F) -> T
where
  T: Send,
  L: FnOnce() -> T + Send,
  F: FnMut(u8),
{
  thread::scope(|scope| {
    let loader = scope.spawn(load);
    run_progress(pacing, &mut rand::thread_rng(), on_progress);
    match loader.join() {
      Ok(value) => value,
      Err(payload) => panic::resume_unwind(payload),
    }
  })
}
