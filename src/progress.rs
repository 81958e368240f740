//! Cosmetic progress shown while a resolution is in flight.
//!
//! The resolver reports no granular progress, so a timer task creeps the value
//! towards a cap below 100 and the caller forces completion (or stops the
//! timer) when the real request finishes. The timer task is the only writer
//! until `complete`/`stop` aborts it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::constants::constants;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
  /// 0..=100
  pub value: f64,
  /// Index into the stage label list.
  pub stage: usize,
  pub done: bool,
}

impl Progress {
  const START: Progress = Progress { value: 0.0, stage: 0, done: false };
}

/// Next value after one tick: increases by `step` but never past `cap`.
pub fn advance(value: f64, step: f64, cap: f64) -> f64 {
  if value >= cap { value } else { (value + step.max(0.0)).min(cap) }
}

/// Linear mapping of `value` onto `stage_count` labels.
pub fn stage_for(value: f64, stage_count: usize) -> usize {
  if stage_count == 0 {
    return 0;
  }
  let idx = ((value / 100.0) * stage_count as f64).floor().max(0.0) as usize;
  idx.min(stage_count - 1)
}

pub struct ProgressSimulator {
  stage_count: usize,
  tick: Duration,
  cap: f64,
  max_step: f64,
  tx: Arc<watch::Sender<Progress>>,
  rx: watch::Receiver<Progress>,
  handle: Option<JoinHandle<()>>,
}

impl ProgressSimulator {
  pub fn new(stage_count: usize, tick: Duration, cap: f64, max_step: f64) -> Self {
    let (tx, rx) = watch::channel(Progress::START);
    Self { stage_count, tick, cap, max_step, tx: Arc::new(tx), rx, handle: None }
  }

  pub fn from_constants(stage_count: usize) -> Self {
    let c = constants();
    Self::new(stage_count, Duration::from_millis(c.progress_tick_ms), c.progress_cap, c.progress_max_step)
  }

  /// Reset to zero and start ticking. A running timer is replaced.
  pub fn start(&mut self) {
    self.stop();
    self.tx.send_replace(Progress::START);

    let tx = Arc::clone(&self.tx);
    let (tick, cap, max_step, stage_count) = (self.tick, self.cap, self.max_step, self.stage_count);
    self.handle = Some(tokio::spawn(async move {
      let mut rng = StdRng::from_entropy();
      let mut interval = tokio::time::interval(tick);
      // The first tick completes immediately
      interval.tick().await;
      loop {
        interval.tick().await;
        let step = if max_step > 0.0 { rng.gen_range(0.0..max_step) } else { 0.0 };
        tx.send_modify(|p| {
          p.value = advance(p.value, step, cap);
          p.stage = stage_for(p.value, stage_count);
        });
      }
    }));
  }

  /// Force 100 %, select the final stage and stop the timer.
  pub fn complete(&mut self) {
    self.stop();
    self.tx.send_replace(Progress { value: 100.0, stage: self.stage_count.saturating_sub(1), done: true });
  }

  /// Stop the timer and leave the value where it is.
  pub fn stop(&mut self) {
    if let Some(handle) = self.handle.take() {
      handle.abort();
    }
  }

  pub fn is_running(&self) -> bool {
    self.handle.as_ref().is_some_and(|h| !h.is_finished())
  }

  pub fn snapshot(&self) -> Progress {
    *self.rx.borrow()
  }

  pub fn set_stage_count(&mut self, stage_count: usize) {
    self.stage_count = stage_count;
  }
}

impl Drop for ProgressSimulator {
  fn drop(&mut self) {
    self.stop();
  }
}
