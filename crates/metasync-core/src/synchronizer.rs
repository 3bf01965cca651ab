//! The long-lived scheduling loop around [`ExtractionPass`].
//!
//! Lifecycle is `Created → Running → Stopped`, held in a single atomic owned
//! by the synchronizer. Passes never overlap: the next delay only starts once
//! the previous pass has returned. Cancellation is observed at tick
//! granularity; an in-flight pass always runs to completion.

use std::{
  fmt,
  sync::{
    Arc,
    atomic::{AtomicU8, AtomicU64, Ordering},
  },
  time::Duration,
};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
  Error, Result,
  catalog::CatalogReader,
  config::AssetsConfig,
  pass::{ExtractionPass, PassReport},
  sink::AssetSink,
  state::StateStore,
};

// ─── Lifecycle ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
  Created,
  Running,
  Stopped,
}

impl LoopState {
  fn as_u8(self) -> u8 {
    match self {
      Self::Created => 0,
      Self::Running => 1,
      Self::Stopped => 2,
    }
  }

  fn from_u8(v: u8) -> Self {
    match v {
      0 => Self::Created,
      1 => Self::Running,
      _ => Self::Stopped,
    }
  }
}

impl fmt::Display for LoopState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Created => "created",
      Self::Running => "running",
      Self::Stopped => "stopped",
    })
  }
}

/// Counters accumulated over the synchronizer's lifetime.
///
/// Every pass lands in exactly one of `succeeded`, `partial` or `failed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
  pub passes:    u64,
  /// Reached the end of the catalog with nothing skipped.
  pub succeeded: u64,
  /// Reached the end of the catalog, but skipped objects or had assets
  /// rejected by the sink.
  pub partial:   u64,
  /// Aborted because the catalog could not be opened or enumerated.
  pub failed:    u64,
  /// Assets accepted by the sink, including those of aborted passes.
  pub emitted:   u64,
}

#[derive(Default)]
struct Counters {
  passes:    AtomicU64,
  succeeded: AtomicU64,
  partial:   AtomicU64,
  failed:    AtomicU64,
  emitted:   AtomicU64,
}

// ─── Synchronizer ────────────────────────────────────────────────────────────

pub struct Synchronizer<R, S, K> {
  pass:         ExtractionPass<R, S>,
  sink:         K,
  delay:        Duration,
  run_on_start: bool,
  state:        AtomicU8,
  cancel:       CancellationToken,
  counters:     Counters,
}

impl<R, S, K> Synchronizer<R, S, K>
where
  R: CatalogReader,
  S: StateStore,
  K: AssetSink,
{
  pub fn new(pass: ExtractionPass<R, S>, sink: K, delay: Duration) -> Self {
    Self {
      pass,
      sink,
      delay,
      run_on_start: false,
      state: AtomicU8::new(LoopState::Created.as_u8()),
      cancel: CancellationToken::new(),
      counters: Counters::default(),
    }
  }

  /// Build from the `assets` settings, applying the default poll interval.
  pub fn from_config(
    pass: ExtractionPass<R, S>,
    sink: K,
    config: &AssetsConfig,
  ) -> Self {
    Self::new(pass, sink, config.delay()).with_run_on_start(config.run_on_start)
  }

  /// Run the first pass immediately rather than after one delay.
  pub fn with_run_on_start(mut self, run_on_start: bool) -> Self {
    self.run_on_start = run_on_start;
    self
  }

  pub fn delay(&self) -> Duration { self.delay }

  pub fn state(&self) -> LoopState {
    LoopState::from_u8(self.state.load(Ordering::SeqCst))
  }

  pub fn stats(&self) -> SyncStats {
    let c = &self.counters;
    SyncStats {
      passes:    c.passes.load(Ordering::SeqCst),
      succeeded: c.succeeded.load(Ordering::SeqCst),
      partial:   c.partial.load(Ordering::SeqCst),
      failed:    c.failed.load(Ordering::SeqCst),
      emitted:   c.emitted.load(Ordering::SeqCst),
    }
  }

  /// Request shutdown. No new pass starts once this has been called; a pass
  /// already in flight finishes first. Calling it more than once is harmless.
  pub fn stop(&self) {
    let previous = LoopState::from_u8(
      self.state.swap(LoopState::Stopped.as_u8(), Ordering::SeqCst),
    );
    if previous != LoopState::Stopped {
      tracing::info!(%previous, "stopping asset synchronizer");
    }
    self.cancel.cancel();
  }

  /// Move to `Running` and drive passes until [`stop`](Self::stop) is called.
  ///
  /// Fails only if the synchronizer was already started or stopped. Pass
  /// failures are logged and never end the loop.
  pub async fn run(&self) -> Result<()> {
    self
      .state
      .compare_exchange(
        LoopState::Created.as_u8(),
        LoopState::Running.as_u8(),
        Ordering::SeqCst,
        Ordering::SeqCst,
      )
      .map_err(|current| Error::Lifecycle {
        action: "start",
        state:  LoopState::from_u8(current),
      })?;

    tracing::info!(
      delay = ?self.delay,
      run_on_start = self.run_on_start,
      "asset synchronizer started"
    );

    let mut wait = !self.run_on_start;
    loop {
      if wait {
        tokio::select! {
          _ = self.cancel.cancelled() => break,
          _ = tokio::time::sleep(self.delay) => {}
        }
      }
      wait = true;

      if self.cancel.is_cancelled() {
        break;
      }
      // Already logged and counted by `run_once`.
      let _ = self.run_once().await;
    }

    tracing::info!("asset synchronizer stopped");
    Ok(())
  }

  /// Run a single pass outside the schedule, updating the counters.
  pub async fn run_once(&self) -> Result<PassReport> {
    let c = &self.counters;
    c.passes.fetch_add(1, Ordering::SeqCst);

    let mut report = PassReport::default();
    let outcome = self.pass.run_into(&self.sink, &mut report).await;
    c.emitted.fetch_add(report.emitted as u64, Ordering::SeqCst);

    match outcome {
      Ok(()) => {
        let counter = if report.is_clean() { &c.succeeded } else { &c.partial };
        counter.fetch_add(1, Ordering::SeqCst);
        tracing::info!(
          emitted = report.emitted,
          failures = report.failures.len(),
          cursor_advanced = report.cursor_advanced,
          "asset synchronization pass finished"
        );
        Ok(report)
      }
      Err(e) => {
        c.failed.fetch_add(1, Ordering::SeqCst);
        tracing::error!(
          error = %e,
          emitted = report.emitted,
          failures = report.failures.len(),
          "asset synchronization pass failed"
        );
        Err(e)
      }
    }
  }
}

impl<R, S, K> Synchronizer<R, S, K>
where
  R: CatalogReader + 'static,
  S: StateStore + 'static,
  K: AssetSink + 'static,
{
  /// Run the loop on its own tokio task.
  pub fn spawn(self: Arc<Self>) -> JoinHandle<Result<()>> {
    tokio::spawn(async move { self.run().await })
  }
}
