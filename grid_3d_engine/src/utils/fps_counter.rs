/// Frame-rate counter averaged over the last few seconds.
///
/// Frames are counted per elapsed second. Each completed second pushes
/// its frame count into a sliding window of `FPS_WINDOW` entries; the
/// reported frame rate is the integer mean of that window.

use std::cell::Cell;
use std::collections::VecDeque;
use crate::engine_debug;

/// Number of one-second samples kept
pub const FPS_WINDOW: usize = 5;

/// Frame time reported before the first full second
const INITIAL_FRAME_TIME: f64 = 60.0;

#[derive(Debug, Clone)]
pub struct FpsCounter {
    elapsed: f64,
    frames: u32,
    frame_time: f64,
    samples: VecDeque<u32>,
    /// Mean of `samples`, invalidated whenever a sample is pushed
    cached_rate: Cell<Option<u32>>,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            elapsed: 0.0,
            frames: 0,
            frame_time: INITIAL_FRAME_TIME,
            samples: VecDeque::with_capacity(FPS_WINDOW + 1),
            cached_rate: Cell::new(None),
        }
    }

    /// Count one frame that took `dt` seconds
    pub fn update(&mut self, dt: f64) {
        self.elapsed += dt;
        self.frames += 1;

        if self.elapsed >= 1.0 {
            self.frame_time = 1000.0 / f64::from(self.frames);
            self.samples.push_back(self.frames);
            if self.samples.len() > FPS_WINDOW {
                self.samples.pop_front();
            }
            self.cached_rate.set(None);

            self.frames = 0;
            self.elapsed = 0.0;
        }
    }

    /// Average frames per second over the window (0 before the first sample)
    pub fn frame_rate(&self) -> u32 {
        if self.samples.is_empty() {
            return 0;
        }
        if let Some(rate) = self.cached_rate.get() {
            return rate;
        }
        let sum: u32 = self.samples.iter().sum();
        let rate = sum / self.samples.len() as u32;
        self.cached_rate.set(Some(rate));
        rate
    }

    /// Milliseconds per frame over the last completed second
    pub fn frame_time(&self) -> f64 {
        self.frame_time
    }

    /// Per-second samples, oldest first
    pub fn samples(&self) -> impl Iterator<Item = u32> + '_ {
        self.samples.iter().copied()
    }

    /// Log the sample window at DEBUG
    pub fn debug_dump(&self) {
        engine_debug!("grid3d::FpsCounter", "Frame rates ({} samples):", self.samples.len());
        for (i, frames) in self.samples.iter().enumerate() {
            engine_debug!("grid3d::FpsCounter", "  {} : {}", i + 1, frames);
        }
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "fps_counter_tests.rs"]
mod tests;
