use std::time::{Duration, Instant};

/// Hero rotation over the first trending titles.
#[derive(Debug, Clone)]
pub struct Carousel {
    index: usize,
    len: usize,
    auto_play: bool,
    interval: Duration,
    last_advance: Instant,
}

impl Carousel {
    pub fn new(interval: Duration) -> Self {
        Self {
            index: 0,
            len: 0,
            auto_play: true,
            interval,
            last_advance: Instant::now(),
        }
    }

    /// New items restart the rotation from the first slide.
    pub fn reset(&mut self, len: usize, now: Instant) {
        self.index = 0;
        self.len = len;
        self.auto_play = true;
        self.last_advance = now;
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_auto_playing(&self) -> bool {
        self.auto_play
    }

    /// Advance if auto-play is on and the interval has elapsed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.auto_play || self.len == 0 {
            return false;
        }
        if now.duration_since(self.last_advance) < self.interval {
            return false;
        }
        self.index = (self.index + 1) % self.len;
        self.last_advance = now;
        true
    }

    pub fn next(&mut self) {
        if self.len == 0 {
            return;
        }
        self.auto_play = false;
        self.index = (self.index + 1) % self.len;
    }

    pub fn prev(&mut self) {
        if self.len == 0 {
            return;
        }
        self.auto_play = false;
        self.index = (self.index + self.len - 1) % self.len;
    }

    pub fn jump(&mut self, index: usize) {
        if index < self.len {
            self.auto_play = false;
            self.index = index;
        }
    }
}
