use std::time::Instant;

/// Wall-clock delta between frames. Only used for reporting; animation is per frame.
#[derive(Debug)]
pub struct Clock {
    last_tick: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
        }
    }

    /// Seconds since the previous tick
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        delta
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Averages frame rate over a reporting interval
#[derive(Debug, Clone, Copy)]
pub struct FpsCounter {
    interval: f32,
    frames: u32,
    elapsed: f32,
}

impl FpsCounter {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            frames: 0,
            elapsed: 0.0,
        }
    }

    /// Count a frame; yields the average rate once per interval
    pub fn record(&mut self, delta: f32) -> Option<f32> {
        self.frames += 1;
        self.elapsed += delta;
        if self.elapsed < self.interval {
            return None;
        }
        let fps = self.frames as f32 / self.elapsed;
        self.frames = 0;
        self.elapsed = 0.0;
        Some(fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_clock_measures_delta() {
        let mut clock = Clock::new();
        thread::sleep(Duration::from_millis(10));
        assert!(clock.tick() >= 0.009);
    }

    #[test]
    fn test_fps_counter_reports_once_per_interval() {
        let mut fps = FpsCounter::new(1.0);
        for _ in 0..3 {
            assert_eq!(fps.record(0.25), None);
        }
        assert_eq!(fps.record(0.25), Some(4.0));
        assert_eq!(fps.record(0.25), None);
    }
}
