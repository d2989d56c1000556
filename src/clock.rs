use std::{thread::sleep, time::{Duration, Instant}};

/// Paces the main loop and reports how long each frame actually took.
pub struct FrameClock {
    last: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        FrameClock { last: Instant::now() }
    }

    /// Sleeps out the rest of the current frame and returns the seconds
    /// elapsed since the previous call.
    pub fn tick(&mut self, target_fps: u32) -> f64 {
        let frame = Duration::from_secs_f64(1.0 / target_fps.max(1) as f64);
        let spent = self.last.elapsed();
        if spent < frame {
            sleep(frame - spent);
        }

        let now = Instant::now();
        let elapsed = now.duration_since(self.last);
        self.last = now;
        elapsed.as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waits_at_least_one_frame() {
        let mut clock = FrameClock::new();
        let elapsed = clock.tick(100);
        assert!(elapsed >= 0.01);
    }
}
