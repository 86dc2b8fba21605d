use std::time::{Duration, Instant};

/// Measures frame cadence and paces the loop to a target frame duration.
pub struct FrameTiming {
    last_frame_time: Option<Instant>,
    last_fps_time: Instant,
    frame_count: u32,
    pub frame_dt: f32,
    target_frame_duration: Duration,
    next_frame_time: Instant,
}

impl FrameTiming {
    pub fn new(target_hz: f32) -> Self {
        let target_frame_duration = if target_hz > 1.0 {
            Duration::from_secs_f32(1.0 / target_hz)
        } else {
            Duration::from_millis(16)
        };
        let now = Instant::now();
        Self {
            last_frame_time: None,
            last_fps_time: now,
            frame_count: 0,
            frame_dt: target_frame_duration.as_secs_f32(),
            target_frame_duration,
            next_frame_time: now + target_frame_duration,
        }
    }

    /// Sleeps until the next frame is due.
    pub fn wait_for_next_frame(&mut self) {
        let now = Instant::now();
        if now < self.next_frame_time {
            std::thread::sleep(self.next_frame_time - now);
        }
        self.next_frame_time = Instant::now() + self.target_frame_duration;
    }

    pub fn update(&mut self, now: Instant) {
        let dt_duration = if let Some(last) = self.last_frame_time {
            now.saturating_duration_since(last)
        } else {
            self.target_frame_duration
        };
        self.last_frame_time = Some(now);
        self.frame_dt = dt_duration.as_secs_f32().max(0.0);

        self.frame_count = self.frame_count.saturating_add(1);
        let elapsed = now.saturating_duration_since(self.last_fps_time);
        if elapsed.as_secs_f32() >= 5.0 {
            let fps = self.frame_count as f32 / elapsed.as_secs_f32();
            log::debug!(
                "{:.1} fps (cadence {:.2} ms)",
                fps,
                (self.frame_dt * 1000.0).max(0.0)
            );
            self.frame_count = 0;
            self.last_fps_time = now;
        }
    }
}
