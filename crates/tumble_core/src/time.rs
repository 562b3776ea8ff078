use std::time::Instant;

const FPS_SAMPLE_COUNT: usize = 60;

/// Variable-step frame clock. Each frame measures wall-clock `dt`, capped so a
/// stall (window drag, breakpoint) cannot finish a roll in one jump.
pub struct TimeState {
    pub max_frame_dt: f64,
    pub total_time: f64,
    pub frame_count: u64,
    pub dt: f64,
    last_instant: Instant,

    fps_samples: [f64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
    pub smoothed_frame_time_ms: f64,
}

impl TimeState {
    pub fn new() -> Self {
        Self {
            max_frame_dt: 0.25,
            total_time: 0.0,
            frame_count: 0,
            dt: 0.0,
            last_instant: Instant::now(),
            fps_samples: [1.0 / 60.0; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: 60.0,
            smoothed_frame_time_ms: 16.667,
        }
    }

    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.record_frame(elapsed);
    }

    /// Frame `dt` in seconds as the simulation consumes it.
    pub fn dt_secs(&self) -> f32 {
        self.dt as f32
    }

    fn record_frame(&mut self, elapsed: f64) {
        self.dt = elapsed;
        if self.dt > self.max_frame_dt {
            log::warn!(
                "Frame took {:.1}ms, capping dt to {}ms",
                self.dt * 1000.0,
                self.max_frame_dt * 1000.0
            );
            self.dt = self.max_frame_dt;
        }

        self.total_time += self.dt;
        self.frame_count += 1;

        // FPS smoothing
        self.fps_samples[self.fps_sample_index] = self.dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt: f64 = self.fps_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_frame_time_ms = avg_dt * 1000.0;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new()
    }
}
