use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
    pub avg_render_items: f32,
    pub dropped_backlog_ms: f32,
}

/// Aggregates per-frame counters over a fixed interval of loop time.
/// Loop time is fed in explicitly so headless runs report simulated rates.
#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval: Duration,
    elapsed: Duration,
    frames: u32,
    ticks: u32,
    frame_time_sum: Duration,
    render_items_sum: u64,
    dropped_backlog: Duration,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
            frames: 0,
            ticks: 0,
            frame_time_sum: Duration::ZERO,
            render_items_sum: 0,
            dropped_backlog: Duration::ZERO,
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration, render_items: usize) {
        self.frames = self.frames.saturating_add(1);
        self.elapsed = self.elapsed.saturating_add(frame_dt);
        self.frame_time_sum = self.frame_time_sum.saturating_add(frame_dt);
        self.render_items_sum = self.render_items_sum.saturating_add(render_items as u64);
    }

    pub(crate) fn record_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub(crate) fn record_dropped_backlog(&mut self, dropped: Duration) {
        self.dropped_backlog = self.dropped_backlog.saturating_add(dropped);
    }

    pub(crate) fn maybe_snapshot(&mut self) -> Option<LoopMetricsSnapshot> {
        if self.elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = self.elapsed.as_secs_f32().max(f32::EPSILON);
        let (frame_time_ms, avg_render_items) = if self.frames == 0 {
            (0.0, 0.0)
        } else {
            (
                (self.frame_time_sum.as_secs_f32() / self.frames as f32) * 1000.0,
                self.render_items_sum as f32 / self.frames as f32,
            )
        };

        let snapshot = LoopMetricsSnapshot {
            fps: self.frames as f32 / elapsed_seconds,
            tps: self.ticks as f32 / elapsed_seconds,
            frame_time_ms,
            avg_render_items,
            dropped_backlog_ms: self.dropped_backlog.as_secs_f32() * 1000.0,
        };

        *self = Self::new(self.interval);
        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_computes_expected_values() {
        let mut accumulator = MetricsAccumulator::new(Duration::from_secs(1));

        accumulator.record_frame(Duration::from_millis(500), 10);
        accumulator.record_frame(Duration::from_millis(500), 20);
        for _ in 0..4 {
            accumulator.record_tick();
        }

        let snapshot = accumulator
            .maybe_snapshot()
            .expect("snapshot should be emitted");

        assert!((snapshot.fps - 2.0).abs() < 0.05);
        assert!((snapshot.tps - 4.0).abs() < 0.05);
        assert!((snapshot.frame_time_ms - 500.0).abs() < 0.001);
        assert!((snapshot.avg_render_items - 15.0).abs() < 0.001);
    }

    #[test]
    fn snapshot_not_emitted_before_interval() {
        let mut accumulator = MetricsAccumulator::new(Duration::from_secs(1));
        accumulator.record_frame(Duration::from_millis(16), 3);

        assert!(accumulator.maybe_snapshot().is_none());
    }

    #[test]
    fn snapshot_resets_counters() {
        let mut accumulator = MetricsAccumulator::new(Duration::from_millis(100));
        accumulator.record_dropped_backlog(Duration::from_millis(40));
        accumulator.record_frame(Duration::from_millis(100), 1);

        let first = accumulator.maybe_snapshot().expect("first snapshot");
        assert!((first.dropped_backlog_ms - 40.0).abs() < 0.001);
        assert!(accumulator.maybe_snapshot().is_none());
    }
}
