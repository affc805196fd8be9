use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    start_time: Instant,
    stages: Vec<StageStats>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageStats {
    pub stage: String,
    pub duration: Duration,
    pub rows: usize,
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            stages: Vec::new(),
        }
    }

    pub fn record_stage(&mut self, stage: &str, duration: Duration, rows: usize) {
        self.stages.push(StageStats {
            stage: stage.to_string(),
            duration,
            rows,
        });
    }

    pub fn stages(&self) -> &[StageStats] {
        &self.stages
    }

    pub fn stage(&self, stage: &str) -> Option<&StageStats> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn log_summary(&self) {
        for stats in &self.stages {
            let rate = if stats.duration.as_secs_f64() > 0.0 {
                stats.rows as f64 / stats.duration.as_secs_f64()
            } else {
                0.0
            };
            log::info!(
                "{:<6} {:>8} rows in {:>8.3}s ({:.0} rows/sec)",
                stats.stage,
                stats.rows,
                stats.duration.as_secs_f64(),
                rate
            );
        }
        log::info!("total  {:.3}s", self.elapsed().as_secs_f64());
    }
}

// Runs a block, records its duration against a stage, and yields the block's value.
// The row count is taken from the value by the closure passed as `$rows`.
#[macro_export]
macro_rules! time_stage {
    ($metrics:expr, $stage:expr, $rows:expr, $code:block) => {{
        let start = std::time::Instant::now();
        let result = $code;
        let duration = start.elapsed();
        if let Ok(value) = &result {
            $metrics.record_stage($stage, duration, ($rows)(value));
        }
        result
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_stages_in_order() {
        let mut metrics = PipelineMetrics::new();
        metrics.record_stage("load", Duration::from_millis(5), 10);
        metrics.record_stage("clean", Duration::from_millis(2), 8);

        let names: Vec<&str> = metrics.stages().iter().map(|s| s.stage.as_str()).collect();
        assert_eq!(names, vec!["load", "clean"]);
        assert_eq!(metrics.stage("clean").unwrap().rows, 8);
        assert!(metrics.stage("save").is_none());
    }

    #[test]
    fn test_time_stage_skips_failures() {
        let mut metrics = PipelineMetrics::new();

        let ok: Result<Vec<u8>, String> = crate::time_stage!(metrics, "load", |v: &Vec<u8>| v.len(), {
            Ok(vec![1, 2, 3])
        });
        assert!(ok.is_ok());

        let err: Result<Vec<u8>, String> = crate::time_stage!(metrics, "clean", |v: &Vec<u8>| v.len(), {
            Err("boom".to_string())
        });
        assert!(err.is_err());

        assert_eq!(metrics.stages().len(), 1);
        assert_eq!(metrics.stage("load").unwrap().rows, 3);
    }
}
