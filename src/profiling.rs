//! Launch timing for adapter invocations.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

/// Drop-guard that times one adapter launch and records it in the launch
/// timing log, so slow analyses can be traced after the fact.
pub struct LaunchTimer {
    adapter: &'static str,
    start: Instant,
}

impl LaunchTimer {
    pub fn start(adapter: &'static str) -> Self {
        log::debug!("Launching adapter '{}'", adapter);
        Self {
            adapter,
            start: Instant::now(),
        }
    }
}

impl Drop for LaunchTimer {
    fn drop(&mut self) {
        let ms = self.start.elapsed().as_secs_f64() * 1000.0;
        log::info!("Adapter '{}' finished in {:.3}ms", self.adapter, ms);

        if let Err(e) = append_timing(self.adapter, ms) {
            log::warn!("Could not record launch timing: {}", e);
        }
    }
}

/// Location of the launch timing log, under the platform data directory.
pub fn timing_log_path() -> PathBuf {
    let dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bna-rs");
    std::fs::create_dir_all(&dir).ok();
    dir.join("launch_timings.log")
}

fn append_timing(adapter: &str, ms: f64) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(timing_log_path())?;
    writeln!(
        file,
        "{} {} {:.3}ms",
        chrono::Utc::now().to_rfc3339(),
        adapter,
        ms
    )
}
