use std::time::{Duration, Instant};

const SLOW_THRESHOLD: Duration = Duration::from_secs(10);

/// Installs the global logger. `RUST_LOG`, when set, wins over `debug`.
pub fn init_logging(debug: bool) {
    let filter = if debug { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{}] {} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

/// Measures one operation; warns from `Drop` when it ran unusually long.
pub struct Timer {
    name: String,
    start: Instant,
}

impl Timer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }

    pub fn debug(&self) {
        log::debug!("{} completed in {}ms", self.name, self.elapsed_ms());
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        if self.start.elapsed() > SLOW_THRESHOLD {
            log::warn!("{} took {}ms (slow!)", self.name, self.elapsed_ms());
        }
    }
}
