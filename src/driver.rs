//! Production pump for the cooperative scheduler.
//!
//! The component graph is single-threaded, so the driver runs on a
//! current-thread tokio runtime: an interval tick, a pump, repeat. All
//! lifecycle re-entry (fetch completions, gate polls, child cascades)
//! happens inside the pump.

use crate::app::App;

pub struct Driver {
    app: App,
}

impl Driver {
    pub fn new(app: &App) -> Self {
        Self { app: app.clone() }
    }

    /// Pump on the configured tick period until `done` returns true. The
    /// condition is checked after each pump.
    pub async fn run_until(&self, done: impl Fn() -> bool) {
        let mut interval = tokio::time::interval(self.app.config().pump_tick());
        loop {
            interval.tick().await;
            self.app.pump();
            if done() {
                break;
            }
        }
    }

    /// Pump forever.
    pub async fn run(&self) {
        self.run_until(|| false).await;
    }
}
