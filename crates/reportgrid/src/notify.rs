//! Progress notices for the person running a job.

/// Sink for human-readable progress messages.
pub trait Notifier {
    fn notice(&mut self, message: &str);
}

/// Logs notices at `info` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notice(&mut self, message: &str) {
        tracing::info!("{message}");
    }
}

/// Prints notices to standard error, one per line.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notice(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

/// Keeps every notice in memory.
#[derive(Debug, Default, Clone)]
pub struct CollectingNotifier {
    pub messages: Vec<String>,
}

impl Notifier for CollectingNotifier {
    fn notice(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}
