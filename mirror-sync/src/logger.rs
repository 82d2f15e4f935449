//! Logger capability injected into the engine.

use std::sync::Mutex;

/// Leveled text sink the engine reports to.
pub trait SyncLogger: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards to the process-wide `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl SyncLogger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

/// Keeps every message in memory, in order.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far.
    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.lock().clone()
    }

    /// Messages logged at `level`.
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.lock().push((level, message.to_string()));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(LogLevel, String)>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SyncLogger for MemoryLogger {
    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_logger_keeps_order_and_levels() {
        let logger = MemoryLogger::new();
        logger.info("first");
        logger.error("second");
        logger.info("third");

        assert_eq!(
            logger.entries(),
            vec![
                (LogLevel::Info, "first".to_string()),
                (LogLevel::Error, "second".to_string()),
                (LogLevel::Info, "third".to_string()),
            ]
        );
        assert_eq!(logger.messages(LogLevel::Error), vec!["second".to_string()]);

        logger.clear();
        assert!(logger.entries().is_empty());
    }

    #[test]
    fn tracing_logger_is_usable_without_a_subscriber() {
        let _ = env_logger::builder().is_test(true).try_init();
        TracingLogger.info("info without subscriber");
        TracingLogger.error("error without subscriber");
    }
}
