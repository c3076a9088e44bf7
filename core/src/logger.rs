//! Caller logger capability.
//!
//! The pipeline reports encoded URLs and bodies to the logger installed with
//! `with_logger`; with none installed nothing is reported. Internal
//! diagnostics go to the `log` facade independently of this.

/// Receives a message plus key/value fields.
pub trait Logger: Send + Sync {
    fn log(&self, message: &str, fields: &[(&str, &str)]);
}

/// Forwards to the `log` facade at a fixed level.
#[derive(Debug, Clone, Copy)]
pub struct LogFacade {
    level: log::Level,
}

impl LogFacade {
    pub fn new(level: log::Level) -> Self {
        Self { level }
    }
}

impl Default for LogFacade {
    fn default() -> Self {
        Self::new(log::Level::Info)
    }
}

impl Logger for LogFacade {
    fn log(&self, message: &str, fields: &[(&str, &str)]) {
        let fields = render_fields(fields);
        if fields.is_empty() {
            log::log!(self.level, "{message}");
        } else {
            log::log!(self.level, "{message} {fields}");
        }
    }
}

fn render_fields(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(" ")
}
