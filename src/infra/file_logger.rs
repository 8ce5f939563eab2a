use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use tracing::Subscriber;
use tracing_subscriber::Layer;

/// Appends every event to the log file the check help text points users to.
pub struct FileLogger {
    file: Mutex<File>,
}

impl FileLogger {
    pub fn create(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S> Layer<S> for FileLogger
where
    S: Subscriber,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let level = *event.metadata().level();

        let mut visitor = StringVisitor::default();
        event.record(&mut visitor);

        let line = format!(
            "{} {} {}\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            level,
            visitor.message
        );

        // a poisoned lock only means another thread panicked mid-write
        let mut file = match self.file.lock() {
            Ok(file) => file,
            Err(poisoned) => poisoned.into_inner(),
        };
        let _ = file.write_all(line.as_bytes());
    }
}

#[derive(Default)]
struct StringVisitor {
    message: String,
}

impl tracing::field::Visit for StringVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if !self.message.is_empty() {
            self.message.push(' ');
        }

        if field.name() == "message" {
            self.message.push_str(&format!("{value:?}"));
        } else {
            self.message.push_str(&format!("{}={value:?}", field.name()));
        }
    }
}
