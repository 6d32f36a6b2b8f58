use std::io;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use worker::console_log;

/// Install the global subscriber. Later calls in the same isolate are no-ops.
pub fn init(log_level: &str) {
  let filter = EnvFilter::try_new(log_level)
    .unwrap_or_else(|_| EnvFilter::new(crate::consts::DEFAULT_LOG_LEVEL));

  let fmt_layer = fmt::layer()
    .with_ansi(false)
    // wasm32-unknown-unknown has no system clock, the console adds its own
    .without_time()
    .with_writer(ConsoleWriter::default);

  let _ = tracing_subscriber::registry()
    .with(filter)
    .with(fmt_layer)
    .try_init();
}

/// Buffers one formatted event and hands it to the Workers console on drop.
#[derive(Default)]
struct ConsoleWriter {
  buffer: Vec<u8>
}

impl io::Write for ConsoleWriter {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    self.buffer.extend_from_slice(buf);
    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

impl Drop for ConsoleWriter {
  fn drop(&mut self) {
    if self.buffer.is_empty() {
      return
    }

    console_log!("{}", String::from_utf8_lossy(&self.buffer).trim_end());
  }
}
