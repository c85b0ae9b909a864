use flexi_logger::{Logger, LoggerHandle};

use crate::error::Error;

/// Start the logger from a level spec (`info`, `defect_synth=debug`, …).
/// Keep the returned handle alive for the life of the program.
pub fn setup_logging(level: &str) -> Result<LoggerHandle, Error> {
    let handle = Logger::try_with_str(level)?
        .log_to_stderr()
        .format(flexi_logger::colored_default_format)
        .start()?;
    Ok(handle)
}
