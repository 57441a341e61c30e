//! Miscellaneous utility functions

use crate::util::*;

static LOGGER: OnceLock<()> = OnceLock::new();

/// Start the [stderrlog] instance for this crate and the reader crate, with the given verbosity.
///
/// Only the first call has an effect, the logger cannot be reconfigured.
pub fn init_error_logger(verbosity: u8) {
    let _ = LOGGER.get_or_init(|| {
        if let Err(e) = stderrlog::new()
            .module("mid_raw")
            .module("mid_protocol_reader")
            .verbosity(verbosity as usize)
            .init()
        {
            eprintln!("Failed to initialize logger: {e}");
        }
        log::trace!("Logger initialized with verbosity {verbosity}");
    });
}

/// Displays an error message highlighted in red through the [log] facade.
#[inline]
pub fn display_error(err_msg: &str) {
    log::error!("{}", err_msg.red());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logger_twice() {
        init_error_logger(2);
        init_error_logger(4);
        display_error("error displayed after initializing the logger twice");
    }
}
