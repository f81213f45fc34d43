//! Parse-time configuration (spec.md §6.1, "Configure").

/// Knobs the driver and stream decoder consult while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// When a stream's filter pipeline fails, keep the raw bytes and the
    /// list of filters that could not be applied instead of surfacing
    /// [`crate::error::Error::Filter`] (spec.md §4.3 step 4).
    pub ignore_filter_errors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config { ignore_filter_errors: false }
    }
}
