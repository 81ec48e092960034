//! Engine configuration and loaders.
use std::env;

/// Switches applied when a [`Host`] is created.
///
/// [`Host`]: crate::Host
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Enable the profiler at startup.
    pub profiler_enabled: bool,
    /// Start new tree handles with tracing on.
    pub trace_ticks: bool,
}

impl EngineConfig {
    pub const fn new() -> Self {
        Self {
            profiler_enabled: false,
            trace_ticks: false,
        }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BT_PROFILE` - Enable the profiler (default: false)
    /// - `BT_TRACE` - Trace every node tick of new handles (default: false)
    ///
    /// Accepted values are `1/true/yes/on` and `0/false/no/off`; a variable
    /// set to the empty string counts as `true`.
    pub fn from_env() -> Self {
        Self {
            profiler_enabled: read_flag("BT_PROFILE"),
            trace_ticks: read_flag("BT_TRACE"),
        }
    }

    pub const fn with_profiler(mut self, enabled: bool) -> Self {
        self.profiler_enabled = enabled;
        self
    }

    pub const fn with_trace(mut self, enabled: bool) -> Self {
        self.trace_ticks = enabled;
        self
    }
}

fn read_flag(key: &str) -> bool {
    match env::var(key) {
        Ok(value) => parse_flag(key, &value),
        Err(env::VarError::NotPresent) => false,
        Err(error) => {
            tracing::warn!(key, %error, "ignoring flag");
            false
        }
    }
}

/// Parses a flag value. An empty value counts as set.
///
/// Unrecognized values log a warning and read as `false`.
fn parse_flag(key: &str, value: &str) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        other => {
            tracing::warn!(key, value = other, "unrecognized flag value, treating as false");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_off() {
        assert_eq!(EngineConfig::default(), EngineConfig::new());
        assert!(!EngineConfig::default().profiler_enabled);
    }

    #[test]
    fn builders_set_flags() {
        let config = EngineConfig::new().with_profiler(true).with_trace(true);
        assert!(config.profiler_enabled);
        assert!(config.trace_ticks);
    }

    #[test]
    fn flag_values_parse() {
        for value in ["", "1", "true", "TRUE", "yes", "on", " on "] {
            assert!(parse_flag("BT_PROFILE", value), "{value:?}");
        }
        for value in ["0", "false", "False", "no", "off"] {
            assert!(!parse_flag("BT_PROFILE", value), "{value:?}");
        }
    }

    #[test]
    fn unrecognized_flag_value_reads_false() {
        assert!(!parse_flag("BT_TRACE", "maybe"));
        assert!(!parse_flag("BT_TRACE", "2"));
    }

    #[test]
    fn unset_flag_reads_false() {
        assert!(!read_flag("BT_TEST_FLAG_THAT_IS_NEVER_SET"));
    }
}
