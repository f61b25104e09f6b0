//! crates/logging/src/config.rs
//! Verbosity configuration combining info and debug levels.

use super::levels::{DebugFlag, DebugLevels, InfoFlag, InfoLevels};

/// Combined verbosity configuration for info and debug flags.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct VerbosityConfig {
    /// Info flag levels.
    pub info: InfoLevels,
    /// Debug flag levels.
    pub debug: DebugLevels,
}

impl VerbosityConfig {
    /// Create a new configuration from a `-v` count.
    ///
    /// Level 0 leaves every flag off, so only warnings and errors reach the
    /// writer.
    pub fn from_verbose_level(level: u8) -> Self {
        let mut config = Self::default();

        match level {
            0 => {}
            1 => {
                config.info.name = 1;
                config.info.rules = 1;
                config.info.stats = 1;
            }
            2 => {
                config.info.name = 2;
                config.info.rules = 2;
                config.info.stats = 1;
                config.debug.acl = 1;
                config.debug.plan = 1;
                config.debug.principal = 1;
            }
            _ => {
                config.info.set_all(2);
                config.debug.set_all(2);
            }
        }

        config
    }

    /// Returns true when events for `flag` at `level` should be emitted.
    pub fn info_gte(&self, flag: InfoFlag, level: u8) -> bool {
        self.info.get(flag) >= level
    }

    /// Returns true when events for `flag` at `level` should be emitted.
    pub fn debug_gte(&self, flag: DebugFlag, level: u8) -> bool {
        self.debug.get(flag) >= level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_zero_disables_everything() {
        let config = VerbosityConfig::from_verbose_level(0);
        assert_eq!(config, VerbosityConfig::default());
        assert!(!config.info_gte(InfoFlag::Name, 1));
        assert!(config.info_gte(InfoFlag::Name, 0));
    }

    #[test]
    fn level_one_reports_names_and_stats() {
        let config = VerbosityConfig::from_verbose_level(1);
        assert!(config.info_gte(InfoFlag::Name, 1));
        assert!(!config.info_gte(InfoFlag::Name, 2));
        assert!(config.info_gte(InfoFlag::Stats, 1));
        assert!(!config.debug_gte(DebugFlag::Acl, 1));
    }

    #[test]
    fn level_two_enables_debug_acl() {
        let config = VerbosityConfig::from_verbose_level(2);
        assert!(config.debug_gte(DebugFlag::Acl, 1));
        assert!(!config.debug_gte(DebugFlag::Walk, 1));
    }

    #[test]
    fn high_levels_saturate() {
        assert_eq!(
            VerbosityConfig::from_verbose_level(3),
            VerbosityConfig::from_verbose_level(200)
        );
        assert!(VerbosityConfig::from_verbose_level(3).debug_gte(DebugFlag::Walk, 2));
    }
}
