use std::time::Duration;

use crate::error::Result;
use crate::pacing::{FixedDelay, NoDelay, Pacer};
use crate::registers::{self, MIN_REGISTERS};

/// The externally tunable parameters of a machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineConfig {
    /// Number of register slots, PC and flags included
    pub register_count: usize,
    /// Pause after every cycle. Zero runs at full speed.
    pub cycle_delay: Duration,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            register_count: MIN_REGISTERS,
            cycle_delay: Duration::ZERO,
        }
    }
}

impl MachineConfig {
    pub fn with_register_count(mut self, register_count: usize) -> Self {
        self.register_count = register_count;
        self
    }

    pub fn with_cycle_delay(mut self, cycle_delay: Duration) -> Self {
        self.cycle_delay = cycle_delay;
        self
    }

    pub fn validate(&self) -> Result<()> {
        registers::check_count(self.register_count)
    }

    pub fn pacer(&self) -> Box<dyn Pacer> {
        if self.cycle_delay.is_zero() {
            Box::new(NoDelay)
        } else {
            Box::new(FixedDelay(self.cycle_delay))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::Result;

    #[test]
    fn test_default_is_valid() -> Result<()> {
        let config = MachineConfig::default();
        config.validate()?;
        assert_eq!(config.register_count, 5);
        assert!(config.cycle_delay.is_zero());

        Ok(())
    }

    #[test]
    fn test_register_count_bounds() -> Result<()> {
        assert!(MachineConfig::default()
            .with_register_count(4)
            .validate()
            .is_err());
        assert!(MachineConfig::default()
            .with_register_count(17)
            .validate()
            .is_err());
        MachineConfig::default().with_register_count(16).validate()?;

        Ok(())
    }

    #[test]
    fn test_pacer_selection() -> Result<()> {
        let fast = MachineConfig::default().pacer();
        assert_eq!(format!("{:?}", fast), "NoDelay");

        let slow = MachineConfig::default()
            .with_cycle_delay(Duration::from_millis(50))
            .pacer();
        assert_eq!(format!("{:?}", slow), "FixedDelay(50ms)");

        Ok(())
    }
}
