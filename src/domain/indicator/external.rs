//! Indicator whose value is maintained by the strategy rather than by market data.

use std::fmt;

use super::{Indicator, IndicatorCore, IndicatorState};

pub struct ExternalValue<T> {
    core: IndicatorCore<T>,
}

impl<T: Clone> ExternalValue<T> {
    pub fn new(core: IndicatorCore<T>) -> Self {
        ExternalValue { core }
    }

    pub fn named(title: impl Into<String>) -> Self {
        Self::new(IndicatorCore::new(title, ""))
    }

    pub fn core(&self) -> &IndicatorCore<T> {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut IndicatorCore<T> {
        &mut self.core
    }
}

impl<T: Clone + fmt::Display> Indicator for ExternalValue<T> {
    fn state(&self) -> &dyn IndicatorState {
        &self.core
    }

    fn state_mut(&mut self) -> &mut dyn IndicatorState {
        &mut self.core
    }
}
