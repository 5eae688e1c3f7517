//! Indicator value cells and the hooks through which they react to events.
//!
//! This module provides:
//! - `IndicatorCore<T>`: the typed two-state value cell every indicator owns,
//!   with optional per-period history and a declared dependency set
//! - `IndicatorState`: the type-erased view of a core used by the list
//! - `Indicator`: the event hooks an indicator implements
//! - `IndicatorList`: dependency-ordered fan-out of market events

pub mod external;
pub mod list;
pub mod moving_average;
pub mod period_stats;
pub mod price;

use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::domain::error::TradecoreError;
use crate::domain::market::{Quote, Trade};
use crate::domain::properties::Properties;

pub use list::IndicatorList;

/// Shared handle to an indicator. Lists and dependents hold clones.
pub type IndicatorHandle = Rc<RefCell<dyn Indicator>>;

/// Wrap an indicator for sharing between a list and its dependents.
pub fn shared<I>(indicator: I) -> Rc<RefCell<I>> {
    Rc::new(RefCell::new(indicator))
}

/// Identity comparison of two handles.
pub fn same_indicator(a: &IndicatorHandle, b: &IndicatorHandle) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub title: String,
    pub description: String,
    pub parameters: Properties,
}

/// The value and set flag of an indicator as captured at a period end.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodicSample<T> {
    pub value: Option<T>,
    pub is_set: bool,
}

pub struct IndicatorCore<T> {
    descriptor: Descriptor,
    value: Option<T>,
    is_set: bool,
    periodic: Option<Vec<PeriodicSample<T>>>,
    dependencies: Vec<IndicatorHandle>,
}

impl<T: Clone> IndicatorCore<T> {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        IndicatorCore {
            descriptor: Descriptor {
                title: title.into(),
                description: description.into(),
                parameters: Properties::new(),
            },
            value: None,
            is_set: false,
            periodic: None,
            dependencies: Vec::new(),
        }
    }

    pub fn with_parameters(mut self, parameters: Properties) -> Self {
        self.descriptor.parameters = parameters;
        self
    }

    /// Keep a sample of the value at every period end.
    pub fn collecting_periodic(mut self, collect: bool) -> Self {
        self.periodic = collect.then(Vec::new);
        self
    }

    /// Declare that this indicator reads `dependency`. Declaring the same
    /// indicator twice has no effect.
    pub fn depends_on(mut self, dependency: IndicatorHandle) -> Self {
        self.add_dependency(dependency);
        self
    }

    pub fn add_dependency(&mut self, dependency: IndicatorHandle) {
        if !self
            .dependencies
            .iter()
            .any(|d| same_indicator(d, &dependency))
        {
            self.dependencies.push(dependency);
        }
    }

    pub fn value(&self) -> Result<T, TradecoreError> {
        match (&self.value, self.is_set) {
            (Some(v), true) => Ok(v.clone()),
            _ => Err(TradecoreError::ValueNotSet {
                indicator: self.descriptor.title.clone(),
            }),
        }
    }

    pub fn set_value(&mut self, value: T) {
        self.value = Some(value);
        self.is_set = true;
    }

    /// Clear the set flag. The last value and the history are kept.
    pub fn unset_value(&mut self) {
        self.is_set = false;
    }

    pub fn is_set(&self) -> bool {
        self.is_set
    }

    pub fn is_collecting_periodic(&self) -> bool {
        self.periodic.is_some()
    }

    /// Samples recorded at each period end, oldest first. Empty when the
    /// indicator is not collecting.
    pub fn periodic_data(&self) -> &[PeriodicSample<T>] {
        self.periodic.as_deref().unwrap_or(&[])
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn dependencies(&self) -> &[IndicatorHandle] {
        &self.dependencies
    }

    fn record(&mut self) {
        if let Some(history) = self.periodic.as_mut() {
            history.push(PeriodicSample {
                value: self.value.clone(),
                is_set: self.is_set,
            });
        }
    }
}

/// Type-erased view of an [`IndicatorCore`].
pub trait IndicatorState {
    fn descriptor(&self) -> &Descriptor;
    fn dependencies(&self) -> &[IndicatorHandle];
    fn is_set(&self) -> bool;
    fn unset_value(&mut self);
    /// Append the current sample to the periodic history, if collecting.
    fn record_period(&mut self);
    fn periods_recorded(&self) -> usize;
    /// Display form of the current value, `None` while unset.
    fn render_value(&self) -> Option<String>;
}

impl<T: Clone + fmt::Display> IndicatorState for IndicatorCore<T> {
    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn dependencies(&self) -> &[IndicatorHandle] {
        &self.dependencies
    }

    fn is_set(&self) -> bool {
        self.is_set
    }

    fn unset_value(&mut self) {
        self.is_set = false;
    }

    fn record_period(&mut self) {
        self.record();
    }

    fn periods_recorded(&self) -> usize {
        self.periodic_data().len()
    }

    fn render_value(&self) -> Option<String> {
        self.value().ok().map(|v| v.to_string())
    }
}

/// Event hooks of an indicator. Every hook defaults to a no-op; the list
/// calls the period hooks, never the indicator itself.
pub trait Indicator {
    fn state(&self) -> &dyn IndicatorState;
    fn state_mut(&mut self) -> &mut dyn IndicatorState;

    fn trade_received(&mut self, _trade: &Trade) {}
    fn quote_received(&mut self, _quote: &Quote) {}
    fn beginning_of_period(&mut self, _time: DateTime<Utc>) {}
    fn end_of_period(&mut self, _time: DateTime<Utc>) {}

    fn title(&self) -> &str {
        &self.state().descriptor().title
    }
}
