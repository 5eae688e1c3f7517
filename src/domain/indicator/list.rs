//! Dependency-ordered indicator registry and event fan-out.
//!
//! Members are kept sorted by their total transitive dependency count (an
//! indicator's direct dependency count plus, recursively, that of each
//! dependency). The sort is stable, so indicators with equal counts keep
//! their insertion order. For tree-shaped dependency graphs this places
//! every dependency ahead of its dependents, which is what lets a dependent
//! read its inputs' values for the event currently being dispatched.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::rc::Rc;

use super::{same_indicator, Indicator, IndicatorHandle};
use crate::domain::error::TradecoreError;
use crate::domain::market::{Quote, Trade};
use crate::domain::measure::MeasureHandle;
use crate::domain::period::{PeriodAction, PeriodSplitter, PeriodSplitterResult};

pub(crate) struct Member {
    pub(crate) indicator: IndicatorHandle,
    pub(crate) measure: Option<MeasureHandle>,
}

#[derive(Default)]
pub struct IndicatorList {
    members: Vec<Member>,
    splitter: Option<Box<dyn PeriodSplitter>>,
}

impl IndicatorList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Period hooks fire only when a splitter is configured.
    pub fn with_splitter(splitter: Box<dyn PeriodSplitter>) -> Self {
        IndicatorList {
            members: Vec::new(),
            splitter: Some(splitter),
        }
    }

    pub fn set_splitter(&mut self, splitter: Box<dyn PeriodSplitter>) {
        self.splitter = Some(splitter);
    }

    /// Register an indicator and restore dependency order.
    ///
    /// Registering an indicator that is already a member is a no-op, except
    /// that registering it again as a measure tags it as one. A dependency
    /// cycle reachable from the new indicator is rejected and
    /// leaves the list unchanged.
    pub fn add(&mut self, indicator: IndicatorHandle) -> Result<(), TradecoreError> {
        self.insert(Member {
            indicator,
            measure: None,
        })
    }

    pub(crate) fn insert(&mut self, member: Member) -> Result<(), TradecoreError> {
        if let Some(existing) = self
            .members
            .iter_mut()
            .find(|m| same_indicator(&m.indicator, &member.indicator))
        {
            let title = member.indicator.borrow().title().to_string();
            if existing.measure.is_none() && member.measure.is_some() {
                log::debug!("indicator '{title}' now also receives order feedback");
                existing.measure = member.measure;
            } else {
                log::warn!("indicator '{title}' is already registered");
            }
            return Ok(());
        }

        self.members.push(member);
        if let Err(err) = self.reorder() {
            self.members.pop();
            return Err(err);
        }
        Ok(())
    }

    fn reorder(&mut self) -> Result<(), TradecoreError> {
        let mut known = HashMap::new();
        let counts = self
            .members
            .iter()
            .map(|m| dependency_count(&m.indicator, &mut Vec::new(), &mut known))
            .collect::<Result<Vec<_>, _>>()?;

        let mut keyed: Vec<(usize, Member)> =
            counts.into_iter().zip(self.members.drain(..)).collect();
        keyed.sort_by_key(|(count, _)| *count);
        self.members = keyed.into_iter().map(|(_, member)| member).collect();
        Ok(())
    }

    pub fn trade_received(&mut self, trade: &Trade) {
        let boundary = self.splitter.as_mut().map(|s| s.check_trade(trade));
        self.dispatch(boundary, |indicator| indicator.trade_received(trade));
    }

    pub fn quote_received(&mut self, quote: &Quote) {
        let boundary = self.splitter.as_mut().map(|s| s.check_quote(quote));
        self.dispatch(boundary, |indicator| indicator.quote_received(quote));
    }

    fn dispatch(
        &self,
        boundary: Option<PeriodSplitterResult>,
        mut deliver: impl FnMut(&mut dyn Indicator),
    ) {
        let boundary = boundary.filter(|b| b.action != PeriodAction::NoAction);

        if let Some(b) = boundary.filter(|b| b.action.is_before()) {
            self.fire_period_hooks(b.action, b.time);
        }
        for member in &self.members {
            deliver(&mut *member.indicator.borrow_mut());
        }
        if let Some(b) = boundary.filter(|b| !b.action.is_before()) {
            self.fire_period_hooks(b.action, b.time);
        }
    }

    fn fire_period_hooks(&self, action: PeriodAction, time: DateTime<Utc>) {
        log::trace!("dispatching {action:?} to {} indicators", self.members.len());
        if action.ends_period() {
            for member in &self.members {
                let mut indicator = member.indicator.borrow_mut();
                indicator.end_of_period(time);
                indicator.state_mut().record_period();
            }
        }
        if action.starts_period() {
            for member in &self.members {
                member.indicator.borrow_mut().beginning_of_period(time);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = &IndicatorHandle> {
        self.members.iter().map(|m| &m.indicator)
    }

    pub fn titles(&self) -> Vec<String> {
        self.iter().map(|h| h.borrow().title().to_string()).collect()
    }

    pub(crate) fn measures(&self) -> impl Iterator<Item = &MeasureHandle> {
        self.members.iter().filter_map(|m| m.measure.as_ref())
    }
}

fn identity(indicator: &IndicatorHandle) -> *const () {
    Rc::as_ptr(indicator) as *const ()
}

/// Transitive dependency count. `known` holds finished counts so shared
/// dependencies are walked once; `path` holds the current chain for cycle
/// detection.
fn dependency_count(
    indicator: &IndicatorHandle,
    path: &mut Vec<IndicatorHandle>,
    known: &mut HashMap<*const (), usize>,
) -> Result<usize, TradecoreError> {
    if let Some(&count) = known.get(&identity(indicator)) {
        return Ok(count);
    }
    if path.iter().any(|p| same_indicator(p, indicator)) {
        return Err(TradecoreError::DependencyCycle {
            indicator: indicator.borrow().title().to_string(),
        });
    }
    path.push(indicator.clone());

    let current = indicator.borrow();
    let dependencies = current.state().dependencies();
    let mut total = dependencies.len();
    for dependency in dependencies {
        total = total.saturating_add(dependency_count(dependency, path, known)?);
    }

    path.pop();
    known.insert(identity(indicator), total);
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contract::Contract;
    use crate::domain::indicator::external::ExternalValue;
    use crate::domain::indicator::period_stats::PeriodChange;
    use crate::domain::indicator::period_stats::PeriodOpen;
    use crate::domain::indicator::price::LastPrice;
    use crate::domain::indicator::{shared, IndicatorCore, IndicatorState};
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Records every hook call into a shared log.
    struct Recorder {
        core: IndicatorCore<i64>,
        log: Log,
    }

    impl Recorder {
        fn new(title: &str, log: &Log) -> Self {
            Recorder {
                core: IndicatorCore::new(title, "").collecting_periodic(true),
                log: log.clone(),
            }
        }

        fn note(&self, what: &str) {
            self.log
                .borrow_mut()
                .push(format!("{}:{}", self.core.descriptor().title, what));
        }
    }

    impl Indicator for Recorder {
        fn state(&self) -> &dyn IndicatorState {
            &self.core
        }

        fn state_mut(&mut self) -> &mut dyn IndicatorState {
            &mut self.core
        }

        fn trade_received(&mut self, _trade: &Trade) {
            self.note("trade");
        }

        fn quote_received(&mut self, _quote: &Quote) {
            self.note("quote");
        }

        fn beginning_of_period(&mut self, _time: DateTime<Utc>) {
            self.note("begin");
        }

        fn end_of_period(&mut self, _time: DateTime<Utc>) {
            self.note("end");
        }
    }

    /// Replays a fixed script of actions.
    struct ScriptedSplitter {
        actions: Vec<PeriodAction>,
    }

    impl ScriptedSplitter {
        fn next(&mut self) -> PeriodSplitterResult {
            let action = if self.actions.is_empty() {
                PeriodAction::NoAction
            } else {
                self.actions.remove(0)
            };
            PeriodSplitterResult::new(action, t(0))
        }
    }

    impl PeriodSplitter for ScriptedSplitter {
        fn check_trade(&mut self, _trade: &Trade) -> PeriodSplitterResult {
            self.next()
        }

        fn check_quote(&mut self, _quote: &Quote) -> PeriodSplitterResult {
            self.next()
        }
    }

    fn t(ms: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap() + Duration::milliseconds(ms)
    }

    fn trade(ms: i64, price: i64) -> Trade {
        Trade {
            contract: Contract::new("BHP", "ASX", "AUD"),
            time: t(ms),
            price: Decimal::from(price),
            size: 100,
        }
    }

    fn quote(ms: i64) -> Quote {
        Quote {
            contract: Contract::new("BHP", "ASX", "AUD"),
            time: t(ms),
            bid: Decimal::from(44),
            bid_size: 100,
            ask: Decimal::from(46),
            ask_size: 100,
        }
    }

    fn named(title: &str) -> Rc<RefCell<ExternalValue<i64>>> {
        shared(ExternalValue::named(title))
    }

    fn depending_on(title: &str, deps: &[IndicatorHandle]) -> Rc<RefCell<ExternalValue<i64>>> {
        let mut core = IndicatorCore::new(title, "");
        for dep in deps {
            core.add_dependency(dep.clone());
        }
        shared(ExternalValue::new(core))
    }

    fn scripted(actions: &[PeriodAction], log: &Log) -> IndicatorList {
        let mut list = IndicatorList::with_splitter(Box::new(ScriptedSplitter {
            actions: actions.to_vec(),
        }));
        list.add(shared(Recorder::new("a", log))).unwrap();
        list.add(shared(Recorder::new("b", log))).unwrap();
        list
    }

    fn entries(log: &Log) -> Vec<String> {
        log.borrow().clone()
    }

    #[test]
    fn dependency_precedes_dependent_for_any_insertion_order() {
        let a = named("A");
        let c = named("C");
        let b = depending_on("B", &[c.clone() as IndicatorHandle]);

        let orders: [[IndicatorHandle; 3]; 3] = [
            [a.clone(), b.clone(), c.clone()],
            [b.clone(), a.clone(), c.clone()],
            [b.clone(), c.clone(), a.clone()],
        ];
        for order in orders {
            let mut list = IndicatorList::new();
            for handle in order {
                list.add(handle).unwrap();
            }
            let titles = list.titles();
            let pos = |t: &str| titles.iter().position(|x| x == t).unwrap();
            assert!(pos("C") < pos("B"), "order was {titles:?}");
        }
    }

    #[test]
    fn ties_keep_insertion_order() {
        let a = named("A");
        let c = named("C");
        let b = depending_on("B", &[c.clone() as IndicatorHandle]);

        let mut list = IndicatorList::new();
        list.add(a).unwrap();
        list.add(b).unwrap();
        list.add(c).unwrap();
        assert_eq!(list.titles(), vec!["A", "C", "B"]);
    }

    #[test]
    fn transitive_counts_order_chains() {
        let base = named("base");
        let mid = depending_on("mid", &[base.clone() as IndicatorHandle]);
        let top = depending_on("top", &[mid.clone() as IndicatorHandle]);

        let mut list = IndicatorList::new();
        list.add(top).unwrap();
        list.add(mid).unwrap();
        list.add(base).unwrap();
        assert_eq!(list.titles(), vec!["base", "mid", "top"]);
    }

    #[test]
    fn duplicate_registration_is_ignored() {
        let a = named("A");
        let mut list = IndicatorList::new();
        list.add(a.clone()).unwrap();
        list.add(a).unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn layered_shared_dependencies_order_bottom_up() {
        // Each node depends on both nodes of the layer below it.
        let mut layers: Vec<[Rc<RefCell<ExternalValue<i64>>>; 2]> = vec![[named("0a"), named("0b")]];
        for i in 1..40 {
            let below: Vec<IndicatorHandle> =
                layers[i - 1].iter().map(|h| h.clone() as IndicatorHandle).collect();
            layers.push([
                depending_on(&format!("{i}a"), &below),
                depending_on(&format!("{i}b"), &below),
            ]);
        }

        let mut list = IndicatorList::new();
        for layer in layers.iter().rev() {
            for handle in layer {
                list.add(handle.clone()).unwrap();
            }
        }

        let titles = list.titles();
        assert_eq!(titles.len(), 80);
        assert_eq!(titles[..2], ["0a", "0b"]);
        assert_eq!(titles[78..], ["39a", "39b"]);
        let pos = |t: &str| titles.iter().position(|x| x == t).unwrap();
        for i in 1..40 {
            assert!(pos(&format!("{}b", i - 1)) < pos(&format!("{i}a")));
        }
    }

    #[test]
    fn dependency_cycle_rejected() {
        let x = named("X");
        let y = depending_on("Y", &[x.clone() as IndicatorHandle]);
        x.borrow_mut().core_mut().add_dependency(y.clone());

        let mut list = IndicatorList::new();
        let err = list.add(y).unwrap_err();
        assert!(matches!(err, TradecoreError::DependencyCycle { .. }));
        assert!(list.is_empty());
    }

    #[test]
    fn dependent_sees_value_updated_in_same_dispatch() {
        let last = shared(LastPrice::new(false));
        let open = shared(PeriodOpen::new(false));
        let change = shared(PeriodChange::new(last.clone(), open.clone(), false));

        let mut list = IndicatorList::new();
        list.add(change.clone()).unwrap();
        list.add(last.clone()).unwrap();
        list.add(open.clone()).unwrap();
        assert_eq!(list.titles().last().map(String::as_str), Some("Period change"));

        list.trade_received(&trade(0, 100));
        assert_eq!(change.borrow().core().value().unwrap(), Decimal::ZERO);

        list.trade_received(&trade(10, 104));
        assert_eq!(last.borrow().core().value().unwrap(), Decimal::from(104));
        assert_eq!(change.borrow().core().value().unwrap(), Decimal::from(4));
    }

    #[test]
    fn no_splitter_means_no_period_hooks() {
        let log: Log = Rc::default();
        let mut list = IndicatorList::new();
        list.add(shared(Recorder::new("a", &log))).unwrap();
        list.trade_received(&trade(0, 1));
        list.quote_received(&quote(1));
        assert_eq!(entries(&log), vec!["a:trade", "a:quote"]);
    }

    #[test]
    fn start_before_fires_before_event() {
        let log: Log = Rc::default();
        let mut list = scripted(&[PeriodAction::StartBefore], &log);
        list.trade_received(&trade(0, 1));
        assert_eq!(entries(&log), vec!["a:begin", "b:begin", "a:trade", "b:trade"]);
    }

    #[test]
    fn end_before_fires_before_event() {
        let log: Log = Rc::default();
        let mut list = scripted(&[PeriodAction::EndBefore], &log);
        list.quote_received(&quote(0));
        assert_eq!(entries(&log), vec!["a:end", "b:end", "a:quote", "b:quote"]);
    }

    #[test]
    fn restart_before_ends_then_begins() {
        let log: Log = Rc::default();
        let mut list = scripted(&[PeriodAction::RestartBefore], &log);
        list.trade_received(&trade(0, 1));
        assert_eq!(
            entries(&log),
            vec!["a:end", "b:end", "a:begin", "b:begin", "a:trade", "b:trade"]
        );
    }

    #[test]
    fn after_actions_fire_once_event_is_delivered() {
        let log: Log = Rc::default();
        let mut list = scripted(
            &[
                PeriodAction::StartAfter,
                PeriodAction::EndAfter,
                PeriodAction::RestartAfter,
            ],
            &log,
        );
        list.trade_received(&trade(0, 1));
        assert_eq!(entries(&log), vec!["a:trade", "b:trade", "a:begin", "b:begin"]);

        log.borrow_mut().clear();
        list.trade_received(&trade(1, 1));
        assert_eq!(entries(&log), vec!["a:trade", "b:trade", "a:end", "b:end"]);

        log.borrow_mut().clear();
        list.quote_received(&quote(2));
        assert_eq!(
            entries(&log),
            vec!["a:quote", "b:quote", "a:end", "b:end", "a:begin", "b:begin"]
        );
    }

    #[test]
    fn no_action_fires_nothing() {
        let log: Log = Rc::default();
        let mut list = scripted(&[PeriodAction::NoAction], &log);
        list.trade_received(&trade(0, 1));
        assert_eq!(entries(&log), vec!["a:trade", "b:trade"]);
    }

    #[test]
    fn period_end_records_history() {
        let log: Log = Rc::default();
        let recorder = shared(Recorder::new("a", &log));
        let mut list = IndicatorList::with_splitter(Box::new(ScriptedSplitter {
            actions: vec![PeriodAction::EndBefore, PeriodAction::RestartBefore],
        }));
        list.add(recorder.clone()).unwrap();

        list.trade_received(&trade(0, 1));
        recorder.borrow_mut().core.set_value(5);
        list.trade_received(&trade(1, 1));

        let history = recorder.borrow().core.periodic_data().to_vec();
        assert_eq!(history.len(), 2);
        assert!(!history[0].is_set);
        assert_eq!(history[1].value, Some(5));
        assert!(history[1].is_set);
    }
}
