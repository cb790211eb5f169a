//! The engine that drives a [`Model`] by popping and firing scheduled events
//!
//! [`Simulator`] is written once, generic over the time domain `T` and the
//! model it drives, and specialized twice: [`DEVSimulator`] fixes `T = f64`
//! for free-form real-valued time, and [`ABMSimulator`] wraps it with an
//! integer tick clock plus a self-perpetuating heartbeat event that calls
//! `Model::step` once per tick.

use crate::error::{SimError, SimResult};
use crate::event::{callback, EventType, Priority, SharedCallback, SimulationEvent};
use crate::list::EventList;
use crate::model::Model;
use crate::time::TimePoint;
use std::cell::RefCell;
use std::rc::Rc;

type PostExecuteHook<T, M> =
    Box<dyn FnMut(&SimulationEvent<T>, &Rc<RefCell<M>>, &mut EventList<T>)>;

/// Drives a [`Model`] of time domain `T` by repeatedly popping the earliest
/// due [`SimulationEvent`] and firing it.
///
/// `post_execute` is the one seam `ABMSimulator` needs and `DEVSimulator`
/// doesn't: a hook run after every fired event, given a chance to push a
/// successor event back onto the list. It is `None` for a plain
/// `Simulator`/`DEVSimulator`.
pub struct Simulator<T: TimePoint, M: Model<Time = T>> {
    event_list: EventList<T>,
    model: Option<Rc<RefCell<M>>>,
    post_execute: Option<PostExecuteHook<T, M>>,
    /// Local mirror of the clock, used only by the deprecated `time()`
    /// accessor when no model is attached (before `setup`, or after `reset`).
    /// Kept in lockstep with `model.time()` whenever a model is attached, so
    /// reading it is never stale.
    local_time: T,
    /// Real bound of the current run; defaults to `T::ZERO` and is realigned
    /// to the model's clock at `setup`.
    start_time: T,
    /// Real bound of the current run; defaults to `T::MAX` ("+infinity") and
    /// is narrowed to whatever `end` a caller last passed to `run_until`.
    end_time: T,
}

impl<T: TimePoint, M: Model<Time = T>> Default for Simulator<T, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimePoint, M: Model<Time = T>> Simulator<T, M> {
    pub fn new() -> Self {
        Self {
            event_list: EventList::new(),
            model: None,
            post_execute: None,
            local_time: T::ZERO,
            start_time: T::ZERO,
            end_time: T::MAX,
        }
    }

    /// Attach `model` to this simulator.
    ///
    /// The model's clock must read `T::ZERO` and the event list must be
    /// empty; both are preconditions a fresh simulator satisfies trivially,
    /// but a reused one (after `reset`) must satisfy them again.
    pub fn setup(&mut self, model: Rc<RefCell<M>>) -> SimResult<()> {
        if model.borrow().time() != T::ZERO {
            return Err(SimError::InvalidSetup(
                "model time must be zero before setup".to_string(),
            ));
        }
        if !self.event_list.is_empty() {
            return Err(SimError::InvalidSetup(
                "event list must be empty before setup".to_string(),
            ));
        }
        self.start_time = model.borrow().time();
        self.local_time = self.start_time;
        self.model = Some(model);
        Ok(())
    }

    /// Detach the model, discard every scheduled event, and reset the run
    /// bounds and local clock to their defaults.
    pub fn reset(&mut self) {
        self.event_list.clear();
        self.model = None;
        self.post_execute = None;
        self.local_time = T::ZERO;
        self.start_time = T::ZERO;
        self.end_time = T::MAX;
    }

    pub fn model(&self) -> Option<Rc<RefCell<M>>> {
        self.model.clone()
    }

    /// Number of physically queued events, canceled or not.
    pub fn pending_count(&self) -> usize {
        self.event_list.len()
    }

    /// True if `event` is still physically present in the event list,
    /// canceled or not.
    pub fn contains(&self, event: &SimulationEvent<T>) -> bool {
        self.event_list.contains(event)
    }

    /// Peek at the first `n` non-canceled events in firing order, without
    /// removing them from the list.
    pub fn peek_ahead(&mut self, n: usize) -> SimResult<Vec<SimulationEvent<T>>> {
        self.event_list.peek_ahead(n)
    }

    fn current_clock(&self) -> SimResult<T> {
        self.model
            .as_ref()
            .map(|m| m.borrow().time())
            .ok_or(SimError::NotConfigured)
    }

    /// The model's current clock reading, or the local clock if no model is
    /// attached. Never fails. Superseded by reading the model's own
    /// `Model::time` directly; kept for callers migrating off it.
    #[deprecated(note = "read the model's own clock via Model::time instead")]
    pub fn time(&self) -> T {
        self.model
            .as_ref()
            .map(|m| m.borrow().time())
            .unwrap_or(self.local_time)
    }

    fn schedule_raw(
        &mut self,
        event_type: EventType,
        time: T,
        priority: Priority,
        callback: std::rc::Weak<RefCell<dyn FnMut()>>,
    ) -> SimResult<SimulationEvent<T>> {
        let now = self.current_clock()?;
        if time < now {
            return Err(SimError::PastTimeError {
                requested: time.as_f64(),
                now: now.as_f64(),
            });
        }
        let event = SimulationEvent::from_weak(time, priority, event_type, callback);
        self.event_list.add_event(event.clone());
        Ok(event)
    }

    /// Schedule `callback` to fire at the model's current time.
    pub fn schedule_event_now(
        &mut self,
        priority: Priority,
        callback: &SharedCallback,
    ) -> SimResult<SimulationEvent<T>> {
        let now = self.current_clock()?;
        self.schedule_raw(EventType::Default, now, priority, Rc::downgrade(callback))
    }

    /// Schedule `callback` to fire at an absolute point on the clock. Errors
    /// if `time` is strictly before the model's current time.
    pub fn schedule_event_absolute(
        &mut self,
        time: T,
        priority: Priority,
        callback: &SharedCallback,
    ) -> SimResult<SimulationEvent<T>> {
        self.schedule_raw(EventType::Default, time, priority, Rc::downgrade(callback))
    }

    /// Schedule `callback` to fire `delay` after the model's current time.
    /// `delay` must not be negative.
    pub fn schedule_event_relative(
        &mut self,
        delay: T,
        priority: Priority,
        callback: &SharedCallback,
    ) -> SimResult<SimulationEvent<T>> {
        if delay < T::ZERO {
            return Err(SimError::InvalidArgument(
                "relative delay must not be negative".to_string(),
            ));
        }
        let now = self.current_clock()?;
        self.schedule_raw(EventType::Default, now + delay, priority, Rc::downgrade(callback))
    }

    /// Cancel a previously scheduled event. A no-op if it has already fired
    /// or was already canceled.
    pub fn cancel_event(&self, event: &SimulationEvent<T>) {
        event.cancel();
    }

    fn execute_one(&mut self) -> SimResult<()> {
        let model = self.model.clone().ok_or(SimError::NotConfigured)?;
        let event = self.event_list.pop_event()?;
        model.borrow_mut().set_time(event.time());
        self.local_time = event.time();
        event.execute();
        if let Some(hook) = &mut self.post_execute {
            hook(&event, &model, &mut self.event_list);
        }
        Ok(())
    }

    /// Pop and fire exactly one event. Errors if unconfigured or the queue
    /// has nothing left to fire.
    pub fn run_next_event(&mut self) -> SimResult<()> {
        if self.model.is_none() {
            return Err(SimError::NotConfigured);
        }
        self.execute_one()
    }

    /// Fire every due event up to and including `end`, then advance the
    /// model's clock to `end` regardless of whether anything fired.
    pub fn run_until(&mut self, end: T) -> SimResult<()> {
        if self.model.is_none() {
            return Err(SimError::NotConfigured);
        }
        self.end_time = end;
        loop {
            match self.event_list.peek_ahead(1) {
                Ok(events) if events[0].time() <= end => self.execute_one()?,
                Ok(_) => break,
                Err(SimError::EmptyQueue) => break,
                Err(e) => return Err(e),
            }
        }
        if let Some(model) = &self.model {
            model.borrow_mut().set_time(end);
        }
        self.local_time = end;
        Ok(())
    }

    /// Equivalent to `run_until(current_time + duration)`.
    pub fn run_for(&mut self, duration: T) -> SimResult<()> {
        let now = self.current_clock()?;
        self.run_until(now + duration)
    }

    /// The real bound the current run started from. `T::ZERO` before the
    /// first `setup`.
    pub fn start_time(&self) -> T {
        self.start_time
    }

    /// The real bound of the current run. `T::MAX` until a `run_until` call
    /// narrows it.
    pub fn end_time(&self) -> T {
        self.end_time
    }
}

/// A simulator over real-valued time, advanced purely by the events a caller
/// schedules — nothing self-perpetuating runs unless a callback reschedules
/// itself.
pub type DEVSimulator<M> = Simulator<f64, M>;

/// A simulator over an integer tick grid, whose `Model::step` is called once
/// per tick by a heartbeat event the simulator maintains on the model's
/// behalf.
///
/// The heartbeat is recognized on re-fire by weak-reference identity, not by
/// invoking it: after it fires, `post_execute` resolves its own weak
/// reference and compares it with `Rc::ptr_eq` against the strong callback
/// `ABMSimulator` is holding, and only then inserts the next tick's
/// heartbeat. A user event scheduled with `schedule_event_next_tick` fires
/// once and is never reinserted, because it is never the tracked callback.
pub struct ABMSimulator<M: Model<Time = i64> + 'static> {
    inner: Simulator<i64, M>,
    step_callback: Option<SharedCallback>,
}

impl<M: Model<Time = i64> + 'static> Default for ABMSimulator<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model<Time = i64> + 'static> ABMSimulator<M> {
    pub fn new() -> Self {
        Self {
            inner: Simulator::new(),
            step_callback: None,
        }
    }

    /// Attach `model`, then schedule the first heartbeat tick one step
    /// ahead of the model's current time.
    pub fn setup(&mut self, model: Rc<RefCell<M>>) -> SimResult<()> {
        self.inner.setup(model.clone())?;

        let step_model = model.clone();
        let step_cb: SharedCallback = callback(move || {
            step_model.borrow_mut().step();
        });

        let tracked = step_cb.clone();
        self.inner.post_execute = Some(Box::new(move |event, model, event_list| {
            if event.event_type() != EventType::ModelStep {
                return;
            }
            let Some(weak) = event.callback_weak() else {
                return;
            };
            let Some(strong) = weak.upgrade() else {
                return;
            };
            if !Rc::ptr_eq(&strong, &tracked) {
                return;
            }
            let next_time = model.borrow().time() + 1;
            let next = SimulationEvent::from_weak(
                next_time,
                Priority::Default,
                EventType::ModelStep,
                Rc::downgrade(&tracked),
            );
            event_list.add_event(next);
        }));

        let bootstrap_time = model.borrow().time() + 1;
        self.inner.schedule_raw(
            EventType::ModelStep,
            bootstrap_time,
            Priority::Default,
            Rc::downgrade(&step_cb),
        )?;
        self.step_callback = Some(step_cb);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.inner.reset();
        self.step_callback = None;
    }

    pub fn model(&self) -> Option<Rc<RefCell<M>>> {
        self.inner.model()
    }

    pub fn pending_count(&self) -> usize {
        self.inner.pending_count()
    }

    /// True if `event` is still physically present in the event list,
    /// canceled or not.
    pub fn contains(&self, event: &SimulationEvent<i64>) -> bool {
        self.inner.contains(event)
    }

    /// Peek at the first `n` non-canceled events in firing order, without
    /// removing them from the list.
    pub fn peek_ahead(&mut self, n: usize) -> SimResult<Vec<SimulationEvent<i64>>> {
        self.inner.peek_ahead(n)
    }

    /// The model's current clock reading, or the local clock if no model is
    /// attached. Never fails. Superseded by reading the model's own
    /// `Model::time` directly; kept for callers migrating off it.
    #[deprecated(note = "read the model's own clock via Model::time instead")]
    #[allow(deprecated)]
    pub fn time(&self) -> i64 {
        self.inner.time()
    }

    /// The real bound the current run started from. `0` before the first
    /// `setup`.
    pub fn start_time(&self) -> i64 {
        self.inner.start_time()
    }

    /// The real bound of the current run. `i64::MAX` until a `run_until`
    /// call narrows it.
    pub fn end_time(&self) -> i64 {
        self.inner.end_time()
    }

    /// Schedule `callback` to fire exactly one tick from now. Unlike the
    /// heartbeat, this event is never reinserted after it fires.
    pub fn schedule_event_next_tick(
        &mut self,
        priority: Priority,
        callback: &SharedCallback,
    ) -> SimResult<SimulationEvent<i64>> {
        let now = self.inner.current_clock()?;
        self.inner
            .schedule_raw(EventType::Default, now + 1, priority, Rc::downgrade(callback))
    }

    pub fn schedule_event_now(
        &mut self,
        priority: Priority,
        callback: &SharedCallback,
    ) -> SimResult<SimulationEvent<i64>> {
        self.inner.schedule_event_now(priority, callback)
    }

    pub fn schedule_event_absolute(
        &mut self,
        time: i64,
        priority: Priority,
        callback: &SharedCallback,
    ) -> SimResult<SimulationEvent<i64>> {
        self.inner.schedule_event_absolute(time, priority, callback)
    }

    pub fn cancel_event(&self, event: &SimulationEvent<i64>) {
        self.inner.cancel_event(event)
    }

    pub fn run_next_event(&mut self) -> SimResult<()> {
        self.inner.run_next_event()
    }

    pub fn run_until(&mut self, end: i64) -> SimResult<()> {
        self.inner.run_until(end)
    }

    pub fn run_for(&mut self, duration: i64) -> SimResult<()> {
        self.inner.run_for(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DevModel {
        time: f64,
    }

    impl Model for DevModel {
        type Time = f64;
        fn time(&self) -> f64 {
            self.time
        }
        fn set_time(&mut self, time: f64) {
            self.time = time;
        }
        fn steps(&self) -> u64 {
            0
        }
        fn step(&mut self) {}
    }

    struct TickModel {
        time: i64,
        steps: u64,
    }

    impl Model for TickModel {
        type Time = i64;
        fn time(&self) -> i64 {
            self.time
        }
        fn set_time(&mut self, time: i64) {
            self.time = time;
        }
        fn steps(&self) -> u64 {
            self.steps
        }
        fn step(&mut self) {
            self.steps += 1;
        }
    }

    #[test]
    fn devs_basic_scenario() {
        let model = Rc::new(RefCell::new(DevModel { time: 0.0 }));
        let mut sim: DEVSimulator<DevModel> = Simulator::new();
        sim.setup(model.clone()).unwrap();

        let fn1_calls = Rc::new(RefCell::new(0));
        let fn1_calls2 = fn1_calls.clone();
        let fn1 = callback(move || *fn1_calls2.borrow_mut() += 1);

        let fn2_calls = Rc::new(RefCell::new(0));
        let fn2_calls2 = fn2_calls.clone();
        let fn2 = callback(move || *fn2_calls2.borrow_mut() += 1);

        let fn3_calls = Rc::new(RefCell::new(0));
        let fn3_calls2 = fn3_calls.clone();
        let fn3 = callback(move || *fn3_calls2.borrow_mut() += 1);

        sim.schedule_event_now(Priority::Default, &fn1).unwrap();
        sim.schedule_event_absolute(1.0, Priority::Default, &fn2)
            .unwrap();
        sim.schedule_event_relative(0.5, Priority::Default, &fn3)
            .unwrap();

        sim.run_for(0.8).unwrap();
        assert_eq!(*fn1_calls.borrow(), 1);
        assert_eq!(*fn3_calls.borrow(), 1);
        assert_eq!(*fn2_calls.borrow(), 0);
        assert_eq!(model.borrow().time(), 0.8);

        sim.run_for(0.2).unwrap();
        assert_eq!(*fn2_calls.borrow(), 1);
        assert_eq!(model.borrow().time(), 1.0);

        sim.run_for(0.2).unwrap();
        assert_eq!(model.borrow().time(), 1.2);
    }

    #[test]
    fn devs_rejects_scheduling_before_current_time() {
        let model = Rc::new(RefCell::new(DevModel { time: 0.0 }));
        let mut sim: DEVSimulator<DevModel> = Simulator::new();
        sim.setup(model).unwrap();

        let fn2 = callback(|| {});
        sim.schedule_event_absolute(1.0, Priority::Default, &fn2)
            .unwrap();
        sim.run_for(1.0).unwrap();

        let err = sim
            .schedule_event_absolute(0.5, Priority::Default, &fn2)
            .unwrap_err();
        assert!(matches!(err, SimError::PastTimeError { .. }));
    }

    #[test]
    fn run_next_event_on_empty_queue_errors() {
        let model = Rc::new(RefCell::new(DevModel { time: 0.0 }));
        let mut sim: DEVSimulator<DevModel> = Simulator::new();
        sim.setup(model).unwrap();
        assert!(matches!(sim.run_next_event(), Err(SimError::EmptyQueue)));
    }

    #[test]
    fn setup_rejects_nonzero_model_time() {
        let model = Rc::new(RefCell::new(DevModel { time: 5.0 }));
        let mut sim: DEVSimulator<DevModel> = Simulator::new();
        assert!(matches!(sim.setup(model), Err(SimError::InvalidSetup(_))));
    }

    #[test]
    fn setup_rejects_nonempty_event_list() {
        let first = Rc::new(RefCell::new(DevModel { time: 0.0 }));
        let mut sim: DEVSimulator<DevModel> = Simulator::new();
        sim.setup(first).unwrap();
        let fn1 = callback(|| {});
        sim.schedule_event_now(Priority::Default, &fn1).unwrap();

        let second = Rc::new(RefCell::new(DevModel { time: 0.0 }));
        assert!(matches!(
            sim.setup(second),
            Err(SimError::InvalidSetup(_))
        ));
    }

    #[test]
    fn unconfigured_simulator_refuses_to_run() {
        let mut sim: DEVSimulator<DevModel> = Simulator::new();
        assert!(matches!(sim.run_next_event(), Err(SimError::NotConfigured)));
    }

    #[test]
    fn abm_run_for_advances_steps_and_time() {
        let model = Rc::new(RefCell::new(TickModel { time: 0, steps: 0 }));
        let mut sim = ABMSimulator::new();
        sim.setup(model.clone()).unwrap();

        sim.run_for(3).unwrap();
        assert_eq!(model.borrow().steps(), 3);
        assert_eq!(model.borrow().time(), 3);
    }

    #[test]
    fn abm_run_until_ten_ticks() {
        let model = Rc::new(RefCell::new(TickModel { time: 0, steps: 0 }));
        let mut sim = ABMSimulator::new();
        sim.setup(model.clone()).unwrap();

        sim.run_until(10).unwrap();
        assert_eq!(model.borrow().steps(), 10);
        assert_eq!(model.borrow().time(), 10);
    }

    #[test]
    fn abm_bootstrap_event_is_tagged_model_step() {
        let model = Rc::new(RefCell::new(TickModel { time: 0, steps: 0 }));
        let mut sim = ABMSimulator::new();
        sim.setup(model).unwrap();

        let peeked = sim.peek_ahead(1).unwrap();
        assert_eq!(peeked[0].event_type(), EventType::ModelStep);
        assert!(sim.contains(&peeked[0]));
    }

    #[test]
    #[allow(deprecated)]
    fn deprecated_time_accessor_never_errors() {
        let model = Rc::new(RefCell::new(DevModel { time: 0.0 }));
        let mut sim: DEVSimulator<DevModel> = Simulator::new();

        assert_eq!(sim.time(), 0.0);

        sim.setup(model.clone()).unwrap();
        sim.run_for(2.5).unwrap();

        assert_eq!(sim.time(), 2.5);
        assert_eq!(sim.time(), model.borrow().time());
    }

    #[test]
    fn abm_user_event_fires_once_and_is_never_rescheduled() {
        let model = Rc::new(RefCell::new(TickModel { time: 0, steps: 0 }));
        let mut sim = ABMSimulator::new();
        sim.setup(model.clone()).unwrap();

        let calls = Rc::new(RefCell::new(0));
        let calls2 = calls.clone();
        let user_fn = callback(move || *calls2.borrow_mut() += 1);
        sim.schedule_event_next_tick(Priority::Default, &user_fn)
            .unwrap();

        sim.run_for(5).unwrap();
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(model.borrow().steps(), 5);
    }
}
