//! Test fixtures: a bare counting [`Model`] and a builder for deterministic
//! event sequences to schedule against it

use desim_core::{callback, Model, Priority, SharedCallback, SimResult, Simulator, TimePoint};
use std::cell::RefCell;
use std::rc::Rc;

/// A [`Model`] that does nothing but track time and step count.
///
/// Exists so a test can drive a `Simulator` without writing a domain model
/// of its own — most engine-level tests care only about when and how often
/// events fire, not about what a "real" model would do in response.
#[derive(Debug, Clone, Copy)]
pub struct CountingModel<T: TimePoint> {
    time: T,
    steps: u64,
}

impl<T: TimePoint> CountingModel<T> {
    pub fn new() -> Self {
        Self {
            time: T::ZERO,
            steps: 0,
        }
    }
}

impl<T: TimePoint> Default for CountingModel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimePoint> Model for CountingModel<T> {
    type Time = T;

    fn time(&self) -> T {
        self.time
    }

    fn set_time(&mut self, time: T) {
        self.time = time;
    }

    fn steps(&self) -> u64 {
        self.steps
    }

    fn step(&mut self) {
        self.steps += 1;
    }
}

/// A counter that increments each time its paired callback fires, plus the
/// callback itself. Callers must hold onto the callback for as long as the
/// scheduled event should remain live — the event list only holds a weak
/// reference to it.
pub struct CountingCallback {
    pub count: Rc<RefCell<u32>>,
    pub callback: SharedCallback,
}

impl CountingCallback {
    pub fn new() -> Self {
        let count = Rc::new(RefCell::new(0u32));
        let counted = count.clone();
        let callback = callback(move || *counted.borrow_mut() += 1);
        Self { count, callback }
    }

    pub fn calls(&self) -> u32 {
        *self.count.borrow()
    }
}

impl Default for CountingCallback {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a deterministic sequence of relative-delay events to schedule
/// against a real-valued-time `Simulator`, one [`CountingCallback`] per
/// entry so a test can assert exactly how many times each fired.
#[derive(Clone, Default)]
pub struct EventSequenceBuilder {
    specs: Vec<(f64, Priority)>,
}

impl EventSequenceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event firing `delay` after whatever time it is scheduled at.
    pub fn then_after(mut self, delay: f64, priority: Priority) -> Self {
        self.specs.push((delay, priority));
        self
    }

    /// Schedule every entry onto `sim` via `schedule_event_relative`, in
    /// order, returning one [`CountingCallback`] per entry. The caller must
    /// keep the returned `Vec` alive for as long as the events should remain
    /// schedulable.
    pub fn schedule_onto<M: Model<Time = f64>>(
        self,
        sim: &mut Simulator<f64, M>,
    ) -> SimResult<Vec<CountingCallback>> {
        let mut counters = Vec::with_capacity(self.specs.len());
        for (delay, priority) in self.specs {
            let counting = CountingCallback::new();
            sim.schedule_event_relative(delay, priority, &counting.callback)?;
            counters.push(counting);
        }
        Ok(counters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell as StdRefCell;
    use std::rc::Rc as StdRc;

    #[test]
    fn counting_model_tracks_steps_independent_of_time() {
        let mut model = CountingModel::<i64>::new();
        model.step();
        model.step();
        model.set_time(10);
        assert_eq!(model.steps(), 2);
        assert_eq!(model.time(), 10);
    }

    #[test]
    fn event_sequence_builder_schedules_and_fires_in_order() {
        let model = StdRc::new(StdRefCell::new(CountingModel::<f64>::new()));
        let mut sim: Simulator<f64, CountingModel<f64>> = Simulator::new();
        sim.setup(model.clone()).unwrap();

        let counters = EventSequenceBuilder::new()
            .then_after(1.0, Priority::Default)
            .then_after(2.0, Priority::Default)
            .schedule_onto(&mut sim)
            .unwrap();

        sim.run_for(3.0).unwrap();
        assert_eq!(counters[0].calls(), 1);
        assert_eq!(counters[1].calls(), 1);
    }

    #[test]
    fn abm_heartbeat_is_observable_from_outside_the_core_crate() {
        let model = StdRc::new(StdRefCell::new(CountingModel::<i64>::new()));
        let mut sim = desim_core::ABMSimulator::new();
        sim.setup(model).unwrap();

        let peeked = sim.peek_ahead(1).unwrap();
        assert_eq!(peeked.len(), 1);
        assert_eq!(peeked[0].event_type(), desim_core::EventType::ModelStep);
        assert!(sim.contains(&peeked[0]));
    }
}
