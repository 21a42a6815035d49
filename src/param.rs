use crate::{context::Clock, lerp, Error, Result, Shared};

/// How an automation event reaches its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Curve {
    /// Jump to the value at the event time
    Set,
    /// Ramp linearly from the previous event
    Linear,
    /// Ramp exponentially from the previous event
    Exponential,
}

/// A scheduled change to an [`AudioParam`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamEvent {
    /// The time at which the event's value is reached
    pub time: f64,
    /// The target value
    pub value: f64,
    /// The shape of the change
    pub curve: Curve,
    /// Where a ramp begins when no earlier event exists
    origin: (f64, f64),
}

#[derive(Debug, Clone)]
pub(crate) struct Timeline {
    value: f64,
    events: Vec<ParamEvent>,
}

impl Timeline {
    pub fn new(value: f64) -> Self {
        Timeline {
            value,
            events: Vec::new(),
        }
    }
    fn insert(&mut self, event: ParamEvent) {
        let index = self.events.partition_point(|e| e.time <= event.time);
        self.events.insert(index, event);
    }
    /// Evaluate the automation at the given time
    pub fn value_at(&self, time: f64) -> f64 {
        let mut held: Option<(f64, f64)> = None;
        for event in &self.events {
            let (start_time, start_value) = match (held, event.curve) {
                (Some(prev), _) => prev,
                (None, Curve::Set) => (event.time, self.value),
                (None, _) => event.origin,
            };
            if time < event.time {
                if time < start_time {
                    return held.map_or(self.value, |(_, value)| value);
                }
                let t = (time - start_time) / (event.time - start_time);
                return match event.curve {
                    Curve::Set => start_value,
                    Curve::Linear => lerp(start_value, event.value, t),
                    Curve::Exponential => {
                        if start_value == 0.0 || start_value.signum() != event.value.signum() {
                            start_value
                        } else {
                            start_value * (event.value / start_value).powf(t)
                        }
                    }
                };
            }
            held = Some((event.time, event.value));
        }
        held.map_or(self.value, |(_, value)| value)
    }
}

fn check_time(time: f64) -> Result<()> {
    if time.is_finite() && time >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidTime(time))
    }
}

/**
An automatable node parameter

Values are computed for every rendered frame from the parameter's intrinsic
value and its scheduled events.
*/
#[derive(Debug, Clone)]
pub struct AudioParam {
    timeline: Shared<Timeline>,
    clock: Clock,
}

impl AudioParam {
    pub(crate) fn new(timeline: Shared<Timeline>, clock: Clock) -> Self {
        AudioParam { timeline, clock }
    }
    /// Get the intrinsic value
    pub fn value(&self) -> f64 {
        self.timeline.lock().value
    }
    /// Set the intrinsic value
    ///
    /// This is the value used before any scheduled event takes effect.
    pub fn set_value(&self, value: f64) {
        self.timeline.lock().value = value;
    }
    /// Jump to `value` at `time`
    pub fn set_value_at_time(&self, value: f64, time: f64) -> Result<()> {
        self.schedule(value, time, Curve::Set)
    }
    /// Ramp linearly from the previous event to `value`, arriving at `time`
    pub fn linear_ramp_to_value_at_time(&self, value: f64, time: f64) -> Result<()> {
        self.schedule(value, time, Curve::Linear)
    }
    /// Ramp exponentially from the previous event to `value`, arriving at `time`
    ///
    /// `value` must not be zero.
    pub fn exponential_ramp_to_value_at_time(&self, value: f64, time: f64) -> Result<()> {
        if value == 0.0 || !value.is_finite() {
            return Err(Error::ExponentialRampToZero(value));
        }
        self.schedule(value, time, Curve::Exponential)
    }
    fn schedule(&self, value: f64, time: f64, curve: Curve) -> Result<()> {
        check_time(time)?;
        let mut timeline = self.timeline.lock();
        let origin = (self.clock.now(), timeline.value);
        timeline.insert(ParamEvent {
            time,
            value,
            curve,
            origin,
        });
        Ok(())
    }
    /// Get the scheduled events in time order
    pub fn events(&self) -> Vec<ParamEvent> {
        self.timeline.lock().events.clone()
    }
    /// Compute the parameter's value at the given time
    pub fn value_at(&self, time: f64) -> f64 {
        self.timeline.lock().value_at(time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(value: f64) -> AudioParam {
        AudioParam::new(Shared::new(Timeline::new(value)), Clock::new(100.0))
    }

    #[test]
    fn intrinsic_value_without_events() {
        let p = param(0.5);
        assert_eq!(p.value_at(0.0), 0.5);
        assert_eq!(p.value_at(10.0), 0.5);
    }

    #[test]
    fn set_value_holds_until_next_event() {
        let p = param(1.0);
        p.set_value_at_time(0.25, 1.0).unwrap();
        p.set_value_at_time(0.75, 2.0).unwrap();
        assert_eq!(p.value_at(0.5), 1.0);
        assert_eq!(p.value_at(1.0), 0.25);
        assert_eq!(p.value_at(1.9), 0.25);
        assert_eq!(p.value_at(2.5), 0.75);
    }

    #[test]
    fn linear_ramp_interpolates_from_previous_event() {
        let p = param(1.0);
        p.set_value_at_time(0.0, 1.0).unwrap();
        p.linear_ramp_to_value_at_time(1.0, 1.01).unwrap();
        assert_eq!(p.value_at(1.0), 0.0);
        assert!((p.value_at(1.005) - 0.5).abs() < 1e-9);
        assert_eq!(p.value_at(1.01), 1.0);
        assert_eq!(p.value_at(3.0), 1.0);
    }

    #[test]
    fn exponential_ramp_decays_geometrically() {
        let p = param(1.0);
        p.set_value_at_time(1.0, 0.0).unwrap();
        p.exponential_ramp_to_value_at_time(0.01, 2.0).unwrap();
        assert!((p.value_at(1.0) - 0.1).abs() < 1e-9);
        assert!((p.value_at(2.0) - 0.01).abs() < 1e-12);
    }

    #[test]
    fn exponential_ramp_from_zero_holds() {
        let p = param(1.0);
        p.set_value_at_time(0.0, 0.0).unwrap();
        p.exponential_ramp_to_value_at_time(1.0, 1.0).unwrap();
        assert_eq!(p.value_at(0.5), 0.0);
        assert_eq!(p.value_at(1.0), 1.0);
    }

    #[test]
    fn ramp_without_previous_event_starts_at_schedule_time() {
        let p = param(0.0);
        p.linear_ramp_to_value_at_time(1.0, 2.0).unwrap();
        assert!((p.value_at(1.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn events_at_same_time_keep_insertion_order() {
        let p = param(0.0);
        p.set_value_at_time(0.3, 1.0).unwrap();
        p.set_value_at_time(0.6, 1.0).unwrap();
        let values: Vec<f64> = p.events().iter().map(|e| e.value).collect();
        assert_eq!(values, [0.3, 0.6]);
        assert_eq!(p.value_at(1.0), 0.6);
    }

    #[test]
    fn rejects_bad_input() {
        let p = param(1.0);
        assert!(matches!(
            p.exponential_ramp_to_value_at_time(0.0, 1.0),
            Err(Error::ExponentialRampToZero(_))
        ));
        assert!(matches!(
            p.set_value_at_time(1.0, -1.0),
            Err(Error::InvalidTime(_))
        ));
        assert!(matches!(
            p.linear_ramp_to_value_at_time(1.0, f64::NAN),
            Err(Error::InvalidTime(_))
        ));
        assert!(p.events().is_empty());
    }
}
