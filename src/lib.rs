#![warn(missing_docs)]

/*!
This crate schedules note sequences as oscillator/gain envelopes on an audio context,
and plays them on the system output or renders them to WAV files.

```
use peptone::*;

let context = AudioContext::offline(44100.0);
let schedule = start_song(&context, &[440.0, 494.0]).unwrap();
assert_eq!(schedule.len(), 2);
let samples = context.render(schedule.end().unwrap());
assert!(samples.iter().any(|s| s.abs() > 0.5));
```
*/

mod config;
mod context;
mod error;
mod note;
#[cfg(feature = "output")]
mod output;
mod param;
pub mod protein;
mod sequencer;
mod sound;
pub mod source;
#[cfg(feature = "wav")]
#[cfg_attr(docsrs, doc(cfg(feature = "wav")))]
pub mod wav;
mod wave;

#[cfg(feature = "output")]
#[cfg_attr(docsrs, doc(cfg(feature = "output")))]
pub use output::*;
#[doc(inline)]
pub use source::Source;
use std::{fmt, sync::Arc, time::Duration};

use parking_lot::{Mutex, MutexGuard};
pub use {
    config::*, context::*, error::*, note::*, param::*, sequencer::*, sound::*, wave::*,
};

/// Linearly interpolate two numbers
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    (1.0 - t) * a + t * b
}

/// A trait for converting to a [`Duration`]
pub trait ToDuration {
    /// Convert to a duration
    fn to_duration(self) -> Duration;
}

/// Interprets a number as seconds
impl ToDuration for f32 {
    fn to_duration(self) -> Duration {
        Duration::from_secs_f32(self.max(0.0))
    }
}

/// Interprets a number as seconds
impl ToDuration for f64 {
    fn to_duration(self) -> Duration {
        Duration::from_secs_f64(self.max(0.0))
    }
}

/// Interprets a number as seconds
impl ToDuration for u64 {
    fn to_duration(self) -> Duration {
        Duration::from_secs(self)
    }
}

/// Interprets a number as seconds
impl ToDuration for Duration {
    fn to_duration(self) -> Duration {
        self
    }
}

/// A thread-safe, reference-counted, locked wrapper
///
/// Node state and automation timelines are shared this way between
/// the handles used for scheduling and the thread that renders them.
pub(crate) struct Shared<T>(Arc<Mutex<T>>);

impl<T> Shared<T> {
    pub fn new(val: T) -> Self {
        Shared(Arc::new(Mutex::new(val)))
    }
    pub fn lock(&self) -> MutexGuard<T> {
        self.0.lock()
    }
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Shared(Arc::clone(&self.0))
    }
}

impl<T> fmt::Debug for Shared<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.lock().fmt(f)
    }
}
