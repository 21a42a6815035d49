//! Audio sources

use crate::ToDuration;

/// A mono audio source
pub trait Source {
    /// Get the sample rate
    fn sample_rate(&self) -> f64;
    /// Get the next sample
    ///
    /// Returning [`None`] indicates the source has no samples left
    fn next(&mut self) -> Option<f64>;
    /// End the source after some duration
    fn take(self, dur: impl ToDuration) -> Take<Self>
    where
        Self: Sized,
    {
        Take {
            source: self,
            duration: dur.to_duration().as_secs_f64(),
            elapsed: 0,
        }
    }
    /// Amplify the source by some multiplier
    fn amplify(self, amp: f64) -> Amplify<Self>
    where
        Self: Sized,
    {
        Amplify { source: self, amp }
    }
}

/// Source returned from [`Source::take`]
#[derive(Debug, Clone, Copy)]
pub struct Take<S> {
    source: S,
    duration: f64,
    elapsed: u64,
}

impl<S> Source for Take<S>
where
    S: Source,
{
    fn sample_rate(&self) -> f64 {
        self.source.sample_rate()
    }
    fn next(&mut self) -> Option<f64> {
        let frames = (self.duration * self.sample_rate()).round() as u64;
        if self.elapsed >= frames {
            return None;
        }
        let sample = self.source.next()?;
        self.elapsed += 1;
        Some(sample)
    }
}

/// Source returned from [`Source::amplify`]
#[derive(Debug, Clone, Copy)]
pub struct Amplify<S> {
    source: S,
    amp: f64,
}

impl<S> Source for Amplify<S>
where
    S: Source,
{
    fn sample_rate(&self) -> f64 {
        self.source.sample_rate()
    }
    fn next(&mut self) -> Option<f64> {
        self.source.next().map(|s| s * self.amp)
    }
}
