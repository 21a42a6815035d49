//! Wave generation

use std::f64::consts::TAU;

/// Defines a waveform
pub trait Waveform {
    /// Get the amplitude of a 1 Hz wave at the given time
    ///
    /// This should be in the range [-1.0, 1.0]
    fn one_hz(&self, time: f64) -> f64;
}

/// A sine waveform
#[derive(Debug, Clone, Copy, Default)]
pub struct Sine;
impl Waveform for Sine {
    fn one_hz(&self, time: f64) -> f64 {
        (time * TAU).sin()
    }
}

/// A square waveform
#[derive(Debug, Clone, Copy, Default)]
pub struct Square;
impl Waveform for Square {
    fn one_hz(&self, time: f64) -> f64 {
        if time.rem_euclid(1.0) < 0.5 {
            1.0
        } else {
            -1.0
        }
    }
}

/// A saw waveform
#[derive(Debug, Clone, Copy, Default)]
pub struct Saw;
impl Waveform for Saw {
    fn one_hz(&self, time: f64) -> f64 {
        2.0 * (time - (time + 0.5).floor())
    }
}

/// A triangle waveform
#[derive(Debug, Clone, Copy, Default)]
pub struct Triangle;
impl Waveform for Triangle {
    fn one_hz(&self, time: f64) -> f64 {
        1.0 - 2.0 * Saw.one_hz(time).abs()
    }
}

/// The waveform an [`OscillatorNode`](crate::OscillatorNode) produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[allow(missing_docs)]
pub enum OscillatorType {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform for OscillatorType {
    fn one_hz(&self, time: f64) -> f64 {
        match self {
            OscillatorType::Sine => Sine.one_hz(time),
            OscillatorType::Square => Square.one_hz(time),
            OscillatorType::Sawtooth => Saw.one_hz(time),
            OscillatorType::Triangle => Triangle.one_hz(time),
        }
    }
}
