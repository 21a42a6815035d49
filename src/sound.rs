use serde::{Deserialize, Serialize};

use crate::{
    AudioContext, AudioNode, Error, GainNode, OscillatorNode, OscillatorType, Result,
};

/// The amplitude envelope applied to every [`Sound`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Envelope {
    /// The time from the start of the note until it reaches its peak
    pub attack: f64,
    /// The peak gain
    pub peak: f64,
    /// The time from the start of the note until it is stopped
    pub release: f64,
    /// The gain the note decays to before it is stopped
    ///
    /// This must be non-zero.
    pub floor: f64,
}

impl Default for Envelope {
    fn default() -> Self {
        Envelope {
            attack: 0.01,
            peak: 1.0,
            release: 1.0,
            floor: 0.001,
        }
    }
}

impl Envelope {
    /// Create a new envelope
    pub fn new(attack: f64, peak: f64, release: f64, floor: f64) -> Self {
        Envelope {
            attack,
            peak,
            release,
            floor,
        }
    }
    /// Check that the envelope can be scheduled
    ///
    /// Times must be finite and non-negative with the attack ending no later than the
    /// release. Levels must be finite and positive.
    pub fn validate(&self) -> Result<()> {
        let Envelope {
            attack,
            peak,
            release,
            floor,
        } = *self;
        let problem = if !attack.is_finite() || attack < 0.0 {
            "attack must be finite and non-negative"
        } else if !release.is_finite() || release < 0.0 {
            "release must be finite and non-negative"
        } else if attack > release {
            "attack must not be longer than release"
        } else if !peak.is_finite() || peak <= 0.0 {
            "peak must be finite and positive"
        } else if !floor.is_finite() || floor <= 0.0 {
            "floor must be finite and positive"
        } else {
            return Ok(());
        };
        Err(Error::InvalidEnvelope(problem))
    }
}

/**
A single sine tone: one oscillator feeding one gain node

A sound is not reused between notes. Build a new one for each note.
*/
#[derive(Debug, Clone)]
pub struct Sound {
    context: AudioContext,
    envelope: Envelope,
    nodes: Option<(OscillatorNode, GainNode)>,
}

impl Sound {
    /// Create a sound with the default envelope
    pub fn new(context: &AudioContext) -> Self {
        Sound::with_envelope(context, Envelope::default())
    }
    /// Create a sound with the given envelope
    pub fn with_envelope(context: &AudioContext, envelope: Envelope) -> Self {
        Sound {
            context: context.clone(),
            envelope,
            nodes: None,
        }
    }
    /// Build a fresh oscillator -> gain -> destination graph
    ///
    /// Nodes from a previous call are left in the context but no longer
    /// controlled by this sound.
    pub fn setup(&mut self) -> Result<()> {
        let oscillator = self.context.create_oscillator();
        let gain = self.context.create_gain();
        oscillator.connect(&gain)?;
        gain.connect(&self.context.destination())?;
        oscillator.set_waveform(OscillatorType::Sine);
        self.nodes = Some((oscillator, gain));
        Ok(())
    }
    /// Play the given frequency starting at `start_time`
    ///
    /// Nothing is added to the context unless the whole note can be scheduled.
    pub fn play(&mut self, value: f64, start_time: f64) -> Result<()> {
        if !value.is_finite() || value <= 0.0 {
            return Err(Error::InvalidNote(value.to_string()));
        }
        if !start_time.is_finite() || start_time < 0.0 {
            return Err(Error::InvalidTime(start_time));
        }
        self.envelope.validate()?;
        self.setup()?;
        let (oscillator, gain) = self.nodes()?;
        oscillator.frequency().set_value(value);
        gain.gain().set_value_at_time(0.0, start_time)?;
        gain.gain()
            .linear_ramp_to_value_at_time(self.envelope.peak, start_time + self.envelope.attack)?;
        self.fade_out(start_time)?;
        oscillator.start(start_time)?;
        oscillator.stop(start_time + self.envelope.release)
    }
    /// Fade out and stop the note that began at `start_time`
    pub fn stop(&self, start_time: f64) -> Result<()> {
        let (oscillator, _) = self.nodes()?;
        self.fade_out(start_time)?;
        oscillator.stop(start_time + self.envelope.release)
    }
    fn fade_out(&self, start_time: f64) -> Result<()> {
        let (_, gain) = self.nodes()?;
        gain.gain().exponential_ramp_to_value_at_time(
            self.envelope.floor,
            start_time + self.envelope.release,
        )
    }
    fn nodes(&self) -> Result<(&OscillatorNode, &GainNode)> {
        let (oscillator, gain) = self.nodes.as_ref().ok_or(Error::NotSetUp)?;
        Ok((oscillator, gain))
    }
    /// Get the current oscillator, if [`Sound::setup`] has been called
    pub fn oscillator(&self) -> Option<&OscillatorNode> {
        self.nodes.as_ref().map(|(oscillator, _)| oscillator)
    }
    /// Get the current gain node, if [`Sound::setup`] has been called
    pub fn gain(&self) -> Option<&GainNode> {
        self.nodes.as_ref().map(|(_, gain)| gain)
    }
    /// Get the envelope
    pub fn envelope(&self) -> Envelope {
        self.envelope
    }
}
