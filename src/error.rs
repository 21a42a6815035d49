use std::io;

/// An error produced while building, scheduling, or rendering a song
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An exponential ramp cannot reach or pass through zero
    #[error("exponential ramp target must be non-zero, got {0}")]
    ExponentialRampToZero(f64),
    /// Automation and playback times must be finite and non-negative
    #[error("invalid time {0}")]
    InvalidTime(f64),
    /// An oscillator can only be started once
    #[error("oscillator has already been started")]
    AlreadyStarted,
    /// An oscillator must be started before it is stopped
    #[error("oscillator has not been started")]
    NotStarted,
    /// A [`Sound`](crate::Sound) was used before its nodes were created
    #[error("sound has no nodes, call setup first")]
    NotSetUp,
    /// The connection is not allowed between these nodes
    #[error("cannot connect {from} to {to}")]
    InvalidConnection {
        /// The kind of the source node
        from: &'static str,
        /// The kind of the target node
        to: &'static str,
    },
    /// A note list could not be parsed
    #[error("invalid note list: {0}")]
    Notes(#[from] serde_json::Error),
    /// A note name or frequency is not usable
    #[error("invalid note {0:?}")]
    InvalidNote(String),
    /// An envelope's times or levels are not usable
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(&'static str),
    /// The time between notes must be finite and positive
    #[error("note spacing must be positive, got {0}")]
    InvalidSpacing(f64),
    /// A FASTA record contained no residues
    #[error("FASTA input has no sequence")]
    EmptyFasta,
    /// An IO error
    #[error("{0}")]
    Io(#[from] io::Error),
    /// An error reading or writing a WAV file
    #[cfg(feature = "wav")]
    #[error("{0}")]
    Wav(#[from] hound::Error),
    /// An error building the audio stream
    #[cfg(feature = "output")]
    #[error("{0}")]
    Stream(#[from] cpal::BuildStreamError),
    /// An error starting the audio stream
    #[cfg(feature = "output")]
    #[error("{0}")]
    Play(#[from] cpal::PlayStreamError),
    /// An error getting a default stream configuration
    #[cfg(feature = "output")]
    #[error("{0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),
    /// No output device is available
    #[cfg(feature = "output")]
    #[error("No device available")]
    NoDevice,
    /// The device's sample format is not supported
    #[cfg(feature = "output")]
    #[error("Unsupported sample format")]
    UnsupportedSampleFormat,
    /// The output stream stopped advancing the context's clock
    #[cfg(feature = "output")]
    #[error("output stream stalled at {0}s")]
    Stalled(f64),
}

/// A result type for peptone operations
pub type Result<T, E = Error> = std::result::Result<T, E>;
