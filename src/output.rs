use std::{
    thread,
    time::{Duration, Instant},
};

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    Device, OutputCallbackInfo, SampleFormat, SizedSample, Stream, StreamConfig,
    SupportedStreamConfig,
};
use log::{error, info};

pub use cpal;

use crate::{AudioContext, Error, Result};

trait Amplitude: SizedSample {
    fn from_f64(f: f64) -> Self;
}

impl Amplitude for f32 {
    fn from_f64(f: f64) -> Self {
        f as f32
    }
}

impl Amplitude for u16 {
    fn from_f64(f: f64) -> Self {
        const HALF_U16_MAX: f64 = u16::MAX as f64 * 0.5;
        (f.clamp(-1.0, 1.0) * HALF_U16_MAX + HALF_U16_MAX) as u16
    }
}

impl Amplitude for i16 {
    fn from_f64(f: f64) -> Self {
        const I16_MAX: f64 = i16::MAX as f64;
        (f.clamp(-1.0, 1.0) * I16_MAX) as i16
    }
}

/// Get the default output device
pub fn default_output_device() -> Option<Device> {
    cpal::default_host().default_output_device()
}

/**
A builder for creating [`DeviceOutput`]s
*/
#[derive(Default)]
pub struct DeviceIoBuilder {
    /// The device to use. If not set, the default device will be used.
    pub device: Option<Device>,
    /// The stream configuration to be used. If not set, the default will be used.
    pub config: Option<SupportedStreamConfig>,
}

impl DeviceIoBuilder {
    /// Initialize a builder with the default output device and stream configuration
    pub fn default_output() -> Self {
        let device = default_output_device();
        let config = device
            .as_ref()
            .and_then(|device| device.default_output_config().ok());
        DeviceIoBuilder { device, config }
    }
    /// Set the output device
    pub fn device(self, device: Device) -> Self {
        DeviceIoBuilder {
            device: Some(device),
            ..self
        }
    }
    /// Set the stream configuration
    pub fn config(self, config: SupportedStreamConfig) -> Self {
        DeviceIoBuilder {
            config: Some(config),
            ..self
        }
    }
    /// Build a [`DeviceOutput`] and start its stream
    pub fn build_output(self) -> Result<DeviceOutput> {
        DeviceOutput::from_builder(self)
    }
}

/**
A real-time [`AudioContext`] whose destination is an output device

The context's clock is driven by the device. Playback stops when this is dropped.
*/
pub struct DeviceOutput {
    context: AudioContext,
    _stream: Stream,
}

impl DeviceOutput {
    /// Create an output on the default device
    pub fn with_default_device() -> Result<Self> {
        DeviceIoBuilder::default_output().build_output()
    }
    fn from_builder(builder: DeviceIoBuilder) -> Result<Self> {
        let device = if let Some(device) = builder.device {
            device
        } else {
            default_output_device().ok_or(Error::NoDevice)?
        };
        let config = if let Some(config) = builder.config {
            config
        } else {
            device.default_output_config()?
        };
        let sample_format = config.sample_format();
        let config: StreamConfig = config.into();
        let context = AudioContext::offline(config.sample_rate.0 as f64);
        let err_fn = |err| error!("an error occurred on the output audio stream: {err}");
        macro_rules! output_stream {
            ($sample:ty) => {
                device.build_output_stream(
                    &config,
                    write_context::<$sample>(context.clone(), config.channels as usize),
                    err_fn,
                    None,
                )
            };
        }
        let stream = match sample_format {
            SampleFormat::F32 => output_stream!(f32),
            SampleFormat::I16 => output_stream!(i16),
            SampleFormat::U16 => output_stream!(u16),
            _ => return Err(Error::UnsupportedSampleFormat),
        }?;
        stream.play()?;
        info!(
            "playing at {} Hz on {} channel(s)",
            config.sample_rate.0, config.channels
        );
        Ok(DeviceOutput {
            context,
            _stream: stream,
        })
    }
    /// Get the context rendered by this output
    pub fn context(&self) -> &AudioContext {
        &self.context
    }
    /// Block the thread until the context's clock reaches `time`
    ///
    /// Fails if the stream stops advancing the clock for [`STALL_TIMEOUT`].
    pub fn block_until(&self, time: f64) -> Result<()> {
        wait_for(&self.context, time, STALL_TIMEOUT)
    }
}

/// How long [`DeviceOutput::block_until`] waits on a clock that isn't moving
pub const STALL_TIMEOUT: Duration = Duration::from_secs(2);

fn wait_for(context: &AudioContext, time: f64, stall_timeout: Duration) -> Result<()> {
    let mut last = context.current_time();
    let mut last_change = Instant::now();
    while last < time {
        thread::sleep(Duration::from_millis(10));
        let now = context.current_time();
        if now > last {
            last = now;
            last_change = Instant::now();
        } else if last_change.elapsed() >= stall_timeout {
            error!("output clock stuck at {now}s, waiting for {time}s");
            return Err(Error::Stalled(now));
        }
    }
    Ok(())
}

fn write_context<A>(
    context: AudioContext,
    channels: usize,
) -> impl FnMut(&mut [A], &OutputCallbackInfo) + Send + 'static
where
    A: Amplitude,
{
    let mut frames = Vec::new();
    move |buffer, _| {
        frames.resize(buffer.len() / channels.max(1), 0.0);
        context.fill(&mut frames);
        for (out, &sample) in buffer.chunks_mut(channels.max(1)).zip(&frames) {
            out.fill(A::from_f64(sample));
        }
    }
}
