//! Write rendered audio to wave files

use std::io::{Seek, Write};

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::{AudioContext, Result, Source, ToDuration};

/// Write a mono source to a 32-bit float WAV file
pub fn write_source<W, S>(writer: W, mut source: S) -> Result<()>
where
    W: Write + Seek,
    S: Source,
{
    let spec = WavSpec {
        channels: 1,
        sample_rate: source.sample_rate().round() as u32,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::new(writer, spec)?;
    while let Some(sample) = source.next() {
        writer.write_sample(sample as f32)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Render `duration` of a context, from its current time, to a WAV file
pub fn write_context<W>(
    writer: W,
    context: &AudioContext,
    duration: impl ToDuration,
) -> Result<()>
where
    W: Write + Seek,
{
    write_source(writer, context.source().take(duration))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::start_song;

    #[test]
    fn writes_mono_float_samples() {
        let context = AudioContext::offline(8000.0);
        start_song(&context, &[440.0]).unwrap();
        let mut bytes = Cursor::new(Vec::new());
        write_context(&mut bytes, &context, 0.5).unwrap();
        bytes.set_position(0);
        let reader = hound::WavReader::new(bytes).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.spec().sample_rate, 8000);
        assert_eq!(reader.len(), 4000);
    }

    #[test]
    fn writer_errors_are_wav_errors() {
        let context = AudioContext::offline(8000.0);
        let mut bytes = Cursor::new([0u8; 8]);
        let result = write_context(&mut bytes, &context, 0.5);
        assert!(matches!(result, Err(crate::Error::Wav(_))));
    }
}
