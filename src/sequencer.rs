use log::debug;

use crate::{AudioContext, Envelope, Result, SongConfig, Sound};

/// A note that has been handed to an [`AudioContext`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledNote {
    /// The frequency in Hz
    pub frequency: f64,
    /// When the note starts
    pub start: f64,
    /// When the note's oscillator stops
    pub stop: f64,
}

/// The notes scheduled by [`start_song`], in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    notes: Vec<ScheduledNote>,
}

impl Schedule {
    /// Get the scheduled notes
    pub fn notes(&self) -> &[ScheduledNote] {
        &self.notes
    }
    /// Get the number of notes
    pub fn len(&self) -> usize {
        self.notes.len()
    }
    /// Check whether no notes were scheduled
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
    /// Get the time the last note stops
    pub fn end(&self) -> Option<f64> {
        self.notes.iter().map(|note| note.stop).reduce(f64::max)
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a ScheduledNote;
    type IntoIter = std::slice::Iter<'a, ScheduledNote>;
    fn into_iter(self) -> Self::IntoIter {
        self.notes.iter()
    }
}

/// Play a single note at `start_time` with the default envelope
pub fn play_sound(context: &AudioContext, note: f64, start_time: f64) -> Result<Sound> {
    play_sound_with(context, note, start_time, Envelope::default())
}

/// Play a single note at `start_time` with the given envelope
pub fn play_sound_with(
    context: &AudioContext,
    note: f64,
    start_time: f64,
    envelope: Envelope,
) -> Result<Sound> {
    let mut sound = Sound::with_envelope(context, envelope);
    sound.play(note, start_time)?;
    Ok(sound)
}

/// Schedule each note half a second after the previous one, starting now
pub fn start_song(context: &AudioContext, notes: &[f64]) -> Result<Schedule> {
    start_song_with(context, notes, &SongConfig::default())
}

/// Schedule each note `config.spacing` seconds after the previous one, starting now
///
/// The config is checked before any note is scheduled.
pub fn start_song_with(
    context: &AudioContext,
    notes: &[f64],
    config: &SongConfig,
) -> Result<Schedule> {
    config.validate()?;
    debug!("notes: {notes:?}");
    let mut start_time = context.current_time();
    let mut schedule = Schedule::default();
    for &note in notes {
        let sound = play_sound_with(context, note, start_time, config.envelope)?;
        schedule.notes.push(ScheduledNote {
            frequency: note,
            start: start_time,
            stop: start_time + sound.envelope().release,
        });
        start_time += config.spacing;
        debug!("next note at {start_time}");
    }
    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn empty_song_schedules_nothing() {
        let context = AudioContext::offline(1000.0);
        let schedule = start_song(&context, &[]).unwrap();
        assert!(schedule.is_empty());
        assert_eq!(schedule.end(), None);
        assert_eq!(context.node_count(), 1);
    }

    #[test]
    fn play_sound_threads_start_time() {
        let context = AudioContext::offline(1000.0);
        let sound = play_sound(&context, 494.0, 1.5).unwrap();
        let osc = sound.oscillator().unwrap();
        assert_eq!(osc.start_time(), Some(1.5));
        assert_eq!(osc.stop_time(), Some(2.5));
    }

    #[test]
    fn spacing_comes_from_config() {
        let context = AudioContext::offline(1000.0);
        let config = SongConfig::default().spacing(0.25);
        let schedule = start_song_with(&context, &[1.0, 2.0, 3.0], &config).unwrap();
        let starts: Vec<f64> = schedule.into_iter().map(|note| note.start).collect();
        assert_eq!(starts, [0.0, 0.25, 0.5]);
        assert_eq!(schedule.end(), Some(1.5));
    }

    #[test]
    fn invalid_note_stops_scheduling() {
        let context = AudioContext::offline(1000.0);
        assert!(start_song(&context, &[440.0, 0.0, 440.0]).is_err());
        assert_eq!(context.node_count(), 3);
    }

    #[test]
    fn bad_spacing_schedules_nothing() {
        let context = AudioContext::offline(1000.0);
        for spacing in [0.0, -0.5, f64::NAN] {
            let config = SongConfig::default().spacing(spacing);
            let result = start_song_with(&context, &[440.0, 494.0], &config);
            assert!(matches!(result, Err(Error::InvalidSpacing(_))));
        }
        assert_eq!(context.node_count(), 1);
    }

    #[test]
    fn failed_note_is_silent() {
        let context = AudioContext::offline(1000.0);
        let envelope = Envelope {
            floor: 0.0,
            ..Envelope::default()
        };
        assert!(play_sound_with(&context, 440.0, 0.0, envelope).is_err());
        assert_eq!(context.node_count(), 1);
        assert!(context.render(1.5).iter().all(|&s| s == 0.0));
    }
}
