use peptone::{protein::Fasta, *};

const RATE: f64 = 8000.0;

fn peak(samples: &[f64]) -> f64 {
    samples.iter().fold(0.0, |max, s| max.max(s.abs()))
}

#[test]
fn one_sound_per_note() {
    let context = AudioContext::offline(RATE);
    let notes = [440.0, 494.0, 523.25, 587.33];
    let schedule = start_song(&context, &notes).unwrap();
    assert_eq!(schedule.len(), notes.len());
    // Destination plus an oscillator and a gain for every note
    assert_eq!(context.node_count(), 1 + 2 * notes.len());
    for (note, &freq) in schedule.notes().iter().zip(&notes) {
        assert_eq!(note.frequency, freq);
        assert!((note.stop - note.start - 1.0).abs() < 1e-12);
    }
}

#[test]
fn starts_are_half_a_second_apart_from_current_time() {
    let context = AudioContext::offline(RATE);
    context.render(0.25);
    let t0 = context.current_time();
    let schedule = start_song(&context, &[440.0, 494.0, 440.0]).unwrap();
    let starts: Vec<f64> = schedule.notes().iter().map(|note| note.start).collect();
    assert_eq!(starts, [t0, t0 + 0.5, t0 + 1.0]);
}

#[test]
fn two_note_example() {
    let context = AudioContext::offline(RATE);
    let t0 = context.current_time();
    let first = play_sound(&context, 440.0, t0).unwrap();
    let second = play_sound(&context, 494.0, t0 + 0.5).unwrap();
    for (sound, freq, start) in [(&first, 440.0, t0), (&second, 494.0, t0 + 0.5)] {
        let osc = sound.oscillator().unwrap();
        assert_eq!(osc.waveform(), OscillatorType::Sine);
        assert_eq!(osc.frequency().value(), freq);
        assert_eq!(osc.start_time(), Some(start));
    }
}

#[test]
fn rendered_envelope_shape() {
    let context = AudioContext::offline(RATE);
    let schedule = start_song(&context, &[440.0]).unwrap();
    let samples = context.render(schedule.end().unwrap() + 0.25);
    let at = |t: f64| (t * RATE) as usize;
    // Attack reaches full scale within the first few milliseconds
    assert!(peak(&samples[at(0.0)..at(0.005)]) < 0.55);
    assert!(peak(&samples[at(0.01)..at(0.02)]) > 0.9);
    // Exponential decay: halfway through the release the level is about 0.03
    let mid = peak(&samples[at(0.5)..at(0.51)]);
    assert!(mid > 0.02 && mid < 0.045, "{mid}");
    assert!(peak(&samples[at(0.95)..at(1.0)]) < 0.002);
    // Silent once the oscillator stops
    assert_eq!(peak(&samples[at(1.0)..]), 0.0);
}

#[test]
fn notes_overlap_while_decaying() {
    let context = AudioContext::offline(RATE);
    start_song(&context, &[200.0, 300.0]).unwrap();
    let samples = context.render(2.0);
    let at = |t: f64| (t * RATE) as usize;
    assert!(peak(&samples[at(0.51)..at(0.52)]) > 0.85);
    assert_eq!(peak(&samples[at(1.5)..]), 0.0);
}

#[test]
fn long_song_does_not_accumulate_nodes() {
    let context = AudioContext::offline(1000.0);
    let notes = vec![440.0; 2000];
    let config = SongConfig::default().spacing(0.01);
    let schedule = start_song_with(&context, &notes, &config).unwrap();
    assert_eq!(context.node_count(), 1 + 2 * notes.len());
    context.render(schedule.end().unwrap() + 0.01);
    assert_eq!(context.node_count(), 1);
}

#[test]
fn unusable_config_is_rejected_up_front() {
    let context = AudioContext::offline(RATE);
    let notes = [440.0, 494.0];
    let bad_floor = SongConfig::default().envelope(Envelope {
        floor: 0.0,
        ..Envelope::default()
    });
    for config in [SongConfig::default().spacing(-0.5), bad_floor] {
        assert!(start_song_with(&context, &notes, &config).is_err());
    }
    assert_eq!(context.node_count(), 1);
    assert_eq!(peak(&context.render(2.0)), 0.0);
}

#[test]
fn protein_song_end_to_end() {
    let fasta = Fasta::parse(">tiny\nMKV\n").unwrap();
    let context = AudioContext::offline(RATE);
    let schedule = start_song(&context, &fasta.notes()).unwrap();
    assert_eq!(schedule.len(), 6);
    assert_eq!(schedule.end(), Some(2.5 + 1.0));
}

#[test]
fn json_notes_end_to_end() {
    let notes = notes_from_json(r#"["A4", 494]"#).unwrap();
    let context = AudioContext::offline(RATE);
    let schedule = start_song(&context, &notes).unwrap();
    assert_eq!(schedule.notes()[0].frequency, 440.0);
    assert_eq!(schedule.notes()[1].start, 0.5);
}

#[cfg(feature = "wav")]
#[test]
fn render_wav_file() {
    let path = std::env::temp_dir().join("peptone-render-test.wav");
    let context = AudioContext::offline(RATE);
    let schedule = start_song(&context, &[440.0, 494.0]).unwrap();
    let file = std::fs::File::create(&path).unwrap();
    wav::write_context(file, &context, schedule.end().unwrap()).unwrap();
    let mut reader = hound::WavReader::open(&path).unwrap();
    let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(samples.len(), (1.5 * RATE) as usize);
    assert!(samples.iter().any(|s| s.abs() > 0.9));
}
