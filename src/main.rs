use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use peptone::{protein::Fasta, *};

/// Play note lists and protein sequences as sine tones
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play the notes on the default output device
    Play {
        #[command(flatten)]
        song: SongArgs,
    },
    /// Render the notes to a WAV file
    Render {
        #[command(flatten)]
        song: SongArgs,
        /// The WAV file to write
        #[arg(short, long)]
        output: PathBuf,
        /// Samples per second
        #[arg(long, default_value_t = 44100)]
        sample_rate: u32,
        /// Scale the rendered samples
        #[arg(long, default_value_t = 0.5)]
        volume: f64,
    },
}

#[derive(Args)]
struct SongArgs {
    /// A JSON array of frequencies and pitch names, or a FASTA file with --fasta
    file: PathBuf,
    /// Read the file as a FASTA protein sequence
    #[arg(long)]
    fasta: bool,
    /// A JSON song config
    #[arg(long)]
    config: Option<PathBuf>,
}

impl SongArgs {
    fn load(&self) -> Result<(Vec<f64>, SongConfig)> {
        let text = fs::read_to_string(&self.file)
            .with_context(|| format!("failed to read {}", self.file.display()))?;
        let notes = if self.fasta {
            let fasta = Fasta::parse(&text)?;
            info!("{} ({} residues)", fasta.header, fasta.sequence.len());
            fasta.notes()
        } else {
            notes_from_json(&text)?
        };
        let config = match &self.config {
            Some(path) => SongConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => SongConfig::default(),
        };
        Ok((notes, config))
    }
}

fn main() -> Result<()> {
    env_logger::init();
    match Cli::parse().command {
        Command::Play { song } => play(&song),
        Command::Render {
            song,
            output,
            sample_rate,
            volume,
        } => render(&song, &output, sample_rate, volume),
    }
}

fn play(song: &SongArgs) -> Result<()> {
    let (notes, config) = song.load()?;
    let output = DeviceOutput::with_default_device().context("failed to open output device")?;
    let schedule = start_song_with(output.context(), &notes, &config)?;
    if let Some(end) = schedule.end() {
        info!("playing {} notes for {end:.1}s", schedule.len());
        output.block_until(end)?;
    }
    Ok(())
}

fn render(song: &SongArgs, path: &Path, sample_rate: u32, volume: f64) -> Result<()> {
    let (notes, config) = song.load()?;
    let context = AudioContext::offline(sample_rate as f64);
    let schedule = start_song_with(&context, &notes, &config)?;
    let duration = schedule.end().unwrap_or(0.0);
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let source = context.source().amplify(volume).take(duration);
    wav::write_source(BufWriter::new(file), source)?;
    info!(
        "wrote {} notes ({duration:.1}s) to {}",
        schedule.len(),
        path.display()
    );
    Ok(())
}
