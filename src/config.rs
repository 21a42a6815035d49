use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{Envelope, Error, Result};

/**
Settings for scheduling a song

```
use peptone::SongConfig;

let config: SongConfig = serde_json::from_str(r#"{ "spacing": 0.25 }"#).unwrap();
assert_eq!(config.spacing, 0.25);
assert_eq!(config.envelope.release, 1.0);
```
*/
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SongConfig {
    /// Seconds between the starts of consecutive notes
    pub spacing: f64,
    /// The envelope of every note
    pub envelope: Envelope,
}

impl Default for SongConfig {
    fn default() -> Self {
        SongConfig {
            spacing: 0.5,
            envelope: Envelope::default(),
        }
    }
}

impl SongConfig {
    /// Set the spacing between notes
    pub fn spacing(self, spacing: f64) -> Self {
        SongConfig { spacing, ..self }
    }
    /// Set the envelope
    pub fn envelope(self, envelope: Envelope) -> Self {
        SongConfig { envelope, ..self }
    }
    /// Check that songs can be scheduled with this config
    pub fn validate(&self) -> Result<()> {
        if !self.spacing.is_finite() || self.spacing <= 0.0 {
            return Err(Error::InvalidSpacing(self.spacing));
        }
        self.envelope.validate()
    }
    /// Load a config from a JSON file
    ///
    /// Missing fields take their default values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: SongConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_envelope_keeps_defaults() {
        let config: SongConfig =
            serde_json::from_str(r#"{ "envelope": { "release": 0.4 } }"#).unwrap();
        assert_eq!(config.spacing, 0.5);
        assert_eq!(config.envelope.release, 0.4);
        assert_eq!(config.envelope.attack, 0.01);
        assert_eq!(config.envelope.floor, 0.001);
    }

    #[test]
    fn load_reads_file() {
        let path = std::env::temp_dir().join("peptone-config-test.json");
        fs::write(&path, r#"{ "spacing": 0.125 }"#).unwrap();
        let config = SongConfig::load(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(config, SongConfig::default().spacing(0.125));
    }

    #[test]
    fn spacing_must_be_positive() {
        for spacing in [0.0, -0.5, f64::NAN, f64::INFINITY] {
            let config = SongConfig::default().spacing(spacing);
            assert!(matches!(config.validate(), Err(Error::InvalidSpacing(_))));
        }
        assert!(SongConfig::default().validate().is_ok());
    }

    #[test]
    fn load_rejects_unusable_values() {
        let path = std::env::temp_dir().join("peptone-bad-config-test.json");
        fs::write(&path, r#"{ "envelope": { "floor": 0 } }"#).unwrap();
        let result = SongConfig::load(&path);
        fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(Error::InvalidEnvelope(_))));
    }
}
