//! VCS configuration.

use std::path::PathBuf;

use atari_tia::audio::DEFAULT_SAMPLE_RATE;

/// VCS configuration.
pub struct Atari2600Config {
    /// Cartridge image (2K, 4K or 8K).
    pub rom_data: Vec<u8>,
    /// Replay script driving input from the first frame.
    pub replay_path: Option<PathBuf>,
    /// Host audio output rate in Hz. Defaults to 44 100.
    pub sample_rate: u32,
}

impl Atari2600Config {
    #[must_use]
    pub fn new(rom_data: Vec<u8>) -> Self {
        Self {
            rom_data,
            replay_path: None,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }

    #[must_use]
    pub fn with_replay(mut self, path: impl Into<PathBuf>) -> Self {
        self.replay_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }
}
