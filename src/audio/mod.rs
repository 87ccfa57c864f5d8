#[cfg(feature = "audio")]
pub mod player;
pub mod sequencer;

#[cfg(feature = "audio")]
pub use player::{AudioPlayer, PlaybackState, PlayerEvent};
pub use sequencer::PlaylistState;

#[derive(Debug, Clone)]
pub struct AudioConfig {
    pub volume: f32,            // 0.0 to 1.0
    pub fade_in_duration: u64,  // milliseconds for smooth track start
    pub fade_out_duration: u64, // milliseconds for smooth track stop
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume: 0.7,
            fade_in_duration: 300,
            fade_out_duration: 200,
        }
    }
}

impl From<&crate::config::Config> for AudioConfig {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            volume: config.audio.volume,
            fade_in_duration: config.audio.fade_in_duration,
            fade_out_duration: config.audio.fade_out_duration,
        }
    }
}
