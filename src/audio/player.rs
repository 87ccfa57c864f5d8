use super::AudioConfig;
use crate::api::Song;
use anyhow::Result;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug, Clone)]
pub enum PlayerEvent {
    TrackStarted(Song),
    TrackPaused,
    TrackResumed,
    TrackStopped,
    Error(String),
}

/// Plays songs the API client fetched into memory. Each track gets a fresh
/// sink; replacing a sink drops the previous one together with the decoded
/// bytes it owned, so audio buffers never outlive their track.
pub struct AudioPlayer {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    sink: Arc<Mutex<Option<Sink>>>,
    current_song: Arc<Mutex<Option<Song>>>,
    state: Arc<Mutex<PlaybackState>>,
    config: AudioConfig,
    event_sender: Option<mpsc::UnboundedSender<PlayerEvent>>,
}

impl AudioPlayer {
    pub fn new(config: AudioConfig) -> Result<Self> {
        let (stream, stream_handle) = OutputStream::try_default()?;

        Ok(Self {
            _stream: stream,
            stream_handle,
            sink: Arc::new(Mutex::new(None)),
            current_song: Arc::new(Mutex::new(None)),
            state: Arc::new(Mutex::new(PlaybackState::Stopped)),
            config,
            event_sender: None,
        })
    }

    pub fn set_event_sender(&mut self, sender: mpsc::UnboundedSender<PlayerEvent>) {
        self.event_sender = Some(sender);
    }

    /// Start playing a song from its fetched bytes. Whatever was playing is
    /// stopped and released first.
    pub fn play_song(&self, song: Song, content: Vec<u8>) -> Result<()> {
        self.stop()?;

        let sink = Sink::try_new(&self.stream_handle)?;

        let source = match Decoder::new(Cursor::new(content)) {
            Ok(s) => s,
            Err(e) => {
                if let Some(sender) = &self.event_sender {
                    let _ = sender.send(PlayerEvent::Error(format!(
                        "Unsupported audio format or corrupted stream: {}",
                        e
                    )));
                }
                return Err(anyhow::anyhow!(
                    "Failed to decode '{}': {}",
                    song.display_title(),
                    e
                ));
            }
        };

        sink.append(source);
        sink.set_volume(0.0);
        self.fade_to(&sink, self.config.volume, self.config.fade_in_duration);

        {
            let mut sink_guard = self.sink.lock().unwrap();
            *sink_guard = Some(sink);
        }

        {
            let mut song_guard = self.current_song.lock().unwrap();
            *song_guard = Some(song.clone());
        }

        {
            let mut state_guard = self.state.lock().unwrap();
            *state_guard = PlaybackState::Playing;
        }

        if let Some(sender) = &self.event_sender {
            let _ = sender.send(PlayerEvent::TrackStarted(song));
        }

        Ok(())
    }

    pub fn pause(&self) -> Result<()> {
        if let Some(sink) = self.sink.lock().unwrap().as_ref() {
            sink.pause();

            let mut state_guard = self.state.lock().unwrap();
            *state_guard = PlaybackState::Paused;

            if let Some(sender) = &self.event_sender {
                let _ = sender.send(PlayerEvent::TrackPaused);
            }
        }

        Ok(())
    }

    pub fn resume(&self) -> Result<()> {
        if let Some(sink) = self.sink.lock().unwrap().as_ref() {
            sink.play();

            let mut state_guard = self.state.lock().unwrap();
            *state_guard = PlaybackState::Playing;

            if let Some(sender) = &self.event_sender {
                let _ = sender.send(PlayerEvent::TrackResumed);
            }
        }

        Ok(())
    }

    pub fn stop(&self) -> Result<()> {
        {
            let mut sink_guard = self.sink.lock().unwrap();
            if let Some(sink) = sink_guard.as_ref() {
                self.fade_to(sink, 0.0, self.config.fade_out_duration);
                sink.stop();
            }
            // Take the sink to release it and its decoded bytes
            sink_guard.take();
        }

        {
            let mut song_guard = self.current_song.lock().unwrap();
            song_guard.take();
        }

        {
            let mut state_guard = self.state.lock().unwrap();
            *state_guard = PlaybackState::Stopped;
        }

        if let Some(sender) = &self.event_sender {
            let _ = sender.send(PlayerEvent::TrackStopped);
        }

        Ok(())
    }

    pub fn set_volume(&mut self, volume: f32) {
        let clamped = volume.clamp(0.0, 1.0);
        self.config.volume = clamped;

        if let Some(sink) = self.sink.lock().unwrap().as_ref() {
            sink.set_volume(clamped);
        }
    }

    pub fn get_volume(&self) -> f32 {
        self.config.volume
    }

    pub fn get_state(&self) -> PlaybackState {
        self.state.lock().unwrap().clone()
    }

    pub fn get_current_song(&self) -> Option<Song> {
        self.current_song.lock().unwrap().clone()
    }

    /// True once the sink has drained - the track ended on its own.
    pub fn is_finished(&self) -> bool {
        self.sink
            .lock()
            .unwrap()
            .as_ref()
            .map(|sink| sink.empty())
            .unwrap_or(true)
    }

    /// Ramp the sink volume in small steps for a smooth start/stop.
    fn fade_to(&self, sink: &Sink, target: f32, duration_ms: u64) {
        if duration_ms == 0 {
            sink.set_volume(target);
            return;
        }

        let start = sink.volume();
        let steps = 10u64;
        let step_duration = duration_ms / steps;
        for step in 1..=steps {
            let t = step as f32 / steps as f32;
            sink.set_volume(start + (target - start) * t);
            std::thread::sleep(std::time::Duration::from_millis(step_duration));
        }
        sink.set_volume(target);
    }
}
