mod idle;

pub use idle::{ControlPanel, IDLE_PERIOD, IdleTimer};

use crate::audio::AudioEngine;
use crate::model::Track;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

pub const DEFAULT_VOLUME: f32 = 0.5;
pub const UNMUTE_VOLUME: f32 = 0.5;
pub const TRACKS_PER_PAGE: usize = 2;
/// Past this point, "previous" restarts the current track instead of going back.
pub const RESTART_THRESHOLD: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// No engine binding exists for the track.
    Idle(usize),
    Paused(usize),
    Playing(usize),
}

impl PlayerState {
    pub fn track_index(self) -> usize {
        match self {
            Self::Idle(index) | Self::Paused(index) | Self::Playing(index) => index,
        }
    }

    pub fn is_playing(self) -> bool {
        matches!(self, Self::Playing(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeLevel {
    Muted,
    Low,
    High,
}

#[derive(Debug, Clone, Copy)]
struct Binding {
    track: usize,
    metadata_ready: bool,
    end_reported: bool,
}

impl Binding {
    fn new(track: usize) -> Self {
        Self {
            track,
            metadata_ready: false,
            end_reported: false,
        }
    }
}

pub struct PlayerController {
    audio: Box<dyn AudioEngine>,
    tracks: Vec<Track>,
    state: PlayerState,
    binding: Option<Binding>,
    volume: f32,
    current_time: Duration,
    duration: Duration,
    shuffle: bool,
    repeat: bool,
    playlist_page: usize,
    panel: ControlPanel,
    rng: SmallRng,
    last_error: Option<String>,
    pub dirty: bool,
}

impl PlayerController {
    pub fn new(mut audio: Box<dyn AudioEngine>, tracks: Vec<Track>) -> Self {
        audio.set_volume(DEFAULT_VOLUME);
        Self {
            audio,
            tracks,
            state: PlayerState::Idle(0),
            binding: None,
            volume: DEFAULT_VOLUME,
            current_time: Duration::ZERO,
            duration: Duration::ZERO,
            shuffle: false,
            repeat: false,
            playlist_page: 0,
            panel: ControlPanel::default(),
            rng: SmallRng::from_os_rng(),
            last_error: None,
            dirty: true,
        }
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    pub fn mount(&mut self) {
        self.load(self.state.track_index());
    }

    /// Stops playback, drops the engine binding and cancels the idle timer.
    pub fn unmount(&mut self) {
        self.teardown();
        self.panel.close();
        self.state = PlayerState::Idle(self.state.track_index());
        self.dirty = true;
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn current_index(&self) -> usize {
        self.state.track_index()
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.tracks.get(self.current_index())
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn volume_level(&self) -> VolumeLevel {
        if self.volume <= 0.0 {
            VolumeLevel::Muted
        } else if self.volume < 0.5 {
            VolumeLevel::Low
        } else {
            VolumeLevel::High
        }
    }

    pub fn current_time(&self) -> Duration {
        self.current_time
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Playback progress in `[0, 1]`; zero until the duration is known.
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 0.0;
        }
        (self.current_time.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    pub fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn output_name(&self) -> Option<String> {
        self.audio.output_name()
    }

    pub fn play(&mut self) {
        let index = self.current_index();
        if self.binding.is_none() {
            self.load(index);
        }
        if self.binding.is_none() {
            return;
        }

        match self.audio.play() {
            Ok(()) => {
                self.state = PlayerState::Playing(index);
                self.last_error = None;
            }
            Err(err) => {
                log::error!("failed to start playback: {err:#}");
                self.last_error = Some(format!("playback error: {err:#}"));
                self.state = PlayerState::Paused(index);
            }
        }
        self.dirty = true;
    }

    pub fn pause(&mut self) {
        if let PlayerState::Playing(index) = self.state {
            self.audio.pause();
            self.state = PlayerState::Paused(index);
            self.dirty = true;
        }
    }

    pub fn toggle_play(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Binds and plays the track at `index`. Out-of-range indices are ignored.
    pub fn select_track(&mut self, index: usize) {
        if index >= self.tracks.len() {
            log::debug!("ignoring out-of-range track {index}");
            return;
        }
        self.load(index);
        self.play();
    }

    pub fn next(&mut self) {
        let len = self.tracks.len();
        if len == 0 {
            return;
        }
        let index = if self.shuffle {
            self.rng.random_range(0..len)
        } else {
            (self.current_index() + 1) % len
        };
        self.select_track(index);
    }

    pub fn previous(&mut self) {
        let len = self.tracks.len();
        if len == 0 {
            return;
        }
        if self.elapsed() > RESTART_THRESHOLD {
            self.restart_in_place();
            return;
        }
        let index = if self.shuffle {
            self.rng.random_range(0..len)
        } else {
            (self.current_index() + len - 1) % len
        };
        self.select_track(index);
    }

    pub fn handle_track_ended(&mut self) {
        if self.repeat {
            let index = self.current_index();
            self.load(index);
            self.play();
        } else {
            self.next();
        }
    }

    /// Seeks to `fraction` of the known duration; ignored until the duration is known.
    pub fn seek_fraction(&mut self, fraction: f64) {
        if !fraction.is_finite() || self.binding.is_none() {
            return;
        }
        let duration = if self.duration.is_zero() {
            self.audio.duration().unwrap_or_default()
        } else {
            self.duration
        };
        if duration.is_zero() {
            return;
        }

        let target = duration.mul_f64(fraction.clamp(0.0, 1.0));
        match self.audio.seek_to(target) {
            Ok(()) => {
                self.current_time = target;
                if let Some(binding) = self.binding.as_mut() {
                    binding.end_reported = false;
                }
            }
            Err(err) => log::warn!("seek failed: {err:#}"),
        }
        self.dirty = true;
    }

    pub fn set_volume(&mut self, volume: f32) {
        let volume = if volume.is_nan() {
            0.0
        } else {
            volume.clamp(0.0, 1.0)
        };
        self.volume = volume;
        self.audio.set_volume(volume);
        self.dirty = true;
    }

    pub fn nudge_volume(&mut self, delta: f32) {
        self.set_volume(self.volume + delta);
    }

    pub fn toggle_mute(&mut self) {
        if self.volume <= 0.0 {
            self.set_volume(UNMUTE_VOLUME);
        } else {
            self.set_volume(0.0);
        }
    }

    pub fn toggle_shuffle(&mut self) {
        self.shuffle = !self.shuffle;
        self.dirty = true;
    }

    /// Flips repeat and rebinds the current track, keeping position and play state.
    pub fn toggle_repeat(&mut self) {
        self.repeat = !self.repeat;
        self.dirty = true;
        if self.binding.is_none() {
            return;
        }

        let index = self.current_index();
        let was_playing = self.is_playing();
        let position = self.audio.position().unwrap_or_default();
        self.load(index);
        if !position.is_zero() && self.binding.is_some() {
            match self.audio.seek_to(position) {
                Ok(()) => self.current_time = position,
                Err(err) => log::warn!("failed to restore position after rebind: {err:#}"),
            }
        }
        if was_playing {
            self.play();
        }
    }

    pub fn page_count(&self) -> usize {
        self.tracks.len().div_ceil(TRACKS_PER_PAGE)
    }

    pub fn playlist_page(&self) -> usize {
        self.playlist_page
    }

    pub fn next_page(&mut self) {
        let count = self.page_count();
        if count == 0 {
            return;
        }
        self.playlist_page = (self.playlist_page + 1) % count;
        self.dirty = true;
    }

    pub fn prev_page(&mut self) {
        let count = self.page_count();
        if count == 0 {
            return;
        }
        self.playlist_page = if self.playlist_page > 0 {
            self.playlist_page - 1
        } else {
            count - 1
        };
        self.dirty = true;
    }

    pub fn set_page(&mut self, page: usize) {
        if page < self.page_count() {
            self.playlist_page = page;
            self.dirty = true;
        }
    }

    /// Tracks on the current page paired with their playlist index.
    pub fn page_tracks(&self) -> impl Iterator<Item = (usize, &Track)> {
        let start = self.playlist_page * TRACKS_PER_PAGE;
        self.tracks
            .iter()
            .enumerate()
            .skip(start)
            .take(TRACKS_PER_PAGE)
    }

    /// Main floating button: opens or closes the panel, starting playback when opening idle.
    pub fn press_main_button(&mut self, now: Instant) {
        if self.panel.is_open() {
            self.close_panel();
        } else {
            self.open_panel(now);
            if !self.is_playing() {
                self.play();
            }
        }
    }

    pub fn open_panel(&mut self, now: Instant) {
        self.panel.open(now);
        self.dirty = true;
    }

    pub fn close_panel(&mut self) {
        self.panel.close();
        self.dirty = true;
    }

    pub fn touch(&mut self, now: Instant) {
        self.panel.touch(now);
    }

    pub fn toggle_playlist_view(&mut self, now: Instant) {
        self.panel.toggle_playlist(now);
        self.dirty = true;
    }

    pub fn poll_idle(&mut self, now: Instant) -> bool {
        let closed = self.panel.poll(now);
        if closed {
            self.dirty = true;
        }
        closed
    }

    /// Pulls metadata, progress and end-of-track from the current binding.
    pub fn tick(&mut self) {
        let Some(binding) = self.binding else {
            return;
        };
        let Some(track) = self.tracks.get(binding.track) else {
            return;
        };
        if self.audio.current_track() != Some(track.source.as_path()) {
            return;
        }

        if !binding.metadata_ready
            && let Some(duration) = self.audio.duration()
        {
            self.duration = duration;
            self.dirty = true;
            if let Some(live) = self.binding.as_mut() {
                live.metadata_ready = true;
            }
        }

        if let Some(position) = self.audio.position()
            && position != self.current_time
        {
            self.current_time = position;
            self.dirty = true;
        }

        if !binding.end_reported && self.audio.is_finished() {
            if let Some(live) = self.binding.as_mut() {
                live.end_reported = true;
            }
            self.handle_track_ended();
        }
    }

    fn elapsed(&self) -> Duration {
        if self.binding.is_none() {
            return Duration::ZERO;
        }
        self.audio.position().unwrap_or(self.current_time)
    }

    fn restart_in_place(&mut self) {
        match self.audio.seek_to(Duration::ZERO) {
            Ok(()) => {
                self.current_time = Duration::ZERO;
                if let Some(binding) = self.binding.as_mut() {
                    binding.end_reported = false;
                }
            }
            Err(err) => log::warn!("failed to restart track: {err:#}"),
        }
        self.dirty = true;
    }

    /// Tears down any existing binding, then binds `index`. Failures leave the player idle.
    fn load(&mut self, index: usize) {
        self.teardown();
        self.current_time = Duration::ZERO;
        self.duration = Duration::ZERO;
        self.dirty = true;

        let Some(track) = self.tracks.get(index) else {
            self.state = PlayerState::Idle(index);
            return;
        };

        match self.audio.load(&track.source) {
            Ok(()) => {
                self.audio.set_volume(self.volume);
                self.binding = Some(Binding::new(index));
                self.state = PlayerState::Paused(index);
                log::debug!("bound {} by {}", track.name, track.artist);
            }
            Err(err) => {
                log::warn!("failed to load {}: {err:#}", track.name);
                self.last_error = Some(format!("could not load {}", track.name));
                self.state = PlayerState::Idle(index);
            }
        }
    }

    fn teardown(&mut self) {
        self.binding = None;
        self.audio.stop();
    }
}

impl Drop for PlayerController {
    fn drop(&mut self) {
        self.unmount();
    }
}
