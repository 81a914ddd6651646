/// Named playlist entry in the fixed study catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Playlist {
    pub name: &'static str,
    pub id: &'static str,
}

pub const STUDY_PLAYLISTS: [Playlist; 4] = [
    Playlist {
        name: "Lo-fi Study Beats",
        id: "lofi-study",
    },
    Playlist {
        name: "Classical Focus",
        id: "classical-focus",
    },
    Playlist {
        name: "Ambient Study",
        id: "ambient-study",
    },
    Playlist {
        name: "Nature Sounds",
        id: "nature-sounds",
    },
];

const NO_TRACK: &str = "No track selected";

/// Stand-in for a streaming integration. Connection and playback are
/// simulated; no request ever leaves the process.
#[derive(Debug, Default)]
pub struct MusicPlayer {
    connected: bool,
    playing: bool,
    current_track: Option<String>,
}

impl MusicPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn current_track(&self) -> &str {
        self.current_track.as_deref().unwrap_or(NO_TRACK)
    }

    /// Simulates a successful account link and queues a default track.
    pub fn connect(&mut self) {
        self.connected = true;
        self.current_track = Some("Lo-fi Study Beats - Relaxing Music".to_string());
    }

    pub fn toggle_playback(&mut self) {
        self.playing = !self.playing;
    }

    /// Points the player at a catalogue entry; out-of-range indices are
    /// ignored.
    pub fn select_playlist(&mut self, index: usize) {
        if let Some(playlist) = STUDY_PLAYLISTS.get(index) {
            self.current_track = Some(playlist.name.to_string());
        }
    }
}
