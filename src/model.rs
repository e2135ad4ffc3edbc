use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub name: String,
    pub artist: String,
    pub source: PathBuf,
    /// Cosmetic only; the engine reports the real duration once decoded.
    pub display_duration: String,
}

impl Track {
    pub fn new(name: &str, artist: &str, source: PathBuf, display_duration: &str) -> Self {
        Self {
            name: name.to_string(),
            artist: artist.to_string(),
            source,
            display_duration: display_duration.to_string(),
        }
    }
}

/// The bundled playlist, resolved against the music asset directory.
pub fn bundled_playlist(music_dir: &Path) -> Vec<Track> {
    vec![
        Track::new("2:23 AM", "Sharou", music_dir.join("Lagu1.mp3"), "3:16"),
        Track::new("Blue", "yung kai", music_dir.join("Lagu2.mp3"), "3:34"),
        Track::new(
            "Dancing Through Fantasies",
            "Wuthering Waves",
            music_dir.join("Lagu3.mp3"),
            "3:20",
        ),
        Track::new("REVIVER", "Sawano Hiroyuki", music_dir.join("Lagu4.mp3"), "3:11"),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    About,
    Projects,
    Contacts,
    BehindStory,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Home,
        Page::About,
        Page::Projects,
        Page::Contacts,
        Page::BehindStory,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::About => "about",
            Self::Projects => "projects",
            Self::Contacts => "contacts",
            Self::BehindStory => "behindStory",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::About => "About",
            Self::Projects => "Projects",
            Self::Contacts => "Contacts",
            Self::BehindStory => "Story",
        }
    }

    /// Unknown ids render the home page.
    pub fn from_id(id: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|page| page.id() == id)
            .unwrap_or_default()
    }

    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|page| *page == self)
            .unwrap_or_default()
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}
