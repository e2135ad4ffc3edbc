use crate::storage::KeyValueStore;
use serde::{Deserialize, Serialize};

pub const PREFERENCES_KEY: &str = "themePreferences";
pub const DEFAULT_ACCENT: &str = "redYellow";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Stored modes are not validated: only the exact string `"dark"` is dark.
    pub fn from_stored(raw: &str) -> Self {
        if raw == "dark" { Self::Dark } else { Self::Light }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
            a: 0xff,
        }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Composites this color over an opaque background.
    pub fn over(self, background: Rgba) -> (u8, u8, u8) {
        let alpha = u16::from(self.a);
        let blend = |fg: u8, bg: u8| {
            ((u16::from(fg) * alpha + u16::from(bg) * (255 - alpha) + 127) / 255) as u8
        };
        (
            blend(self.r, background.r),
            blend(self.g, background.g),
            blend(self.b, background.b),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shade {
    pub light: Rgba,
    pub main: Rgba,
    pub dark: Rgba,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccentPair {
    pub key: &'static str,
    pub name: &'static str,
    pub primary: Shade,
    pub secondary: Shade,
}

const fn shade(light: u32, main: u32, dark: u32) -> Shade {
    Shade {
        light: Rgba::hex(light),
        main: Rgba::hex(main),
        dark: Rgba::hex(dark),
    }
}

pub const ACCENTS: [AccentPair; 6] = [
    AccentPair {
        key: "redYellow",
        name: "Red & Yellow",
        primary: shade(0xff6659, 0xd32f2f, 0x9a0007),
        secondary: shade(0xffc107, 0xffc107, 0xc8a415),
    },
    AccentPair {
        key: "blueOrange",
        name: "Blue & Orange",
        primary: shade(0x63a4ff, 0x1976d2, 0x004ba0),
        secondary: shade(0xf57c00, 0xff9800, 0xc66900),
    },
    AccentPair {
        key: "greenPurple",
        name: "Green & Purple",
        primary: shade(0x66bb6a, 0x4caf50, 0x087f23),
        secondary: shade(0x9575cd, 0x7e57c2, 0x4d2c91),
    },
    AccentPair {
        key: "purpleTeal",
        name: "Purple & Teal",
        primary: shade(0x9c64fb, 0x6200ee, 0x3700b3),
        secondary: shade(0x26c6da, 0x00bcd4, 0x008ba3),
    },
    AccentPair {
        key: "amberIndigo",
        name: "Amber & Indigo",
        primary: shade(0xffab00, 0xffc107, 0xff8f00),
        secondary: shade(0x5c6bc0, 0x3f51b5, 0x1a237e),
    },
    AccentPair {
        key: "tealCoral",
        name: "Teal & Coral",
        primary: shade(0x4db6ac, 0x009688, 0x00695c),
        secondary: shade(0xf4511e, 0xff5722, 0xc41c00),
    },
];

pub fn accent(key: &str) -> Option<&'static AccentPair> {
    ACCENTS.iter().find(|pair| pair.key == key)
}

fn default_accent() -> &'static AccentPair {
    &ACCENTS[0]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePreference {
    pub mode: ThemeMode,
    /// Always a key from [`ACCENTS`].
    pub accent_key: &'static str,
}

impl Default for ThemePreference {
    fn default() -> Self {
        Self {
            mode: ThemeMode::Light,
            accent_key: DEFAULT_ACCENT,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredPreference {
    #[serde(default)]
    mode: Option<String>,
    #[serde(default, rename = "themeColor")]
    theme_color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteColor {
    pub main: Rgba,
    pub light: Rgba,
    pub dark: Rgba,
    pub contrast_text: Rgba,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub primary: PaletteColor,
    pub secondary: PaletteColor,
    pub background: Rgba,
    pub paper: Rgba,
    pub text_primary: Rgba,
    pub text_secondary: Rgba,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonStyle {
    pub radius: u8,
    pub font_weight: u16,
    pub primary_hover: Rgba,
    pub secondary_hover: Rgba,
    pub secondary_text: Rgba,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardStyle {
    pub radius: u8,
    pub shadow: Rgba,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentOverrides {
    pub button: ButtonStyle,
    pub card: CardStyle,
    pub chip_font_weight: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeDescriptor {
    pub mode: ThemeMode,
    pub accent_key: &'static str,
    pub accent_name: &'static str,
    pub palette: Palette,
    pub components: ComponentOverrides,
}

const WHITE: Rgba = Rgba::hex(0xffffff);
const BLACK: Rgba = Rgba::hex(0x000000);

/// Maps a preference to the full visual theme. Unknown keys resolve to the default accent.
pub fn derived_theme(mode: ThemeMode, accent_key: &str) -> ThemeDescriptor {
    let pair = accent(accent_key).unwrap_or_else(default_accent);
    let light = mode == ThemeMode::Light;

    let primary = PaletteColor {
        main: if light { pair.primary.main } else { pair.primary.light },
        light: pair.primary.light,
        dark: pair.primary.dark,
        contrast_text: WHITE,
    };
    let secondary = PaletteColor {
        main: if light {
            pair.secondary.main
        } else {
            pair.secondary.light
        },
        light: pair.secondary.light,
        dark: pair.secondary.dark,
        contrast_text: BLACK,
    };

    let (background, paper, ink) = if light {
        (WHITE, Rgba::hex(0xf5f5f5), BLACK)
    } else {
        (Rgba::hex(0x121212), Rgba::hex(0x1e1e1e), WHITE)
    };

    ThemeDescriptor {
        mode,
        accent_key: pair.key,
        accent_name: pair.name,
        palette: Palette {
            primary,
            secondary,
            background,
            paper,
            text_primary: ink.with_alpha(222),
            text_secondary: ink.with_alpha(153),
        },
        components: ComponentOverrides {
            button: ButtonStyle {
                radius: 8,
                font_weight: 500,
                primary_hover: pair.primary.dark,
                secondary_hover: pair.secondary.dark,
                secondary_text: BLACK,
            },
            card: CardStyle {
                radius: 12,
                shadow: BLACK.with_alpha(if light { 26 } else { 128 }),
            },
            chip_font_weight: 500,
        },
    }
}

/// Owns the theme preference, its persisted copy and the memoized descriptor.
#[derive(Debug)]
pub struct ThemeManager<S: KeyValueStore> {
    preference: ThemePreference,
    theme: ThemeDescriptor,
    revision: u64,
    store: S,
}

impl<S: KeyValueStore> ThemeManager<S> {
    pub fn new(store: S) -> Self {
        let preference = ThemePreference::default();
        Self {
            preference,
            theme: derived_theme(preference.mode, preference.accent_key),
            revision: 0,
            store,
        }
    }

    /// Builds the manager and restores whatever was persisted.
    pub fn restore(store: S) -> Self {
        let mut manager = Self::new(store);
        manager.load_persisted();
        manager
    }

    pub fn preference(&self) -> ThemePreference {
        self.preference
    }

    pub fn mode(&self) -> ThemeMode {
        self.preference.mode
    }

    pub fn accent_key(&self) -> &'static str {
        self.preference.accent_key
    }

    pub fn theme(&self) -> &ThemeDescriptor {
        &self.theme
    }

    /// Bumped every time the descriptor is recomputed.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn load_persisted(&mut self) {
        let raw = match self.store.get(PREFERENCES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(err) => {
                log::warn!("failed to read theme preferences: {err:#}");
                return;
            }
        };

        let stored: StoredPreference = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(err) => {
                log::warn!("discarding malformed theme preferences: {err}");
                return;
            }
        };

        let mut next = self.preference;
        next.mode = ThemeMode::from_stored(stored.mode.as_deref().unwrap_or_default());
        match stored.theme_color.as_deref().and_then(accent) {
            Some(pair) => next.accent_key = pair.key,
            None => log::debug!(
                "keeping accent {} over stored {:?}",
                next.accent_key,
                stored.theme_color
            ),
        }

        if next != self.preference {
            self.recompute(next);
        }
    }

    pub fn toggle_mode(&mut self) {
        let next = ThemePreference {
            mode: self.preference.mode.toggled(),
            ..self.preference
        };
        self.apply(next);
    }

    /// Unknown keys are ignored.
    pub fn change_accent(&mut self, key: &str) {
        let Some(pair) = accent(key) else {
            log::debug!("ignoring unknown accent {key:?}");
            return;
        };
        let next = ThemePreference {
            accent_key: pair.key,
            ..self.preference
        };
        self.apply(next);
    }

    pub fn cycle_accent(&mut self) {
        let position = ACCENTS
            .iter()
            .position(|pair| pair.key == self.preference.accent_key)
            .unwrap_or(0);
        let next = ACCENTS[(position + 1) % ACCENTS.len()].key;
        self.change_accent(next);
    }

    fn apply(&mut self, next: ThemePreference) {
        if next == self.preference {
            return;
        }
        self.recompute(next);
        self.persist();
    }

    fn recompute(&mut self, next: ThemePreference) {
        self.preference = next;
        self.theme = derived_theme(next.mode, next.accent_key);
        self.revision += 1;
    }

    fn persist(&mut self) {
        let stored = StoredPreference {
            mode: Some(self.preference.mode.as_str().to_string()),
            theme_color: Some(self.preference.accent_key.to_string()),
        };
        let result = serde_json::to_string(&stored)
            .map_err(anyhow::Error::from)
            .and_then(|json| self.store.set(PREFERENCES_KEY, &json));
        if let Err(err) = result {
            log::warn!("failed to persist theme preferences: {err:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use proptest::prop_assert_eq;

    fn stored(store: &MemoryStore) -> serde_json::Value {
        let raw = store
            .get(PREFERENCES_KEY)
            .expect("get")
            .expect("preferences written");
        serde_json::from_str(&raw).expect("valid json")
    }

    #[test]
    fn defaults_to_light_with_first_accent() {
        let manager = ThemeManager::new(MemoryStore::new());
        assert_eq!(manager.mode(), ThemeMode::Light);
        assert_eq!(manager.accent_key(), "redYellow");
        assert_eq!(manager.theme().accent_name, "Red & Yellow");
    }

    #[test]
    fn toggle_mode_flips_and_persists_full_snapshot() {
        let mut manager = ThemeManager::new(MemoryStore::new());
        manager.toggle_mode();
        assert_eq!(manager.mode(), ThemeMode::Dark);

        let blob = stored(manager.store());
        assert_eq!(blob["mode"], "dark");
        assert_eq!(blob["themeColor"], "redYellow");

        manager.toggle_mode();
        assert_eq!(manager.mode(), ThemeMode::Light);
        assert_eq!(stored(manager.store())["mode"], "light");
        assert_eq!(manager.store().writes(), 2);
    }

    #[test]
    fn unknown_accent_is_a_silent_no_op() {
        let mut manager = ThemeManager::new(MemoryStore::new());
        manager.change_accent("tealCoral");
        let revision = manager.revision();

        manager.change_accent("neonPink");
        assert_eq!(manager.accent_key(), "tealCoral");
        assert_eq!(manager.revision(), revision);
        assert_eq!(manager.store().writes(), 1);
    }

    #[test]
    fn reapplying_current_accent_does_not_write() {
        let mut manager = ThemeManager::new(MemoryStore::new());
        manager.change_accent(DEFAULT_ACCENT);
        assert_eq!(manager.store().writes(), 0);
        assert_eq!(manager.revision(), 0);
    }

    #[test]
    fn load_applies_valid_pair() {
        let store = MemoryStore::with_entry(
            PREFERENCES_KEY,
            r#"{"mode":"dark","themeColor":"purpleTeal"}"#,
        );
        let manager = ThemeManager::restore(store);
        assert_eq!(manager.mode(), ThemeMode::Dark);
        assert_eq!(manager.accent_key(), "purpleTeal");
        assert_eq!(manager.theme().palette.primary.main, Rgba::hex(0x9c64fb));
    }

    #[test]
    fn load_keeps_previous_accent_but_adopts_mode_for_unknown_color() {
        let store = MemoryStore::with_entry(
            PREFERENCES_KEY,
            r#"{"mode":"dark","themeColor":"nonexistent"}"#,
        );
        let manager = ThemeManager::restore(store);
        assert_eq!(manager.mode(), ThemeMode::Dark);
        assert_eq!(manager.accent_key(), DEFAULT_ACCENT);
    }

    #[test]
    fn load_treats_any_non_dark_mode_as_light() {
        let store = MemoryStore::with_entry(
            PREFERENCES_KEY,
            r#"{"mode":"sepia","themeColor":"blueOrange"}"#,
        );
        let manager = ThemeManager::restore(store);
        assert_eq!(manager.mode(), ThemeMode::Light);
        assert_eq!(manager.accent_key(), "blueOrange");
    }

    #[test]
    fn malformed_blob_keeps_defaults_and_does_not_write() {
        let store = MemoryStore::with_entry(PREFERENCES_KEY, "{{{");
        let manager = ThemeManager::restore(store);
        assert_eq!(manager.preference(), ThemePreference::default());
        assert_eq!(manager.store().writes(), 0);
    }

    #[test]
    fn cycle_accent_walks_registry_and_wraps() {
        let mut manager = ThemeManager::new(MemoryStore::new());
        for pair in ACCENTS.iter().skip(1) {
            manager.cycle_accent();
            assert_eq!(manager.accent_key(), pair.key);
        }
        manager.cycle_accent();
        assert_eq!(manager.accent_key(), ACCENTS[0].key);
    }

    #[test]
    fn dark_mode_uses_light_shades_for_main() {
        let theme = derived_theme(ThemeMode::Dark, "greenPurple");
        assert_eq!(theme.palette.primary.main, Rgba::hex(0x66bb6a));
        assert_eq!(theme.palette.secondary.main, Rgba::hex(0x9575cd));
        assert_eq!(theme.palette.background, Rgba::hex(0x121212));
        assert_eq!(theme.components.card.shadow.a, 128);

        let light = derived_theme(ThemeMode::Light, "greenPurple");
        assert_eq!(light.palette.primary.main, Rgba::hex(0x4caf50));
        assert_eq!(light.components.button.primary_hover, Rgba::hex(0x087f23));
    }

    #[test]
    fn alpha_compositing_blends_toward_background() {
        let ink = BLACK.with_alpha(153);
        assert_eq!(ink.over(WHITE), (102, 102, 102));
        assert_eq!(Rgba::hex(0x123456).over(WHITE), (0x12, 0x34, 0x56));
    }

    proptest::proptest! {
        #[test]
        fn unregistered_keys_never_change_accent(key in "[a-zA-Z]{0,16}", start in 0usize..6) {
            let mut manager = ThemeManager::new(MemoryStore::new());
            manager.change_accent(ACCENTS[start].key);
            let before = manager.preference();

            manager.change_accent(&key);
            if accent(&key).is_none() {
                prop_assert_eq!(manager.preference(), before);
            } else {
                prop_assert_eq!(manager.accent_key(), key.as_str());
            }
        }

        #[test]
        fn derived_theme_is_deterministic(dark in proptest::bool::ANY, index in 0usize..6) {
            let mode = if dark { ThemeMode::Dark } else { ThemeMode::Light };
            let key = ACCENTS[index].key;
            prop_assert_eq!(derived_theme(mode, key), derived_theme(mode, key));
        }

        #[test]
        fn persisted_pair_round_trips(toggles in 0usize..4, index in 0usize..6) {
            let mut manager = ThemeManager::new(MemoryStore::new());
            for _ in 0..toggles {
                manager.toggle_mode();
            }
            manager.change_accent(ACCENTS[index].key);

            let expected = manager.preference();
            let reloaded = ThemeManager::restore(manager.store().clone());
            prop_assert_eq!(reloaded.preference(), expected);
        }
    }
}
