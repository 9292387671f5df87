use serde::{Deserialize, Serialize};

/// Platform/console identifiers for every system the catalog can classify.
///
/// Centralizes console identity (short names, display names, manufacturer,
/// aliases and file extensions) so the rest of the pipeline never matches
/// on raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    // Nintendo
    #[serde(rename = "nes")]
    Nes,
    #[serde(rename = "snes")]
    Snes,
    #[serde(rename = "gb")]
    GameBoy,
    #[serde(rename = "gbc")]
    GameBoyColor,
    #[serde(rename = "gba")]
    Gba,
    #[serde(rename = "n64")]
    N64,
    #[serde(rename = "gamecube")]
    GameCube,
    #[serde(rename = "wii")]
    Wii,
    #[serde(rename = "nds")]
    Ds,
    #[serde(rename = "3ds")]
    N3ds,
    #[serde(rename = "switch")]
    Switch,

    // Sega
    #[serde(rename = "sms")]
    MasterSystem,
    #[serde(rename = "gamegear")]
    GameGear,
    #[serde(rename = "genesis")]
    Genesis,
    #[serde(rename = "32x")]
    Sega32x,
    #[serde(rename = "saturn")]
    Saturn,
    #[serde(rename = "dreamcast")]
    Dreamcast,

    // Sony
    #[serde(rename = "ps1")]
    Ps1,
    #[serde(rename = "psp")]
    Psp,
    #[serde(rename = "vita")]
    Vita,

    // Atari
    #[serde(rename = "atari2600")]
    Atari2600,
    #[serde(rename = "atari7800")]
    Atari7800,
    #[serde(rename = "lynx")]
    Lynx,
    #[serde(rename = "jaguar")]
    Jaguar,

    // Archive bucket
    #[serde(rename = "arcade")]
    Arcade,
}

/// All platform variants in registration order.
const ALL_PLATFORMS: &[Platform] = &[
    Platform::Nes,
    Platform::Snes,
    Platform::GameBoy,
    Platform::GameBoyColor,
    Platform::Gba,
    Platform::N64,
    Platform::GameCube,
    Platform::Wii,
    Platform::Ds,
    Platform::N3ds,
    Platform::Switch,
    Platform::MasterSystem,
    Platform::GameGear,
    Platform::Genesis,
    Platform::Sega32x,
    Platform::Saturn,
    Platform::Dreamcast,
    Platform::Ps1,
    Platform::Psp,
    Platform::Vita,
    Platform::Atari2600,
    Platform::Atari7800,
    Platform::Lynx,
    Platform::Jaguar,
    Platform::Arcade,
];

/// Extension → platform table.
///
/// Extensions shared by several systems resolve to the most common one:
/// `.bin` → Genesis, `.cue`/`.chd` → PlayStation, `.rvz` → GameCube,
/// `.mdf`/`.mds` → Saturn, `.zip`/`.7z` → arcade. These are lossy guesses and
/// existing snapshots depend on them, so the assignments must not change.
const EXTENSION_TABLE: &[(&str, Platform)] = &[
    (".nes", Platform::Nes),
    (".fds", Platform::Nes),
    (".unf", Platform::Nes),
    (".sfc", Platform::Snes),
    (".smc", Platform::Snes),
    (".gb", Platform::GameBoy),
    (".gbc", Platform::GameBoyColor),
    (".gba", Platform::Gba),
    (".n64", Platform::N64),
    (".z64", Platform::N64),
    (".v64", Platform::N64),
    (".gcm", Platform::GameCube),
    (".gcz", Platform::GameCube),
    (".rvz", Platform::GameCube),
    (".wbfs", Platform::Wii),
    (".wad", Platform::Wii),
    (".nds", Platform::Ds),
    (".3ds", Platform::N3ds),
    (".cia", Platform::N3ds),
    (".nsp", Platform::Switch),
    (".xci", Platform::Switch),
    (".sms", Platform::MasterSystem),
    (".gg", Platform::GameGear),
    (".md", Platform::Genesis),
    (".gen", Platform::Genesis),
    (".smd", Platform::Genesis),
    (".bin", Platform::Genesis),
    (".32x", Platform::Sega32x),
    (".mdf", Platform::Saturn),
    (".mds", Platform::Saturn),
    (".cdi", Platform::Dreamcast),
    (".gdi", Platform::Dreamcast),
    (".cue", Platform::Ps1),
    (".chd", Platform::Ps1),
    (".pbp", Platform::Psp),
    (".cso", Platform::Psp),
    (".vpk", Platform::Vita),
    (".a26", Platform::Atari2600),
    (".a78", Platform::Atari7800),
    (".lnx", Platform::Lynx),
    (".j64", Platform::Jaguar),
    (".jag", Platform::Jaguar),
    (".zip", Platform::Arcade),
    (".7z", Platform::Arcade),
];

/// Extensions too ambiguous to guess a platform for. Always "no match".
const UNCLASSIFIABLE_EXTENSIONS: &[&str] = &[".iso"];

impl Platform {
    /// Canonical short name used in snapshots and identifiers.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Nes => "nes",
            Self::Snes => "snes",
            Self::GameBoy => "gb",
            Self::GameBoyColor => "gbc",
            Self::Gba => "gba",
            Self::N64 => "n64",
            Self::GameCube => "gamecube",
            Self::Wii => "wii",
            Self::Ds => "nds",
            Self::N3ds => "3ds",
            Self::Switch => "switch",
            Self::MasterSystem => "sms",
            Self::GameGear => "gamegear",
            Self::Genesis => "genesis",
            Self::Sega32x => "32x",
            Self::Saturn => "saturn",
            Self::Dreamcast => "dreamcast",
            Self::Ps1 => "ps1",
            Self::Psp => "psp",
            Self::Vita => "vita",
            Self::Atari2600 => "atari2600",
            Self::Atari7800 => "atari7800",
            Self::Lynx => "lynx",
            Self::Jaguar => "jaguar",
            Self::Arcade => "arcade",
        }
    }

    /// Full display name for the platform.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Nes => "Nintendo Entertainment System",
            Self::Snes => "Super Nintendo Entertainment System",
            Self::GameBoy => "Game Boy",
            Self::GameBoyColor => "Game Boy Color",
            Self::Gba => "Game Boy Advance",
            Self::N64 => "Nintendo 64",
            Self::GameCube => "Nintendo GameCube",
            Self::Wii => "Nintendo Wii",
            Self::Ds => "Nintendo DS",
            Self::N3ds => "Nintendo 3DS",
            Self::Switch => "Nintendo Switch",
            Self::MasterSystem => "Sega Master System",
            Self::GameGear => "Sega Game Gear",
            Self::Genesis => "Sega Genesis / Mega Drive",
            Self::Sega32x => "Sega 32X",
            Self::Saturn => "Sega Saturn",
            Self::Dreamcast => "Sega Dreamcast",
            Self::Ps1 => "Sony PlayStation",
            Self::Psp => "Sony PlayStation Portable",
            Self::Vita => "Sony PlayStation Vita",
            Self::Atari2600 => "Atari 2600",
            Self::Atari7800 => "Atari 7800",
            Self::Lynx => "Atari Lynx",
            Self::Jaguar => "Atari Jaguar",
            Self::Arcade => "Arcade",
        }
    }

    /// Console manufacturer.
    pub fn manufacturer(&self) -> &'static str {
        match self {
            Self::Nes
            | Self::Snes
            | Self::GameBoy
            | Self::GameBoyColor
            | Self::Gba
            | Self::N64
            | Self::GameCube
            | Self::Wii
            | Self::Ds
            | Self::N3ds
            | Self::Switch => "Nintendo",

            Self::MasterSystem
            | Self::GameGear
            | Self::Genesis
            | Self::Sega32x
            | Self::Saturn
            | Self::Dreamcast => "Sega",

            Self::Ps1 | Self::Psp | Self::Vita => "Sony",

            Self::Atari2600 | Self::Atari7800 | Self::Lynx | Self::Jaguar => "Atari",

            Self::Arcade => "Various",
        }
    }

    /// All accepted names for this platform (case-insensitive matching).
    ///
    /// The canonical short name always comes first.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Nes => &["nes", "famicom", "fc"],
            Self::Snes => &["snes", "sfc", "super famicom", "super nintendo"],
            Self::GameBoy => &["gb", "gameboy", "game boy"],
            Self::GameBoyColor => &["gbc", "gameboy color", "game boy color"],
            Self::Gba => &["gba", "game boy advance", "gameboy advance"],
            Self::N64 => &["n64", "nintendo 64", "nintendo64"],
            Self::GameCube => &["gamecube", "gcn", "gc", "ngc"],
            Self::Wii => &["wii"],
            Self::Ds => &["nds", "ds", "nintendo ds"],
            Self::N3ds => &["3ds", "nintendo 3ds", "n3ds"],
            Self::Switch => &["switch", "nintendo switch", "nsw"],
            Self::MasterSystem => &["sms", "master system", "mastersystem", "mark iii"],
            Self::GameGear => &["gamegear", "game gear", "gg"],
            Self::Genesis => &["genesis", "megadrive", "mega drive", "md", "gen"],
            Self::Sega32x => &["32x", "sega32x", "sega 32x"],
            Self::Saturn => &["saturn", "sega saturn"],
            Self::Dreamcast => &["dreamcast", "dc"],
            Self::Ps1 => &["ps1", "psx", "playstation", "playstation1"],
            Self::Psp => &["psp", "playstation portable"],
            Self::Vita => &["vita", "psvita", "ps vita", "playstation vita"],
            Self::Atari2600 => &["atari2600", "2600", "vcs"],
            Self::Atari7800 => &["atari7800", "7800"],
            Self::Lynx => &["lynx", "atari lynx"],
            Self::Jaguar => &["jaguar", "atari jaguar"],
            Self::Arcade => &["arcade", "mame"],
        }
    }

    /// All platform variants.
    pub fn all() -> &'static [Platform] {
        ALL_PLATFORMS
    }

    /// Classify a file extension (case-insensitive, leading dot optional).
    ///
    /// Returns `None` for unknown extensions and for extensions that are
    /// deliberately left unclassified (raw `.iso` disc images).
    pub fn from_extension(extension: &str) -> Option<Platform> {
        let ext = normalize_extension(extension)?;
        if UNCLASSIFIABLE_EXTENSIONS.contains(&ext.as_str()) {
            return None;
        }
        EXTENSION_TABLE
            .iter()
            .find(|(candidate, _)| *candidate == ext)
            .map(|&(_, platform)| platform)
    }

    /// Every extension the classifier knows, in table order.
    ///
    /// This is the default supported-extension set for a scan.
    pub fn known_extensions() -> Vec<&'static str> {
        EXTENSION_TABLE.iter().map(|(ext, _)| *ext).collect()
    }

    /// Extensions that classify to this platform.
    pub fn file_extensions(&self) -> Vec<&'static str> {
        EXTENSION_TABLE
            .iter()
            .filter(|(_, platform)| platform == self)
            .map(|(ext, _)| *ext)
            .collect()
    }
}

/// Free-function form of [`Platform::from_extension`].
pub fn infer_platform(extension: &str) -> Option<Platform> {
    Platform::from_extension(extension)
}

/// Lower-case an extension and make sure it carries a leading dot.
///
/// Returns `None` for an empty (or dot-only) extension.
pub fn normalize_extension(extension: &str) -> Option<String> {
    let trimmed = extension.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(".{}", trimmed.to_lowercase()))
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Error returned when a string cannot be parsed into a `Platform`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformParseError(pub String);

impl std::fmt::Display for PlatformParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown platform: '{}'", self.0)
    }
}

impl std::error::Error for PlatformParseError {}

impl std::str::FromStr for Platform {
    type Err = PlatformParseError;

    /// Parse a platform from any recognized name (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        ALL_PLATFORMS
            .iter()
            .copied()
            .find(|platform| platform.aliases().contains(&lower.as_str()))
            .ok_or_else(|| PlatformParseError(s.to_string()))
    }
}

#[cfg(test)]
#[path = "tests/platform_tests.rs"]
mod tests;
