//! Named extension presets

use super::SyncConfig;
use clap::ValueEnum;

/// Shorthand for a group of file types
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    Documents,
    Images,
    Music,
    Videos,
    Code,
    /// Visual Studio solution: skips user files and build output
    Vs,
    /// UWP project: like `vs`, plus signing keys and packaging output
    Uwp,
}

/// Filters a preset stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetExpansion {
    pub include: &'static [&'static str],
    pub exclude: &'static [&'static str],
    pub directories: &'static [&'static str],
}

const DOCUMENTS: &[&str] = &[
    "doc", "docx", "txt", "rtf", "tex", "csv", "pps", "ppsx", "ppt", "pptx", "xls", "xlsx", "xlr",
    "odt", "pdf",
];

const IMAGES: &[&str] = &[
    "ai", "bmp", "gif", "ico", "jpeg", "jpg", "png", "ps", "psd", "svg", "tif", "tiff", "tga",
    "yuv",
];

const MUSIC: &[&str] = &[
    "aif", "cda", "mid", "midi", "mp3", "mpa", "ogg", "wav", "wma", "wpl", "flac", "iff", "m3u",
    "m4a",
];

const VIDEOS: &[&str] = &[
    "3g2", "3gp", "avi", "flv", "h264", "m4v", "mkv", "mov", "mp4", "mpg", "mpeg", "rm", "swf",
    "vob", "wmv", "asf", "srt",
];

const CODE: &[&str] = &[
    "c", "class", "cpp", "cc", "cu", "cs", "h", "java", "sh", "swift", "vb", "rb", "asp", "aspx",
    "css", "htm", "html", "js", "jsp", "php", "xml", "xaml", "lua", "m", "pl", "py", "pyc",
];

const VS_EXCLUDE: &[&str] = &["user", "suo"];
const VS_DIRS: &[&str] = &[".git", ".vs", "bin", "obj"];
const UWP_EXCLUDE: &[&str] = &["user", "suo", "pfx"];
const UWP_DIRS: &[&str] = &[".git", ".vs", "bin", "obj", "Builds", "BundleArtifacts"];

impl Preset {
    pub fn expand(self) -> PresetExpansion {
        match self {
            Preset::Documents => PresetExpansion::inclusions(DOCUMENTS),
            Preset::Images => PresetExpansion::inclusions(IMAGES),
            Preset::Music => PresetExpansion::inclusions(MUSIC),
            Preset::Videos => PresetExpansion::inclusions(VIDEOS),
            Preset::Code => PresetExpansion::inclusions(CODE),
            Preset::Vs => PresetExpansion {
                include: &[],
                exclude: VS_EXCLUDE,
                directories: VS_DIRS,
            },
            Preset::Uwp => PresetExpansion {
                include: &[],
                exclude: UWP_EXCLUDE,
                directories: UWP_DIRS,
            },
        }
    }
}

impl PresetExpansion {
    const fn inclusions(include: &'static [&'static str]) -> Self {
        Self {
            include,
            exclude: &[],
            directories: &[],
        }
    }

    /// Overwrite the filter lists of `config` with this expansion.
    pub fn apply_to(&self, config: &mut SyncConfig) {
        let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        config.include = owned(self.include);
        config.exclude = owned(self.exclude);
        config.excluded_dirs = owned(self.directories);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_presets_only_include() {
        for preset in [
            Preset::Documents,
            Preset::Images,
            Preset::Music,
            Preset::Videos,
            Preset::Code,
        ] {
            let expansion = preset.expand();
            assert!(!expansion.include.is_empty(), "{:?} should include", preset);
            assert!(expansion.exclude.is_empty());
            assert!(expansion.directories.is_empty());
        }
    }

    #[test]
    fn test_special_presets_never_mix_include_and_exclude() {
        for preset in [Preset::Vs, Preset::Uwp] {
            let expansion = preset.expand();
            assert!(expansion.include.is_empty());
            assert!(!expansion.exclude.is_empty());
            assert!(expansion.directories.contains(&".git"));
        }
    }

    #[test]
    fn test_uwp_extends_vs() {
        let vs = Preset::Vs.expand();
        let uwp = Preset::Uwp.expand();
        assert!(vs.exclude.iter().all(|e| uwp.exclude.contains(e)));
        assert!(vs.directories.iter().all(|d| uwp.directories.contains(d)));
        assert!(uwp.directories.contains(&"BundleArtifacts"));
    }

    #[test]
    fn test_preset_parses_case_insensitively() {
        let preset = Preset::from_str("MUSIC", true).expect("parse preset");
        assert_eq!(preset, Preset::Music);
        assert!(preset.expand().include.contains(&"flac"));
    }
}
