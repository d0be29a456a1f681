//! Platform tag used for installer dispatch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::IntoEnumIterator;

/// The platform family an installation runs on.
///
/// Recipes branch on this tag through [`when`](crate::when) and
/// [`on`](crate::on). The set is closed: every dispatch table can be
/// checked for completeness against [`Platform::all()`].
///
/// # Example
///
/// ```rust
/// use install_pipeline::Platform;
///
/// assert_eq!(Platform::Unix.tag(), "unix");
/// assert_eq!("win".parse::<Platform>().unwrap(), Platform::Windows);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Linux, macOS and the BSDs.
    Unix,
    /// Windows.
    #[serde(rename = "win")]
    Windows,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    /// Short tag for the platform (`"unix"` or `"win"`).
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Unix => "unix",
            Self::Windows => "win",
        }
    }

    /// Iterator over every supported platform.
    pub fn all() -> impl Iterator<Item = Self> {
        <Self as IntoEnumIterator>::iter()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Error returned when parsing an unknown platform tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform tag: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unix" => Ok(Self::Unix),
            "win" | "windows" => Ok(Self::Windows),
            other => Err(UnknownPlatform(other.to_string())),
        }
    }
}
