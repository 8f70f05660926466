use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Wire revisions the model can render, newest first.
pub const SUPPORTED_VERSIONS: [Version; 6] = [
    Version::V1_0_3,
    Version::V1_0_2,
    Version::V1_0_1,
    Version::V1_0_0,
    Version::V0_95,
    Version::V0_9,
];

/// A negotiated revision of the statement wire format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Version {
    V0_9,
    V0_95,
    V1_0_0,
    V1_0_1,
    V1_0_2,
    V1_0_3,
}

/// The two query-parameter tables a version can map to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VersionFamily {
    Pre1,
    V1,
}

impl Version {
    pub const LATEST: Version = Version::V1_0_3;

    pub fn as_str(self) -> &'static str {
        match self {
            Self::V0_9 => "0.9",
            Self::V0_95 => "0.95",
            Self::V1_0_0 => "1.0.0",
            Self::V1_0_1 => "1.0.1",
            Self::V1_0_2 => "1.0.2",
            Self::V1_0_3 => "1.0.3",
        }
    }

    pub fn family(self) -> VersionFamily {
        match self {
            Self::V0_9 | Self::V0_95 => VersionFamily::Pre1,
            _ => VersionFamily::V1,
        }
    }

    /// The oldest revision: short-form vocabulary, renamed account fields, no
    /// version header.
    pub fn is_legacy(self) -> bool {
        self == Self::V0_9
    }

    pub fn is_pre_1_0(self) -> bool {
        self.family() == VersionFamily::Pre1
    }

    /// Header value sent with every request, `None` for the oldest revision.
    pub fn header_value(self) -> Option<&'static str> {
        if self.is_legacy() {
            None
        } else {
            Some(self.as_str())
        }
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::LATEST
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Version {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        SUPPORTED_VERSIONS
            .iter()
            .copied()
            .find(|version| version.as_str() == value)
            .ok_or_else(|| ModelError::UnsupportedVersion(value.to_string()))
    }
}
