use serde::{Deserialize, Serialize};

/// Adaptive-bitrate width variants the manifest resolver is willing to probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "720w")]
    W720,
    #[serde(rename = "540w")]
    W540,
    #[serde(rename = "360w")]
    W360,
    #[serde(rename = "240w")]
    W240,
}

impl Quality {
    /// Highest first.
    pub const ALL: [Quality; 4] = [Quality::W720, Quality::W540, Quality::W360, Quality::W240];

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::W720 => "720w",
            Quality::W540 => "540w",
            Quality::W360 => "360w",
            Quality::W240 => "240w",
        }
    }

    /// Substring that marks this variant's sub-manifest in a master playlist.
    pub fn marker(&self) -> String {
        format!("_{}.m3u8", self.as_str())
    }

    /// Sub-manifest file name for this variant, derived from the master's file name.
    pub fn sub_manifest_name(&self, manifest_name: &str) -> String {
        manifest_name.replace(".m3u8", &self.marker())
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
