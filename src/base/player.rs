use super::board::Symbol;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerKind {
    /// The player sitting in front of this window.
    #[serde(rename = "personalPlayer")]
    Personal,
    /// The remote peer whose moves arrive through the socket.
    #[serde(rename = "computerPlayer")]
    Computer,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub name: String,
    pub symbol: Symbol,
    /// `0xRRGGBB`
    pub color: u32,
    pub kind: PlayerKind,
}

impl Player {
    pub fn personal(name: impl Into<String>, color: u32) -> Self {
        Self {
            name: name.into(),
            symbol: Symbol::X,
            color,
            kind: PlayerKind::Personal,
        }
    }

    pub fn computer(name: impl Into<String>, color: u32) -> Self {
        Self {
            name: name.into(),
            symbol: Symbol::O,
            color,
            kind: PlayerKind::Computer,
        }
    }

    pub fn is_computer(&self) -> bool {
        self.kind == PlayerKind::Computer
    }

    /// `#rrggbb`, the form the server expects.
    pub fn color_hex(&self) -> String {
        format!("#{:06x}", self.color & 0xFF_FFFF)
    }
}
