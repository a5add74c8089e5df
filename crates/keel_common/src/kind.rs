//! Kinds of top-level declarations found in contract sources.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of a top-level declaration.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    /// A deployable contract (including abstract contracts).
    Contract,
    /// A library, linked into contracts by address.
    Library,
    /// An interface with no implementation.
    Interface,
}

impl DeclarationKind {
    /// Returns the source keyword introducing this kind of declaration.
    pub fn keyword(self) -> &'static str {
        match self {
            DeclarationKind::Contract => "contract",
            DeclarationKind::Library => "library",
            DeclarationKind::Interface => "interface",
        }
    }
}

impl FromStr for DeclarationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contract" => Ok(DeclarationKind::Contract),
            "library" => Ok(DeclarationKind::Library),
            "interface" => Ok(DeclarationKind::Interface),
            other => Err(format!("unknown declaration kind '{other}'")),
        }
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
