use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A declaration-level modifier keyword.
///
/// Modifiers are stored as sets on declarations; the ordering below is the
/// conventional source order and is used when rendering a set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Abstract,
    Static,
    Final,
    Default,
    Synchronized,
    Native,
    Transient,
    Volatile,
    Strictfp,
}

impl Modifier {
    /// Every modifier, in source order.
    pub const ALL: [Modifier; 12] = [
        Modifier::Public,
        Modifier::Protected,
        Modifier::Private,
        Modifier::Abstract,
        Modifier::Static,
        Modifier::Final,
        Modifier::Default,
        Modifier::Synchronized,
        Modifier::Native,
        Modifier::Transient,
        Modifier::Volatile,
        Modifier::Strictfp,
    ];

    /// The source keyword for this modifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
            Self::Abstract => "abstract",
            Self::Static => "static",
            Self::Final => "final",
            Self::Default => "default",
            Self::Synchronized => "synchronized",
            Self::Native => "native",
            Self::Transient => "transient",
            Self::Volatile => "volatile",
            Self::Strictfp => "strictfp",
        }
    }

    /// Returns `true` for `public`, `protected` and `private`.
    pub fn is_visibility(&self) -> bool {
        matches!(self, Self::Public | Self::Protected | Self::Private)
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modifier {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Modifier::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| TypeError::UnknownModifier(s.to_string()))
    }
}

/// Access level of a declaration, ordered from least to most visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Package,
    Protected,
    Public,
}

impl Visibility {
    /// Derive the visibility implied by a modifier set.
    ///
    /// A set without any visibility keyword is package-private.
    pub fn of(modifiers: &BTreeSet<Modifier>) -> Self {
        if modifiers.contains(&Modifier::Public) {
            Self::Public
        } else if modifiers.contains(&Modifier::Protected) {
            Self::Protected
        } else if modifiers.contains(&Modifier::Private) {
            Self::Private
        } else {
            Self::Package
        }
    }

    /// The modifier keyword for this visibility, if it has one.
    pub fn modifier(&self) -> Option<Modifier> {
        match self {
            Self::Public => Some(Modifier::Public),
            Self::Protected => Some(Modifier::Protected),
            Self::Private => Some(Modifier::Private),
            Self::Package => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Package => "package",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "protected" => Ok(Self::Protected),
            "package" | "package-private" => Ok(Self::Package),
            "private" => Ok(Self::Private),
            other => Err(TypeError::UnknownVisibility(other.to_string())),
        }
    }
}
