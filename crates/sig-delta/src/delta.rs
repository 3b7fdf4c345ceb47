//! The generic comparison result.
//!
//! A [`Delta`] records one structural difference between corresponding
//! elements of two API snapshots: the value in the baseline snapshot
//! (`from`) and the value in the new snapshot (`to`). An absent side is
//! `None`:
//!
//! | `from`  | `to`    | meaning  |
//! |---------|---------|----------|
//! | `None`  | `Some`  | added    |
//! | `Some`  | `None`  | removed  |
//! | `Some`  | `Some`  | changed  |
//!
//! A delta never has both sides absent. It does not collapse equal values:
//! filtering unchanged elements is the job of the comparison routine, which
//! uses [`Delta::between`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DeltaError, DeltaResult};

/// Which of the three comparison outcomes a delta represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaKind {
    Added,
    Removed,
    Changed,
}

impl DeltaKind {
    /// Single-character marker used in text reports.
    pub fn symbol(&self) -> char {
        match self {
            Self::Added => '+',
            Self::Removed => '-',
            Self::Changed => '~',
        }
    }
}

impl fmt::Display for DeltaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Removed => write!(f, "removed"),
            Self::Changed => write!(f, "changed"),
        }
    }
}

/// An immutable `(from, to)` pair with at least one side present.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DeltaParts<T>", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Delta<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<T>,
}

impl<T> Delta<T> {
    /// Build a delta from the two sides exactly as given.
    ///
    /// Fails only when both sides are absent.
    pub fn new(from: Option<T>, to: Option<T>) -> DeltaResult<Self> {
        if from.is_none() && to.is_none() {
            return Err(DeltaError::EmptyDelta);
        }
        Ok(Self { from, to })
    }

    /// An element present only in the new snapshot.
    pub fn added(to: T) -> Self {
        Self {
            from: None,
            to: Some(to),
        }
    }

    /// An element present only in the baseline snapshot.
    pub fn removed(from: T) -> Self {
        Self {
            from: Some(from),
            to: None,
        }
    }

    /// An element present on both sides. The values are not compared.
    pub fn changed(from: T, to: T) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// The value in the baseline snapshot, absent for an addition.
    pub fn from(&self) -> Option<&T> {
        self.from.as_ref()
    }

    /// The value in the new snapshot, absent for a removal.
    pub fn to(&self) -> Option<&T> {
        self.to.as_ref()
    }

    pub fn kind(&self) -> DeltaKind {
        match (&self.from, &self.to) {
            (None, _) => DeltaKind::Added,
            (_, None) => DeltaKind::Removed,
            _ => DeltaKind::Changed,
        }
    }

    pub fn is_added(&self) -> bool {
        self.kind() == DeltaKind::Added
    }

    pub fn is_removed(&self) -> bool {
        self.kind() == DeltaKind::Removed
    }

    pub fn is_changed(&self) -> bool {
        self.kind() == DeltaKind::Changed
    }

    /// The most recent value: `to` if present, otherwise `from`.
    pub fn latest(&self) -> &T {
        match (&self.to, &self.from) {
            (Some(to), _) => to,
            (None, Some(from)) => from,
            (None, None) => unreachable!("delta with both sides absent"),
        }
    }

    pub fn into_parts(self) -> (Option<T>, Option<T>) {
        (self.from, self.to)
    }

    /// Borrow both sides.
    pub fn as_borrowed(&self) -> Delta<&T> {
        Delta {
            from: self.from.as_ref(),
            to: self.to.as_ref(),
        }
    }

    /// Transform both sides, preserving which sides are present.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Delta<U> {
        Delta {
            from: self.from.map(&mut f),
            to: self.to.map(&mut f),
        }
    }
}

impl<T: PartialEq> Delta<T> {
    /// Build a delta only if the two sides differ.
    ///
    /// Returns `None` when both sides are absent, or both are present and
    /// equal. This is the filter the comparison routine applies before any
    /// delta is constructed.
    pub fn between(from: Option<T>, to: Option<T>) -> Option<Self> {
        if from == to {
            return None;
        }
        Some(Self { from, to })
    }
}

#[derive(Deserialize)]
struct DeltaParts<T> {
    from: Option<T>,
    to: Option<T>,
}

impl<T> TryFrom<DeltaParts<T>> for Delta<T> {
    type Error = DeltaError;

    fn try_from(parts: DeltaParts<T>) -> Result<Self, Self::Error> {
        Self::new(parts.from, parts.to)
    }
}
