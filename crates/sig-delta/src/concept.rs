//! Concept-specific deltas.
//!
//! Each comparable concept (modifiers, types, annotations, ...) gets its own
//! nominal wrapper around [`Delta`]. The wrappers add no behavior: they
//! dereference to the underlying `Delta<T>`, so they can be used anywhere a
//! generic delta is expected, while [`SigDelta`] lets a consumer tell a
//! modifier change from a type change in a mixed collection.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use sig_types::{Annotation, ClassKind, Modifier, TypeParameter, TypeRef};

use crate::delta::{Delta, DeltaKind};
use crate::error::DeltaResult;

/// The comparable concept a leaf delta describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Concept {
    Modifier,
    Type,
    Interface,
    Exception,
    Annotation,
    TypeParameter,
    Value,
    Kind,
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Modifier => "modifier",
            Self::Type => "type",
            Self::Interface => "interface",
            Self::Exception => "exception",
            Self::Annotation => "annotation",
            Self::TypeParameter => "type parameter",
            Self::Value => "value",
            Self::Kind => "kind",
        };
        f.write_str(name)
    }
}

/// A delta with a concept-specific identity.
pub trait ConceptDelta {
    type Value;

    const CONCEPT: Concept;

    /// The underlying generic delta.
    fn delta(&self) -> &Delta<Self::Value>;

    fn concept(&self) -> Concept {
        Self::CONCEPT
    }

    fn kind(&self) -> DeltaKind {
        self.delta().kind()
    }
}

macro_rules! concept_delta {
    ($(#[$meta:meta])* $name:ident($value:ty) => $concept:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Delta<$value>);

        impl $name {
            pub fn new(from: Option<$value>, to: Option<$value>) -> DeltaResult<Self> {
                Delta::new(from, to).map(Self)
            }

            pub fn added(to: $value) -> Self {
                Self(Delta::added(to))
            }

            pub fn removed(from: $value) -> Self {
                Self(Delta::removed(from))
            }

            pub fn changed(from: $value, to: $value) -> Self {
                Self(Delta::changed(from, to))
            }

            pub fn into_delta(self) -> Delta<$value> {
                self.0
            }
        }

        impl ConceptDelta for $name {
            type Value = $value;

            const CONCEPT: Concept = Concept::$concept;

            fn delta(&self) -> &Delta<$value> {
                &self.0
            }
        }

        impl Deref for $name {
            type Target = Delta<$value>;

            fn deref(&self) -> &Delta<$value> {
                &self.0
            }
        }

        impl AsRef<Delta<$value>> for $name {
            fn as_ref(&self) -> &Delta<$value> {
                &self.0
            }
        }

        impl From<Delta<$value>> for $name {
            fn from(delta: Delta<$value>) -> Self {
                Self(delta)
            }
        }

        impl From<$name> for SigDelta {
            fn from(delta: $name) -> Self {
                SigDelta::$concept(delta)
            }
        }
    };
}

concept_delta! {
    /// A modifier present on one side only, e.g. `final` added to a method.
    ModifierDelta(Modifier) => Modifier
}

concept_delta! {
    /// A field type, return type or superclass change.
    TypeDelta(TypeRef) => Type
}

concept_delta! {
    /// An implemented or extended interface added, removed or re-parameterized.
    InterfaceDelta(TypeRef) => Interface
}

concept_delta! {
    /// A declared exception added, removed or re-parameterized.
    ExceptionDelta(TypeRef) => Exception
}

concept_delta! {
    AnnotationDelta(Annotation) => Annotation
}

concept_delta! {
    /// A generic type parameter added, removed or re-bounded.
    TypeParameterDelta(TypeParameter) => TypeParameter
}

concept_delta! {
    /// A constant value or enum constant change.
    ValueDelta(String) => Value
}

concept_delta! {
    /// A class turned into an interface, enum or annotation type (or back).
    KindDelta(ClassKind) => Kind
}

/// A leaf delta of any concept.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "concept", content = "delta", rename_all = "snake_case")]
pub enum SigDelta {
    Modifier(ModifierDelta),
    Type(TypeDelta),
    Interface(InterfaceDelta),
    Exception(ExceptionDelta),
    Annotation(AnnotationDelta),
    TypeParameter(TypeParameterDelta),
    Value(ValueDelta),
    Kind(KindDelta),
}

impl SigDelta {
    pub fn concept(&self) -> Concept {
        match self {
            Self::Modifier(d) => d.concept(),
            Self::Type(d) => d.concept(),
            Self::Interface(d) => d.concept(),
            Self::Exception(d) => d.concept(),
            Self::Annotation(d) => d.concept(),
            Self::TypeParameter(d) => d.concept(),
            Self::Value(d) => d.concept(),
            Self::Kind(d) => d.concept(),
        }
    }

    pub fn kind(&self) -> DeltaKind {
        match self {
            Self::Modifier(d) => d.kind(),
            Self::Type(d) => d.kind(),
            Self::Interface(d) => d.kind(),
            Self::Exception(d) => d.kind(),
            Self::Annotation(d) => d.kind(),
            Self::TypeParameter(d) => d.kind(),
            Self::Value(d) => d.kind(),
            Self::Kind(d) => d.kind(),
        }
    }

    pub fn is_modifier(&self) -> bool {
        matches!(self, Self::Modifier(_))
    }

    pub fn as_modifier(&self) -> Option<&ModifierDelta> {
        match self {
            Self::Modifier(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&TypeDelta> {
        match self {
            Self::Type(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&ValueDelta> {
        match self {
            Self::Value(d) => Some(d),
            _ => None,
        }
    }

    /// One-line human description, e.g. `modifier final added` or
    /// `type changed: int -> long`.
    pub fn describe(&self) -> String {
        match self {
            Self::Modifier(d) => describe(self.concept(), d.delta()),
            Self::Type(d) => describe(self.concept(), d.delta()),
            Self::Interface(d) => describe(self.concept(), d.delta()),
            Self::Exception(d) => describe(self.concept(), d.delta()),
            Self::Annotation(d) => describe(self.concept(), d.delta()),
            Self::TypeParameter(d) => describe(self.concept(), d.delta()),
            Self::Value(d) => describe(self.concept(), d.delta()),
            Self::Kind(d) => describe(self.concept(), d.delta()),
        }
    }
}

impl fmt::Display for SigDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

fn describe<T: fmt::Display>(concept: Concept, delta: &Delta<T>) -> String {
    match (delta.from(), delta.to()) {
        (Some(from), Some(to)) => format!("{concept} changed: {from} -> {to}"),
        (None, Some(to)) => format!("{concept} {to} added"),
        (Some(from), None) => format!("{concept} {from} removed"),
        (None, None) => format!("{concept} (empty)"),
    }
}
