//! Signature delta model for sigdiff.
//!
//! Compares two [`ApiSnapshot`](sig_types::ApiSnapshot)s and describes every
//! structural difference as a tree of deltas: packages contain classes,
//! classes contain members, and every changed element carries the leaf
//! deltas (modifiers, types, annotations, ...) that explain the change.
//!
//! # Key Types
//!
//! - [`Delta`] -- Generic `(from, to)` pair with at least one side present
//! - [`ModifierDelta`] / [`TypeDelta`] / [`SigDelta`] -- Concept-specific leaf deltas
//! - [`ApiDelta`] / [`ClassDelta`] / [`MethodDelta`] -- Aggregate deltas
//! - [`ApiComparator`] / [`CompareConfig`] -- The comparison routine and its options
//! - [`DeltaSummary`] -- Counts and compatibility classification

pub mod compare;
pub mod concept;
pub mod config;
pub mod delta;
pub mod error;
pub mod model;
pub mod report;
pub mod summary;

pub use compare::ApiComparator;
pub use concept::{
    AnnotationDelta, Concept, ConceptDelta, ExceptionDelta, InterfaceDelta, KindDelta,
    ModifierDelta, SigDelta, TypeDelta, TypeParameterDelta, ValueDelta,
};
pub use config::CompareConfig;
pub use delta::{Delta, DeltaKind};
pub use error::{DeltaError, DeltaResult};
pub use model::{
    ApiDelta, ClassDelta, ConstructorDelta, ElementDelta, FieldDelta, MethodDelta, PackageDelta,
};
pub use report::{render_json, render_text};
pub use summary::{
    BreakingChange, Compatibility, DeltaSummary, ElementCounts, ExceptionHierarchy,
};
