//! API snapshot model for sigdiff.
//!
//! An API snapshot is a parsed, in-memory description of a library's public
//! surface at one point in time. Every other sigdiff crate depends on
//! `sig-types`.
//!
//! # Key Types
//!
//! - [`ApiSnapshot`] -- Root of a snapshot: named, versioned list of packages
//! - [`Package`] / [`ClassDecl`] -- Containers of declarations
//! - [`Field`] / [`Method`] / [`Constructor`] -- Member declarations
//! - [`Modifier`] / [`Visibility`] -- Declaration-level attributes
//! - [`TypeRef`] -- Parsed Java-style type reference (`java.util.List<T>[]`)
//! - [`SnapshotDigest`] -- BLAKE3 content digest of a snapshot

pub mod decl;
pub mod error;
pub mod modifier;
pub mod snapshot;
pub mod type_ref;

pub use decl::{
    Annotation, ClassDecl, ClassKind, Constructor, Declaration, Field, Method, Package,
    Parameter, TypeParameter,
};
pub use error::TypeError;
pub use modifier::{Modifier, Visibility};
pub use snapshot::{ApiSnapshot, SnapshotDigest};
pub use type_ref::{Primitive, TypeRef};
