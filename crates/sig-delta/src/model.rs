//! Aggregate deltas: one per declaration level.
//!
//! An aggregate owns the generic delta of its declaration plus the child
//! deltas describing what changed inside it. Added and removed declarations
//! carry no children; a changed declaration has at least one child.

use serde::{Deserialize, Serialize};
use sig_types::{ClassDecl, Constructor, Field, Method, Package, SnapshotDigest};

use crate::concept::SigDelta;
use crate::delta::{Delta, DeltaKind};

/// Shared surface of every aggregate delta.
pub trait ElementDelta {
    type Element;

    /// The key the element was matched by (name or erased signature).
    fn key(&self) -> &str;

    fn delta(&self) -> &Delta<Self::Element>;

    /// Attribute-level changes of this element.
    fn changes(&self) -> &[SigDelta];

    fn kind(&self) -> DeltaKind {
        self.delta().kind()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDelta {
    pub name: String,
    pub delta: Delta<Field>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<SigDelta>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDelta {
    /// Erased signature, e.g. `get(int)`.
    pub signature: String,
    pub delta: Delta<Method>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<SigDelta>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorDelta {
    /// Erased parameter list, e.g. `(java.lang.String)`.
    pub signature: String,
    pub delta: Delta<Constructor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<SigDelta>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDelta {
    pub name: String,
    pub delta: Delta<ClassDecl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<SigDelta>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_deltas: Vec<FieldDelta>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constructor_deltas: Vec<ConstructorDelta>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub method_deltas: Vec<MethodDelta>,
}

impl ClassDelta {
    /// Number of member-level deltas (fields, constructors, methods).
    pub fn member_count(&self) -> usize {
        self.field_deltas.len() + self.constructor_deltas.len() + self.method_deltas.len()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDelta {
    pub name: String,
    pub delta: Delta<Package>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<SigDelta>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub class_deltas: Vec<ClassDelta>,
}

macro_rules! impl_element_delta {
    ($ty:ty, $element:ty, $key:ident) => {
        impl ElementDelta for $ty {
            type Element = $element;

            fn key(&self) -> &str {
                &self.$key
            }

            fn delta(&self) -> &Delta<$element> {
                &self.delta
            }

            fn changes(&self) -> &[SigDelta] {
                &self.changes
            }
        }
    };
}

impl_element_delta!(FieldDelta, Field, name);
impl_element_delta!(MethodDelta, Method, signature);
impl_element_delta!(ConstructorDelta, Constructor, signature);
impl_element_delta!(ClassDelta, ClassDecl, name);
impl_element_delta!(PackageDelta, Package, name);

/// The root of a delta tree: every difference between two snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDelta {
    pub from_label: String,
    pub to_label: String,
    pub from_digest: SnapshotDigest,
    pub to_digest: SnapshotDigest,
    #[serde(default)]
    pub package_deltas: Vec<PackageDelta>,
}

impl ApiDelta {
    /// Returns `true` if the two snapshots have no API differences.
    pub fn is_empty(&self) -> bool {
        self.package_deltas.is_empty()
    }

    /// Number of package-level deltas.
    pub fn len(&self) -> usize {
        self.package_deltas.len()
    }

    pub fn package(&self, name: &str) -> Option<&PackageDelta> {
        self.package_deltas.iter().find(|p| p.name == name)
    }

    /// Look up a class delta by package and class name.
    pub fn class(&self, package: &str, name: &str) -> Option<&ClassDelta> {
        self.package(package)
            .and_then(|p| p.class_deltas.iter().find(|c| c.name == name))
    }

    /// Every leaf delta in the tree with the qualified path of the
    /// declaration it belongs to, in tree order.
    ///
    /// Paths look like `pkg`, `pkg.Class`, `pkg.Class#field`,
    /// `pkg.Class#method(int)` and `pkg.Class#<init>(int)`.
    pub fn leaf_deltas(&self) -> Vec<(String, &SigDelta)> {
        let mut out = Vec::new();
        for package in &self.package_deltas {
            push_all(&mut out, &package.name, &package.changes);
            for class in &package.class_deltas {
                let class_path = format!("{}.{}", package.name, class.name);
                push_all(&mut out, &class_path, &class.changes);
                for field in &class.field_deltas {
                    push_all(&mut out, &format!("{class_path}#{}", field.name), &field.changes);
                }
                for ctor in &class.constructor_deltas {
                    push_all(
                        &mut out,
                        &format!("{class_path}#<init>{}", ctor.signature),
                        &ctor.changes,
                    );
                }
                for method in &class.method_deltas {
                    push_all(
                        &mut out,
                        &format!("{class_path}#{}", method.signature),
                        &method.changes,
                    );
                }
            }
        }
        out
    }
}

fn push_all<'a>(out: &mut Vec<(String, &'a SigDelta)>, path: &str, changes: &'a [SigDelta]) {
    out.extend(changes.iter().map(|c| (path.to_string(), c)));
}
