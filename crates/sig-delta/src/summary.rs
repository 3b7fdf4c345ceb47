//! Change counts and compatibility classification for a delta tree.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sig_types::{ApiSnapshot, Declaration, Modifier, TypeRef};

use crate::concept::SigDelta;
use crate::delta::DeltaKind;
use crate::model::{ApiDelta, ElementDelta};

/// How the new snapshot relates to the baseline for existing clients.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compatibility {
    /// No API differences at all.
    #[default]
    Identical,
    /// Only additions and other changes existing clients cannot observe.
    Compatible,
    /// At least one change that can break existing clients.
    Breaking,
}

impl fmt::Display for Compatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identical => write!(f, "identical"),
            Self::Compatible => write!(f, "compatible"),
            Self::Breaking => write!(f, "breaking"),
        }
    }
}

/// Added / removed / changed tallies for one element level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementCounts {
    pub added: usize,
    pub removed: usize,
    pub changed: usize,
}

impl ElementCounts {
    pub fn record(&mut self, kind: DeltaKind) {
        match kind {
            DeltaKind::Added => self.added += 1,
            DeltaKind::Removed => self.removed += 1,
            DeltaKind::Changed => self.changed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.added + self.removed + self.changed
    }
}

impl fmt::Display for ElementCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{} -{} ~{}", self.added, self.removed, self.changed)
    }
}

/// A change that can break existing clients, with the declaration it
/// applies to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakingChange {
    pub path: String,
    pub reason: String,
}

impl fmt::Display for BreakingChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaSummary {
    pub compatibility: Compatibility,
    pub packages: ElementCounts,
    pub classes: ElementCounts,
    pub fields: ElementCounts,
    pub constructors: ElementCounts,
    pub methods: ElementCounts,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breaking: Vec<BreakingChange>,
}

/// Unchecked exception roots; they and their subclasses never break callers
/// when added to a `throws` clause.
const UNCHECKED_ROOTS: [&str; 2] = ["java.lang.RuntimeException", "java.lang.Error"];

/// `java.lang` exception types and their superclasses.
const JAVA_LANG_EXCEPTIONS: &[(&str, &str)] = &[
    ("RuntimeException", "Exception"),
    ("Error", "Throwable"),
    ("Exception", "Throwable"),
    ("ArithmeticException", "RuntimeException"),
    ("ArrayStoreException", "RuntimeException"),
    ("ClassCastException", "RuntimeException"),
    ("IllegalArgumentException", "RuntimeException"),
    ("IllegalMonitorStateException", "RuntimeException"),
    ("IllegalStateException", "RuntimeException"),
    ("IndexOutOfBoundsException", "RuntimeException"),
    ("NegativeArraySizeException", "RuntimeException"),
    ("NullPointerException", "RuntimeException"),
    ("SecurityException", "RuntimeException"),
    ("UnsupportedOperationException", "RuntimeException"),
    ("ArrayIndexOutOfBoundsException", "IndexOutOfBoundsException"),
    ("StringIndexOutOfBoundsException", "IndexOutOfBoundsException"),
    ("NumberFormatException", "IllegalArgumentException"),
    ("IllegalThreadStateException", "IllegalArgumentException"),
    ("AssertionError", "Error"),
    ("LinkageError", "Error"),
    ("VirtualMachineError", "Error"),
    ("OutOfMemoryError", "VirtualMachineError"),
    ("StackOverflowError", "VirtualMachineError"),
    ("NoClassDefFoundError", "LinkageError"),
    ("ClassNotFoundException", "ReflectiveOperationException"),
    ("ReflectiveOperationException", "Exception"),
    ("InterruptedException", "Exception"),
    ("CloneNotSupportedException", "Exception"),
];

/// Superclass chains of exception types, used to tell checked exceptions
/// from unchecked ones.
///
/// The default hierarchy knows the `java.lang` exceptions;
/// [`ExceptionHierarchy::from_snapshot`] adds every class of a snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExceptionHierarchy {
    superclasses: BTreeMap<String, String>,
}

impl Default for ExceptionHierarchy {
    fn default() -> Self {
        let superclasses = JAVA_LANG_EXCEPTIONS
            .iter()
            .map(|(class, superclass)| {
                (format!("java.lang.{class}"), format!("java.lang.{superclass}"))
            })
            .collect();
        Self { superclasses }
    }
}

impl ExceptionHierarchy {
    pub fn from_snapshot(snapshot: &ApiSnapshot) -> Self {
        let mut hierarchy = Self::default();
        for package in &snapshot.packages {
            for class in &package.classes {
                if let Some(TypeRef::Class { name, .. }) = &class.superclass {
                    hierarchy
                        .superclasses
                        .insert(format!("{}.{}", package.name, class.name), name.clone());
                }
            }
        }
        hierarchy
    }

    /// `true` for `RuntimeException`, `Error` and their known subclasses.
    /// Type variables and unknown classes count as checked.
    pub fn is_unchecked(&self, exception: &TypeRef) -> bool {
        let TypeRef::Class { name, .. } = exception else {
            return false;
        };
        let mut current = name.as_str();
        // The step limit stops on cyclic superclass chains.
        for _ in 0..=self.superclasses.len() {
            if UNCHECKED_ROOTS.contains(&current) {
                return true;
            }
            match self.superclasses.get(current) {
                Some(superclass) => current = superclass.as_str(),
                None => return false,
            }
        }
        false
    }
}

impl DeltaSummary {
    /// Count every element delta in the tree and classify the result.
    ///
    /// Added exceptions are classified against the `java.lang` hierarchy
    /// only; use [`DeltaSummary::with_hierarchy`] to resolve the snapshot's
    /// own exception classes.
    pub fn from_delta(api: &ApiDelta) -> Self {
        Self::with_hierarchy(api, &ExceptionHierarchy::default())
    }

    pub fn with_hierarchy(api: &ApiDelta, exceptions: &ExceptionHierarchy) -> Self {
        let mut summary = Self::default();

        for package in &api.package_deltas {
            summary.packages.record(package.kind());
            if package.delta.is_removed() {
                summary.flag(&package.name, "package removed".to_string());
            }
            summary.check_changes(&package.name, &package.changes, exceptions);

            for class in &package.class_deltas {
                let path = format!("{}.{}", package.name, class.name);
                summary.classes.record(class.kind());
                summary.check_element(&path, "class", class, exceptions);

                for field in &class.field_deltas {
                    summary.fields.record(field.kind());
                    let field_path = format!("{path}#{}", field.name);
                    summary.check_element(&field_path, "field", field, exceptions);
                }
                for ctor in &class.constructor_deltas {
                    summary.constructors.record(ctor.kind());
                    summary.check_element(
                        &format!("{path}#<init>{}", ctor.signature),
                        "constructor",
                        ctor,
                        exceptions,
                    );
                }
                for method in &class.method_deltas {
                    summary.methods.record(method.kind());
                    summary.check_element(
                        &format!("{path}#{}", method.signature),
                        "method",
                        method,
                        exceptions,
                    );
                }
            }
        }

        summary.compatibility = if api.is_empty() {
            Compatibility::Identical
        } else if summary.breaking.is_empty() {
            Compatibility::Compatible
        } else {
            Compatibility::Breaking
        };
        summary
    }

    pub fn is_breaking(&self) -> bool {
        self.compatibility == Compatibility::Breaking
    }

    /// Total number of element deltas at every level.
    pub fn total(&self) -> usize {
        self.packages.total()
            + self.classes.total()
            + self.fields.total()
            + self.constructors.total()
            + self.methods.total()
    }

    fn check_element<E>(
        &mut self,
        path: &str,
        label: &str,
        element: &E,
        exceptions: &ExceptionHierarchy,
    ) where
        E: ElementDelta,
        E::Element: Declaration,
    {
        let delta = element.delta();
        if delta.is_removed() {
            self.flag(path, format!("{label} removed"));
        }
        if let (Some(from), Some(to)) = (delta.from(), delta.to()) {
            let (was, now) = (from.visibility(), to.visibility());
            if now < was {
                self.flag(path, format!("visibility narrowed from {was} to {now}"));
            }
        }
        self.check_changes(path, element.changes(), exceptions);
    }

    fn check_changes(
        &mut self,
        path: &str,
        changes: &[SigDelta],
        exceptions: &ExceptionHierarchy,
    ) {
        for change in changes.iter().filter(|c| is_breaking(c, exceptions)) {
            self.flag(path, change.describe());
        }
    }

    fn flag(&mut self, path: &str, reason: String) {
        self.breaking.push(BreakingChange {
            path: path.to_string(),
            reason,
        });
    }
}

/// Leaf changes that can break existing clients.
fn is_breaking(change: &SigDelta, exceptions: &ExceptionHierarchy) -> bool {
    match change {
        SigDelta::Modifier(d) => match (d.kind(), d.latest()) {
            (DeltaKind::Added, Modifier::Final | Modifier::Abstract) => true,
            (_, Modifier::Static) => true,
            _ => false,
        },
        SigDelta::Type(d) => !d.is_added(),
        SigDelta::Interface(d) => d.is_removed(),
        SigDelta::Exception(d) => d.is_added() && !exceptions.is_unchecked(d.latest()),
        SigDelta::TypeParameter(d) => !d.is_added(),
        SigDelta::Value(d) => !d.is_added(),
        SigDelta::Kind(_) => true,
        SigDelta::Annotation(_) => false,
    }
}

impl fmt::Display for DeltaSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "compatibility: {}", self.compatibility)?;
        writeln!(f, "packages:      {}", self.packages)?;
        writeln!(f, "classes:       {}", self.classes)?;
        writeln!(f, "fields:        {}", self.fields)?;
        writeln!(f, "constructors:  {}", self.constructors)?;
        write!(f, "methods:       {}", self.methods)?;
        if !self.breaking.is_empty() {
            write!(f, "\nbreaking changes:")?;
            for change in &self.breaking {
                write!(f, "\n  {change}")?;
            }
        }
        Ok(())
    }
}
