//! The comparison routine: walks two snapshots in lock-step and builds the
//! delta tree.
//!
//! Both snapshots are first validated, then normalized under the
//! [`CompareConfig`] (hidden declarations dropped, ignored modifiers and
//! annotations stripped, implicit modifiers made explicit). The walk then
//! matches declarations by key at every level:
//!
//! - present in both and equal: nothing is emitted, no delta is built
//! - present in both and different: a changed delta with child deltas
//! - present on one side only: an added or removed delta without children
//!
//! Methods and constructors are keyed by erased signature, with type
//! variables erased to their bounds. Type variables renamed between the two
//! snapshots are matched by position and are not reported as changes.

use std::collections::{BTreeMap, BTreeSet};

use sig_types::{
    Annotation, ApiSnapshot, ClassDecl, ClassKind, Constructor, Declaration, Field, Method,
    Modifier, Package, Parameter, TypeParameter, TypeRef, Visibility,
};
use tracing::{debug, info};

use crate::concept::{
    AnnotationDelta, ExceptionDelta, InterfaceDelta, KindDelta, ModifierDelta, SigDelta,
    TypeDelta, TypeParameterDelta, ValueDelta,
};
use crate::config::CompareConfig;
use crate::delta::Delta;
use crate::error::DeltaResult;
use crate::model::{
    ApiDelta, ClassDelta, ConstructorDelta, FieldDelta, MethodDelta, PackageDelta,
};

/// Compares API snapshots under a fixed configuration.
#[derive(Clone, Debug, Default)]
pub struct ApiComparator {
    config: CompareConfig,
}

impl ApiComparator {
    pub fn new(config: CompareConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Compute the delta tree from `from` (baseline) to `to` (new).
    ///
    /// Both snapshots must pass [`ApiSnapshot::validate`]. Snapshots with
    /// identical digests short-circuit to an empty delta.
    pub fn compare(&self, from: &ApiSnapshot, to: &ApiSnapshot) -> DeltaResult<ApiDelta> {
        from.validate()?;
        to.validate()?;
        let from_digest = from.digest()?;
        let to_digest = to.digest()?;
        let mut api = ApiDelta {
            from_label: from.label(),
            to_label: to.label(),
            from_digest,
            to_digest,
            package_deltas: Vec::new(),
        };

        if from_digest == to_digest {
            debug!(digest = %from_digest, "snapshots are identical");
            return Ok(api);
        }

        let from = self.normalize(from);
        let to = self.normalize(to);

        for (name, old, new) in match_by_key(&from.packages, &to.packages, |p| p.name.clone()) {
            debug!(package = %name, "comparing package");
            if let Some(delta) = compare_package(name, old, new) {
                api.package_deltas.push(delta);
            }
        }

        info!(
            from = %api.from_label,
            to = %api.to_label,
            packages = api.len(),
            "snapshot comparison complete"
        );
        Ok(api)
    }

    /// Apply the configuration to a snapshot.
    pub fn normalize(&self, snapshot: &ApiSnapshot) -> ApiSnapshot {
        let packages = snapshot
            .packages
            .iter()
            .filter(|p| !self.config.is_package_ignored(&p.name))
            .filter_map(|p| self.normalize_package(p))
            .collect();
        ApiSnapshot {
            name: snapshot.name.clone(),
            version: snapshot.version.clone(),
            packages,
        }
    }

    fn normalize_package(&self, package: &Package) -> Option<Package> {
        let classes: Vec<ClassDecl> = package
            .classes
            .iter()
            .filter_map(|c| self.normalize_class(c, package))
            .collect();
        if classes.is_empty() && !package.classes.is_empty() {
            debug!(package = %package.name, "no visible classes; package skipped");
            return None;
        }
        Some(Package {
            name: package.name.clone(),
            annotations: self.annotations(&package.annotations),
            classes,
        })
    }

    fn normalize_class(&self, class: &ClassDecl, package: &Package) -> Option<ClassDecl> {
        let modifiers = self.class_modifiers(class, package);
        if !self.config.is_visible(Visibility::of(&modifiers)) {
            return None;
        }
        let kind = class.kind;

        let fields = class
            .fields
            .iter()
            .filter_map(|f| {
                let modifiers = self.member_modifiers(f, kind, MemberKind::Field);
                self.config
                    .is_visible(Visibility::of(&modifiers))
                    .then(|| Field {
                        modifiers,
                        annotations: self.annotations(&f.annotations),
                        ..f.clone()
                    })
            })
            .collect();

        let constructors = class
            .constructors
            .iter()
            .filter_map(|c| {
                let modifiers = self.member_modifiers(c, kind, MemberKind::Constructor);
                self.config
                    .is_visible(Visibility::of(&modifiers))
                    .then(|| Constructor {
                        modifiers,
                        annotations: self.annotations(&c.annotations),
                        ..c.clone()
                    })
            })
            .collect();

        let methods = class
            .methods
            .iter()
            .filter_map(|m| {
                let modifiers = self.member_modifiers(m, kind, MemberKind::Method);
                self.config
                    .is_visible(Visibility::of(&modifiers))
                    .then(|| Method {
                        modifiers,
                        annotations: self.annotations(&m.annotations),
                        ..m.clone()
                    })
            })
            .collect();

        Some(ClassDecl {
            modifiers,
            annotations: self.annotations(&class.annotations),
            fields,
            constructors,
            methods,
            ..class.clone()
        })
    }

    fn modifiers(&self, modifiers: &BTreeSet<Modifier>) -> BTreeSet<Modifier> {
        modifiers
            .difference(&self.config.ignored_modifiers)
            .copied()
            .collect()
    }

    /// Class modifiers with the implicit ones made explicit: interfaces and
    /// annotation types are abstract, nested interfaces, enums and annotation
    /// types are static, and member types of an interface are public static.
    fn class_modifiers(&self, class: &ClassDecl, package: &Package) -> BTreeSet<Modifier> {
        let mut modifiers = class.modifiers.clone();
        if class.kind.has_public_members() {
            modifiers.insert(Modifier::Abstract);
        }
        if let Some((outer, _)) = class.name.rsplit_once('.') {
            if class.kind != ClassKind::Class {
                modifiers.insert(Modifier::Static);
            }
            if package.class(outer).is_some_and(|o| o.kind.has_public_members()) {
                if Visibility::of(&modifiers) == Visibility::Package {
                    modifiers.insert(Modifier::Public);
                }
                modifiers.insert(Modifier::Static);
            }
        }
        self.modifiers(&modifiers)
    }

    /// Member modifiers with the implicit modifiers of interface and
    /// annotation-type members and of enum constructors made explicit.
    fn member_modifiers(
        &self,
        member: &impl Declaration,
        owner: ClassKind,
        member_kind: MemberKind,
    ) -> BTreeSet<Modifier> {
        let mut modifiers = member.modifiers().clone();
        if owner.has_public_members() {
            if Visibility::of(&modifiers) == Visibility::Package {
                modifiers.insert(Modifier::Public);
            }
            match member_kind {
                MemberKind::Field => {
                    modifiers.insert(Modifier::Static);
                    modifiers.insert(Modifier::Final);
                }
                MemberKind::Method => {
                    if !modifiers.contains(&Modifier::Default)
                        && !modifiers.contains(&Modifier::Static)
                        && !modifiers.contains(&Modifier::Private)
                    {
                        modifiers.insert(Modifier::Abstract);
                    }
                }
                MemberKind::Constructor => {}
            }
        }
        if owner == ClassKind::Enum
            && matches!(member_kind, MemberKind::Constructor)
            && Visibility::of(&modifiers) == Visibility::Package
        {
            modifiers.insert(Modifier::Private);
        }
        self.modifiers(&modifiers)
    }

    fn annotations(&self, annotations: &[Annotation]) -> Vec<Annotation> {
        if self.config.ignore_annotations {
            Vec::new()
        } else {
            annotations.to_vec()
        }
    }
}

#[derive(Clone, Copy)]
enum MemberKind {
    Field,
    Constructor,
    Method,
}

/// Pair up the elements of two slices by key, in key order.
fn match_by_key<'a, T, K: Ord>(
    from: &'a [T],
    to: &'a [T],
    key: impl Fn(&T) -> K,
) -> Vec<(K, Option<&'a T>, Option<&'a T>)> {
    match_by_keys(from, to, &key, &key)
}

/// [`match_by_key`] with a separate key function per side.
fn match_by_keys<'a, T, K: Ord>(
    from: &'a [T],
    to: &'a [T],
    from_key: impl Fn(&T) -> K,
    to_key: impl Fn(&T) -> K,
) -> Vec<(K, Option<&'a T>, Option<&'a T>)> {
    let mut pairs: BTreeMap<K, (Option<&'a T>, Option<&'a T>)> = BTreeMap::new();
    for item in from {
        pairs.entry(from_key(item)).or_default().0 = Some(item);
    }
    for item in to {
        pairs.entry(to_key(item)).or_default().1 = Some(item);
    }
    pairs
        .into_iter()
        .map(|(k, (old, new))| (k, old, new))
        .collect()
}

/// Compare one matched element. `diff` is only called when both sides are
/// present; an empty result means "unchanged" and yields `None`.
fn compare_element<T: Clone>(
    old: Option<&T>,
    new: Option<&T>,
    diff: impl FnOnce(&T, &T) -> Vec<SigDelta>,
) -> Option<(Delta<T>, Vec<SigDelta>)> {
    match (old, new) {
        (Some(old), Some(new)) => {
            let changes = diff(old, new);
            if changes.is_empty() {
                None
            } else {
                Some((Delta::changed(old.clone(), new.clone()), changes))
            }
        }
        _ => Delta::new(old.cloned(), new.cloned())
            .ok()
            .map(|delta| (delta, Vec::new())),
    }
}

/// Set-style comparison of keyed values; equal entries are filtered out.
fn keyed_deltas<T: Clone + PartialEq, K: Ord>(
    old: &[T],
    new: &[T],
    key: impl Fn(&T) -> K,
) -> Vec<Delta<T>> {
    match_by_key(old, new, key)
        .into_iter()
        .filter_map(|(_, a, b)| Delta::between(a.cloned(), b.cloned()))
        .collect()
}

fn modifier_deltas(old: &BTreeSet<Modifier>, new: &BTreeSet<Modifier>, out: &mut Vec<SigDelta>) {
    for m in old.union(new) {
        let from = old.contains(m).then_some(*m);
        let to = new.contains(m).then_some(*m);
        if let Some(delta) = Delta::between(from, to) {
            out.push(ModifierDelta::from(delta).into());
        }
    }
}

fn annotation_deltas(old: &[Annotation], new: &[Annotation], out: &mut Vec<SigDelta>) {
    out.extend(
        keyed_deltas(old, new, |a| a.type_name.clone())
            .into_iter()
            .map(|d| AnnotationDelta::from(d).into()),
    );
}

fn type_parameter_deltas(old: &[TypeParameter], new: &[TypeParameter], out: &mut Vec<SigDelta>) {
    out.extend(
        keyed_deltas(old, new, |p| p.name.clone())
            .into_iter()
            .map(|d| TypeParameterDelta::from(d).into()),
    );
}

fn exception_deltas(
    old: &[TypeRef],
    new: &[TypeRef],
    renames: &Renames,
    out: &mut Vec<SigDelta>,
) {
    let new = rename_all(new, renames);
    out.extend(
        keyed_deltas(old, &new, erased_key)
            .into_iter()
            .map(|d| ExceptionDelta::from(d).into()),
    );
}

/// Parameters of matched executables share an erased signature; only their
/// type arguments can differ.
fn parameter_deltas(
    old: &[Parameter],
    new: &[Parameter],
    renames: &Renames,
    out: &mut Vec<SigDelta>,
) {
    for (a, b) in old.iter().zip(new) {
        let to = b.ty.rename_variables(renames);
        if let Some(delta) = Delta::between(Some(a.ty.clone()), Some(to)) {
            out.push(TypeDelta::from(delta).into());
        }
    }
}

fn type_delta(old: Option<&TypeRef>, new: Option<&TypeRef>, out: &mut Vec<SigDelta>) {
    if let Some(delta) = Delta::between(old.cloned(), new.cloned()) {
        out.push(TypeDelta::from(delta).into());
    }
}

fn erased_key(ty: &TypeRef) -> String {
    ty.erasure().to_string()
}

/// Type variable renames from the new side's names to the old side's.
type Renames = BTreeMap<String, String>;

/// Positional renames between two type parameter lists of equal length.
/// Lists of different length are compared by name instead.
fn variable_renames(old: &[TypeParameter], new: &[TypeParameter]) -> Renames {
    if old.len() != new.len() {
        return Renames::new();
    }
    old.iter()
        .zip(new)
        .filter(|(a, b)| a.name != b.name)
        .map(|(a, b)| (b.name.clone(), a.name.clone()))
        .collect()
}

/// Renames in effect inside a generic member: the enclosing renames minus
/// the variables the member shadows, plus the member's own.
fn scoped_renames(outer: &Renames, old: &[TypeParameter], new: &[TypeParameter]) -> Renames {
    let mut renames: Renames = outer
        .iter()
        .filter(|(name, _)| !new.iter().any(|p| &&p.name == name))
        .map(|(from, to)| (from.clone(), to.clone()))
        .collect();
    renames.extend(variable_renames(old, new));
    renames
}

fn rename_all(types: &[TypeRef], renames: &Renames) -> Vec<TypeRef> {
    types.iter().map(|t| t.rename_variables(renames)).collect()
}

fn rename_type_parameters(params: &[TypeParameter], renames: &Renames) -> Vec<TypeParameter> {
    params.iter().map(|p| p.rename_variables(renames)).collect()
}

fn compare_package(name: String, old: Option<&Package>, new: Option<&Package>) -> Option<PackageDelta> {
    match (old, new) {
        (Some(old), Some(new)) => {
            let mut changes = Vec::new();
            annotation_deltas(&old.annotations, &new.annotations, &mut changes);
            let class_deltas: Vec<ClassDelta> =
                match_by_key(&old.classes, &new.classes, |c| c.name.clone())
                    .into_iter()
                    .filter_map(|(name, a, b)| compare_class(name, a, b))
                    .collect();
            if changes.is_empty() && class_deltas.is_empty() {
                return None;
            }
            Some(PackageDelta {
                name,
                delta: Delta::changed(old.clone(), new.clone()),
                changes,
                class_deltas,
            })
        }
        _ => Delta::new(old.cloned(), new.cloned())
            .ok()
            .map(|delta| PackageDelta {
                name,
                delta,
                changes: Vec::new(),
                class_deltas: Vec::new(),
            }),
    }
}

fn compare_class(name: String, old: Option<&ClassDecl>, new: Option<&ClassDecl>) -> Option<ClassDelta> {
    let (Some(old), Some(new)) = (old, new) else {
        return Delta::new(old.cloned(), new.cloned())
            .ok()
            .map(|delta| ClassDelta {
                name,
                delta,
                changes: Vec::new(),
                field_deltas: Vec::new(),
                constructor_deltas: Vec::new(),
                method_deltas: Vec::new(),
            });
    };

    let renames = variable_renames(&old.type_parameters, &new.type_parameters);
    let mut changes = Vec::new();
    if let Some(delta) = Delta::between(Some(old.kind), Some(new.kind)) {
        changes.push(KindDelta::from(delta).into());
    }
    modifier_deltas(&old.modifiers, &new.modifiers, &mut changes);
    type_parameter_deltas(
        &old.type_parameters,
        &rename_type_parameters(&new.type_parameters, &renames),
        &mut changes,
    );
    let superclass = new.superclass.as_ref().map(|t| t.rename_variables(&renames));
    type_delta(old.superclass.as_ref(), superclass.as_ref(), &mut changes);
    changes.extend(
        keyed_deltas(&old.interfaces, &rename_all(&new.interfaces, &renames), erased_key)
            .into_iter()
            .map(|d| InterfaceDelta::from(d).into()),
    );
    annotation_deltas(&old.annotations, &new.annotations, &mut changes);
    changes.extend(
        keyed_deltas(&old.enum_constants, &new.enum_constants, String::clone)
            .into_iter()
            .map(|d| ValueDelta::from(d).into()),
    );

    let field_deltas: Vec<FieldDelta> = match_by_key(&old.fields, &new.fields, |f| f.name.clone())
        .into_iter()
        .filter_map(|(name, a, b)| {
            compare_element(a, b, |x, y| compare_field(x, y, &renames)).map(
                |(delta, changes)| FieldDelta {
                    name,
                    delta,
                    changes,
                },
            )
        })
        .collect();

    let constructor_deltas: Vec<ConstructorDelta> = match_by_keys(
        &old.constructors,
        &new.constructors,
        |c| c.signature_in(&old.type_parameters),
        |c| c.signature_in(&new.type_parameters),
    )
    .into_iter()
    .filter_map(|(signature, a, b)| {
        compare_element(a, b, |x, y| compare_constructor(x, y, &renames)).map(
            |(delta, changes)| ConstructorDelta {
                signature,
                delta,
                changes,
            },
        )
    })
    .collect();

    let method_deltas: Vec<MethodDelta> = match_by_keys(
        &old.methods,
        &new.methods,
        |m| m.signature_in(&old.type_parameters),
        |m| m.signature_in(&new.type_parameters),
    )
    .into_iter()
    .filter_map(|(signature, a, b)| {
        compare_element(a, b, |x, y| compare_method(x, y, &renames)).map(
            |(delta, changes)| MethodDelta {
                signature,
                delta,
                changes,
            },
        )
    })
    .collect();

    if changes.is_empty()
        && field_deltas.is_empty()
        && constructor_deltas.is_empty()
        && method_deltas.is_empty()
    {
        return None;
    }

    Some(ClassDelta {
        name,
        delta: Delta::changed(old.clone(), new.clone()),
        changes,
        field_deltas,
        constructor_deltas,
        method_deltas,
    })
}

fn compare_field(old: &Field, new: &Field, renames: &Renames) -> Vec<SigDelta> {
    let mut changes = Vec::new();
    modifier_deltas(&old.modifiers, &new.modifiers, &mut changes);
    type_delta(Some(&old.ty), Some(&new.ty.rename_variables(renames)), &mut changes);
    if let Some(delta) = Delta::between(old.value.clone(), new.value.clone()) {
        changes.push(ValueDelta::from(delta).into());
    }
    annotation_deltas(&old.annotations, &new.annotations, &mut changes);
    changes
}

fn compare_method(old: &Method, new: &Method, class_renames: &Renames) -> Vec<SigDelta> {
    let renames = scoped_renames(class_renames, &old.type_parameters, &new.type_parameters);
    let mut changes = Vec::new();
    modifier_deltas(&old.modifiers, &new.modifiers, &mut changes);
    type_parameter_deltas(
        &old.type_parameters,
        &rename_type_parameters(&new.type_parameters, &renames),
        &mut changes,
    );
    let return_type = new.return_type.rename_variables(&renames);
    type_delta(Some(&old.return_type), Some(&return_type), &mut changes);
    parameter_deltas(&old.parameters, &new.parameters, &renames, &mut changes);
    exception_deltas(&old.exceptions, &new.exceptions, &renames, &mut changes);
    annotation_deltas(&old.annotations, &new.annotations, &mut changes);
    changes
}

fn compare_constructor(
    old: &Constructor,
    new: &Constructor,
    class_renames: &Renames,
) -> Vec<SigDelta> {
    let renames = scoped_renames(class_renames, &old.type_parameters, &new.type_parameters);
    let mut changes = Vec::new();
    modifier_deltas(&old.modifiers, &new.modifiers, &mut changes);
    type_parameter_deltas(
        &old.type_parameters,
        &rename_type_parameters(&new.type_parameters, &renames),
        &mut changes,
    );
    parameter_deltas(&old.parameters, &new.parameters, &renames, &mut changes);
    exception_deltas(&old.exceptions, &new.exceptions, &renames, &mut changes);
    annotation_deltas(&old.annotations, &new.annotations, &mut changes);
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concept::Concept;
    use crate::delta::DeltaKind;
    use crate::error::DeltaError;
    use crate::model::ElementDelta;
    use sig_types::TypeError;

    fn ty(s: &str) -> TypeRef {
        TypeRef::parse(s).unwrap()
    }

    fn snapshot(version: &str, classes: Vec<ClassDecl>) -> ApiSnapshot {
        let mut package = Package::new("android.view");
        package.classes = classes;
        ApiSnapshot::new("android", version).with_package(package)
    }

    fn public_class(name: &str) -> ClassDecl {
        ClassDecl::new(name, ClassKind::Class).with_modifiers(&[Modifier::Public])
    }

    fn event_class() -> ClassDecl {
        public_class("AccessibilityEvent")
            .with_superclass(ty("java.lang.Object"))
            .with_interface(ty("android.os.Parcelable"))
            .with_field(
                Field::new("TYPE_VIEW_CLICKED", ty("int"))
                    .with_modifiers(&[Modifier::Public, Modifier::Static, Modifier::Final])
                    .with_value("1"),
            )
            .with_method(
                Method::new("getEventType", ty("int")).with_modifiers(&[Modifier::Public]),
            )
            .with_method(
                Method::new("setEventType", ty("void"))
                    .with_modifiers(&[Modifier::Public])
                    .with_parameter(Parameter::new("eventType", ty("int"))),
            )
    }

    fn compare(old: Vec<ClassDecl>, new: Vec<ClassDecl>) -> ApiDelta {
        ApiComparator::default()
            .compare(&snapshot("1", old), &snapshot("2", new))
            .unwrap()
    }

    fn only_class(delta: &ApiDelta) -> &ClassDelta {
        assert_eq!(delta.package_deltas.len(), 1);
        let package = &delta.package_deltas[0];
        assert_eq!(package.class_deltas.len(), 1);
        &package.class_deltas[0]
    }

    #[test]
    fn identical_snapshots_produce_empty_delta() {
        let snap = snapshot("1", vec![event_class()]);
        let delta = ApiComparator::default().compare(&snap, &snap).unwrap();
        assert!(delta.is_empty());
        assert_eq!(delta.from_digest, delta.to_digest);
    }

    #[test]
    fn version_bump_without_api_change_is_empty() {
        let delta = compare(vec![event_class()], vec![event_class()]);
        assert!(delta.is_empty());
        assert_ne!(delta.from_digest, delta.to_digest);
        assert_eq!(delta.from_label, "android-1");
        assert_eq!(delta.to_label, "android-2");
    }

    #[test]
    fn added_and_removed_packages() {
        let old = ApiSnapshot::new("lib", "1")
            .with_package(Package::new("a").with_class(public_class("A")));
        let new = ApiSnapshot::new("lib", "2")
            .with_package(Package::new("b").with_class(public_class("B")));
        let delta = ApiComparator::default().compare(&old, &new).unwrap();
        assert_eq!(delta.len(), 2);
        let a = delta.package("a").unwrap();
        assert!(a.delta.is_removed());
        assert!(a.class_deltas.is_empty());
        let b = delta.package("b").unwrap();
        assert!(b.delta.is_added());
        assert_eq!(b.delta.to().unwrap().classes.len(), 1);
    }

    #[test]
    fn added_class_has_no_children() {
        let delta = compare(vec![event_class()], vec![event_class(), public_class("View")]);
        let class = only_class(&delta);
        assert_eq!(class.name, "View");
        assert_eq!(class.kind(), DeltaKind::Added);
        assert!(class.changes.is_empty());
        assert_eq!(class.member_count(), 0);
    }

    #[test]
    fn final_added_to_method() {
        let mut new = event_class();
        new.methods[0].modifiers.insert(Modifier::Final);
        let delta = compare(vec![event_class()], vec![new]);
        let class = only_class(&delta);
        assert!(class.changes.is_empty());
        assert_eq!(class.method_deltas.len(), 1);
        let method = &class.method_deltas[0];
        assert_eq!(method.signature, "getEventType()");
        assert!(method.delta.is_changed());
        assert_eq!(method.changes.len(), 1);
        let modifier = method.changes[0].as_modifier().unwrap();
        assert!(modifier.from().is_none());
        assert_eq!(modifier.to(), Some(&Modifier::Final));
    }

    #[test]
    fn visibility_change_yields_two_modifier_deltas() {
        let mut new = event_class();
        new.methods[1].modifiers = [Modifier::Protected].into_iter().collect();
        let delta = compare(vec![event_class()], vec![new]);
        let method = &only_class(&delta).method_deltas[0];
        assert_eq!(method.signature, "setEventType(int)");
        let kinds: Vec<(DeltaKind, Modifier)> = method
            .changes
            .iter()
            .filter_map(SigDelta::as_modifier)
            .map(|m| (m.kind(), *m.latest()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (DeltaKind::Removed, Modifier::Public),
                (DeltaKind::Added, Modifier::Protected)
            ]
        );
    }

    #[test]
    fn field_type_and_constant_value_changes() {
        let mut new = event_class();
        new.fields[0].ty = ty("long");
        new.fields[0].value = Some("2".into());
        let delta = compare(vec![event_class()], vec![new]);
        let field = &only_class(&delta).field_deltas[0];
        let concepts: Vec<Concept> = field.changes.iter().map(SigDelta::concept).collect();
        assert_eq!(concepts, vec![Concept::Type, Concept::Value]);
        let value = field.changes[1].as_value().unwrap();
        assert_eq!(value.from().map(String::as_str), Some("1"));
        assert_eq!(value.to().map(String::as_str), Some("2"));
    }

    #[test]
    fn return_type_change() {
        let mut new = event_class();
        new.methods[0].return_type = ty("long");
        let delta = compare(vec![event_class()], vec![new]);
        let method = &only_class(&delta).method_deltas[0];
        let change = method.changes[0].as_type().unwrap();
        assert_eq!(change.from(), Some(&ty("int")));
        assert_eq!(change.to(), Some(&ty("long")));
    }

    #[test]
    fn overload_is_a_separate_method() {
        let new = event_class().with_method(
            Method::new("setEventType", ty("void"))
                .with_modifiers(&[Modifier::Public])
                .with_parameter(Parameter::new("eventType", ty("long"))),
        );
        let delta = compare(vec![event_class()], vec![new]);
        let class = only_class(&delta);
        assert_eq!(class.method_deltas.len(), 1);
        assert_eq!(class.method_deltas[0].signature, "setEventType(long)");
        assert!(class.method_deltas[0].delta.is_added());
    }

    #[test]
    fn parameter_type_argument_change() {
        let with_param = |p: &str| {
            public_class("Parcel").with_method(
                Method::new("writeList", ty("void"))
                    .with_modifiers(&[Modifier::Public])
                    .with_parameter(Parameter::new("val", ty(p))),
            )
        };
        let delta = compare(
            vec![with_param("java.util.List<java.lang.Object>")],
            vec![with_param("java.util.List<?>")],
        );
        let method = &only_class(&delta).method_deltas[0];
        assert_eq!(method.signature, "writeList(java.util.List)");
        assert_eq!(method.changes[0].concept(), Concept::Type);
    }

    #[test]
    fn class_header_changes() {
        let mut new = event_class()
            .with_interface(ty("java.lang.Cloneable"))
            .with_superclass(ty("android.view.InputEvent"));
        new.interfaces.retain(|i| i != &ty("android.os.Parcelable"));
        new.annotations.push(Annotation::new("java.lang.Deprecated"));
        let delta = compare(vec![event_class()], vec![new]);
        let class = only_class(&delta);
        let described: Vec<String> = class.changes.iter().map(SigDelta::describe).collect();
        assert_eq!(
            described,
            vec![
                "type changed: java.lang.Object -> android.view.InputEvent",
                "interface android.os.Parcelable removed",
                "interface java.lang.Cloneable added",
                "annotation @java.lang.Deprecated added",
            ]
        );
    }

    #[test]
    fn ignore_annotations() {
        let mut new = event_class();
        new.methods[0].annotations.push(Annotation::new("java.lang.Deprecated"));
        let config = CompareConfig {
            ignore_annotations: true,
            ..Default::default()
        };
        let delta = ApiComparator::new(config)
            .compare(&snapshot("1", vec![event_class()]), &snapshot("2", vec![new]))
            .unwrap();
        assert!(delta.is_empty());
    }

    #[test]
    fn exceptions_and_type_parameters() {
        let mut new = event_class();
        new.methods[0].exceptions.push(ty("java.io.IOException"));
        new.type_parameters.push(TypeParameter::new("T"));
        let delta = compare(vec![event_class()], vec![new]);
        let class = only_class(&delta);
        assert_eq!(class.changes[0].concept(), Concept::TypeParameter);
        assert_eq!(class.method_deltas[0].changes[0].concept(), Concept::Exception);
        assert_eq!(class.method_deltas[0].changes[0].kind(), DeltaKind::Added);
    }

    #[test]
    fn private_members_hidden_by_default() {
        let new = event_class().with_field(
            Field::new("mSealed", ty("boolean")).with_modifiers(&[Modifier::Private]),
        );
        let delta = compare(vec![event_class()], vec![new.clone()]);
        assert!(delta.is_empty());

        let strict = ApiComparator::new(CompareConfig::strict())
            .compare(&snapshot("1", vec![event_class()]), &snapshot("2", vec![new]))
            .unwrap();
        let field = &only_class(&strict).field_deltas[0];
        assert_eq!(field.name, "mSealed");
        assert!(field.delta.is_added());
    }

    #[test]
    fn class_made_public_appears_as_added() {
        let hidden = ClassDecl::new("ViewRoot", ClassKind::Class);
        let delta = compare(
            vec![event_class(), hidden.clone()],
            vec![event_class(), hidden.with_modifiers(&[Modifier::Public])],
        );
        let class = only_class(&delta);
        assert_eq!(class.name, "ViewRoot");
        assert!(class.delta.is_added());
    }

    #[test]
    fn ignored_modifiers_are_not_reported() {
        let mut new = event_class();
        new.methods[0].modifiers.insert(Modifier::Synchronized);
        new.methods[1].modifiers.insert(Modifier::Native);
        assert!(compare(vec![event_class()], vec![new]).is_empty());
    }

    #[test]
    fn interface_members_are_implicitly_public_abstract() {
        let implicit = ClassDecl::new("Callback", ClassKind::Interface)
            .with_modifiers(&[Modifier::Public])
            .with_method(Method::new("onEvent", ty("void")))
            .with_field(Field::new("ANY", ty("int")).with_value("0"));
        let explicit = ClassDecl::new("Callback", ClassKind::Interface)
            .with_modifiers(&[Modifier::Public])
            .with_method(
                Method::new("onEvent", ty("void"))
                    .with_modifiers(&[Modifier::Public, Modifier::Abstract]),
            )
            .with_field(
                Field::new("ANY", ty("int"))
                    .with_modifiers(&[Modifier::Public, Modifier::Static, Modifier::Final])
                    .with_value("0"),
            );
        assert!(compare(vec![implicit], vec![explicit]).is_empty());
    }

    #[test]
    fn ignored_packages_are_skipped() {
        let old = ApiSnapshot::new("lib", "1");
        let new = ApiSnapshot::new("lib", "2")
            .with_package(Package::new("com.android.internal").with_class(public_class("X")))
            .with_package(Package::new("android.app").with_class(public_class("Activity")));
        let config = CompareConfig {
            ignored_packages: vec!["com.android.internal".into()],
            ..Default::default()
        };
        let delta = ApiComparator::new(config).compare(&old, &new).unwrap();
        assert_eq!(delta.len(), 1);
        assert_eq!(delta.package_deltas[0].name, "android.app");
    }

    #[test]
    fn enum_constants_and_kind_change() {
        let old = public_class("Mode");
        let mut new = ClassDecl::new("Mode", ClassKind::Enum).with_modifiers(&[Modifier::Public]);
        new.enum_constants = vec!["FAST".into(), "SLOW".into()];
        let delta = compare(vec![old], vec![new]);
        let class = only_class(&delta);
        let described: Vec<String> = class.changes.iter().map(SigDelta::describe).collect();
        assert_eq!(
            described,
            vec!["kind changed: class -> enum", "value FAST added", "value SLOW added"]
        );
    }

    #[test]
    fn constructor_added() {
        let new = event_class().with_constructor(
            Constructor::new()
                .with_modifiers(&[Modifier::Public])
                .with_parameter(Parameter::new("type", ty("int"))),
        );
        let delta = compare(vec![event_class()], vec![new]);
        let ctor = &only_class(&delta).constructor_deltas[0];
        assert_eq!(ctor.signature, "(int)");
        assert!(ctor.delta.is_added());
    }

    #[test]
    fn output_is_sorted_and_deterministic() {
        let old = vec![public_class("Zeta"), public_class("Alpha")];
        let new: Vec<ClassDecl> = Vec::new();
        let first = compare(old.clone(), new.clone());
        let second = compare(old, new);
        assert_eq!(first, second);
        let names: Vec<&str> = first.package_deltas[0]
            .class_deltas
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn normalize_drops_hidden_declarations() {
        let snap = snapshot(
            "1",
            vec![event_class().with_method(
                Method::new("internal", ty("void")).with_modifiers(&[Modifier::Private]),
            )],
        );
        let normalized = ApiComparator::default().normalize(&snap);
        let class = normalized.class("android.view", "AccessibilityEvent").unwrap();
        assert!(class.method("internal()").is_none());
        assert!(class.method("getEventType()").is_some());
    }

    #[test]
    fn duplicate_signatures_are_rejected() {
        let old = public_class("Parcel")
            .with_method(Method::new("m", ty("void")).with_modifiers(&[Modifier::Public]))
            .with_method(Method::new("m", ty("int")).with_modifiers(&[Modifier::Public]));
        let new = public_class("Parcel")
            .with_method(Method::new("m", ty("int")).with_modifiers(&[Modifier::Public]));
        let err = ApiComparator::default()
            .compare(&snapshot("1", vec![old]), &snapshot("2", vec![new]))
            .unwrap_err();
        assert!(matches!(
            err,
            DeltaError::Type(TypeError::Duplicate { ref scope, .. }) if scope == "method"
        ));
    }

    fn generic_method(var: &str) -> Method {
        let mut method = Method::new("wrap", ty(var))
            .with_modifiers(&[Modifier::Public])
            .with_parameter(Parameter::new("value", ty(var)))
            .with_parameter(Parameter::new("all", ty(&format!("java.util.List<{var}>"))));
        method.type_parameters.push(TypeParameter::new(var));
        method
    }

    #[test]
    fn renamed_method_type_variable_is_not_a_change() {
        let old = public_class("Parcel").with_method(generic_method("T"));
        let new = public_class("Parcel").with_method(generic_method("E"));
        assert!(compare(vec![old], vec![new]).is_empty());
    }

    #[test]
    fn renamed_class_type_variable_is_not_a_change() {
        let holder = |var: &str| {
            let mut class = public_class("Holder")
                .with_interface(ty(&format!("java.lang.Comparable<{var}>")))
                .with_field(Field::new("value", ty(var)).with_modifiers(&[Modifier::Public]))
                .with_method(
                    Method::new("set", ty("void"))
                        .with_modifiers(&[Modifier::Public])
                        .with_parameter(Parameter::new("v", ty(var))),
                );
            class.type_parameters.push(TypeParameter::new(var));
            class
        };
        assert!(compare(vec![holder("T")], vec![holder("E")]).is_empty());
    }

    #[test]
    fn generic_method_matches_its_erased_form() {
        let old = public_class("Parcel").with_method(generic_method("T"));
        let new = public_class("Parcel").with_method(
            Method::new("wrap", ty("java.lang.Object"))
                .with_modifiers(&[Modifier::Public])
                .with_parameter(Parameter::new("value", ty("java.lang.Object")))
                .with_parameter(Parameter::new("all", ty("java.util.List"))),
        );
        let delta = compare(vec![old], vec![new]);
        let class = only_class(&delta);
        assert_eq!(class.method_deltas.len(), 1);
        let method = &class.method_deltas[0];
        assert_eq!(method.signature, "wrap(java.lang.Object, java.util.List)");
        assert!(method.delta.is_changed());
    }

    #[test]
    fn interfaces_are_implicitly_abstract() {
        let plain =
            ClassDecl::new("Runnable", ClassKind::Interface).with_modifiers(&[Modifier::Public]);
        let explicit = plain.clone().with_modifiers(&[Modifier::Abstract]);
        assert!(compare(vec![plain], vec![explicit]).is_empty());

        let annotation =
            ClassDecl::new("Keep", ClassKind::Annotation).with_modifiers(&[Modifier::Public]);
        let normalized = ApiComparator::default().normalize(&snapshot("1", vec![annotation]));
        let keep = normalized.class("android.view", "Keep").unwrap();
        assert!(keep.modifiers.contains(&Modifier::Abstract));
    }

    #[test]
    fn interface_member_types_are_implicitly_public_static() {
        let outer = ClassDecl::new("View", ClassKind::Interface).with_modifiers(&[Modifier::Public]);
        let implicit = ClassDecl::new("View.Handle", ClassKind::Class);
        let explicit = ClassDecl::new("View.Handle", ClassKind::Class)
            .with_modifiers(&[Modifier::Public, Modifier::Static]);
        let delta = compare(
            vec![outer.clone(), implicit.clone()],
            vec![outer.clone(), explicit],
        );
        assert!(delta.is_empty());

        let normalized = ApiComparator::default().normalize(&snapshot("1", vec![outer, implicit]));
        assert!(normalized.class("android.view", "View.Handle").is_some());
    }

    #[test]
    fn nested_enums_are_implicitly_static() {
        let outer = public_class("View");
        let nested =
            ClassDecl::new("View.Mode", ClassKind::Enum).with_modifiers(&[Modifier::Public]);
        let explicit = nested.clone().with_modifiers(&[Modifier::Static]);
        assert!(compare(vec![outer.clone(), nested], vec![outer, explicit]).is_empty());
    }

    #[test]
    fn enum_constructors_are_implicitly_private() {
        let mode = |modifiers: &[Modifier]| {
            ClassDecl::new("Mode", ClassKind::Enum)
                .with_modifiers(&[Modifier::Public])
                .with_constructor(
                    Constructor::new()
                        .with_modifiers(modifiers)
                        .with_parameter(Parameter::new("speed", ty("int"))),
                )
        };
        let strict = ApiComparator::new(CompareConfig::strict());
        let delta = strict
            .compare(
                &snapshot("1", vec![mode(&[])]),
                &snapshot("2", vec![mode(&[Modifier::Private])]),
            )
            .unwrap();
        assert!(delta.is_empty());

        let normalized = ApiComparator::default().normalize(&snapshot("1", vec![mode(&[])]));
        let class = normalized.class("android.view", "Mode").unwrap();
        assert!(class.constructors.is_empty());
    }
}
