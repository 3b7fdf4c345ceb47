//! Declarations that make up an API snapshot.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::modifier::{Modifier, Visibility};
use crate::type_ref::TypeRef;

/// An annotation applied to a declaration.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Annotation {
    /// Fully qualified annotation type, e.g. `java.lang.Deprecated`.
    pub type_name: String,
    /// Element values rendered as source text.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub elements: BTreeMap<String, String>,
}

impl Annotation {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            elements: BTreeMap::new(),
        }
    }

    pub fn with_element(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.elements.insert(name.into(), value.into());
        self
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.type_name)?;
        if !self.elements.is_empty() {
            let body: Vec<String> = self
                .elements
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            write!(f, "({})", body.join(", "))?;
        }
        Ok(())
    }
}

/// A type parameter of a generic class, method or constructor.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeParameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bounds: Vec<TypeRef>,
}

impl TypeParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bounds: Vec::new(),
        }
    }

    pub fn bounded(name: impl Into<String>, bounds: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            bounds,
        }
    }

    /// Apply [`TypeRef::rename_variables`] to the name and every bound.
    pub fn rename_variables(&self, renames: &BTreeMap<String, String>) -> Self {
        Self {
            name: renames.get(&self.name).unwrap_or(&self.name).clone(),
            bounds: self
                .bounds
                .iter()
                .map(|b| b.rename_variables(renames))
                .collect(),
        }
    }
}

impl fmt::Display for TypeParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.bounds.is_empty() {
            let bounds: Vec<String> = self.bounds.iter().map(ToString::to_string).collect();
            write!(f, " extends {}", bounds.join(" & "))?;
        }
        Ok(())
    }
}

/// A formal parameter of a method or constructor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// The kind of a class declaration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Enum,
    Annotation,
}

impl ClassKind {
    /// Interfaces and annotation types make their members implicitly public.
    pub fn has_public_members(&self) -> bool {
        matches!(self, Self::Interface | Self::Annotation)
    }
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class => write!(f, "class"),
            Self::Interface => write!(f, "interface"),
            Self::Enum => write!(f, "enum"),
            Self::Annotation => write!(f, "@interface"),
        }
    }
}

/// Common surface of every modifiable, annotatable declaration.
pub trait Declaration {
    fn modifiers(&self) -> &BTreeSet<Modifier>;

    fn annotations(&self) -> &[Annotation];

    /// Visibility as written on the declaration.
    fn visibility(&self) -> Visibility {
        Visibility::of(self.modifiers())
    }
}

/// A field or constant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub modifiers: BTreeSet<Modifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    /// Constant value as source text, for compile-time constants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            modifiers: BTreeSet::new(),
            annotations: Vec::new(),
            value: None,
        }
    }

    pub fn with_modifiers(mut self, modifiers: &[Modifier]) -> Self {
        self.modifiers.extend(modifiers.iter().copied());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// A method declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<TypeParameter>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub return_type: TypeRef,
    #[serde(default)]
    pub modifiers: BTreeSet<Modifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl Method {
    pub fn new(name: impl Into<String>, return_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_parameters: Vec::new(),
            parameters: Vec::new(),
            return_type,
            modifiers: BTreeSet::new(),
            exceptions: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: Parameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn with_modifiers(mut self, modifiers: &[Modifier]) -> Self {
        self.modifiers.extend(modifiers.iter().copied());
        self
    }

    pub fn with_exception(mut self, exception: TypeRef) -> Self {
        self.exceptions.push(exception);
        self
    }

    /// Erased signature used to match methods across snapshots:
    /// `name(java.util.List, int)`. Only the method's own type parameters
    /// are resolved; see [`Method::signature_in`].
    pub fn signature(&self) -> String {
        self.signature_in(&[])
    }

    /// Erased signature with the type variables of the method and of its
    /// declaring class resolved to their erasure, so `<T> m(T)` and
    /// `<E> m(E)` share the signature `m(java.lang.Object)`.
    pub fn signature_in(&self, class_params: &[TypeParameter]) -> String {
        let params = erased_parameter_list(&self.parameters, &self.type_parameters, class_params);
        format!("{}{}", self.name, params)
    }
}

/// A constructor declaration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constructor {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<TypeParameter>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub modifiers: BTreeSet<Modifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl Constructor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter(mut self, param: Parameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn with_modifiers(mut self, modifiers: &[Modifier]) -> Self {
        self.modifiers.extend(modifiers.iter().copied());
        self
    }

    /// Erased parameter list used to match constructors: `(int, java.lang.String)`.
    pub fn signature(&self) -> String {
        self.signature_in(&[])
    }

    pub fn signature_in(&self, class_params: &[TypeParameter]) -> String {
        erased_parameter_list(&self.parameters, &self.type_parameters, class_params)
    }
}

/// Own type parameters shadow the declaring class's.
fn erased_parameter_list(
    params: &[Parameter],
    own: &[TypeParameter],
    class_params: &[TypeParameter],
) -> String {
    let scope: Vec<&TypeParameter> = own.iter().chain(class_params).collect();
    let types: Vec<String> = params
        .iter()
        .map(|p| p.ty.erasure_in(&scope).to_string())
        .collect();
    format!("({})", types.join(", "))
}

/// A class, interface, enum or annotation type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDecl {
    /// Simple name; nested classes use `Outer.Inner`.
    pub name: String,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default)]
    pub modifiers: BTreeSet<Modifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<TypeParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub constructors: Vec<Constructor>,
    #[serde(default)]
    pub methods: Vec<Method>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_constants: Vec<String>,
}

impl ClassDecl {
    pub fn new(name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            modifiers: BTreeSet::new(),
            type_parameters: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            annotations: Vec::new(),
            fields: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            enum_constants: Vec::new(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: &[Modifier]) -> Self {
        self.modifiers.extend(modifiers.iter().copied());
        self
    }

    pub fn with_superclass(mut self, superclass: TypeRef) -> Self {
        self.superclass = Some(superclass);
        self
    }

    pub fn with_interface(mut self, interface: TypeRef) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_constructor(mut self, constructor: Constructor) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a method by erased signature, e.g. `get(int)`.
    pub fn method(&self, signature: &str) -> Option<&Method> {
        self.methods
            .iter()
            .find(|m| m.signature_in(&self.type_parameters) == signature)
    }

    /// Look up a constructor by erased parameter list, e.g. `(int)`.
    pub fn constructor(&self, signature: &str) -> Option<&Constructor> {
        self.constructors
            .iter()
            .find(|c| c.signature_in(&self.type_parameters) == signature)
    }
}

/// A package and the classes it declares.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub classes: Vec<ClassDecl>,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotations: Vec::new(),
            classes: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: ClassDecl) -> Self {
        self.classes.push(class);
        self
    }

    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.classes.iter().find(|c| c.name == name)
    }
}

macro_rules! impl_declaration {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Declaration for $ty {
                fn modifiers(&self) -> &BTreeSet<Modifier> {
                    &self.modifiers
                }

                fn annotations(&self) -> &[Annotation] {
                    &self.annotations
                }
            }
        )*
    };
}

impl_declaration!(Field, Method, Constructor, ClassDecl);
