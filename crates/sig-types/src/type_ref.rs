//! Java-style type references.
//!
//! Type references are written and displayed as source text:
//! `int`, `java.lang.String[]`, `java.util.Map<K, java.util.List<? extends V>>`,
//! `java.lang.Object...`. Class names must be fully qualified; an unqualified
//! name that is not a primitive keyword is a type variable.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::decl::TypeParameter;
use crate::error::TypeError;

const OBJECT: &str = "java.lang.Object";

/// Primitive types, including `void` for return types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
}

impl Primitive {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Void => "void",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        let p = match s {
            "boolean" => Self::Boolean,
            "byte" => Self::Byte,
            "char" => Self::Char,
            "short" => Self::Short,
            "int" => Self::Int,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            "void" => Self::Void,
            _ => return None,
        };
        Some(p)
    }
}

/// A reference to a type as it appears in a declaration.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    /// A primitive type or `void`.
    Primitive(Primitive),
    /// A class or interface, possibly parameterized.
    Class { name: String, args: Vec<TypeRef> },
    /// An array of the inner type. Varargs parameters are arrays.
    Array(Box<TypeRef>),
    /// A type variable declared by an enclosing generic declaration.
    Variable(String),
    /// `?`
    Wildcard,
    /// `? extends T`
    WildcardExtends(Box<TypeRef>),
    /// `? super T`
    WildcardSuper(Box<TypeRef>),
}

impl TypeRef {
    /// A raw (non-parameterized) class reference.
    pub fn class(name: impl Into<String>) -> Self {
        Self::Class {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// A parameterized class reference.
    pub fn parameterized(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self::Class {
            name: name.into(),
            args,
        }
    }

    pub fn array(component: TypeRef) -> Self {
        Self::Array(Box::new(component))
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(
            self,
            Self::Wildcard | Self::WildcardExtends(_) | Self::WildcardSuper(_)
        )
    }

    /// Number of array dimensions (0 for non-arrays).
    pub fn dimensions(&self) -> usize {
        match self {
            Self::Array(inner) => 1 + inner.dimensions(),
            _ => 0,
        }
    }

    /// The type with all type arguments removed. Type variables are kept by
    /// name; use [`TypeRef::erasure_in`] to resolve them.
    pub fn erasure(&self) -> TypeRef {
        self.erase(&[], 0)
    }

    /// Erasure with type variables resolved against `scope`, innermost
    /// declaration first.
    ///
    /// A declared variable erases to the erasure of its leftmost bound, or to
    /// `java.lang.Object` when unbounded. Variables missing from `scope`
    /// are kept by name.
    pub fn erasure_in(&self, scope: &[&TypeParameter]) -> TypeRef {
        self.erase(scope, scope.len())
    }

    // `depth` bounds the walk through variable-to-variable bounds, so
    // cyclic bounds such as `<A extends B, B extends A>` terminate.
    fn erase(&self, scope: &[&TypeParameter], depth: usize) -> TypeRef {
        match self {
            Self::Class { name, .. } => Self::class(name.clone()),
            Self::Array(inner) => Self::array(inner.erase(scope, depth)),
            Self::Variable(name) => match scope.iter().find(|p| &p.name == name) {
                Some(param) => match param.bounds.first() {
                    Some(bound) if depth > 0 => bound.erase(scope, depth - 1),
                    _ => Self::class(OBJECT),
                },
                None => self.clone(),
            },
            other => other.clone(),
        }
    }

    /// Rename type variables, e.g. `{E -> T}` turns `java.util.List<E>` into
    /// `java.util.List<T>`. All renames apply at once, so swaps work.
    pub fn rename_variables(&self, renames: &BTreeMap<String, String>) -> TypeRef {
        match self {
            Self::Variable(name) => match renames.get(name) {
                Some(to) => Self::Variable(to.clone()),
                None => self.clone(),
            },
            Self::Class { name, args } => Self::Class {
                name: name.clone(),
                args: args.iter().map(|a| a.rename_variables(renames)).collect(),
            },
            Self::Array(inner) => Self::array(inner.rename_variables(renames)),
            Self::WildcardExtends(bound) => {
                Self::WildcardExtends(Box::new(bound.rename_variables(renames)))
            }
            Self::WildcardSuper(bound) => {
                Self::WildcardSuper(Box::new(bound.rename_variables(renames)))
            }
            Self::Primitive(_) | Self::Wildcard => self.clone(),
        }
    }

    /// Parse a type reference from source text.
    pub fn parse(input: &str) -> Result<Self, TypeError> {
        let mut parser = Parser { src: input, pos: 0 };
        let ty = parser.parse_type(false)?;
        parser.skip_ws();
        if parser.pos < parser.src.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(ty)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => f.write_str(p.as_str()),
            Self::Class { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            Self::Array(inner) => write!(f, "{inner}[]"),
            Self::Variable(name) => f.write_str(name),
            Self::Wildcard => f.write_str("?"),
            Self::WildcardExtends(bound) => write!(f, "? extends {bound}"),
            Self::WildcardSuper(bound) => write!(f, "? super {bound}"),
        }
    }
}

impl FromStr for TypeRef {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TypeRef {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn error(&self, reason: &str) -> TypeError {
        TypeError::InvalidTypeRef {
            input: self.src.to_string(),
            reason: format!("{reason} at offset {}", self.pos),
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), TypeError> {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.bump();
            Ok(())
        } else {
            Err(self.error(&format!("expected `{expected}`")))
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let rest = &self.src[self.pos..];
        if !rest.starts_with(keyword) {
            return false;
        }
        let boundary = rest[keyword.len()..]
            .chars()
            .next()
            .map_or(true, |c| !is_ident_char(c));
        if boundary {
            self.pos += keyword.len();
        }
        boundary
    }

    fn parse_ident(&mut self) -> Result<String, TypeError> {
        self.skip_ws();
        let start = self.pos;
        match self.peek() {
            Some(c) if is_ident_start(c) => self.bump(),
            _ => return Err(self.error("expected type name")),
        }
        while let Some(c) = self.peek() {
            if c == '.' && self.src[self.pos..].starts_with("..") {
                break;
            }
            if !is_ident_char(c) {
                break;
            }
            self.bump();
        }
        let ident = &self.src[start..self.pos];
        if ident.ends_with('.') {
            return Err(self.error("qualified name ends with `.`"));
        }
        Ok(ident.to_string())
    }

    fn parse_type(&mut self, allow_wildcard: bool) -> Result<TypeRef, TypeError> {
        self.skip_ws();
        if self.peek() == Some('?') {
            if !allow_wildcard {
                return Err(self.error("wildcard outside type arguments"));
            }
            self.bump();
            self.skip_ws();
            if self.eat_keyword("extends") {
                return Ok(TypeRef::WildcardExtends(Box::new(self.parse_type(false)?)));
            }
            if self.eat_keyword("super") {
                return Ok(TypeRef::WildcardSuper(Box::new(self.parse_type(false)?)));
            }
            return Ok(TypeRef::Wildcard);
        }

        let ident = self.parse_ident()?;
        let mut ty = if let Some(p) = Primitive::from_keyword(&ident) {
            TypeRef::Primitive(p)
        } else if ident.contains('.') {
            self.skip_ws();
            let args = if self.peek() == Some('<') {
                self.parse_args()?
            } else {
                Vec::new()
            };
            TypeRef::Class { name: ident, args }
        } else {
            self.skip_ws();
            if self.peek() == Some('<') {
                return Err(self.error("type variable cannot take type arguments"));
            }
            TypeRef::Variable(ident)
        };

        loop {
            self.skip_ws();
            if self.src[self.pos..].starts_with("...") {
                self.pos += 3;
                ty = TypeRef::array(ty);
            } else if self.peek() == Some('[') {
                self.bump();
                self.expect(']')?;
                ty = TypeRef::array(ty);
            } else {
                break;
            }
        }
        Ok(ty)
    }

    fn parse_args(&mut self) -> Result<Vec<TypeRef>, TypeError> {
        self.expect('<')?;
        let mut args = Vec::new();
        loop {
            args.push(self.parse_type(true)?);
            self.skip_ws();
            match self.peek() {
                Some(',') => self.bump(),
                Some('>') => {
                    self.bump();
                    break;
                }
                _ => return Err(self.error("expected `,` or `>`")),
            }
        }
        Ok(args)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '.'
}
