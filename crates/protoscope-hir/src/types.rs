use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Char,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    /// The `java.lang` wrapper class used for boxing conversion.
    pub fn wrapper(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "java.lang.Boolean",
            PrimitiveType::Byte => "java.lang.Byte",
            PrimitiveType::Short => "java.lang.Short",
            PrimitiveType::Char => "java.lang.Character",
            PrimitiveType::Int => "java.lang.Integer",
            PrimitiveType::Long => "java.lang.Long",
            PrimitiveType::Float => "java.lang.Float",
            PrimitiveType::Double => "java.lang.Double",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.keyword() == keyword)
    }
}

/// A Java type as written in a declaration.
///
/// Named types carry their canonical (qualified, erased) text; generics are
/// irrelevant for the naming conventions this crate models.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Void,
    Primitive(PrimitiveType),
    Named(String),
    Array(Box<Type>),
}

impl Type {
    pub fn int() -> Self {
        Type::Primitive(PrimitiveType::Int)
    }

    pub fn boolean() -> Self {
        Type::Primitive(PrimitiveType::Boolean)
    }

    pub fn string() -> Self {
        Type::Named("java.lang.String".into())
    }

    pub fn named(name: impl Into<String>) -> Self {
        Type::Named(name.into())
    }

    /// Parses the textual form used in annotation attributes (`int`,
    /// `java.lang.String`, `long[]`, `void`).
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(element) = text.strip_suffix("[]") {
            return Type::Array(Box::new(Type::parse(element)));
        }
        if text == "void" {
            return Type::Void;
        }
        match PrimitiveType::from_keyword(text) {
            Some(p) => Type::Primitive(p),
            None => Type::Named(text.to_string()),
        }
    }

    pub fn is_primitive_boolean(&self) -> bool {
        matches!(self, Type::Primitive(PrimitiveType::Boolean))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Type::Named(_) | Type::Array(_))
    }

    pub fn canonical_text(&self) -> String {
        match self {
            Type::Void => "void".to_string(),
            Type::Primitive(p) => p.keyword().to_string(),
            Type::Named(name) => name.clone(),
            Type::Array(element) => format!("{}[]", element.canonical_text()),
        }
    }

    /// The unqualified spelling, as an editor would present it.
    pub fn presentable_text(&self) -> String {
        match self {
            Type::Named(name) => name.rsplit('.').next().unwrap_or(name).to_string(),
            Type::Array(element) => format!("{}[]", element.presentable_text()),
            other => other.canonical_text(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_text())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: Type,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Java modifier bitmask.
///
/// Bit values follow `java.lang.reflect.Modifier` so that the `modifier`
/// attribute of an augment annotation can be decoded directly.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Modifiers(u32);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const PUBLIC: Modifiers = Modifiers(0x0001);
    pub const PRIVATE: Modifiers = Modifiers(0x0002);
    pub const PROTECTED: Modifiers = Modifiers(0x0004);
    pub const STATIC: Modifiers = Modifiers(0x0008);
    pub const FINAL: Modifiers = Modifiers(0x0010);
    pub const SYNCHRONIZED: Modifiers = Modifiers(0x0020);
    pub const VOLATILE: Modifiers = Modifiers(0x0040);
    pub const TRANSIENT: Modifiers = Modifiers(0x0080);
    pub const NATIVE: Modifiers = Modifiers(0x0100);
    pub const ABSTRACT: Modifiers = Modifiers(0x0400);
    pub const STRICTFP: Modifiers = Modifiers(0x0800);
    // Not part of the reflection bitmask; interface `default` methods.
    pub const DEFAULT: Modifiers = Modifiers(0x1_0000);

    const NAMED: [(Modifiers, &'static str); 12] = [
        (Modifiers::PUBLIC, "public"),
        (Modifiers::PRIVATE, "private"),
        (Modifiers::PROTECTED, "protected"),
        (Modifiers::STATIC, "static"),
        (Modifiers::FINAL, "final"),
        (Modifiers::SYNCHRONIZED, "synchronized"),
        (Modifiers::VOLATILE, "volatile"),
        (Modifiers::TRANSIENT, "transient"),
        (Modifiers::NATIVE, "native"),
        (Modifiers::ABSTRACT, "abstract"),
        (Modifiers::STRICTFP, "strictfp"),
        (Modifiers::DEFAULT, "default"),
    ];

    pub const fn from_bits(bits: u32) -> Self {
        Modifiers(bits)
    }

    /// Decodes a `long` annotation constant, ignoring bits we do not model.
    pub fn from_reflection(bits: i64) -> Self {
        let known = Self::NAMED.iter().fold(0u32, |acc, (m, _)| acc | m.0);
        Modifiers((bits as u32) & known)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub fn insert(&mut self, other: Modifiers) {
        self.0 |= other.0;
    }

    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMED
            .into_iter()
            .filter(move |(m, _)| self.contains(*m))
            .map(|(_, name)| name)
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 | rhs.0)
    }
}

impl BitAnd for Modifiers {
    type Output = Modifiers;

    fn bitand(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 & rhs.0)
    }
}

impl BitOrAssign for Modifiers {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
