//! Typed descriptors of host symbols.
//!
//! A descriptor is what a lookup returns and what an invocation takes; the
//! delivery stack never touches the host's own reflective objects.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fully qualified host type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRef(String);

impl TypeRef {
    pub const INT: &'static str = "int";
    pub const STRING: &'static str = "string";
    pub const VOID: &'static str = "void";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn int() -> Self {
        Self::new(Self::INT)
    }

    pub fn string() -> Self {
        Self::new(Self::STRING)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything before the last `.`; empty for unqualified names.
    pub fn package(&self) -> &str {
        self.0.rsplit_once('.').map_or("", |(pkg, _)| pkg)
    }

    /// Everything after the last `.`.
    pub fn simple_name(&self) -> &str {
        self.0.rsplit_once('.').map_or(self.0.as_str(), |(_, name)| name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for TypeRef {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSymbol {
    pub owner: TypeRef,
    pub name: String,
    pub params: Vec<TypeRef>,
    pub returns: TypeRef,
    pub is_static: bool,
}

impl fmt::Display for MethodSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}({})", self.owner, self.name, join(&self.params))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldSymbol {
    pub owner: TypeRef,
    pub name: String,
    pub declared_type: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstructorSymbol {
    pub owner: TypeRef,
    pub params: Vec<TypeRef>,
}

impl fmt::Display for ConstructorSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.owner, join(&self.params))
    }
}

/// Comma-separated parameter list, as used in symbol displays and errors.
pub fn join(params: &[TypeRef]) -> String {
    params
        .iter()
        .map(TypeRef::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_package_and_simple_name() {
        let ty = TypeRef::new("org.bukkit.craftbukkit.v1_8_R3.CraftServer");
        assert_eq!(ty.package(), "org.bukkit.craftbukkit.v1_8_R3");
        assert_eq!(ty.simple_name(), "CraftServer");
    }

    #[test]
    fn unqualified_name_has_empty_package() {
        let ty = TypeRef::int();
        assert_eq!(ty.package(), "");
        assert_eq!(ty.simple_name(), "int");
    }

    #[test]
    fn symbol_display() {
        let ctor = ConstructorSymbol {
            owner: TypeRef::new("Title"),
            params: vec![TypeRef::int(), TypeRef::int(), TypeRef::int()],
        };
        assert_eq!(ctor.to_string(), "Title(int, int, int)");
    }
}
