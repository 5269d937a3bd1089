//! Runtime type surface shared by the metadata model and the planner.
//!
//! `ValueType` describes a property's storage shape; `StructuralType` stands in
//! for the backing type an entity is mapped from. Shadow entity types have no
//! structural type at all.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

///
/// ScalarKind
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum ScalarKind {
    #[display("bool")]
    Bool,
    #[display("int32")]
    Int32,
    #[display("int64")]
    Int64,
    #[display("decimal")]
    Decimal,
    #[display("float64")]
    Float64,
    #[display("text")]
    Text,
    #[display("bytes")]
    Bytes,
    #[display("uuid")]
    Uuid,
    #[display("timestamp")]
    Timestamp,
}

///
/// ValueType
/// Scalar kind plus nullability.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ValueType {
    pub kind: ScalarKind,
    pub nullable: bool,
}

impl ValueType {
    #[must_use]
    pub const fn required(kind: ScalarKind) -> Self {
        Self {
            kind,
            nullable: false,
        }
    }

    #[must_use]
    pub const fn nullable(kind: ScalarKind) -> Self {
        Self {
            kind,
            nullable: true,
        }
    }

    /// The nullable counterpart of this type.
    #[must_use]
    pub const fn as_nullable(self) -> Self {
        Self::nullable(self.kind)
    }

    /// Whether values of `self` and `other` may be compared for equality,
    /// possibly after widening one side to nullable.
    #[must_use]
    pub fn is_compatible_with(self, other: Self) -> bool {
        self.kind == other.kind
    }

    #[must_use]
    pub fn differs_only_by_nullability(self, other: Self) -> bool {
        self.kind == other.kind && self.nullable != other.nullable
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "{}?", self.kind)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

///
/// MemberType
/// Shape of one member on a structural type.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MemberType {
    Scalar(ValueType),

    /// Single-valued reference to another structural type, by name.
    Reference(String),

    /// Collection whose elements are of the named structural type.
    Collection(String),
}

///
/// StructuralType
///
/// Backing type of a non-shadow entity type: its name, its members, and
/// whether instances raise change notifications on their own.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StructuralType {
    name: String,
    members: BTreeMap<String, MemberType>,
    notifies_changes: bool,
}

impl StructuralType {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: BTreeMap::new(),
            notifies_changes: false,
        }
    }

    #[must_use]
    pub fn with_scalar(mut self, name: impl Into<String>, ty: ValueType) -> Self {
        self.members.insert(name.into(), MemberType::Scalar(ty));
        self
    }

    #[must_use]
    pub fn with_reference(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.members
            .insert(name.into(), MemberType::Reference(target.into()));
        self
    }

    #[must_use]
    pub fn with_collection(mut self, name: impl Into<String>, element: impl Into<String>) -> Self {
        self.members
            .insert(name.into(), MemberType::Collection(element.into()));
        self
    }

    #[must_use]
    pub const fn notifying_changes(mut self) -> Self {
        self.notifies_changes = true;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn member(&self, name: &str) -> Option<&MemberType> {
        self.members.get(name)
    }

    pub fn members(&self) -> impl Iterator<Item = (&str, &MemberType)> {
        self.members.iter().map(|(name, ty)| (name.as_str(), ty))
    }

    #[must_use]
    pub const fn notifies_changes(&self) -> bool {
        self.notifies_changes
    }
}
