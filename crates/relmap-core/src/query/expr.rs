use crate::{
    model::PropertyRef,
    types::{ScalarKind, ValueType},
};

///
/// ColumnExpression
///
/// A column read from one table scope. `property` links the column back to
/// the metadata it was derived from, which is how aliased projections are
/// found again later.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColumnExpression {
    pub name: String,
    pub table_alias: String,
    pub property: Option<PropertyRef>,
    pub ty: ValueType,
}

impl ColumnExpression {
    pub fn new(
        name: impl Into<String>,
        table_alias: impl Into<String>,
        property: Option<PropertyRef>,
        ty: ValueType,
    ) -> Self {
        Self {
            name: name.into(),
            table_alias: table_alias.into(),
            property,
            ty,
        }
    }
}

///
/// AliasExpression
/// One projection entry with its unique output name.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AliasExpression {
    pub expression: SqlExpression,
    pub alias: String,
}

///
/// SqlExpression
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SqlExpression {
    Column(ColumnExpression),

    /// Widens `operand` to `ty`; only ever used to add nullability.
    Convert {
        operand: Box<Self>,
        ty: ValueType,
    },

    Equal(Box<Self>, Box<Self>),
    AndAlso(Box<Self>, Box<Self>),
}

impl SqlExpression {
    #[must_use]
    pub fn equal(left: Self, right: Self) -> Self {
        Self::Equal(Box::new(left), Box::new(right))
    }

    #[must_use]
    pub fn and_also(left: Self, right: Self) -> Self {
        Self::AndAlso(Box::new(left), Box::new(right))
    }

    #[must_use]
    pub fn convert(operand: Self, ty: ValueType) -> Self {
        Self::Convert {
            operand: Box::new(operand),
            ty,
        }
    }

    #[must_use]
    pub const fn ty(&self) -> ValueType {
        match self {
            Self::Column(column) => column.ty,
            Self::Convert { ty, .. } => *ty,
            Self::Equal(..) | Self::AndAlso(..) => ValueType::required(ScalarKind::Bool),
        }
    }

    #[must_use]
    pub const fn as_column(&self) -> Option<&ColumnExpression> {
        match self {
            Self::Column(column) => Some(column),
            _ => None,
        }
    }

    /// Flatten nested `AndAlso` nodes into their operands, left to right.
    #[must_use]
    pub fn conjuncts(&self) -> Vec<&Self> {
        match self {
            Self::AndAlso(left, right) => {
                let mut out = left.conjuncts();
                out.extend(right.conjuncts());
                out
            }
            other => vec![other],
        }
    }

    /// Number of `Convert` nodes anywhere in the tree.
    #[must_use]
    pub fn convert_count(&self) -> usize {
        match self {
            Self::Column(_) => 0,
            Self::Convert { operand, .. } => 1 + operand.convert_count(),
            Self::Equal(left, right) | Self::AndAlso(left, right) => {
                left.convert_count() + right.convert_count()
            }
        }
    }
}
