//! Deterministic ANSI-style SQL rendering of select shapes, for explain output
//! and diagnostics. Not a provider SQL generator.

use crate::query::{
    expr::{AliasExpression, ColumnExpression, SqlExpression},
    select::{Ordering, SelectExpression, TableExpression, TableSource},
};
use std::fmt::{self, Display};

struct Quoted<'a>(&'a str);

impl Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0.replace('"', "\"\""))
    }
}

impl Display for ColumnExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", Quoted(&self.table_alias), Quoted(&self.name))
    }
}

impl Display for SqlExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(column) => write!(f, "{column}"),
            Self::Convert { operand, ty } => write!(f, "CAST({operand} AS {ty})"),
            Self::Equal(left, right) => write!(f, "{left} = {right}"),
            Self::AndAlso(left, right) => write!(f, "{left} AND {right}"),
        }
    }
}

impl Display for AliasExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)?;

        match self.expression.as_column() {
            Some(column) if column.name == self.alias => Ok(()),
            _ => write!(f, " AS {}", Quoted(&self.alias)),
        }
    }
}

impl Display for TableExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "{}.", Quoted(schema))?;
        }

        write!(f, "{} AS {}", Quoted(&self.name), Quoted(&self.alias))
    }
}

impl Display for TableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table(table) => write!(f, "{table}"),
            Self::Select(select) => {
                write!(f, "({select})")?;
                match select.alias() {
                    Some(alias) => write!(f, " AS {}", Quoted(alias)),
                    None => Ok(()),
                }
            }
            Self::Join(join) => write!(f, "{} {} ON {}", join.kind, join.table, join.predicate),
        }
    }
}

impl Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.column, self.direction)
    }
}

impl Display for SelectExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        if self.is_distinct() {
            f.write_str("DISTINCT ")?;
        }

        if self.projection().is_empty() {
            f.write_str("1")?;
        } else {
            write_list(f, self.projection(), ", ")?;
        }

        for (i, table) in self.tables().iter().enumerate() {
            match (i, table) {
                (0, _) => write!(f, " FROM {table}")?,
                (_, TableSource::Join(_)) => write!(f, " {table}")?,
                _ => write!(f, ", {table}")?,
            }
        }

        if !self.order_by().is_empty() {
            f.write_str(" ORDER BY ")?;
            write_list(f, self.order_by(), ", ")?;
        }

        Ok(())
    }
}

fn write_list<T: Display>(f: &mut fmt::Formatter<'_>, items: &[T], separator: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{item}")?;
    }

    Ok(())
}
