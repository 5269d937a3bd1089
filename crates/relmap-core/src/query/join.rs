use crate::{
    model::{Model, NavigationInfo, Property, describe_properties},
    query::{IncludeError, expr::SqlExpression, select::TableSource},
};

/// Build the equality predicate joining the two sides of `navigation`.
///
/// Foreign-key property `i` is resolved on `dependent_side` and paired with
/// `principal_key[i]` resolved on `principal_side`. When a pair differs only
/// by nullability the non-nullable column is widened, so every comparison is
/// between equal types. The pairs are AND-combined in key order.
pub fn build_join_predicate(
    model: &Model,
    navigation: NavigationInfo<'_>,
    principal_key: &[&Property],
    dependent_side: &TableSource,
    principal_side: &TableSource,
) -> Result<SqlExpression, IncludeError> {
    let fk = navigation.foreign_key;
    if fk.properties.len() != principal_key.len() {
        return Err(IncludeError::JoinArityMismatch {
            navigation: navigation.navigation.name().to_string(),
            foreign_key: fk.to_string(),
            principal_key: describe_properties(
                &principal_key.iter().map(|p| p.name()).collect::<Vec<_>>(),
            ),
        });
    }

    let dependent = model.entity_type(fk.dependent)?;
    let mut predicate: Option<SqlExpression> = None;

    for (name, principal) in fk.properties.iter().zip(principal_key) {
        let property = dependent.get_property(name)?;

        let mut left = SqlExpression::Column(dependent_side.column_for(property)?);
        let mut right = SqlExpression::Column(principal_side.column_for(principal)?);

        let (left_ty, right_ty) = (left.ty(), right.ty());
        if left_ty.differs_only_by_nullability(right_ty) {
            if left_ty.nullable {
                right = SqlExpression::convert(right, left_ty);
            } else {
                left = SqlExpression::convert(left, right_ty);
            }
        }

        let equal = SqlExpression::equal(left, right);
        predicate = Some(match predicate {
            Some(acc) => SqlExpression::and_also(acc, equal),
            None => equal,
        });
    }

    // the model rejects empty foreign keys, so at least one pair exists
    predicate.ok_or_else(|| IncludeError::JoinArityMismatch {
        navigation: navigation.navigation.name().to_string(),
        foreign_key: fk.to_string(),
        principal_key: describe_properties::<&str>(&[]),
    })
}
