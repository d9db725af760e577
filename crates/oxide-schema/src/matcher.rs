//! Pairing of actual and expected elements within one category.
//!
//! Matching runs in three passes:
//!
//! 1. Every expected element claims the first unclaimed actual element that
//!    is equal to it. Such pairs produce no difference.
//! 2. Every expected element still unpaired claims the first unclaimed
//!    actual element with the same identity (name for columns, name or
//!    column list for indexes, body for constraints) and produces a
//!    mismatch. Without such a candidate it is missing.
//! 3. Every actual element never claimed is extra.
//!
//! Claims are tracked per actual position, so inputs are never modified.

use crate::dialect::TypeCanonicalizer;
use crate::spec::{ColumnSpec, ConstraintSpec, IndexSpec};

/// Outcome of matching for one unpaired element.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Outcome<T> {
    Extra(T),
    Missing(T),
    Mismatch { actual: T, expected: T },
}

/// Claims the first unclaimed element of `actual` satisfying `pred`.
fn claim<'a, T>(
    actual: &'a [T],
    claimed: &mut [bool],
    mut pred: impl FnMut(&T) -> bool,
) -> Option<&'a T> {
    let index = actual
        .iter()
        .zip(claimed.iter())
        .position(|(elem, &taken)| !taken && pred(elem))?;
    if let Some(slot) = claimed.get_mut(index) {
        *slot = true;
    }
    actual.get(index)
}

/// Matches `expected` against `actual`.
///
/// `equal(actual, expected)` decides perfect matches, `related(actual,
/// expected)` decides near misses. Outcomes are ordered with missing and
/// mismatched elements first, in expected order, followed by extra
/// elements in actual order.
pub(crate) fn match_elements<T: Clone>(
    actual: &[T],
    expected: &[T],
    equal: impl Fn(&T, &T) -> bool,
    related: impl Fn(&T, &T) -> bool,
) -> Vec<Outcome<T>> {
    let mut claimed = vec![false; actual.len()];

    let unpaired: Vec<&T> = expected
        .iter()
        .filter(|&exp| claim(actual, &mut claimed, |act| equal(act, exp)).is_none())
        .collect();

    let mut outcomes: Vec<Outcome<T>> = unpaired
        .into_iter()
        .map(|exp| match claim(actual, &mut claimed, |act| related(act, exp)) {
            Some(act) => Outcome::Mismatch {
                actual: act.clone(),
                expected: exp.clone(),
            },
            None => Outcome::Missing(exp.clone()),
        })
        .collect();

    outcomes.extend(
        actual
            .iter()
            .zip(claimed)
            .filter(|(_, taken)| !taken)
            .map(|(act, _)| Outcome::Extra(act.clone())),
    );
    outcomes
}

/// Column equality: canonical types agree and every other attribute that
/// is not a type qualifier is equal.
pub(crate) fn columns_equal(
    types: &(impl TypeCanonicalizer + ?Sized),
    actual: &ColumnSpec,
    expected: &ColumnSpec,
) -> bool {
    // Destructured so that a new attribute cannot be silently left out.
    let ColumnSpec {
        name,
        column_type: _,
        nullable,
        default,
        collate,
        primary_key,
        primary_key_constraint_name,
        table,
        key,
        on_delete,
        on_update,
        deferrable,
        unique,
        unique_constraint_name,
        serial: _,
        fixed: _,
        size: _,
        text: _,
        only_time: _,
    } = actual;

    *name == expected.name
        && *nullable == expected.nullable
        && *default == expected.default
        && *collate == expected.collate
        && *primary_key == expected.primary_key
        && *primary_key_constraint_name == expected.primary_key_constraint_name
        && *table == expected.table
        && *key == expected.key
        && *on_delete == expected.on_delete
        && *on_update == expected.on_update
        && *deferrable == expected.deferrable
        && *unique == expected.unique
        && *unique_constraint_name == expected.unique_constraint_name
        && types.canonical_type(actual) == types.canonical_type(expected)
}

pub(crate) fn columns_related(actual: &ColumnSpec, expected: &ColumnSpec) -> bool {
    actual.name == expected.name
}

/// Index equality. An expectation without a name accepts any name.
pub(crate) fn indexes_equal(actual: &IndexSpec, expected: &IndexSpec) -> bool {
    let IndexSpec {
        columns,
        name,
        index_type,
        unique,
        predicate,
    } = actual;

    (expected.name.is_none() || *name == expected.name)
        && *columns == expected.columns
        && *index_type == expected.index_type
        && *unique == expected.unique
        && *predicate == expected.predicate
}

/// Same index described differently: the names or the column lists agree.
/// Two unnamed indexes share a name.
pub(crate) fn indexes_related(actual: &IndexSpec, expected: &IndexSpec) -> bool {
    actual.name == expected.name || actual.columns == expected.columns
}

pub(crate) fn constraints_equal(actual: &ConstraintSpec, expected: &ConstraintSpec) -> bool {
    actual == expected
}

pub(crate) fn constraints_related(actual: &ConstraintSpec, expected: &ConstraintSpec) -> bool {
    actual.check == expected.check
}
