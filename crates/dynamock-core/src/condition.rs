//! Condition evaluation over attribute values.
//!
//! A [`Condition`] names a comparison operator and its operands. Evaluation
//! happens on decoded values (see [`DecodedValue`]), so numbers compare
//! numerically regardless of spelling. Type mismatches never error: they
//! simply evaluate to `false`. The only failure is an operator this module
//! does not implement.

use std::cmp::Ordering;

use dynamock_model::AttributeValue;
use dynamock_model::decoded::DecodedValue;
use dynamock_model::types::{ComparisonOperator, Condition, ConditionalOperator, Item};

/// Errors raised while evaluating conditions.
#[derive(Debug, thiserror::Error)]
pub enum ConditionError {
    /// The operator is not one the evaluator implements.
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),
}

/// Apply `op` to `value` with the given operands.
///
/// A missing attribute (`value == None`) is `false` for every operator,
/// `NE` and `NOT_CONTAINS` included. Too few operands is also `false`.
pub fn evaluate(
    op: &ComparisonOperator,
    value: Option<&AttributeValue>,
    operands: &[AttributeValue],
) -> Result<bool, ConditionError> {
    if let ComparisonOperator::Unknown(name) = op {
        return Err(ConditionError::UnsupportedOperator(name.clone()));
    }
    let Some(value) = value else {
        return Ok(false);
    };

    let decoded = value.decode();
    let first = operands.first().map(AttributeValue::decode);

    let result = match op {
        ComparisonOperator::Null => value.is_null(),
        ComparisonOperator::NotNull => !value.is_null(),
        ComparisonOperator::Eq => first.is_some_and(|rhs| decoded == rhs),
        ComparisonOperator::Ne => first.is_some_and(|rhs| decoded != rhs),
        ComparisonOperator::In => operands.iter().any(|rhs| decoded == rhs.decode()),
        ComparisonOperator::Lt => ordering_is(&decoded, first.as_ref(), Ordering::is_lt),
        ComparisonOperator::Le => ordering_is(&decoded, first.as_ref(), Ordering::is_le),
        ComparisonOperator::Gt => ordering_is(&decoded, first.as_ref(), Ordering::is_gt),
        ComparisonOperator::Ge => ordering_is(&decoded, first.as_ref(), Ordering::is_ge),
        ComparisonOperator::Between => match operands {
            [low, high, ..] => {
                ordering_is(&decoded, Some(&low.decode()), Ordering::is_ge)
                    && ordering_is(&decoded, Some(&high.decode()), Ordering::is_le)
            }
            _ => false,
        },
        ComparisonOperator::BeginsWith => {
            strings(value, operands.first()).is_some_and(|(s, prefix)| s.starts_with(prefix))
        }
        ComparisonOperator::Contains => {
            strings(value, operands.first()).is_some_and(|(s, needle)| s.contains(needle))
        }
        ComparisonOperator::NotContains => {
            strings(value, operands.first()).is_some_and(|(s, needle)| !s.contains(needle))
        }
        ComparisonOperator::Unknown(_) => false,
    };
    Ok(result)
}

fn ordering_is(
    lhs: &DecodedValue<'_>,
    rhs: Option<&DecodedValue<'_>>,
    check: fn(Ordering) -> bool,
) -> bool {
    rhs.and_then(|rhs| lhs.compare(rhs)).is_some_and(check)
}

fn strings<'a>(
    value: &'a AttributeValue,
    operand: Option<&'a AttributeValue>,
) -> Option<(&'a str, &'a str)> {
    Some((value.as_s()?, operand?.as_s()?))
}

/// Evaluate a set of per-attribute conditions against an item.
///
/// An empty set matches every item.
pub fn evaluate_conditions<'a, I>(
    item: &Item,
    conditions: I,
    combinator: ConditionalOperator,
) -> Result<bool, ConditionError>
where
    I: IntoIterator<Item = (&'a String, &'a Condition)>,
{
    let mut any = false;
    for (attr, condition) in conditions {
        any = true;
        let matched = evaluate(
            &condition.comparison_operator,
            item.get(attr),
            &condition.attribute_value_list,
        )?;
        match combinator {
            ConditionalOperator::And if !matched => return Ok(false),
            ConditionalOperator::Or if matched => return Ok(true),
            _ => {}
        }
    }
    Ok(match combinator {
        ConditionalOperator::And => true,
        ConditionalOperator::Or => !any,
    })
}

/// Fail with `UnsupportedOperator` if any condition names an unknown operator.
///
/// Run before touching items so a bad filter is rejected even on an empty table.
pub fn validate_operators<'a, I>(conditions: I) -> Result<(), ConditionError>
where
    I: IntoIterator<Item = &'a Condition>,
{
    for condition in conditions {
        if let ComparisonOperator::Unknown(name) = &condition.comparison_operator {
            return Err(ConditionError::UnsupportedOperator(name.clone()));
        }
    }
    Ok(())
}

/// Restrict an item to the named attributes. An empty list keeps everything.
#[must_use]
pub fn apply_projection(mut item: Item, attributes: &[String]) -> Item {
    if !attributes.is_empty() {
        item.retain(|name, _| attributes.contains(name));
    }
    item
}
