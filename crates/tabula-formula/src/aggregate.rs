//! Aggregate functions
//!
//! Each function receives the non-empty numeric values of its argument cells; empty
//! cells have already been dropped, so they never count towards `COUNT` or the `AVG`
//! denominator.

use crate::error::{FormulaError, FormulaResult};
use crate::token::AggregateFunction;

/// Apply an aggregate function to resolved values
pub fn apply(func: AggregateFunction, values: &[f64]) -> FormulaResult<f64> {
    match func {
        AggregateFunction::Sum => Ok(fn_sum(values)),
        AggregateFunction::Count => Ok(values.len() as f64),
        AggregateFunction::Avg => fn_avg(values),
        AggregateFunction::Min => non_empty(func, values)
            .map(|v| v.iter().copied().fold(f64::INFINITY, f64::min)),
        AggregateFunction::Max => non_empty(func, values)
            .map(|v| v.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
    }
}

/// SUM: an empty range sums to 0
fn fn_sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// AVG: an empty range has no average
fn fn_avg(values: &[f64]) -> FormulaResult<f64> {
    let values = non_empty(AggregateFunction::Avg, values)?;
    Ok(fn_sum(values) / values.len() as f64)
}

fn non_empty(func: AggregateFunction, values: &[f64]) -> FormulaResult<&[f64]> {
    if values.is_empty() {
        Err(FormulaError::NoValues(func))
    } else {
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregates() {
        let values = [10.0, 20.0, 30.0];
        assert_eq!(apply(AggregateFunction::Sum, &values), Ok(60.0));
        assert_eq!(apply(AggregateFunction::Avg, &values), Ok(20.0));
        assert_eq!(apply(AggregateFunction::Count, &values), Ok(3.0));
        assert_eq!(apply(AggregateFunction::Min, &values), Ok(10.0));
        assert_eq!(apply(AggregateFunction::Max, &values), Ok(30.0));
    }

    #[test]
    fn test_negative_values() {
        let values = [-5.0, -1.5];
        assert_eq!(apply(AggregateFunction::Max, &values), Ok(-1.5));
        assert_eq!(apply(AggregateFunction::Min, &values), Ok(-5.0));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(apply(AggregateFunction::Sum, &[]), Ok(0.0));
        assert_eq!(apply(AggregateFunction::Count, &[]), Ok(0.0));

        for func in [
            AggregateFunction::Avg,
            AggregateFunction::Min,
            AggregateFunction::Max,
        ] {
            let err = apply(func, &[]).unwrap_err();
            assert_eq!(err, FormulaError::NoValues(func));
            assert_eq!(err.to_string(), format!("No values for {}", func.name()));
        }
    }
}
