//! # Expression operators
//!
//! Stored as the `children_begin_or_value` payload of a scalar
//! [`crate::node::NodeType::EnumExpressionOperator`] node, tagging the
//! operator an [`crate::node::NodeType::ObjectSqlNaryExpression`]'s
//! `SqlExpressionArgs` attribute should be applied with.

use serde::{Deserialize, Serialize};

/// Binary and unary expression operators recognized by the parser driver.
///
/// Arithmetic operators (`Plus` through `Xor`) are the ones the
/// column-transform pass classifies; comparison and logical operators never
/// become column transforms since their result is boolean, not a
/// computation over a single column.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpressionOperator {
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulus,
    Xor,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Negate,
    Not,
}

impl ExpressionOperator {
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            ExpressionOperator::Plus
                | ExpressionOperator::Minus
                | ExpressionOperator::Multiply
                | ExpressionOperator::Divide
                | ExpressionOperator::Modulus
                | ExpressionOperator::Xor
        )
    }

    pub fn to_u32(self) -> u32 {
        self as u32
    }

    pub fn from_u32(value: u32) -> Option<Self> {
        const VARIANTS: &[ExpressionOperator] = &[
            ExpressionOperator::Plus,
            ExpressionOperator::Minus,
            ExpressionOperator::Multiply,
            ExpressionOperator::Divide,
            ExpressionOperator::Modulus,
            ExpressionOperator::Xor,
            ExpressionOperator::Eq,
            ExpressionOperator::NotEq,
            ExpressionOperator::Lt,
            ExpressionOperator::LtEq,
            ExpressionOperator::Gt,
            ExpressionOperator::GtEq,
            ExpressionOperator::And,
            ExpressionOperator::Or,
            ExpressionOperator::Negate,
            ExpressionOperator::Not,
        ];
        VARIANTS.get(value as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_u32() {
        for op in [
            ExpressionOperator::Plus,
            ExpressionOperator::Xor,
            ExpressionOperator::Not,
        ] {
            assert_eq!(ExpressionOperator::from_u32(op.to_u32()), Some(op));
        }
    }

    #[test]
    fn only_arithmetic_operators_are_transform_candidates() {
        assert!(ExpressionOperator::Plus.is_arithmetic());
        assert!(!ExpressionOperator::Eq.is_arithmetic());
        assert!(!ExpressionOperator::Not.is_arithmetic());
    }
}
