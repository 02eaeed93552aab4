pub mod errors;

pub use errors::{BomError, BomErrorCategory, BomResult, CalculationResult, TableResult};

use serde::Serialize;
use std::fmt::{Display, Formatter};

pub const DEFAULT_TARGET_AMOUNT: f64 = 100.0;

/// One production step: the mix produced by `column`, whose own total lives on `row`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mix {
    pub name: String,
    pub column: usize,
    pub row: usize,
}

impl Mix {
    pub fn new(name: impl Into<String>, column: usize, row: usize) -> Self {
        Self {
            name: name.into(),
            column,
            row,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    RawMaterial,
    Mix,
}

impl ItemKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RawMaterial => "raw material",
            Self::Mix => "mix",
        }
    }
}

impl Display for ItemKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalculationRequest {
    product_name: String,
    target_amount: f64,
}

impl CalculationRequest {
    pub fn new(product_name: impl Into<String>, target_amount: f64) -> CalculationResult<Self> {
        validate_target_amount(target_amount)?;
        Ok(Self {
            product_name: product_name.into(),
            target_amount,
        })
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub const fn target_amount(&self) -> f64 {
        self.target_amount
    }
}

pub fn validate_target_amount(target_amount: f64) -> CalculationResult<()> {
    if !target_amount.is_finite() || target_amount <= 0.0 {
        return Err(BomError::calculation(
            "RUN.TARGET_AMOUNT",
            format!(
                "target amount must be a positive finite number, got {}",
                target_amount
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{BomErrorCategory, CalculationRequest, ItemKind, Mix};

    #[test]
    fn calculation_request_keeps_product_and_amount() {
        let request = CalculationRequest::new("Product1", 250.0).expect("request should build");
        assert_eq!(request.product_name(), "Product1");
        assert_eq!(request.target_amount(), 250.0);
    }

    #[test]
    fn calculation_request_rejects_non_positive_amounts() {
        for amount in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let error = CalculationRequest::new("Product1", amount)
                .expect_err("non-positive amount should fail");
            assert_eq!(error.category(), BomErrorCategory::CalculationError);
            assert_eq!(error.code(), "RUN.TARGET_AMOUNT");
        }
    }

    #[test]
    fn mix_and_item_kind_render_plain_names() {
        let mix = Mix::new("Mix 1", 0, 5);
        assert_eq!(mix.row, 5);
        assert_eq!(ItemKind::RawMaterial.to_string(), "raw material");
        assert_eq!(ItemKind::Mix.to_string(), "mix");
    }
}
