// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Expense payloads.

use serde::Deserialize;
use validator::{Validate, ValidationError};

use super::{invalid, lenient_number, Schema};
use crate::error::Result;

/// `POST /api/events/{id}/expenses` body.
///
/// A `payer_id` in the body is ignored: the payer is always the caller.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateExpenseInput {
    #[validate(
        required(message = "Description is required"),
        length(min = 1, max = 200, message = "Description must be 1-200 characters")
    )]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    #[validate(required(message = "Amount is required"), custom(function = "positive_amount"))]
    pub amount: Option<f64>,
    pub split_among_ids: Option<Vec<String>>,
}

/// A validated expense ready to be recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub description: String,
    pub amount: f64,
    pub split_among_ids: Vec<String>,
}

fn positive_amount(value: f64) -> std::result::Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid("positive", "Amount must be a positive number"))
    }
}

/// Drop repeated ids, keeping the first occurrence.
fn dedup_ids(ids: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

impl Schema for CreateExpenseInput {
    type Output = NewExpense;

    fn into_output(self) -> Result<NewExpense> {
        Ok(NewExpense {
            description: self.description.unwrap_or_default(),
            amount: self.amount.unwrap_or_default(),
            split_among_ids: dedup_ids(self.split_among_ids.unwrap_or_default()),
        })
    }
}
