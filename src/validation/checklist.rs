// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Checklist item payloads.

use serde::Deserialize;
use validator::{Validate, ValidationError};

use super::{invalid, lenient_number, Schema};
use crate::error::Result;
use crate::models::ItemType;

/// `POST /api/events/{id}/checklist` body.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateChecklistItemInput {
    #[validate(
        required(message = "Name is required"),
        length(min = 1, max = 120, message = "Name must be 1-120 characters")
    )]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    #[validate(custom(function = "positive_integer"))]
    pub quantity: Option<f64>,
    #[validate(length(max = 200, message = "Note must be at most 200 characters"))]
    pub note: Option<String>,
    #[validate(custom(function = "known_item_type"))]
    pub item_type: Option<String>,
    pub is_personal: Option<bool>,
    pub assigned_to_id: Option<String>,
}

/// A validated checklist item ready to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewChecklistItem {
    pub name: String,
    pub quantity: u32,
    pub note: String,
    pub item_type: ItemType,
    pub is_personal: bool,
    pub assigned_to_id: Option<String>,
}

fn positive_integer(value: f64) -> std::result::Result<(), ValidationError> {
    if value.is_finite() && value >= 1.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) {
        Ok(())
    } else {
        Err(invalid("positive_integer", "Quantity must be a positive integer"))
    }
}

fn parse_item_type(value: &str) -> Option<ItemType> {
    match value {
        "GEAR" => Some(ItemType::Gear),
        "FOOD" => Some(ItemType::Food),
        _ => None,
    }
}

fn known_item_type(value: &str) -> std::result::Result<(), ValidationError> {
    match parse_item_type(value) {
        Some(_) => Ok(()),
        None => Err(invalid("invalid_enum", "Item type must be GEAR or FOOD")),
    }
}

impl Schema for CreateChecklistItemInput {
    type Output = NewChecklistItem;

    fn into_output(self) -> Result<NewChecklistItem> {
        Ok(NewChecklistItem {
            name: self.name.unwrap_or_default(),
            quantity: self.quantity.map(|q| q as u32).unwrap_or(1),
            note: self.note.unwrap_or_default(),
            item_type: self
                .item_type
                .as_deref()
                .and_then(parse_item_type)
                .unwrap_or_default(),
            is_personal: self.is_personal.unwrap_or(false),
            assigned_to_id: self.assigned_to_id.filter(|id| !id.is_empty()),
        })
    }
}
