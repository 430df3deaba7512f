// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Expense service. Every operation requires event membership.

use std::sync::Arc;

use crate::db::DocumentStore;
use crate::error::Result;
use crate::models::{new_document_id, Expense, Identity};
use crate::services::{load_event, AccessPolicy};
use crate::time_utils::now_secs;
use crate::validation::{self, CreateExpenseInput};

pub struct ExpenseService {
    db: Arc<dyn DocumentStore>,
    policy: AccessPolicy,
}

impl ExpenseService {
    pub fn new(db: Arc<dyn DocumentStore>, policy: AccessPolicy) -> Self {
        Self { db, policy }
    }

    /// Expenses of an event, oldest first.
    pub async fn list(&self, event_id: &str, caller: &Identity) -> Result<Vec<Expense>> {
        let event = load_event(self.db.as_ref(), event_id).await?;
        self.policy.ensure_member(&event, caller)?;

        let mut expenses = self.db.list_expenses(&event.id).await?;
        expenses.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(expenses)
    }

    /// Record an expense paid by the caller.
    pub async fn add(
        &self,
        event_id: &str,
        input: CreateExpenseInput,
        caller: &Identity,
    ) -> Result<Expense> {
        let event = load_event(self.db.as_ref(), event_id).await?;
        self.policy.ensure_member(&event, caller)?;

        let input = validation::parse(input)?;
        let expense = Expense {
            id: new_document_id(),
            event_id: event.id.clone(),
            description: input.description,
            amount: input.amount,
            payer_id: caller.id.clone(),
            split_among_ids: input.split_among_ids,
            created_at: now_secs(),
        };

        self.db.create_expense(&expense).await?;

        tracing::info!(
            event_id = %event.id,
            expense_id = %expense.id,
            user_id = %caller.id,
            "Expense added"
        );
        Ok(expense)
    }
}
