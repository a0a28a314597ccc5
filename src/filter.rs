//! Client-side narrowing of the expense list and the figures shown above it.
//!
//! Everything here is pure: the same collection and criteria always produce the same view.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::client::Expense;
use crate::types::Status;

/// What the list is narrowed by. Unset criteria match every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Case-insensitive substring of the description or the category, taken as typed.
    /// Only the empty string matches everything; whitespace is part of the term.
    pub query: String,
    /// Exact category name.
    pub category: Option<String>,
    pub status: Option<Status>,
    /// Matches the due date, the payment date or the day the record was created.
    pub date: Option<NaiveDate>,
}

impl FilterCriteria {
    pub fn matches(&self, expense: &Expense) -> bool {
        let q = self.query.to_lowercase();
        self.matches_normalized(expense, &q)
    }

    fn matches_normalized(&self, expense: &Expense, q: &str) -> bool {
        if !q.is_empty()
            && !expense.description.to_lowercase().contains(q)
            && !expense.category.to_lowercase().contains(q)
        {
            return false;
        }
        if let Some(c) = self.category.as_deref()
            && !c.is_empty()
            && expense.category != c
        {
            return false;
        }
        if let Some(s) = self.status
            && expense.status != s
        {
            return false;
        }
        if let Some(d) = self.date {
            let hit = expense.due_date == Some(d)
                || expense.payment_date == Some(d)
                || expense.created_date() == Some(d);
            if !hit {
                return false;
            }
        }
        true
    }

    /// Keeps the records matching every criterion, in their original order.
    pub fn apply<'a, I>(&self, expenses: I) -> Vec<&'a Expense>
    where
        I: IntoIterator<Item = &'a Expense>,
    {
        let q = self.query.to_lowercase();
        expenses
            .into_iter()
            .filter(|e| self.matches_normalized(e, &q))
            .collect()
    }

    /// Filtered records plus the summary over them.
    pub fn view<'a>(&self, expenses: &'a [Expense]) -> FilteredView<'a> {
        let records = self.apply(expenses);
        let summary = Summary::of(records.iter().copied());
        FilteredView { records, summary }
    }
}

#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    pub records: Vec<&'a Expense>,
    pub summary: Summary,
}

/// Figures derived from the currently visible records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub total: f64,
    pub pending: usize,
}

impl Summary {
    pub fn of<'a, I>(expenses: I) -> Self
    where
        I: IntoIterator<Item = &'a Expense>,
    {
        let mut out = Summary::default();
        for e in expenses {
            out.count += 1;
            out.total += countable_amount(e.amount);
            if e.status == Status::Pending {
                out.pending += 1;
            }
        }
        out
    }
}

/// Amounts that are not finite and positive count as zero.
pub fn countable_amount(amount: f64) -> f64 {
    if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    }
}

/// Category names in use, sorted and de-duplicated. Feeds the category filter choices.
pub fn distinct_categories(expenses: &[Expense]) -> Vec<String> {
    expenses
        .iter()
        .map(|e| e.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
