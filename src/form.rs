//! Input state for creating or editing one expense.
//!
//! The form never talks to the API. It holds what the user typed, validates it and hands back a
//! [`Submission`] for the session to send.

use chrono::NaiveDate;

use crate::client::{Expense, ExpenseDraft};
use crate::types::{ExpenseId, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill in the description")]
    MissingDescription,
    #[error("Please select a category")]
    MissingCategory,
    #[error("Please enter a valid amount")]
    InvalidAmount,
    #[error("Please enter a valid due date")]
    InvalidDueDate,
    #[error("Please enter a valid payment date")]
    InvalidPaymentDate,
}

/// A validated payload. `target` is set when the form was opened on an existing record.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub target: Option<ExpenseId>,
    pub draft: ExpenseDraft,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseForm {
    target: Option<ExpenseId>,
    pub description: String,
    pub category: String,
    pub amount: f64,
    pub due_date: String,
    pub payment_date: String,
    pub notes: String,
    pub status: Status,
}

impl Default for ExpenseForm {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpenseForm {
    pub fn new() -> Self {
        Self {
            target: None,
            description: String::new(),
            category: String::new(),
            amount: 0.0,
            due_date: String::new(),
            payment_date: String::new(),
            notes: String::new(),
            status: Status::Pending,
        }
    }

    pub fn edit(expense: &Expense) -> Self {
        let date = |d: Option<NaiveDate>| d.map(|d| d.format("%Y-%m-%d").to_string());
        Self {
            target: Some(expense.id),
            description: expense.description.clone(),
            category: expense.category.clone(),
            amount: expense.amount,
            due_date: date(expense.due_date).unwrap_or_default(),
            payment_date: date(expense.payment_date).unwrap_or_default(),
            notes: expense.notes.clone().unwrap_or_default(),
            status: expense.status,
        }
    }

    pub fn target(&self) -> Option<ExpenseId> {
        self.target
    }

    pub fn is_editing(&self) -> bool {
        self.target.is_some()
    }

    /// Sets the amount from raw text; anything unparseable becomes 0.
    pub fn set_amount_text(&mut self, raw: &str) {
        self.amount = coerce_amount(raw);
    }

    pub fn validate(&self) -> Result<Submission, ValidationError> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingDescription);
        }
        if self.category.is_empty() {
            return Err(ValidationError::MissingCategory);
        }
        if !(self.amount.is_finite() && self.amount > 0.0) {
            return Err(ValidationError::InvalidAmount);
        }
        let due_date = parse_optional_date(&self.due_date).ok_or(ValidationError::InvalidDueDate)?;
        let payment_date =
            parse_optional_date(&self.payment_date).ok_or(ValidationError::InvalidPaymentDate)?;

        let notes = self.notes.trim();
        Ok(Submission {
            target: self.target,
            draft: ExpenseDraft {
                description: self.description.clone(),
                category: self.category.clone(),
                amount: self.amount,
                due_date,
                payment_date,
                notes: (!notes.is_empty()).then(|| notes.to_string()),
                status: self.status,
            },
        })
    }
}

pub fn coerce_amount(raw: &str) -> f64 {
    let s = raw.trim().replace(',', ".");
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

// Outer None means "present but invalid".
fn parse_optional_date(raw: &str) -> Option<Option<NaiveDate>> {
    let s = raw.trim();
    if s.is_empty() {
        return Some(None);
    }
    parse_date(s).map(Some)
}

/// Accepts `YYYY-MM-DD` and the Brazilian `DD/MM/YYYY`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ExpenseForm {
        let mut f = ExpenseForm::new();
        f.description = "Pagamento motoboy João".to_string();
        f.category = "Motoboys".to_string();
        f.set_amount_text("50");
        f
    }

    #[test]
    fn new_form_starts_empty_and_pending() {
        let f = ExpenseForm::new();
        assert!(!f.is_editing());
        assert_eq!(f.amount, 0.0);
        assert_eq!(f.status, Status::Pending);
        assert!(f.due_date.is_empty() && f.notes.is_empty());
    }

    #[test]
    fn empty_description_rejected_first() {
        let mut f = ExpenseForm::new();
        f.description = "   ".to_string();
        assert_eq!(f.validate(), Err(ValidationError::MissingDescription));

        let mut f = filled();
        f.description.clear();
        assert_eq!(f.validate(), Err(ValidationError::MissingDescription));
    }

    #[test]
    fn category_checked_before_amount() {
        let mut f = filled();
        f.category.clear();
        f.amount = 0.0;
        assert_eq!(f.validate(), Err(ValidationError::MissingCategory));
    }

    #[test]
    fn zero_and_negative_amounts_rejected() {
        for raw in ["0", "-3", "abc", "", "NaN"] {
            let mut f = filled();
            f.set_amount_text(raw);
            assert_eq!(f.validate(), Err(ValidationError::InvalidAmount), "{raw}");
        }
    }

    #[test]
    fn amount_text_accepts_comma_decimal() {
        assert_eq!(coerce_amount("12,50"), 12.5);
        assert_eq!(coerce_amount(" 7.25 "), 7.25);
        assert_eq!(coerce_amount("inf"), 0.0);
    }

    #[test]
    fn valid_form_produces_create_payload_with_pending_status() {
        let sub = filled().validate().unwrap();
        assert_eq!(sub.target, None);
        assert_eq!(sub.draft.status, Status::Pending);
        assert_eq!(sub.draft.amount, 50.0);
        assert_eq!(sub.draft.due_date, None);
        assert_eq!(sub.draft.notes, None);
    }

    #[test]
    fn dates_are_validated_after_the_required_fields() {
        let mut f = filled();
        f.due_date = "31/02/2024".to_string();
        assert_eq!(f.validate(), Err(ValidationError::InvalidDueDate));

        f.due_date = "10/05/2024".to_string();
        f.payment_date = "2024-05-09".to_string();
        let sub = f.validate().unwrap();
        assert_eq!(sub.draft.due_date, NaiveDate::from_ymd_opt(2024, 5, 10));
        assert_eq!(sub.draft.payment_date, NaiveDate::from_ymd_opt(2024, 5, 9));

        f.payment_date = "ontem".to_string();
        assert_eq!(f.validate(), Err(ValidationError::InvalidPaymentDate));
    }

    #[test]
    fn edit_prepopulates_and_keeps_target() {
        let e = Expense {
            id: ExpenseId::new(7),
            description: "Internet maio".to_string(),
            category: "Internet".to_string(),
            amount: 129.9,
            due_date: NaiveDate::from_ymd_opt(2024, 5, 15),
            payment_date: None,
            notes: None,
            status: Status::Late,
            created_at: "2024-05-01T10:00:00".to_string(),
            updated_at: None,
        };
        let f = ExpenseForm::edit(&e);
        assert_eq!(f.target(), Some(ExpenseId::new(7)));
        assert_eq!(f.due_date, "2024-05-15");
        assert_eq!(f.payment_date, "");
        assert_eq!(f.notes, "");
        assert_eq!(f.status, Status::Late);

        let sub = f.validate().unwrap();
        assert_eq!(sub.target, Some(ExpenseId::new(7)));
        assert_eq!(sub.draft.amount, 129.9);
    }
}
