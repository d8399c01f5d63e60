//! Budget and financial ledger models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::backend::Resource;
use crate::chart::ToothNumber;
use crate::forms::{FormModel, ValidationErrors, Validator};

/// Round to cents.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// One line of a treatment budget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetItem {
    pub description: String,
    #[serde(default)]
    pub tooth: Option<ToothNumber>,
    pub quantity: u32,
    pub unit_price: f64,
}

impl Default for BudgetItem {
    fn default() -> Self {
        Self {
            description: String::new(),
            tooth: None,
            quantity: 1,
            unit_price: 0.0,
        }
    }
}

impl BudgetItem {
    pub fn new(description: impl Into<String>, quantity: u32, unit_price: f64) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            tooth: None,
        }
    }

    pub fn line_total(&self) -> f64 {
        round_cents(f64::from(self.quantity) * self.unit_price)
    }
}

/// Treatment budget presented to a patient.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    #[serde(default, deserialize_with = "super::de_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub patient_id: String,
    #[serde(default)]
    pub issued_on: Option<NaiveDate>,
    #[serde(default)]
    pub items: Vec<BudgetItem>,
    /// Discount over the subtotal, in percent
    #[serde(default)]
    pub discount_percent: f64,
    #[serde(default)]
    pub amount_paid: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Budget {
    pub fn subtotal(&self) -> f64 {
        round_cents(self.items.iter().map(BudgetItem::line_total).sum())
    }

    pub fn discount(&self) -> f64 {
        round_cents(self.subtotal() * self.discount_percent / 100.0)
    }

    pub fn total(&self) -> f64 {
        round_cents(self.subtotal() - self.discount())
    }

    /// Amount still owed, never negative.
    pub fn outstanding(&self) -> f64 {
        round_cents((self.total() - self.amount_paid).max(0.0))
    }

    pub fn is_settled(&self) -> bool {
        !self.items.is_empty() && self.outstanding() == 0.0
    }
}

impl Resource for Budget {
    const COLLECTION: &'static str = "budgets";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl FormModel for Budget {
    const LABEL: &'static str = "Budget";

    fn normalize(&mut self) {
        for item in &mut self.items {
            item.description = item.description.trim().to_string();
        }
    }

    fn validate(&self, today: NaiveDate) -> Result<(), ValidationErrors> {
        let mut validator = Validator::new();
        validator
            .require("patient_id", &self.patient_id)
            .check(!self.items.is_empty(), "items", "Add at least one item")
            .percent("discount_percent", self.discount_percent)
            .non_negative("amount_paid", self.amount_paid)
            .not_future("issued_on", self.issued_on, today);
        for (index, item) in self.items.iter().enumerate() {
            let field = format!("items[{}]", index);
            validator
                .require(&field, &item.description)
                .check(item.quantity > 0, &field, "Quantity must be greater than zero")
                .non_negative(&field, item.unit_price);
        }
        validator.finish()
    }
}

/// Direction of a ledger movement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    #[default]
    Income,
    Expense,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    DebitCard,
    CreditCard,
    Transfer,
    Insurance,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Insurance => "insurance",
        }
    }
}

/// Income or expense entry of the clinic ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FinancialRecord {
    #[serde(default, deserialize_with = "super::de_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub kind: EntryKind,
    pub concept: String,
    pub amount: f64,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Patient the movement relates to, if any
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl FinancialRecord {
    pub fn income(concept: impl Into<String>, amount: f64, date: NaiveDate) -> Self {
        Self {
            kind: EntryKind::Income,
            concept: concept.into(),
            amount,
            date: Some(date),
            ..Self::default()
        }
    }

    pub fn expense(concept: impl Into<String>, amount: f64, date: NaiveDate) -> Self {
        Self {
            kind: EntryKind::Expense,
            ..Self::income(concept, amount, date)
        }
    }

    /// Amount with sign: positive for income, negative for expense.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            EntryKind::Income => self.amount,
            EntryKind::Expense => -self.amount,
        }
    }
}

impl Resource for FinancialRecord {
    const COLLECTION: &'static str = "finances";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl FormModel for FinancialRecord {
    const LABEL: &'static str = "Financial record";

    fn normalize(&mut self) {
        self.concept = self.concept.trim().to_string();
        self.amount = round_cents(self.amount);
    }

    fn validate(&self, today: NaiveDate) -> Result<(), ValidationErrors> {
        Validator::new()
            .require("concept", &self.concept)
            .positive("amount", self.amount)
            .require_some("date", self.date.as_ref())
            .not_future("date", self.date, today)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_budget() -> Budget {
        Budget {
            patient_id: "p-1".into(),
            items: vec![
                BudgetItem::new("Composite filling", 2, 45.5),
                BudgetItem::new("Scaling", 1, 60.0),
            ],
            discount_percent: 10.0,
            amount_paid: 50.0,
            ..Budget::default()
        }
    }

    #[test]
    fn test_budget_totals() {
        let budget = sample_budget();
        assert_eq!(budget.subtotal(), 151.0);
        assert_eq!(budget.discount(), 15.1);
        assert_eq!(budget.total(), 135.9);
        assert_eq!(budget.outstanding(), 85.9);
        assert!(!budget.is_settled());
    }

    #[test]
    fn test_overpaid_budget_is_settled() {
        let mut budget = sample_budget();
        budget.amount_paid = 500.0;
        assert_eq!(budget.outstanding(), 0.0);
        assert!(budget.is_settled());
    }

    #[test]
    fn test_budget_validation() {
        let today = date(2024, 6, 1);
        let mut budget = sample_budget();
        assert!(budget.validate(today).is_ok());

        budget.discount_percent = 150.0;
        budget.items[1].quantity = 0;
        let errors = budget.validate(today).unwrap_err();
        assert!(errors.has("discount_percent"));
        assert!(errors.has("items[1]"));
        assert!(!errors.has("items[0]"));

        let empty = Budget {
            patient_id: "p-1".into(),
            ..Budget::default()
        };
        assert!(empty.validate(today).unwrap_err().has("items"));
    }

    #[test]
    fn test_financial_record_validation() {
        let today = date(2024, 6, 1);
        let ok = FinancialRecord::income("Consultation", 30.0, date(2024, 5, 31));
        assert!(ok.validate(today).is_ok());

        let future = FinancialRecord::expense("Supplies", 0.0, date(2024, 7, 1));
        let errors = future.validate(today).unwrap_err();
        assert!(errors.has("amount"));
        assert!(errors.has("date"));
    }

    #[test]
    fn test_signed_amount() {
        let d = date(2024, 1, 1);
        assert_eq!(FinancialRecord::income("A", 10.0, d).signed_amount(), 10.0);
        assert_eq!(FinancialRecord::expense("B", 4.0, d).signed_amount(), -4.0);
    }

    #[test]
    fn test_kind_wire_format() {
        let record = FinancialRecord::expense("Rent", 800.0, date(2024, 1, 1));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "expense");
        assert_eq!(json["payment_method"], "cash");
    }
}
