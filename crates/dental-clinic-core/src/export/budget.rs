//! Printable budget statement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{escape_csv, money};
use crate::models::{Budget, Patient};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementLine {
    pub description: String,
    pub tooth: Option<u8>,
    pub quantity: u32,
    pub unit_price: f64,
    pub line_total: f64,
}

/// Budget with its computed totals, ready to print or send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatement {
    pub budget_id: Option<String>,
    pub patient_id: String,
    pub patient_name: Option<String>,
    pub issued_on: Option<String>,
    pub exported_at: String,
    pub lines: Vec<StatementLine>,
    pub subtotal: f64,
    pub discount_percent: f64,
    pub discount: f64,
    pub total: f64,
    pub amount_paid: f64,
    pub outstanding: f64,
}

impl BudgetStatement {
    pub fn from_budget(budget: &Budget, patient: Option<&Patient>, now: DateTime<Utc>) -> Self {
        Self {
            budget_id: budget.id.clone(),
            patient_id: budget.patient_id.clone(),
            patient_name: patient.map(Patient::full_name),
            issued_on: budget.issued_on.map(|d| d.to_string()),
            exported_at: now.to_rfc3339(),
            lines: budget
                .items
                .iter()
                .map(|item| StatementLine {
                    description: item.description.clone(),
                    tooth: item.tooth.map(u8::from),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    line_total: item.line_total(),
                })
                .collect(),
            subtotal: budget.subtotal(),
            discount_percent: budget.discount_percent,
            discount: budget.discount(),
            total: budget.total(),
            amount_paid: budget.amount_paid,
            outstanding: budget.outstanding(),
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Line items followed by the totals block.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();
        csv.push_str("description,tooth,quantity,unit_price,line_total\n");
        for line in &self.lines {
            csv.push_str(&format!(
                "{},{},{},{},{}\n",
                escape_csv(&line.description),
                line.tooth.map(|t| t.to_string()).unwrap_or_default(),
                line.quantity,
                money(line.unit_price),
                money(line.line_total),
            ));
        }
        for (label, amount) in [
            ("subtotal", self.subtotal),
            ("discount", self.discount),
            ("total", self.total),
            ("paid", self.amount_paid),
            ("outstanding", self.outstanding),
        ] {
            csv.push_str(&format!("{},,,,{}\n", label, money(amount)));
        }
        csv
    }
}
