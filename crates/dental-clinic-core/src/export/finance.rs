//! Income / expense summary for the finances tab.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{escape_csv, money};
use crate::models::{round_cents, EntryKind, FinancialRecord};

/// Totals of one calendar month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthTotals {
    /// "YYYY-MM"
    pub month: String,
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

/// Ledger summary over a set of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub exported_at: String,
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
    /// Ascending by month
    pub months: Vec<MonthTotals>,
    pub record_count: usize,
    /// Records without a date count in the totals but in no month
    pub undated_count: usize,
}

impl FinancialSummary {
    pub fn from_records(records: &[FinancialRecord], now: DateTime<Utc>) -> Self {
        let mut months: BTreeMap<String, MonthTotals> = BTreeMap::new();
        let (mut income, mut expense, mut undated) = (0.0, 0.0, 0usize);

        for record in records {
            match record.kind {
                EntryKind::Income => income += record.amount,
                EntryKind::Expense => expense += record.amount,
            }
            let Some(date) = record.date else {
                undated += 1;
                continue;
            };
            let key = format!("{:04}-{:02}", date.year(), date.month());
            let month = months.entry(key.clone()).or_insert_with(|| MonthTotals {
                month: key,
                ..MonthTotals::default()
            });
            match record.kind {
                EntryKind::Income => month.income += record.amount,
                EntryKind::Expense => month.expense += record.amount,
            }
        }

        let months = months
            .into_values()
            .map(|m| MonthTotals {
                income: round_cents(m.income),
                expense: round_cents(m.expense),
                balance: round_cents(m.income - m.expense),
                month: m.month,
            })
            .collect();

        Self {
            exported_at: now.to_rfc3339(),
            total_income: round_cents(income),
            total_expense: round_cents(expense),
            balance: round_cents(income - expense),
            months,
            record_count: records.len(),
            undated_count: undated,
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Per-month CSV.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();
        csv.push_str("month,income,expense,balance\n");
        for m in &self.months {
            csv.push_str(&format!(
                "{},{},{},{}\n",
                m.month,
                money(m.income),
                money(m.expense),
                money(m.balance)
            ));
        }
        csv
    }
}

/// Records dated within `[from, to]`, both inclusive.
pub fn records_between(records: &[FinancialRecord], from: NaiveDate, to: NaiveDate) -> Vec<FinancialRecord> {
    records
        .iter()
        .filter(|r| matches!(r.date, Some(d) if d >= from && d <= to))
        .cloned()
        .collect()
}

/// Ledger CSV, one line per record.
pub fn records_to_csv(records: &[FinancialRecord]) -> String {
    let mut csv = String::new();
    csv.push_str("id,date,kind,concept,amount,payment_method,patient_id\n");
    for record in records {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            escape_csv(record.id.as_deref().unwrap_or("")),
            record.date.map(|d| d.to_string()).unwrap_or_default(),
            match record.kind {
                EntryKind::Income => "income",
                EntryKind::Expense => "expense",
            },
            escape_csv(&record.concept),
            money(record.amount),
            record.payment_method.as_str(),
            escape_csv(record.patient_id.as_deref().unwrap_or("")),
        ));
    }
    csv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_717_000_000, 0).unwrap()
    }

    fn ledger() -> Vec<FinancialRecord> {
        let mut undated = FinancialRecord::income("Cash sale", 5.0, date(2024, 1, 1));
        undated.date = None;
        vec![
            FinancialRecord::income("Consultation", 40.0, date(2024, 2, 3)),
            FinancialRecord::income("Crown", 300.0, date(2024, 1, 15)),
            FinancialRecord::expense("Supplies", 120.5, date(2024, 1, 20)),
            FinancialRecord::expense("Rent", 500.0, date(2024, 2, 1)),
            undated,
        ]
    }

    #[test]
    fn test_summary_totals_and_months() {
        let summary = FinancialSummary::from_records(&ledger(), now());
        assert_eq!(summary.total_income, 345.0);
        assert_eq!(summary.total_expense, 620.5);
        assert_eq!(summary.balance, -275.5);
        assert_eq!(summary.undated_count, 1);

        let months: Vec<_> = summary.months.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["2024-01", "2024-02"]);
        assert_eq!(summary.months[0].balance, 179.5);
        assert_eq!(summary.months[1].balance, -460.0);
    }

    #[test]
    fn test_summary_csv() {
        let summary = FinancialSummary::from_records(&ledger(), now());
        let csv = summary.to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "month,income,expense,balance");
        assert_eq!(lines[1], "2024-01,300.00,120.50,179.50");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_empty_summary() {
        let summary = FinancialSummary::from_records(&[], now());
        assert_eq!(summary.balance, 0.0);
        assert!(summary.months.is_empty());
        assert!(summary.to_json().unwrap().contains("\"record_count\": 0"));
    }

    #[test]
    fn test_records_between_is_inclusive() {
        let found = records_between(&ledger(), date(2024, 1, 20), date(2024, 2, 1));
        let concepts: Vec<_> = found.iter().map(|r| r.concept.as_str()).collect();
        assert_eq!(concepts, vec!["Supplies", "Rent"]);
    }

    #[test]
    fn test_records_csv_escapes_concept() {
        let records = vec![FinancialRecord::income("Filling, tooth 36", 45.0, date(2024, 3, 1))];
        let csv = records_to_csv(&records);
        assert!(csv.contains(",income,\"Filling, tooth 36\",45.00,cash,"));
    }
}
