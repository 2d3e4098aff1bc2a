//! Domain types representing recorded expenses.

use std::fmt;

use chrono::NaiveDate;
use serde::{de::Deserializer, ser::Serializer, Deserialize, Serialize};

use crate::domain::common::*;

/// Icon shown for categories outside the known set.
pub const FALLBACK_CATEGORY_ICON: &str = "📦";

/// A single spending record owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub amount: f64,
    pub category: ExpenseCategory,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    pub user_id: String,
}

impl Expense {
    pub fn new(input: ExpenseInput, user_id: impl Into<String>) -> Self {
        Self {
            id: new_record_id(),
            amount: input.amount,
            category: input.category,
            description: input.description,
            date: input.date,
            user_id: user_id.into(),
        }
    }

    /// Applies every field present in `patch`.
    pub fn apply(&mut self, patch: ExpensePatch) {
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
    }
}

impl Identifiable for Expense {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Amounted for Expense {
    fn amount(&self) -> f64 {
        self.amount
    }
}

impl Displayable for Expense {
    fn display_label(&self) -> String {
        if self.description.is_empty() {
            format!("{} {} ({})", self.category.icon(), self.category, self.date)
        } else {
            format!(
                "{} {} - {} ({})",
                self.category.icon(),
                self.category,
                self.description,
                self.date
            )
        }
    }
}

/// Fields supplied when recording a new expense.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseInput {
    pub amount: f64,
    pub category: ExpenseCategory,
    pub description: String,
    pub date: NaiveDate,
}

impl ExpenseInput {
    pub fn new(amount: f64, category: ExpenseCategory, date: NaiveDate) -> Self {
        Self {
            amount,
            category,
            description: String::new(),
            date,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Partial update for an existing expense; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpensePatch {
    pub amount: Option<f64>,
    pub category: Option<ExpenseCategory>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Spending categories offered by the expense form.
///
/// Values outside the known set survive a load/save cycle through `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExpenseCategory {
    Food,
    Travel,
    Shopping,
    Bills,
    Entertainment,
    Health,
    Education,
    Others,
    Other(String),
}

impl ExpenseCategory {
    pub const KNOWN: [ExpenseCategory; 8] = [
        ExpenseCategory::Food,
        ExpenseCategory::Travel,
        ExpenseCategory::Shopping,
        ExpenseCategory::Bills,
        ExpenseCategory::Entertainment,
        ExpenseCategory::Health,
        ExpenseCategory::Education,
        ExpenseCategory::Others,
    ];

    /// Parses a stored label, keeping unknown labels verbatim.
    pub fn from_label(value: &str) -> Self {
        let trimmed = value.trim();
        Self::KNOWN
            .iter()
            .find(|known| known.label().eq_ignore_ascii_case(trimmed))
            .cloned()
            .unwrap_or_else(|| ExpenseCategory::Other(trimmed.to_string()))
    }

    pub fn label(&self) -> &str {
        match self {
            ExpenseCategory::Food => "Food",
            ExpenseCategory::Travel => "Travel",
            ExpenseCategory::Shopping => "Shopping",
            ExpenseCategory::Bills => "Bills",
            ExpenseCategory::Entertainment => "Entertainment",
            ExpenseCategory::Health => "Health",
            ExpenseCategory::Education => "Education",
            ExpenseCategory::Others => "Others",
            ExpenseCategory::Other(label) => label,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ExpenseCategory::Food => "🍔",
            ExpenseCategory::Travel => "✈️",
            ExpenseCategory::Shopping => "🛒",
            ExpenseCategory::Bills => "📄",
            ExpenseCategory::Entertainment => "🎬",
            ExpenseCategory::Health => "💊",
            ExpenseCategory::Education => "📚",
            ExpenseCategory::Others | ExpenseCategory::Other(_) => FALLBACK_CATEGORY_ICON,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ExpenseCategory::Other(_))
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for ExpenseCategory {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ExpenseCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(ExpenseCategory::from_label(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_category_is_preserved_with_fallback_icon() {
        let category = ExpenseCategory::from_label("Pets");
        assert_eq!(category, ExpenseCategory::Other("Pets".into()));
        assert_eq!(category.icon(), FALLBACK_CATEGORY_ICON);
        assert!(!category.is_known());
    }

    #[test]
    fn known_labels_parse_case_insensitively() {
        assert_eq!(ExpenseCategory::from_label("food"), ExpenseCategory::Food);
        assert_eq!(ExpenseCategory::from_label(" Bills "), ExpenseCategory::Bills);
    }

    #[test]
    fn legacy_record_deserializes() {
        let json = r#"{"id":"1718000000000","amount":250,"category":"Travel",
            "description":"Metro card","date":"2024-06-10","userId":"1717000000000"}"#;
        let expense: Expense = serde_json::from_str(json).expect("legacy expense");
        assert_eq!(expense.category, ExpenseCategory::Travel);
        assert_eq!(expense.user_id, "1717000000000");
        assert_eq!(expense.amount, 250.0);

        let encoded = serde_json::to_string(&expense).expect("encode");
        assert!(encoded.contains("\"userId\""));
        assert!(encoded.contains("\"category\":\"Travel\""));
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let mut expense = Expense::new(
            ExpenseInput::new(100.0, ExpenseCategory::Food, date).with_description("Lunch"),
            "u1",
        );
        expense.apply(ExpensePatch {
            amount: Some(120.0),
            ..ExpensePatch::default()
        });
        assert_eq!(expense.amount, 120.0);
        assert_eq!(expense.description, "Lunch");
        assert_eq!(expense.category, ExpenseCategory::Food);
    }
}
