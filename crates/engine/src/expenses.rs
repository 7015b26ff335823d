//! Expense record: a single dated monetary entry attributed to one budget.
//!
//! Expenses live in a child collection under their budget document
//! (`budgets/{id}/expenses`).
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    Money,
    store::{CollectionRef, Document, Fields, StoreError},
};

pub(crate) fn collection(budget_id: &str) -> CollectionRef {
    crate::budgets::collection().child(budget_id, "expenses")
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Store-assigned document id, not part of the field map.
    #[serde(skip)]
    pub id: String,
    /// Parent budget, implied by the collection path.
    #[serde(skip)]
    pub budget_id: String,
    pub name: String,
    pub amount: Money,
    #[serde(with = "wire_date")]
    pub date: DateTime<Utc>,
    #[serde(rename = "userId")]
    pub user_id: String,
}

impl Expense {
    pub(crate) fn from_document(budget_id: &str, doc: Document) -> Result<Self, StoreError> {
        let mut expense: Expense =
            serde_json::from_value(Value::Object(doc.fields)).map_err(|err| {
                StoreError::Malformed {
                    id: doc.id.clone(),
                    reason: err.to_string(),
                }
            })?;
        expense.id = doc.id;
        expense.budget_id = budget_id.to_string();
        Ok(expense)
    }

    pub(crate) fn to_fields(&self) -> Fields {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Fields::new(),
        }
    }
}

/// Caller-editable expense fields. The date is taken as entered and
/// normalized by the engine before it is written.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpenseChanges {
    pub name: Option<String>,
    pub amount: Option<Money>,
    pub date: Option<String>,
}

impl ExpenseChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.amount.is_none() && self.date.is_none()
    }
}

/// Stored dates are RFC 3339 strings, but legacy records carry a bare
/// calendar date when the user picked one. Reads accept both shapes; writes
/// always emit RFC 3339 UTC so the stored format converges over time.
pub(crate) mod wire_date {
    use chrono::SecondsFormat;
    use serde::{Deserializer, Serializer, de};

    use super::*;

    pub(crate) fn parse(value: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(date_time) = DateTime::parse_from_rfc3339(value) {
            return Ok(date_time.with_timezone(&Utc));
        }
        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            return Ok(date.and_time(NaiveTime::MIN).and_utc());
        }
        Err(format!("invalid date: {value}"))
    }

    pub(crate) fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(de::Error::custom)
    }
}
