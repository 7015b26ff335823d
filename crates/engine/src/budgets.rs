//! Budget record: a user-defined spending category with a cap (`total`) and
//! a derived running total of its expenses (`spent`).
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    Color, Money,
    store::{CollectionRef, Document, Fields, StoreError},
};

pub(crate) fn collection() -> CollectionRef {
    CollectionRef::top("budgets")
}

/// A budget owned by exactly one user.
///
/// `spent` is derived from the child expenses and is only ever written by the
/// engine, never by a caller-supplied edit. The serialized field names match
/// the stored records exactly (`userId` included).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// Store-assigned document id, not part of the field map.
    #[serde(skip)]
    pub id: String,
    pub category: String,
    #[serde(default)]
    pub icon: String,
    pub total: Money,
    #[serde(default)]
    pub spent: Money,
    #[serde(default)]
    pub color: Color,
    #[serde(rename = "userId")]
    pub user_id: String,
}

impl Budget {
    /// Cap minus current spend. May go negative when a budget is overspent.
    #[must_use]
    pub fn remaining(&self) -> Money {
        self.total - self.spent
    }

    pub(crate) fn from_document(doc: Document) -> Result<Self, StoreError> {
        let mut budget: Budget = serde_json::from_value(Value::Object(doc.fields)).map_err(|err| {
            StoreError::Malformed {
                id: doc.id.clone(),
                reason: err.to_string(),
            }
        })?;
        budget.id = doc.id;
        Ok(budget)
    }

    pub(crate) fn to_fields(&self) -> Fields {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Fields::new(),
        }
    }
}

/// Caller-editable budget fields. Everything is optional; unset fields are
/// left untouched. `spent` is deliberately absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BudgetChanges {
    pub category: Option<String>,
    pub icon: Option<String>,
    pub total: Option<Money>,
    pub color: Option<Color>,
}

impl BudgetChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.icon.is_none()
            && self.total.is_none()
            && self.color.is_none()
    }

    pub(crate) fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        if let Some(category) = &self.category {
            fields.insert("category".to_string(), Value::String(category.clone()));
        }
        if let Some(icon) = &self.icon {
            fields.insert("icon".to_string(), Value::String(icon.clone()));
        }
        if let Some(total) = &self.total {
            fields.insert(
                "total".to_string(),
                serde_json::to_value(total).unwrap_or(Value::Null),
            );
        }
        if let Some(color) = &self.color {
            fields.insert(
                "color".to_string(),
                Value::String(color.as_str().to_string()),
            );
        }
        fields
    }
}
