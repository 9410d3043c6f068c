use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::codec;
use crate::id::new_uuid_v7;
use crate::repo::{Entity, SingletonEntity, SqliteQuery};
use crate::time::now_ms;
use crate::AppResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialIncome {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub amount: f64,
    pub category: String,
    pub frequency: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl FinancialIncome {
    pub fn new(
        user_id: &str,
        name: &str,
        amount: f64,
        category: &str,
        frequency: &str,
    ) -> FinancialIncome {
        let now = now_ms();
        FinancialIncome {
            id: new_uuid_v7(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            amount,
            category: category.to_string(),
            frequency: frequency.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for FinancialIncome {
    const TABLE: &'static str = "financial_incomes";
    const ORDER_BY: &'static str = "created_at DESC";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "amount",
        "category",
        "frequency",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.name)
            .bind(self.amount)
            .bind(&self.category)
            .bind(&self.frequency)
            .bind(self.created_at)
            .bind(self.updated_at)
    }

    fn from_row(row: &SqliteRow) -> AppResult<FinancialIncome> {
        Ok(FinancialIncome {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            amount: codec::real_or(row, "amount", 0.0)?,
            category: row.try_get("category")?,
            frequency: row.try_get("frequency")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialExpense {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub amount: f64,
    pub category: String,
    pub frequency: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl FinancialExpense {
    pub fn new(
        user_id: &str,
        name: &str,
        amount: f64,
        category: &str,
        frequency: &str,
    ) -> FinancialExpense {
        let now = now_ms();
        FinancialExpense {
            id: new_uuid_v7(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            amount,
            category: category.to_string(),
            frequency: frequency.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for FinancialExpense {
    const TABLE: &'static str = "financial_expenses";
    const ORDER_BY: &'static str = "created_at DESC";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "amount",
        "category",
        "frequency",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.name)
            .bind(self.amount)
            .bind(&self.category)
            .bind(&self.frequency)
            .bind(self.created_at)
            .bind(self.updated_at)
    }

    fn from_row(row: &SqliteRow) -> AppResult<FinancialExpense> {
        Ok(FinancialExpense {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            amount: codec::real_or(row, "amount", 0.0)?,
            category: row.try_get("category")?,
            frequency: row.try_get("frequency")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// One free-form note per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialNote {
    pub user_id: String,
    pub body: String,
    pub updated_at: i64,
}

impl FinancialNote {
    pub fn new(user_id: &str, body: &str) -> FinancialNote {
        FinancialNote {
            user_id: user_id.to_string(),
            body: body.to_string(),
            updated_at: now_ms(),
        }
    }
}

impl SingletonEntity for FinancialNote {
    const TABLE: &'static str = "financial_notes";
    const COLUMNS: &'static [&'static str] = &["body", "updated_at"];

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query.bind(&self.body).bind(self.updated_at)
    }

    fn from_row(row: &SqliteRow) -> AppResult<FinancialNote> {
        Ok(FinancialNote {
            user_id: row.try_get("user_id")?,
            body: row.try_get("body")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
