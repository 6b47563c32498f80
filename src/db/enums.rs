use chrono::{DateTime, Duration, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Todo priority, stored and exchanged as its numeric level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(try_from = "i32", into = "i32")]
pub enum TodoPriority {
    #[default]
    #[sea_orm(num_value = 1)]
    Low,
    #[sea_orm(num_value = 2)]
    Medium,
    #[sea_orm(num_value = 3)]
    High,
}

impl From<TodoPriority> for i32 {
    fn from(priority: TodoPriority) -> Self {
        match priority {
            TodoPriority::Low => 1,
            TodoPriority::Medium => 2,
            TodoPriority::High => 3,
        }
    }
}

impl TryFrom<i32> for TodoPriority {
    type Error = String;

    fn try_from(level: i32) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(TodoPriority::Low),
            2 => Ok(TodoPriority::Medium),
            3 => Ok(TodoPriority::High),
            other => Err(format!("invalid priority {other}, expected 1 (low), 2 (medium) or 3 (high)")),
        }
    }
}

impl fmt::Display for TodoPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum RecurringFrequency {
    #[sea_orm(string_value = "daily")]
    Daily,
    #[sea_orm(string_value = "weekly")]
    Weekly,
    #[sea_orm(string_value = "monthly")]
    Monthly,
}

impl RecurringFrequency {
    /// Offset between a generation and the due date of the generated todo.
    /// Months are a flat 30 days, not calendar months.
    pub fn interval(self) -> Duration {
        match self {
            RecurringFrequency::Daily => Duration::days(1),
            RecurringFrequency::Weekly => Duration::days(7),
            RecurringFrequency::Monthly => Duration::days(30),
        }
    }

    pub fn next_due_date(self, from: DateTime<Utc>) -> DateTime<Utc> {
        from + self.interval()
    }
}

impl fmt::Display for RecurringFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecurringFrequency::Daily => "daily",
            RecurringFrequency::Weekly => "weekly",
            RecurringFrequency::Monthly => "monthly",
        };
        f.write_str(name)
    }
}
