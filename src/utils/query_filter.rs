use chrono::{DateTime, NaiveDate, Utc};
use sqlx::MySql;
use sqlx::mysql::MySqlArguments;
use sqlx::query::{QueryAs, QueryScalar};

/// Typed value bound to a `?` placeholder of a dynamic filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    U64(u64),
    Str(String),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

/// `WHERE` clause assembled from optional list filters.
#[derive(Debug, Default)]
pub struct WhereClause {
    conditions: Vec<String>,
    args: Vec<FilterValue>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `condition` (with exactly one `?`) when `value` is present.
    pub fn and_opt<T: Into<FilterValue>>(&mut self, condition: &str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.conditions.push(condition.to_string());
            self.args.push(v.into());
        }
        self
    }

    pub fn sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn bind_scalar<'q, O>(
        &self,
        mut query: QueryScalar<'q, MySql, O, MySqlArguments>,
    ) -> QueryScalar<'q, MySql, O, MySqlArguments> {
        for arg in &self.args {
            query = match arg.clone() {
                FilterValue::U64(v) => query.bind(v),
                FilterValue::Str(v) => query.bind(v),
                FilterValue::Date(v) => query.bind(v),
                FilterValue::DateTime(v) => query.bind(v),
            };
        }
        query
    }

    pub fn bind_as<'q, O>(
        &self,
        mut query: QueryAs<'q, MySql, O, MySqlArguments>,
    ) -> QueryAs<'q, MySql, O, MySqlArguments> {
        for arg in &self.args {
            query = match arg.clone() {
                FilterValue::U64(v) => query.bind(v),
                FilterValue::Str(v) => query.bind(v),
                FilterValue::Date(v) => query.bind(v),
                FilterValue::DateTime(v) => query.bind(v),
            };
        }
        query
    }
}

impl From<u64> for FilterValue {
    fn from(v: u64) -> Self {
        FilterValue::U64(v)
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Str(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Str(v.to_string())
    }
}

impl From<NaiveDate> for FilterValue {
    fn from(v: NaiveDate) -> Self {
        FilterValue::Date(v)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(v: DateTime<Utc>) -> Self {
        FilterValue::DateTime(v)
    }
}

const MAX_PAGE: u64 = 1_000_000;

/// 1-based pagination, `per_page` capped at 100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page {
    pub page: u64,
    pub per_page: u64,
}

impl Page {
    pub fn new(page: Option<u64>, per_page: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1).clamp(1, MAX_PAGE),
            per_page: per_page.unwrap_or(10).clamp(1, 100),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_absent_filters() {
        let mut clause = WhereClause::new();
        clause
            .and_opt("employee_id = ?", Some(7u64))
            .and_opt::<&str>("status = ?", None)
            .and_opt("start_date >= ?", NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(clause.sql(), " WHERE employee_id = ? AND start_date >= ?");
        assert_eq!(clause.args.len(), 2);
    }

    #[test]
    fn empty_clause_renders_nothing() {
        assert_eq!(WhereClause::new().sql(), "");
    }

    #[test]
    fn pagination_is_clamped() {
        assert_eq!(Page::new(None, None), Page { page: 1, per_page: 10 });
        assert_eq!(Page::new(Some(0), Some(1000)).per_page, 100);
        assert_eq!(Page::new(Some(3), Some(20)).offset(), 40);
    }

    #[test]
    fn huge_page_numbers_do_not_overflow() {
        let page = Page::new(Some(u64::MAX), Some(100));
        assert_eq!(page.page, MAX_PAGE);
        assert_eq!(page.offset(), (MAX_PAGE - 1) * 100);
        let raw = Page { page: u64::MAX, per_page: 100 };
        assert_eq!(raw.offset(), u64::MAX);
    }
}
