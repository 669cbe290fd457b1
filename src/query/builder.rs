//! Query Builder - Core builder implementation

use super::condition::{render_all, Arguments, Condition};
use super::types::*;
use crate::error::{Error, Result};
use crate::value::{FilterValue, Value};

/// Builder for parameterized SELECT statements.
///
/// Mutating methods return `&mut Self` for chaining; the ones that validate
/// their input return `Result<&mut Self>` so a chain can use `?`.
///
/// ```
/// use sqlx_tx_query::{filters, QueryBuilder, Value};
///
/// # fn main() -> sqlx_tx_query::Result<()> {
/// let query = QueryBuilder::new()
///     .select(["id", "name"])?
///     .from("users")?
///     .where_eq(filters! { "tenant_id" => "t1", "active" => true })
///     .build()?;
///
/// assert_eq!(query.text, "SELECT id, name FROM users WHERE tenant_id = $1 AND active = $2");
/// assert_eq!(query.values, vec![Value::from("t1"), Value::from(true)]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryBuilder {
    selection: Selection,
    table: Option<String>,
    conditions: Vec<Condition>,
    joins: Vec<JoinClause>,
    group_by: Vec<String>,
    having: Vec<Condition>,
    order_by: Vec<(String, OrderDirection)>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl QueryBuilder {
    /// Create a new query builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the SELECT list, replacing any earlier `select` or `select_count`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `columns` is empty. The builder is left unchanged.
    pub fn select<I, S>(&mut self, columns: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(Error::validation("select requires at least one column"));
        }
        self.selection = Selection::Columns(columns);
        Ok(self)
    }

    /// Selects `COUNT(column) AS count`, or `COUNT(*)` when `column` is `None`.
    pub fn select_count(&mut self, column: Option<&str>) -> &mut Self {
        self.selection = Selection::Count(column.unwrap_or("*").to_owned());
        self
    }

    /// Sets the FROM table. An alias may be included (`"users u"`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `table` is blank. The builder is left unchanged.
    #[allow(clippy::should_implement_trait)]
    pub fn from(&mut self, table: &str) -> Result<&mut Self> {
        if table.trim().is_empty() {
            return Err(Error::validation("from requires a table name"));
        }
        self.table = Some(table.to_owned());
        Ok(self)
    }

    /// Adds one condition per mapping entry, in iteration order.
    ///
    /// Absent values are skipped, NULL renders `IS NULL`, lists render `IN (...)`
    /// and anything else renders `= $n`.
    pub fn where_eq<I, K, V>(&mut self, conditions: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FilterValue>,
    {
        push_filters(&mut self.conditions, conditions);
        self
    }

    /// Adds `column operator $n`. The operator is inserted verbatim.
    pub fn where_op(&mut self, column: &str, operator: &str, value: impl Into<Value>) -> &mut Self {
        self.conditions.push(Condition::Op {
            column: column.to_owned(),
            operator: operator.to_owned(),
            value: value.into(),
        });
        self
    }

    /// Adds `column IS NULL`. No argument is consumed.
    pub fn where_null(&mut self, column: &str) -> &mut Self {
        self.conditions.push(Condition::IsNull(column.to_owned()));
        self
    }

    /// Adds `column IS NOT NULL`. No argument is consumed.
    pub fn where_not_null(&mut self, column: &str) -> &mut Self {
        self.conditions.push(Condition::IsNotNull(column.to_owned()));
        self
    }

    /// Adds `column IN ($n, ...)`. An empty list matches nothing.
    pub fn where_in<I, V>(&mut self, column: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.conditions.push(Condition::In {
            column: column.to_owned(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Adds `<kind> JOIN <table> ON <on>`.
    pub fn join(&mut self, kind: JoinKind, table: &str, on: &str) -> &mut Self {
        self.join_raw(kind.as_sql(), table, on)
    }

    /// Like [`join`](Self::join) with caller-supplied kind text, e.g. `"LEFT OUTER"`.
    pub fn join_raw(&mut self, kind: &str, table: &str, on: &str) -> &mut Self {
        self.joins.push(JoinClause {
            kind: kind.to_owned(),
            table: table.to_owned(),
            on: on.to_owned(),
        });
        self
    }

    /// Appends columns to the GROUP BY list.
    pub fn group_by<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Adds HAVING conditions with the same rules as [`where_eq`](Self::where_eq).
    pub fn having<I, K, V>(&mut self, conditions: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FilterValue>,
    {
        push_filters(&mut self.having, conditions);
        self
    }

    /// Appends an ORDER BY term. Terms render in the order they were added.
    pub fn order_by(&mut self, column: &str, direction: OrderDirection) -> &mut Self {
        self.order_by.push((column.to_owned(), direction));
        self
    }

    /// Shorthand for `order_by(column, OrderDirection::Asc)`.
    pub fn order_by_asc(&mut self, column: &str) -> &mut Self {
        self.order_by(column, OrderDirection::Asc)
    }

    /// Shorthand for `order_by(column, OrderDirection::Desc)`.
    pub fn order_by_desc(&mut self, column: &str) -> &mut Self {
        self.order_by(column, OrderDirection::Desc)
    }

    /// Sets `LIMIT $n`. The count is bound as an argument.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `n` is negative. The builder is left unchanged.
    pub fn limit(&mut self, n: i64) -> Result<&mut Self> {
        if n < 0 {
            return Err(Error::validation("limit must be non-negative"));
        }
        self.limit = Some(n);
        Ok(self)
    }

    /// Sets `OFFSET $n`. The count is bound as an argument.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `n` is negative. The builder is left unchanged.
    pub fn offset(&mut self, n: i64) -> Result<&mut Self> {
        if n < 0 {
            return Err(Error::validation("offset must be non-negative"));
        }
        self.offset = Some(n);
        Ok(self)
    }

    /// Restores the pristine state of [`QueryBuilder::new`].
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::default();
        self
    }

    /// Assembles the statement. Does not modify the builder, so repeated calls
    /// return identical output.
    pub fn build(&self) -> Result<Query> {
        let table = self
            .table
            .as_deref()
            .ok_or_else(|| Error::validation("from must precede build"))?;

        let mut sql = String::from("SELECT ");
        match &self.selection {
            Selection::Unset => return Err(Error::validation("select must precede build")),
            Selection::Columns(columns) => sql.push_str(&columns.join(", ")),
            Selection::Count(column) => {
                sql.push_str(&format!("COUNT({}) AS count", column));
            }
        }

        sql.push_str(" FROM ");
        sql.push_str(table);

        for join in &self.joins {
            sql.push_str(&format!(" {} JOIN {} ON {}", join.kind, join.table, join.on));
        }

        let mut args = Arguments::default();

        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&render_all(&self.conditions, &mut args));
        }

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }

        if !self.having.is_empty() {
            sql.push_str(" HAVING ");
            sql.push_str(&render_all(&self.having, &mut args));
        }

        if !self.order_by.is_empty() {
            let order: Vec<String> = self
                .order_by
                .iter()
                .map(|(column, direction)| format!("{} {}", column, direction))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ");
            sql.push_str(&args.push(Value::Int(limit)));
        }

        if let Some(offset) = self.offset {
            sql.push_str(" OFFSET ");
            sql.push_str(&args.push(Value::Int(offset)));
        }

        Ok(Query {
            text: sql,
            values: args.into_values(),
        })
    }
}

fn push_filters<I, K, V>(target: &mut Vec<Condition>, conditions: I)
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<FilterValue>,
{
    target.extend(
        conditions
            .into_iter()
            .filter_map(|(column, value)| Condition::from_filter(column.into(), value.into())),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters;

    fn users() -> QueryBuilder {
        let mut qb = QueryBuilder::new();
        qb.select(["id", "name"]).unwrap().from("users").unwrap();
        qb
    }

    #[test]
    fn test_select_from_only() {
        let q = users().build().unwrap();
        assert_eq!(q.text, "SELECT id, name FROM users");
        assert!(q.values.is_empty());
    }

    #[test]
    fn test_where_mapping_scenario() {
        let q = users()
            .where_eq(filters! { "tenant_id" => "t1", "active" => true })
            .build()
            .unwrap();
        assert_eq!(
            q.text,
            "SELECT id, name FROM users WHERE tenant_id = $1 AND active = $2"
        );
        assert_eq!(q.values, vec![Value::from("t1"), Value::Bool(true)]);
    }

    #[test]
    fn test_where_mapping_value_kinds() {
        let missing: Option<&str> = None;
        let q = users()
            .where_eq(filters! {
                "status" => missing,
                "deleted_at" => FilterValue::Null,
                "role" => vec!["admin", "owner"],
                "org_id" => 7,
            })
            .build()
            .unwrap();
        assert_eq!(
            q.text,
            "SELECT id, name FROM users WHERE deleted_at IS NULL AND role IN ($1, $2) AND org_id = $3"
        );
        assert_eq!(
            q.values,
            vec![Value::from("admin"), Value::from("owner"), Value::Int(7)]
        );
    }

    #[test]
    fn test_where_mapping_empty_list_sentinel() {
        let q = users()
            .where_eq(filters! { "a" => 1, "b" => Vec::<i64>::new() })
            .build()
            .unwrap();
        assert_eq!(q.text, "SELECT id, name FROM users WHERE a = $1 AND 1 = $2");
        assert_eq!(q.values, vec![Value::Int(1), Value::Int(0)]);
    }

    #[test]
    fn test_where_in_empty_never_emits_bare_in() {
        let q = users()
            .where_op("age", ">", 30)
            .where_in("id", Vec::<i64>::new())
            .build()
            .unwrap();
        assert!(q.text.ends_with("WHERE age > $1 AND 1 = $2"));
        assert!(!q.text.contains("IN ()"));
        assert_eq!(q.values[1], Value::Int(0));
    }

    #[test]
    fn test_null_checks_consume_no_parameters() {
        let q = users()
            .where_null("deleted_at")
            .where_not_null("email")
            .where_op("name", "ILIKE", "a%")
            .build()
            .unwrap();
        assert_eq!(
            q.text,
            "SELECT id, name FROM users WHERE deleted_at IS NULL AND email IS NOT NULL AND name ILIKE $1"
        );
        assert_eq!(q.values, vec![Value::from("a%")]);
    }

    #[test]
    fn test_optional_arguments_bind_null() {
        let manager: Option<i64> = None;
        let q = users()
            .where_op("manager_id", "IS NOT DISTINCT FROM", manager)
            .where_in("team_id", [Some(4u64), None])
            .build()
            .unwrap();
        assert_eq!(
            q.text,
            "SELECT id, name FROM users WHERE manager_id IS NOT DISTINCT FROM $1 AND team_id IN ($2, $3)"
        );
        assert_eq!(q.values, vec![Value::Null, Value::Int(4), Value::Null]);
    }

    #[test]
    fn test_full_clause_order() {
        let mut qb = QueryBuilder::new();
        qb.select(["u.id", "COUNT(o.id) AS orders"])
            .unwrap()
            .from("users u")
            .unwrap()
            .join(JoinKind::Left, "orders o", "o.user_id = u.id")
            .join_raw("INNER", "tenants t", "t.id = u.tenant_id")
            .where_eq(filters! { "t.slug" => "acme" })
            .group_by(["u.id"])
            .having(filters! { "COUNT(o.id)" => 3 })
            .order_by_desc("orders")
            .order_by("u.id", OrderDirection::default());
        qb.limit(10).unwrap().offset(20).unwrap();

        let q = qb.build().unwrap();
        assert_eq!(
            q.text,
            "SELECT u.id, COUNT(o.id) AS orders FROM users u \
             LEFT JOIN orders o ON o.user_id = u.id \
             INNER JOIN tenants t ON t.id = u.tenant_id \
             WHERE t.slug = $1 GROUP BY u.id HAVING COUNT(o.id) = $2 \
             ORDER BY orders DESC, u.id ASC LIMIT $3 OFFSET $4"
        );
        assert_eq!(
            q.values,
            vec![Value::from("acme"), Value::Int(3), Value::Int(10), Value::Int(20)]
        );
    }

    #[test]
    fn test_select_count() {
        let mut qb = QueryBuilder::new();
        qb.select_count(None).from("users").unwrap();
        assert_eq!(qb.build().unwrap().text, "SELECT COUNT(*) AS count FROM users");

        qb.select_count(Some("id"));
        assert_eq!(qb.build().unwrap().text, "SELECT COUNT(id) AS count FROM users");
    }

    #[test]
    fn test_build_is_repeatable() {
        let mut qb = users();
        qb.where_in("id", [1, 2, 3]).where_op("age", "<", 40);
        assert_eq!(qb.build().unwrap(), qb.build().unwrap());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = users();
        original.where_eq(filters! { "a" => 1 });
        let mut copy = original.clone();

        copy.where_eq(filters! { "b" => 2 }).limit(5).unwrap();
        original.where_null("c");

        assert_eq!(
            original.build().unwrap().text,
            "SELECT id, name FROM users WHERE a = $1 AND c IS NULL"
        );
        assert_eq!(
            copy.build().unwrap().text,
            "SELECT id, name FROM users WHERE a = $1 AND b = $2 LIMIT $3"
        );
    }

    #[test]
    fn test_reset_matches_new_builder() {
        let mut qb = users();
        qb.where_eq(filters! { "x" => 1 })
            .join(JoinKind::Inner, "t", "t.id = users.t_id")
            .order_by_asc("id");
        qb.limit(3).unwrap();
        qb.reset();

        assert_eq!(qb, QueryBuilder::new());
        assert!(qb.build().is_err());

        qb.select(["id"]).unwrap().from("users").unwrap();
        let mut fresh = QueryBuilder::new();
        fresh.select(["id"]).unwrap().from("users").unwrap();
        assert_eq!(qb.build().unwrap(), fresh.build().unwrap());
    }

    #[test]
    fn test_validation_errors() {
        let mut qb = QueryBuilder::new();
        assert!(qb.limit(-1).unwrap_err().is_validation());
        assert!(qb.offset(-1).unwrap_err().is_validation());
        assert!(qb.select(Vec::<String>::new()).unwrap_err().is_validation());
        assert!(qb.from("").unwrap_err().is_validation());
        assert!(qb.from("   ").unwrap_err().is_validation());

        qb.select(["id"]).unwrap();
        let err = qb.build().unwrap_err();
        assert_eq!(err.to_string(), "Validation error: from must precede build");
    }

    #[test]
    fn test_failed_validation_leaves_state_untouched() {
        let mut qb = users();
        qb.limit(5).unwrap();
        assert!(qb.limit(-1).is_err());
        assert!(qb.select(Vec::<&str>::new()).is_err());
        assert_eq!(qb.build().unwrap().text, "SELECT id, name FROM users LIMIT $1");
    }

    #[test]
    fn test_argument_count_matches_highest_placeholder() {
        let q = users()
            .where_eq(filters! { "a" => vec![1, 2], "b" => FilterValue::Null, "c" => "x" })
            .where_in("d", Vec::<i64>::new())
            .build()
            .unwrap();
        let highest = (1..=q.values.len())
            .rev()
            .find(|n| q.text.contains(&format!("${}", n)))
            .unwrap_or(0);
        assert_eq!(highest, q.values.len());
        assert!(!q.text.contains(&format!("${}", q.values.len() + 1)));
    }

    #[test]
    fn test_values_never_interpolated() {
        let q = users()
            .where_eq(filters! { "name" => "'; DROP TABLE users; --" })
            .build()
            .unwrap();
        assert!(!q.text.contains("DROP"));
        assert_eq!(q.values, vec![Value::from("'; DROP TABLE users; --")]);
    }
}
