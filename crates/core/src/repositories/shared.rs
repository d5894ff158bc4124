//! Shared repository utilities.
//!
//! Owner-scoped CRUD is the same shape for every record table, so the query plumbing lives
//! here once and each service supplies its table through [`OwnedRecord`].
//!
//! ## Key Components
//!
//! - **Pagination**: [`Pagination`] clamps client-supplied `limit`/`offset`
//! - **Reads**: `fetch_owned`, `fetch_by_ids`, `list_owned`, `select_owned`
//! - **Writes**: `update_owned` driven by a [`RecordPatch`], and `soft_delete`
//!
//! All reads skip soft-deleted rows.

use crate::constants::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use crate::models::Page;
use crate::{Database, RecordError, RecordResult};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite};
use uuid::Uuid;

/// A row type stored in an owner-scoped table with a `deleted_at` marker.
pub(crate) trait OwnedRecord: for<'r> FromRow<'r, SqliteRow> + Send + Unpin {
    /// Table name. Interpolated into SQL, so it must be a literal.
    const TABLE: &'static str;
    /// Human label used in not-found errors.
    const LABEL: &'static str;
    /// `ORDER BY` clause used by listings.
    const DEFAULT_ORDER: &'static str;
}

/// Page window for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    limit: i64,
    offset: i64,
}

impl Pagination {
    /// Build a window from optional client values.
    ///
    /// A missing or non-positive limit becomes the default, a limit above the ceiling is
    /// clamped, and a missing or negative offset becomes zero.
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = match limit {
            Some(limit) if limit > 0 => limit.min(MAX_PAGE_LIMIT),
            _ => DEFAULT_PAGE_LIMIT,
        };
        Self {
            limit,
            offset: offset.unwrap_or(0).max(0),
        }
    }

    /// The first `limit` rows.
    pub fn first(limit: i64) -> Self {
        Self::new(Some(limit), None)
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Builds the `SET` list of an `UPDATE` from the fields present in a patch.
pub(crate) struct Assignments<'a> {
    query: QueryBuilder<'a, Sqlite>,
    empty: bool,
}

impl<'a> Assignments<'a> {
    fn new(table: &str) -> Self {
        Self {
            query: QueryBuilder::new(format!("UPDATE {table} SET ")),
            empty: true,
        }
    }

    /// Add `column = value` when `value` is present.
    pub(crate) fn set<T>(&mut self, column: &'static str, value: Option<T>) -> &mut Self
    where
        T: 'a + sqlx::Encode<'a, Sqlite> + sqlx::Type<Sqlite> + Send,
    {
        if let Some(value) = value {
            if !self.empty {
                self.query.push(", ");
            }
            self.query.push(column).push(" = ").push_bind(value);
            self.empty = false;
        }
        self
    }
}

/// A typed set of optional field updates for one record table.
pub(crate) trait RecordPatch {
    fn apply(self, assignments: &mut Assignments<'_>);
}

fn owned_select<'a>(select: &str, table: &str, user_id: Uuid) -> QueryBuilder<'a, Sqlite> {
    let mut query = QueryBuilder::new(format!(
        "SELECT {select} FROM {table} WHERE deleted_at IS NULL AND user_id = "
    ));
    query.push_bind(user_id);
    query
}

/// Fetch one record by id, owned by `user_id`.
///
/// # Errors
///
/// Returns [`RecordError::NotFound`] when no live row matches both id and owner.
pub(crate) async fn fetch_owned<T: OwnedRecord>(
    db: &Database,
    user_id: Uuid,
    id: Uuid,
) -> RecordResult<T> {
    let sql = format!(
        "SELECT * FROM {} WHERE id = ? AND user_id = ? AND deleted_at IS NULL",
        T::TABLE
    );
    sqlx::query_as::<_, T>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(db.pool())
        .await?
        .ok_or(RecordError::NotFound(T::LABEL))
}

/// Fetch live records whose id is in `ids`, regardless of owner.
pub(crate) async fn fetch_by_ids<T: OwnedRecord>(
    db: &Database,
    ids: &[Uuid],
) -> RecordResult<Vec<T>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = QueryBuilder::<Sqlite>::new(format!(
        "SELECT * FROM {} WHERE deleted_at IS NULL AND id IN (",
        T::TABLE
    ));
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
    query.push(format!(" ORDER BY {}", T::DEFAULT_ORDER));

    Ok(query.build_query_as::<T>().fetch_all(db.pool()).await?)
}

/// List one page of an owner's records.
///
/// `filter` appends extra `AND ...` conditions; it runs against both the count and the page
/// query so `total` reflects the filter.
pub(crate) async fn list_owned<T, F>(
    db: &Database,
    user_id: Uuid,
    page: Pagination,
    order: &str,
    filter: F,
) -> RecordResult<Page<T>>
where
    T: OwnedRecord,
    F: Fn(&mut QueryBuilder<'_, Sqlite>),
{
    let mut count = owned_select("COUNT(*)", T::TABLE, user_id);
    filter(&mut count);
    let total: i64 = count
        .build_query_scalar::<i64>()
        .fetch_one(db.pool())
        .await?;

    let mut select = owned_select("*", T::TABLE, user_id);
    filter(&mut select);
    select.push(format!(" ORDER BY {order} LIMIT "));
    select.push_bind(page.limit());
    select.push(" OFFSET ");
    select.push_bind(page.offset());
    let data = select.build_query_as::<T>().fetch_all(db.pool()).await?;

    Ok(Page {
        data,
        total,
        limit: page.limit(),
        offset: page.offset(),
    })
}

/// Select every matching record of an owner, unpaged.
pub(crate) async fn select_owned<T, F>(
    db: &Database,
    user_id: Uuid,
    order: &str,
    filter: F,
) -> RecordResult<Vec<T>>
where
    T: OwnedRecord,
    F: Fn(&mut QueryBuilder<'_, Sqlite>),
{
    let mut select = owned_select("*", T::TABLE, user_id);
    filter(&mut select);
    select.push(format!(" ORDER BY {order}"));
    Ok(select.build_query_as::<T>().fetch_all(db.pool()).await?)
}

/// Apply a patch to an owned record and return the updated row.
///
/// `updated_at` is always refreshed, so an empty patch still touches the row.
///
/// # Errors
///
/// Returns [`RecordError::NotFound`] when no live row matches both id and owner.
pub(crate) async fn update_owned<T, P>(
    db: &Database,
    user_id: Uuid,
    id: Uuid,
    patch: P,
) -> RecordResult<T>
where
    T: OwnedRecord,
    P: RecordPatch,
{
    let mut assignments = Assignments::new(T::TABLE);
    patch.apply(&mut assignments);
    assignments.set("updated_at", Some(Utc::now()));

    let mut query = assignments.query;
    query
        .push(" WHERE id = ")
        .push_bind(id)
        .push(" AND user_id = ")
        .push_bind(user_id)
        .push(" AND deleted_at IS NULL");

    let result = query.build().execute(db.pool()).await?;
    if result.rows_affected() == 0 {
        return Err(RecordError::NotFound(T::LABEL));
    }

    fetch_owned(db, user_id, id).await
}

/// Mark an owned record deleted.
///
/// # Errors
///
/// Returns [`RecordError::NotFound`] when no live row matches both id and owner.
pub(crate) async fn soft_delete<T: OwnedRecord>(
    db: &Database,
    user_id: Uuid,
    id: Uuid,
) -> RecordResult<()> {
    let now = Utc::now();
    let sql = format!(
        "UPDATE {} SET deleted_at = ?, updated_at = ? \
         WHERE id = ? AND user_id = ? AND deleted_at IS NULL",
        T::TABLE
    );
    let result = sqlx::query(&sql)
        .bind(now)
        .bind(now)
        .bind(id)
        .bind(user_id)
        .execute(db.pool())
        .await?;

    if result.rows_affected() == 0 {
        return Err(RecordError::NotFound(T::LABEL));
    }
    Ok(())
}
