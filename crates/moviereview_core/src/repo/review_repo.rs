//! Review repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Translate filters and partial updates into SQL against `reviews`.
//! - Resolve identifiers stored under either key encoding.
//! - Compute per-movie rating aggregates.
//!
//! # Invariants
//! - Lookups by id try the raw-string key first and retry once with the
//!   object-id key only when the first attempt finds no row.
//! - Storage "no row" becomes `NotFound`; unique-constraint violations
//!   become `AlreadyExists`; all other failures pass through as `Db`.
//! - No business validation happens here.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::review::{now_epoch_ms, Review, ReviewFilter, ReviewId, ReviewUpdateData};
use crate::repo::object_id::ObjectId;
use log::debug;
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const REVIEW_COLUMNS: &str =
    "_id, user_id, movie_id, rating, comment, created_at, updated_at, is_deleted";

const REQUIRED_COLUMNS: [&str; 8] = [
    "_id",
    "user_id",
    "movie_id",
    "rating",
    "comment",
    "created_at",
    "updated_at",
    "is_deleted",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for review persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// No document matched under either key encoding.
    NotFound(ReviewId),
    /// A write hit a uniqueness constraint.
    AlreadyExists,
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted row cannot be converted into a `Review`.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "review not found: {id}"),
            Self::AlreadyExists => write!(f, "review already exists for this user and movie"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "review repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "review repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "review repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted review data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for review persistence.
pub trait ReviewRepository {
    /// Inserts `review` and returns the stored copy with id and timestamps.
    ///
    /// A non-empty `review.id` is stored verbatim as a raw-string key;
    /// otherwise a fresh object id is assigned.
    fn create(&self, review: &Review) -> RepoResult<Review>;
    /// Returns the review stored under `id` in either key encoding.
    fn find_by_id(&self, id: &str) -> RepoResult<Review>;
    /// Lists reviews matching every present filter field, newest first.
    fn find(&self, filter: &ReviewFilter) -> RepoResult<Vec<Review>>;
    /// Applies present fields, refreshes `updated_at`, returns the post-image.
    fn update(&self, id: &str, update: &ReviewUpdateData) -> RepoResult<Review>;
    /// Logical delete.
    fn delete(&self, id: &str) -> RepoResult<Review> {
        self.update(id, &ReviewUpdateData::mark_deleted())
    }
    /// True iff an active review exists for the pair.
    fn check_user_review_exists(&self, user_id: &str, movie_id: &str) -> RepoResult<bool>;
    /// Mean rating over active reviews, `0.0` when there are none.
    fn get_average_rating(&self, movie_id: &str) -> RepoResult<f64>;
}

/// SQLite-backed review repository.
pub struct SqliteReviewRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReviewRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_review_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn fetch_by_key(&self, key: &StoredKey) -> RepoResult<Option<Review>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE _id = ?1;"))?;
        let mut rows = stmt.query([key.to_value()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_review_row(row)?));
        }

        Ok(None)
    }

    fn update_by_key(
        &self,
        sql: &str,
        values: &[Value],
        key: &StoredKey,
    ) -> RepoResult<Option<Review>> {
        let mut stmt = self.conn.prepare(sql)?;
        let bind = values.iter().cloned().chain(std::iter::once(key.to_value()));
        let mut rows = stmt.query(params_from_iter(bind)).map_err(map_write_error)?;
        if let Some(row) = rows.next().map_err(map_write_error)? {
            return Ok(Some(parse_review_row(row)?));
        }

        Ok(None)
    }
}

impl ReviewRepository for SqliteReviewRepository<'_> {
    fn create(&self, review: &Review) -> RepoResult<Review> {
        let key = if review.id.is_empty() {
            StoredKey::Object(ObjectId::generate())
        } else {
            StoredKey::Raw(review.id.clone())
        };
        let now = now_epoch_ms();

        self.conn
            .execute(
                "INSERT INTO reviews (
                    _id,
                    user_id,
                    movie_id,
                    rating,
                    comment,
                    created_at,
                    updated_at,
                    is_deleted
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
                params![
                    key.to_value(),
                    review.user_id.as_str(),
                    review.movie_id.as_str(),
                    review.rating,
                    review.comment.as_str(),
                    now,
                    now,
                    bool_to_int(review.is_deleted),
                ],
            )
            .map_err(map_write_error)?;

        Ok(Review {
            id: key.to_review_id(),
            created_at: now,
            updated_at: now,
            ..review.clone()
        })
    }

    fn find_by_id(&self, id: &str) -> RepoResult<Review> {
        resolve_by_id(id, |key| self.fetch_by_key(key))
    }

    fn find(&self, filter: &ReviewFilter) -> RepoResult<Vec<Review>> {
        let mut sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(id) = filter.id.as_ref() {
            push_key_match(&mut sql, &mut bind_values, std::slice::from_ref(id));
        }
        if !filter.ids.is_empty() {
            push_key_match(&mut sql, &mut bind_values, &filter.ids);
        }

        if let Some(user_id) = filter.user_id.as_ref() {
            sql.push_str(" AND user_id = ?");
            bind_values.push(Value::Text(user_id.clone()));
        }

        if let Some(movie_id) = filter.movie_id.as_ref() {
            sql.push_str(" AND movie_id = ?");
            bind_values.push(Value::Text(movie_id.clone()));
        }

        if filter.min_rating.is_some() || filter.max_rating.is_some() {
            if let Some(min_rating) = filter.min_rating {
                sql.push_str(" AND rating >= ?");
                bind_values.push(Value::Integer(i64::from(min_rating)));
            }
            if let Some(max_rating) = filter.max_rating {
                sql.push_str(" AND rating <= ?");
                bind_values.push(Value::Integer(i64::from(max_rating)));
            }
        } else if let Some(rating) = filter.rating {
            sql.push_str(" AND rating = ?");
            bind_values.push(Value::Integer(i64::from(rating)));
        }

        // rowid keeps same-millisecond inserts newest first.
        sql.push_str(" ORDER BY created_at DESC, rowid DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut reviews = Vec::new();
        while let Some(row) = rows.next()? {
            reviews.push(parse_review_row(row)?);
        }

        Ok(reviews)
    }

    fn update(&self, id: &str, update: &ReviewUpdateData) -> RepoResult<Review> {
        let mut assignments = vec!["updated_at = ?"];
        let mut values = vec![Value::Integer(now_epoch_ms())];

        if let Some(rating) = update.rating {
            assignments.push("rating = ?");
            values.push(Value::Integer(i64::from(rating)));
        }
        if let Some(comment) = update.comment.as_ref() {
            assignments.push("comment = ?");
            values.push(Value::Text(comment.clone()));
        }
        if let Some(is_deleted) = update.is_deleted {
            assignments.push("is_deleted = ?");
            values.push(Value::Integer(bool_to_int(is_deleted)));
        }

        let sql = format!(
            "UPDATE reviews SET {} WHERE _id = ? RETURNING {REVIEW_COLUMNS};",
            assignments.join(", ")
        );

        resolve_by_id(id, |key| self.update_by_key(&sql, &values, key))
    }

    fn check_user_review_exists(&self, user_id: &str, movie_id: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM reviews
                WHERE user_id = ?1
                  AND movie_id = ?2
                  AND is_deleted = 0
            );",
            params![user_id, movie_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn get_average_rating(&self, movie_id: &str) -> RepoResult<f64> {
        let average: Option<f64> = self.conn.query_row(
            "SELECT AVG(rating)
             FROM reviews
             WHERE movie_id = ?1
               AND is_deleted = 0;",
            [movie_id],
            |row| row.get(0),
        )?;
        Ok(average.unwrap_or(0.0))
    }
}

/// Physical key encodings a review `_id` may be stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
enum StoredKey {
    Raw(String),
    Object(ObjectId),
}

impl StoredKey {
    fn to_value(&self) -> Value {
        match self {
            Self::Raw(id) => Value::Text(id.clone()),
            Self::Object(object_id) => Value::Blob(object_id.as_bytes().to_vec()),
        }
    }

    fn to_review_id(&self) -> ReviewId {
        match self {
            Self::Raw(id) => id.clone(),
            Self::Object(object_id) => object_id.to_hex(),
        }
    }
}

/// Runs `attempt` with the raw-string key, then once with the object-id
/// key when the first attempt finds nothing and `id` parses as one.
fn resolve_by_id<T>(
    id: &str,
    mut attempt: impl FnMut(&StoredKey) -> RepoResult<Option<T>>,
) -> RepoResult<T> {
    if let Some(found) = attempt(&StoredKey::Raw(id.to_string()))? {
        return Ok(found);
    }

    if let Some(object_id) = ObjectId::parse_hex(id) {
        debug!("event=review_id_fallback module=repo status=retry encoding=object_id");
        if let Some(found) = attempt(&StoredKey::Object(object_id))? {
            return Ok(found);
        }
    }

    Err(RepoError::NotFound(id.to_string()))
}

fn push_key_match(sql: &mut String, bind_values: &mut Vec<Value>, ids: &[ReviewId]) {
    let mut placeholders = Vec::new();
    for id in ids {
        placeholders.push("?");
        bind_values.push(StoredKey::Raw(id.clone()).to_value());
        if let Some(object_id) = ObjectId::parse_hex(id) {
            placeholders.push("?");
            bind_values.push(StoredKey::Object(object_id).to_value());
        }
    }
    sql.push_str(&format!(" AND _id IN ({})", placeholders.join(", ")));
}

fn map_write_error(err: rusqlite::Error) -> RepoError {
    let err = DbError::from(err);
    if err.is_unique_violation() {
        RepoError::AlreadyExists
    } else {
        RepoError::Db(err)
    }
}

fn parse_review_row(row: &Row<'_>) -> RepoResult<Review> {
    let id = match row.get_ref("_id")? {
        ValueRef::Text(bytes) => String::from_utf8(bytes.to_vec()).map_err(|_| {
            RepoError::InvalidData("non UTF-8 text key in reviews._id".to_string())
        })?,
        ValueRef::Blob(bytes) => ObjectId::from_slice(bytes)
            .map(ObjectId::to_hex)
            .ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "object id of {} bytes in reviews._id",
                    bytes.len()
                ))
            })?,
        other => {
            return Err(RepoError::InvalidData(format!(
                "unsupported key type {:?} in reviews._id",
                other.data_type()
            )));
        }
    };

    let rating_raw: i64 = row.get("rating")?;
    let rating = i32::try_from(rating_raw).map_err(|_| {
        RepoError::InvalidData(format!("rating `{rating_raw}` out of range in reviews.rating"))
    })?;

    let is_deleted = match row.get::<_, i64>("is_deleted")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_deleted value `{other}` in reviews.is_deleted"
            )));
        }
    };

    Ok(Review {
        id,
        user_id: row.get("user_id")?,
        movie_id: row.get("movie_id")?,
        rating,
        comment: row.get("comment")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        is_deleted,
    })
}

fn ensure_review_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "reviews")? {
        return Err(RepoError::MissingRequiredTable("reviews"));
    }

    for column in REQUIRED_COLUMNS {
        if !table_has_column(conn, "reviews", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "reviews",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
