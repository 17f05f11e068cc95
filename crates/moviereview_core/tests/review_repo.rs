use moviereview_core::db::migrations::latest_version;
use moviereview_core::db::open_db_in_memory;
use moviereview_core::{
    RepoError, Review, ReviewFilter, ReviewRepository, ReviewUpdateData, SqliteReviewRepository,
};
use rusqlite::{params, Connection};

const HEX_ID: &str = "65a1b2c3d4e5f60718293a4b";
const HEX_BLOB: &str = "X'65a1b2c3d4e5f60718293a4b'";

#[test]
fn create_assigns_object_id_and_timestamps() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReviewRepository::try_new(&conn).unwrap();

    let created = repo
        .create(&Review::new("user-1", "movie-1", 4, "solid"))
        .unwrap();

    assert_eq!(created.id.len(), 24);
    assert!(created.id.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(created.created_at > 0);
    assert_eq!(created.created_at, created.updated_at);
    assert!(!created.is_deleted);
    assert_eq!(key_type(&conn, "user-1"), "blob");
}

#[test]
fn create_with_caller_id_keeps_raw_string_key() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReviewRepository::try_new(&conn).unwrap();

    let mut review = Review::new("user-1", "movie-1", 3, "imported");
    review.id = "legacy-42".to_string();
    let created = repo.create(&review).unwrap();

    assert_eq!(created.id, "legacy-42");
    assert_eq!(key_type(&conn, "user-1"), "text");
    assert_eq!(repo.find_by_id("legacy-42").unwrap().comment, "imported");
}

#[test]
fn find_by_id_falls_back_to_object_id_encoding() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReviewRepository::try_new(&conn).unwrap();
    insert_fixture(&conn, HEX_BLOB, "user-1", "movie-1", 5, 1_000, false);

    let found = repo.find_by_id(HEX_ID).unwrap();
    assert_eq!(found.id, HEX_ID);
    assert_eq!(found.rating, 5);

    let upper = repo.find_by_id(&HEX_ID.to_ascii_uppercase()).unwrap();
    assert_eq!(upper.id, HEX_ID);
}

#[test]
fn find_by_id_prefers_raw_string_key_over_object_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReviewRepository::try_new(&conn).unwrap();
    insert_fixture(&conn, HEX_BLOB, "blob-user", "movie-1", 2, 1_000, false);
    insert_fixture(
        &conn,
        &format!("'{HEX_ID}'"),
        "text-user",
        "movie-2",
        4,
        2_000,
        false,
    );

    let found = repo.find_by_id(HEX_ID).unwrap();
    assert_eq!(found.user_id, "text-user");
}

#[test]
fn find_by_id_missing_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReviewRepository::try_new(&conn).unwrap();

    let err = repo.find_by_id("not-an-object-id").unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == "not-an-object-id"));

    let err = repo.find_by_id(HEX_ID).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[test]
fn find_sorts_by_created_at_descending() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReviewRepository::try_new(&conn).unwrap();
    insert_fixture(&conn, "'r-old'", "u1", "movie-1", 3, 1_000, false);
    insert_fixture(&conn, "'r-new'", "u2", "movie-1", 3, 3_000, false);
    insert_fixture(&conn, "'r-mid'", "u3", "movie-1", 3, 2_000, false);

    let ids = ids_of(repo.find(&ReviewFilter::default()).unwrap());
    assert_eq!(ids, vec!["r-new", "r-mid", "r-old"]);
}

#[test]
fn find_with_rating_range_returns_only_bounded_ratings() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReviewRepository::try_new(&conn).unwrap();
    for (key, rating, created_at) in [
        ("'r1'", 1, 1_000),
        ("'r2'", 3, 2_000),
        ("'r3'", 5, 3_000),
        ("'r4'", 4, 4_000),
        ("'r5'", 2, 5_000),
    ] {
        insert_fixture(&conn, key, key, "movie-1", rating, created_at, false);
    }

    let filter = ReviewFilter {
        min_rating: Some(3),
        max_rating: Some(4),
        ..ReviewFilter::default()
    };
    let found = repo.find(&filter).unwrap();
    assert_eq!(ids_of(found.clone()), vec!["r4", "r2"]);
    assert!(found.iter().all(|review| (3..=4).contains(&review.rating)));
}

#[test]
fn rating_bounds_take_precedence_over_exact_rating() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReviewRepository::try_new(&conn).unwrap();
    insert_fixture(&conn, "'r1'", "u1", "movie-1", 2, 1_000, false);
    insert_fixture(&conn, "'r2'", "u2", "movie-1", 4, 2_000, false);
    insert_fixture(&conn, "'r3'", "u3", "movie-1", 5, 3_000, false);

    let exact = ReviewFilter {
        rating: Some(2),
        ..ReviewFilter::default()
    };
    assert_eq!(ids_of(repo.find(&exact).unwrap()), vec!["r1"]);

    let with_min = ReviewFilter {
        rating: Some(2),
        min_rating: Some(4),
        ..ReviewFilter::default()
    };
    assert_eq!(ids_of(repo.find(&with_min).unwrap()), vec!["r3", "r2"]);

    let with_max = ReviewFilter {
        max_rating: Some(4),
        ..ReviewFilter::default()
    };
    assert_eq!(ids_of(repo.find(&with_max).unwrap()), vec!["r2", "r1"]);
}

#[test]
fn find_combines_fields_with_and_semantics() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReviewRepository::try_new(&conn).unwrap();
    insert_fixture(&conn, "'a'", "u1", "movie-1", 4, 1_000, false);
    insert_fixture(&conn, "'b'", "u1", "movie-2", 4, 2_000, false);
    insert_fixture(&conn, "'c'", "u2", "movie-1", 4, 3_000, false);

    let filter = ReviewFilter {
        user_id: Some("u1".to_string()),
        movie_id: Some("movie-1".to_string()),
        ..ReviewFilter::default()
    };
    assert_eq!(ids_of(repo.find(&filter).unwrap()), vec!["a"]);

    assert_eq!(
        ids_of(repo.find(&ReviewFilter::by_user("u1")).unwrap()),
        vec!["b", "a"]
    );
}

#[test]
fn find_by_ids_matches_either_key_encoding() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReviewRepository::try_new(&conn).unwrap();
    insert_fixture(&conn, HEX_BLOB, "u1", "movie-1", 4, 1_000, false);
    insert_fixture(&conn, "'raw-key'", "u2", "movie-1", 4, 2_000, false);
    insert_fixture(&conn, "'other'", "u3", "movie-1", 4, 3_000, false);

    let filter = ReviewFilter {
        ids: vec![HEX_ID.to_string(), "raw-key".to_string()],
        ..ReviewFilter::default()
    };
    assert_eq!(ids_of(repo.find(&filter).unwrap()), vec!["raw-key", HEX_ID]);

    let single = ReviewFilter {
        id: Some(HEX_ID.to_string()),
        ..ReviewFilter::default()
    };
    assert_eq!(ids_of(repo.find(&single).unwrap()), vec![HEX_ID]);
}

#[test]
fn update_applies_only_present_fields_and_returns_post_image() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReviewRepository::try_new(&conn).unwrap();
    insert_fixture(&conn, "'r1'", "u1", "movie-1", 2, 1_000, false);

    let updated = repo
        .update("r1", &ReviewUpdateData::default().with_rating(5))
        .unwrap();
    assert_eq!(updated.rating, 5);
    assert_eq!(updated.comment, "fixture comment");
    assert_eq!(updated.created_at, 1_000);
    assert!(updated.updated_at > 1_000);
    assert!(!updated.is_deleted);

    let updated = repo
        .update("r1", &ReviewUpdateData::default().with_comment("changed"))
        .unwrap();
    assert_eq!(updated.rating, 5);
    assert_eq!(updated.comment, "changed");
}

#[test]
fn update_resolves_object_id_and_reports_missing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReviewRepository::try_new(&conn).unwrap();
    insert_fixture(&conn, HEX_BLOB, "u1", "movie-1", 3, 1_000, false);

    let updated = repo
        .update(HEX_ID, &ReviewUpdateData::default().with_rating(1))
        .unwrap();
    assert_eq!(updated.id, HEX_ID);
    assert_eq!(updated.rating, 1);

    let err = repo
        .update("missing", &ReviewUpdateData::default().with_rating(1))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == "missing"));
}

#[test]
fn delete_sets_tombstone_and_keeps_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReviewRepository::try_new(&conn).unwrap();
    let created = repo
        .create(&Review::new("u1", "movie-1", 4, "fine"))
        .unwrap();

    let deleted = repo.delete(&created.id).unwrap();
    assert!(deleted.is_deleted);
    assert!(repo.find_by_id(&created.id).unwrap().is_deleted);

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM reviews;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn check_user_review_exists_ignores_deleted_reviews() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReviewRepository::try_new(&conn).unwrap();
    insert_fixture(&conn, "'gone'", "u1", "movie-1", 3, 1_000, true);

    assert!(!repo.check_user_review_exists("u1", "movie-1").unwrap());

    insert_fixture(&conn, "'live'", "u1", "movie-1", 3, 2_000, false);
    assert!(repo.check_user_review_exists("u1", "movie-1").unwrap());
    assert!(!repo.check_user_review_exists("u1", "movie-2").unwrap());
}

#[test]
fn average_rating_excludes_deleted_and_defaults_to_zero() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReviewRepository::try_new(&conn).unwrap();
    insert_fixture(&conn, "'a'", "u1", "movie-1", 3, 1_000, false);
    insert_fixture(&conn, "'b'", "u2", "movie-1", 5, 2_000, false);
    insert_fixture(&conn, "'c'", "u3", "movie-1", 4, 3_000, false);
    insert_fixture(&conn, "'d'", "u4", "movie-1", 1, 4_000, true);

    assert_eq!(repo.get_average_rating("movie-1").unwrap(), 4.0);
    assert_eq!(repo.get_average_rating("movie-empty").unwrap(), 0.0);
}

#[test]
fn unique_index_rejects_second_active_review_for_pair() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReviewRepository::try_new(&conn).unwrap();
    let first = repo
        .create(&Review::new("u1", "movie-1", 4, "first"))
        .unwrap();

    let err = repo
        .create(&Review::new("u1", "movie-1", 2, "racing"))
        .unwrap_err();
    assert!(matches!(err, RepoError::AlreadyExists));

    repo.delete(&first.id).unwrap();
    repo.create(&Review::new("u1", "movie-1", 2, "again"))
        .unwrap();

    let err = repo
        .update(
            &first.id,
            &ReviewUpdateData {
                is_deleted: Some(false),
                ..ReviewUpdateData::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, RepoError::AlreadyExists));
}

#[test]
fn duplicate_raw_key_returns_already_exists() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReviewRepository::try_new(&conn).unwrap();

    let mut review = Review::new("u1", "movie-1", 4, "first");
    review.id = "fixed".to_string();
    repo.create(&review).unwrap();

    let mut clash = Review::new("u2", "movie-2", 4, "second");
    clash.id = "fixed".to_string();
    assert!(matches!(
        repo.create(&clash).unwrap_err(),
        RepoError::AlreadyExists
    ));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteReviewRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_missing_table_and_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();
    assert!(matches!(
        SqliteReviewRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("reviews"))
    ));

    conn.execute_batch(
        "CREATE TABLE reviews (
            _id PRIMARY KEY NOT NULL,
            user_id TEXT NOT NULL,
            movie_id TEXT NOT NULL,
            rating INTEGER NOT NULL,
            comment TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );",
    )
    .unwrap();
    assert!(matches!(
        SqliteReviewRepository::try_new(&conn),
        Err(RepoError::MissingRequiredColumn {
            table: "reviews",
            column: "is_deleted"
        })
    ));
}

fn insert_fixture(
    conn: &Connection,
    key_literal: &str,
    user_id: &str,
    movie_id: &str,
    rating: i32,
    created_at: i64,
    is_deleted: bool,
) {
    conn.execute(
        &format!(
            "INSERT INTO reviews (
                _id, user_id, movie_id, rating, comment, created_at, updated_at, is_deleted
            ) VALUES ({key_literal}, ?1, ?2, ?3, 'fixture comment', ?4, ?4, ?5);"
        ),
        params![user_id, movie_id, rating, created_at, i64::from(is_deleted)],
    )
    .unwrap();
}

fn key_type(conn: &Connection, user_id: &str) -> String {
    conn.query_row(
        "SELECT typeof(_id) FROM reviews WHERE user_id = ?1;",
        [user_id],
        |row| row.get(0),
    )
    .unwrap()
}

fn ids_of(reviews: Vec<Review>) -> Vec<String> {
    reviews.into_iter().map(|review| review.id).collect()
}
