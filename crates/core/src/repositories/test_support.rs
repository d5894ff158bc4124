use crate::models::{NewUser, User};
use crate::{Database, EmailAddress, NonEmptyText, UserService};

pub(crate) async fn database() -> Database {
    Database::in_memory().await.expect("in-memory database")
}

pub(crate) async fn user(db: &Database, email: &str) -> User {
    UserService::new(db.clone())
        .register(NewUser {
            email: EmailAddress::parse(email).expect("valid email"),
            password: "password123".into(),
            first_name: NonEmptyText::new("Test").expect("first name"),
            last_name: NonEmptyText::new("User").expect("last name"),
            phone: String::new(),
        })
        .await
        .expect("register test user")
}

/// File-backed database with a multi-connection pool, for tests that need real contention.
///
/// The returned directory must outlive the database.
pub(crate) async fn file_database(max_connections: u32) -> (tempfile::TempDir, Database) {
    let temp_dir = tempfile::TempDir::new().expect("temp dir");
    let url = format!("sqlite://{}", temp_dir.path().join("medvault.db").display());
    let db = Database::connect_url(&url, max_connections)
        .await
        .expect("file database");
    db.migrate().await.expect("migrate file database");
    (temp_dir, db)
}
