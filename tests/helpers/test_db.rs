use storechat::database::Database;

pub async fn setup_test_db() -> Database {
    // Use file-based SQLite for tests (unique UUID per test for parallel execution)
    use uuid::Uuid;
    let temp_file = format!("test_{}.db", Uuid::new_v4());
    let db_url = format!("sqlite://{}?mode=rwc", temp_file);

    let db = Database::connect(&db_url)
        .await
        .expect("Failed to connect to test database");

    setup_schema(&db).await;

    db
}

async fn setup_schema(db: &Database) {
    let pool = db.pool();

    sqlx::query(
        "CREATE TABLE chat_rooms (
            id TEXT PRIMARY KEY,
            customer_id TEXT NOT NULL UNIQUE,
            customer_name TEXT NOT NULL,
            status TEXT NOT NULL CHECK(status IN ('active', 'closed')) DEFAULT 'active',
            last_message TEXT NOT NULL DEFAULT '',
            last_message_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .expect("Failed to create chat_rooms table");

    sqlx::query("CREATE INDEX idx_chat_rooms_status ON chat_rooms(status)")
        .execute(pool)
        .await
        .ok();

    sqlx::query("CREATE INDEX idx_chat_rooms_last_message_at ON chat_rooms(last_message_at DESC)")
        .execute(pool)
        .await
        .ok();

    sqlx::query(
        "CREATE TABLE messages (
            id TEXT PRIMARY KEY,
            chat_room_id TEXT NOT NULL,
            sender_id TEXT NOT NULL,
            sender_type TEXT NOT NULL CHECK(sender_type IN ('customer', 'technician')),
            sender_name TEXT NOT NULL,
            content TEXT NOT NULL,
            attachment_url TEXT,
            is_read INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .expect("Failed to create messages table");

    sqlx::query("CREATE INDEX idx_messages_chat_room_id ON messages(chat_room_id)")
        .execute(pool)
        .await
        .ok();

    sqlx::query("CREATE INDEX idx_messages_created_at ON messages(created_at DESC)")
        .execute(pool)
        .await
        .ok();

    sqlx::query(
        "CREATE TABLE message_reads (
            message_id TEXT NOT NULL,
            technician_id TEXT NOT NULL,
            read_at TEXT NOT NULL,
            PRIMARY KEY (message_id, technician_id),
            FOREIGN KEY (message_id) REFERENCES messages(id) ON DELETE CASCADE
        )",
    )
    .execute(pool)
    .await
    .expect("Failed to create message_reads table");

    sqlx::query(
        "CREATE TABLE technicians (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .expect("Failed to create technicians table");

    sqlx::query(
        "CREATE TABLE chat_notifications (
            technician_id TEXT NOT NULL,
            chat_room_id TEXT NOT NULL,
            unread_count INTEGER NOT NULL DEFAULT 0,
            last_message_at TEXT NOT NULL,
            PRIMARY KEY (technician_id, chat_room_id)
        )",
    )
    .execute(pool)
    .await
    .expect("Failed to create chat_notifications table");
}
