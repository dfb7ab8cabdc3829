#![cfg(feature = "mysql-live-tests")]

use std::env;

use mysql_middleware::prelude::*;

fn live_options() -> MysqlOptions {
    MysqlOptions::builder(
        env::var("TESTING_MYSQL_HOST").unwrap_or_else(|_| "127.0.0.1:3306".to_string()),
        env::var("TESTING_MYSQL_USER").unwrap_or_else(|_| "root".to_string()),
        env::var("TESTING_MYSQL_PASSWORD").unwrap_or_default(),
        env::var("TESTING_MYSQL_DATABASE").unwrap_or_else(|_| "test".to_string()),
    )
    .timeout("5s")
    .finish()
}

#[test]
fn test3_mysql_fetch_and_write() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let mut client = Client::from_options(live_options()).await;
        client.ping().await?;

        client.query("DROP TABLE IF EXISTS mm_people", &[]).await?;
        client
            .query(
                "CREATE TABLE mm_people (
                    id BIGINT AUTO_INCREMENT PRIMARY KEY,
                    name VARCHAR(64) NULL,
                    score INT NOT NULL
                )",
                &[],
            )
            .await?;

        let first = client
            .query(
                "INSERT INTO mm_people (name, score) VALUES (?, ?)",
                &[RowValues::Text("alice".into()), RowValues::Int(10)],
            )
            .await?;
        assert_eq!(first.rows_affected, 1);
        assert!(first.last_insert_id > 0);

        let second = client
            .query(
                "INSERT INTO mm_people (name, score) VALUES (?, ?)",
                &[RowValues::Null, RowValues::Int(20)],
            )
            .await?;
        assert_eq!(second.last_insert_id, first.last_insert_id + 1);

        client
            .query(
                "INSERT INTO mm_people (name, score) VALUES (?, ?)",
                &[RowValues::Text(String::new()), RowValues::Int(30)],
            )
            .await?;

        // Zero rows: empty map, not an error.
        let none = client
            .get_row("SELECT name FROM mm_people WHERE score > ?", &[RowValues::Int(1000)])
            .await?;
        assert!(none.is_empty());

        // Several rows: last row wins per column.
        let last = client
            .get_row("SELECT id, score FROM mm_people ORDER BY id", &[])
            .await?;
        assert_eq!(last.get("score"), Some("30"));

        let all = client
            .get_result("SELECT name, score FROM mm_people ORDER BY id", &[])
            .await?;
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].get("name"), Some("alice"));
        // NULL and empty string read back the same.
        assert_eq!(all[1].get("name"), Some(""));
        assert_eq!(all[2].get("name"), Some(""));
        assert_eq!(
            all.iter().filter_map(|r| r.get("score")).collect::<Vec<_>>(),
            ["10", "20", "30"]
        );

        let empty = client
            .get_result("SELECT name FROM mm_people WHERE score < 0", &[])
            .await?;
        assert!(empty.is_empty());

        let updated = client
            .query("UPDATE mm_people SET score = score + 1 WHERE score >= ?", &[RowValues::Int(20)])
            .await?;
        assert_eq!(updated.rows_affected, 2);
        assert_eq!(updated.last_insert_id, 0);

        client.query("DROP TABLE mm_people", &[]).await?;
        Ok::<(), MysqlMiddlewareError>(())
    })?;
    Ok(())
}

#[test]
fn test3_mysql_transaction_control() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let mut client = Client::from_options(live_options()).await;
        // Keep every statement on one session so the transaction spans calls.
        client.set_max_open_conns(1);
        client.ping().await?;

        client.query("DROP TABLE IF EXISTS mm_tx", &[]).await?;
        client
            .query("CREATE TABLE mm_tx (id INT PRIMARY KEY) ENGINE=InnoDB", &[])
            .await?;

        client.start().await?;
        client.query("INSERT INTO mm_tx (id) VALUES (?)", &[RowValues::Int(1)]).await?;
        client.rollback().await?;
        let after_rollback = client.get_result("SELECT id FROM mm_tx", &[]).await?;
        assert!(after_rollback.is_empty());

        client.start().await?;
        client.query("INSERT INTO mm_tx (id) VALUES (?)", &[RowValues::Int(2)]).await?;
        client.commit().await?;
        let row = client.get_row("SELECT COUNT(*) AS n FROM mm_tx", &[]).await?;
        assert_eq!(row.get("n"), Some("1"));

        // No client-side tracking: a bare COMMIT is just sent to the server.
        client.commit().await?;

        client.query("DROP TABLE mm_tx", &[]).await?;
        Ok::<(), MysqlMiddlewareError>(())
    })?;
    Ok(())
}

#[test]
fn test3_mysql_pool_settings_apply_live() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let mut client = Client::from_options(live_options()).await;
        client.ping().await?;

        client.set_max_open_conns(3);
        client.set_max_idle_conns(0);
        client.get_row("SELECT 1 AS one", &[]).await?;

        let status = client.status();
        let pool = status.pool.expect("healthy client has a pool");
        assert_eq!(pool.max_size, 3);
        assert_eq!(pool.available, 0);

        client.close();
        assert!(client.get_row("SELECT 1", &[]).await.is_err());
        Ok::<(), MysqlMiddlewareError>(())
    })?;
    Ok(())
}

#[test]
fn test3_mysql_values_read_back_as_stored() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let mut client = Client::from_options(live_options()).await;
        // sql_mode is per session; one connection keeps it for the insert.
        client.set_max_open_conns(1);
        client.ping().await?;
        client.query("SET SESSION sql_mode = ''", &[]).await?;

        client.query("DROP TABLE IF EXISTS mm_values", &[]).await?;
        client
            .query(
                "CREATE TABLE mm_values (
                    id INT PRIMARY KEY,
                    long_span TIME,
                    negative_span TIME,
                    partial_date DATE,
                    zero_date DATE,
                    partial_stamp DATETIME,
                    amount DECIMAL(10, 2),
                    ratio FLOAT,
                    big BIGINT UNSIGNED
                )",
                &[],
            )
            .await?;
        client
            .query(
                "INSERT INTO mm_values VALUES (
                    1, '838:59:59', '-01:00:00', '2024-00-15', '0000-00-00',
                    '2024-05-00 10:11:12', 12.50, 1.5, 18446744073709551615
                )",
                &[],
            )
            .await?;

        let expected = [
            ("id", "1"),
            ("long_span", "838:59:59"),
            ("negative_span", "-01:00:00"),
            ("partial_date", "2024-00-15"),
            ("zero_date", "0000-00-00"),
            ("partial_stamp", "2024-05-00 10:11:12"),
            ("amount", "12.50"),
            ("ratio", "1.5"),
            ("big", "18446744073709551615"),
        ];

        // No parameters: text protocol. A bound parameter: prepared, binary protocol.
        let text_row = client.get_row("SELECT * FROM mm_values WHERE id = 1", &[]).await?;
        let binary_row = client
            .get_row("SELECT * FROM mm_values WHERE id = ?", &[RowValues::Int(1)])
            .await?;
        let text_rows = client.get_result("SELECT * FROM mm_values WHERE id = 1", &[]).await?;
        let binary_rows = client
            .get_result("SELECT * FROM mm_values WHERE id = ?", &[RowValues::Int(1)])
            .await?;
        assert_eq!(text_rows.len(), 1);
        assert_eq!(binary_rows.len(), 1);

        for (path, row) in [
            ("get_row text", &text_row),
            ("get_row binary", &binary_row),
            ("get_result text", &text_rows[0]),
            ("get_result binary", &binary_rows[0]),
        ] {
            for (column, value) in expected {
                assert_eq!(row.get(column), Some(value), "{path}: {column}");
            }
        }

        client.query("DROP TABLE mm_values", &[]).await?;
        Ok::<(), MysqlMiddlewareError>(())
    })?;
    Ok(())
}
