use std::time::Duration;

use mysql_middleware::pool::DEFAULT_MAX_OPEN;
use mysql_middleware::prelude::*;

#[test]
fn test2_options_from_json_config() -> Result<(), Box<dyn std::error::Error>> {
    let opts: MysqlOptions = serde_json::from_str(
        r#"{
            "host": "db.internal:3307",
            "user": "app",
            "password": "hunter2",
            "database": "orders",
            "pool": { "max_lifetime": "30m", "max_idle": 4, "max_open": 8 }
        }"#,
    )?;

    assert_eq!(opts.timeout, "10s");
    assert_eq!(opts.charset, "utf8");
    assert_eq!(opts.connect_timeout()?, Duration::from_secs(10));
    assert_eq!(
        opts.dsn(),
        "app:hunter2@tcp(db.internal:3307)/orders?charset=utf8&timeout=10s"
    );
    assert_eq!(opts.pool.max_lifetime, Duration::from_secs(30 * 60));
    assert_eq!(opts.pool.max_idle, 4);
    assert_eq!(opts.pool.max_open, 8);
    Ok(())
}

#[test]
fn test2_pool_defaults_when_omitted() -> Result<(), Box<dyn std::error::Error>> {
    let opts: MysqlOptions = serde_json::from_str(
        r#"{"host": "", "user": "root", "password": "", "database": "", "timeout": "1s"}"#,
    )?;
    assert_eq!(opts.pool, PoolSettings::default());
    assert_eq!(opts.pool.max_open, DEFAULT_MAX_OPEN);
    assert!(opts.connect_options().is_ok());
    Ok(())
}

#[test]
fn test2_bad_port_is_a_config_error() {
    let opts = MysqlOptions::new("db:99999", "root", "", "test", "1s");
    assert!(matches!(
        opts.connect_options(),
        Err(MysqlMiddlewareError::Config(_))
    ));
}
