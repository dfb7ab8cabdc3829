use sqlx::MySql;
use sqlx::mysql::MySqlArguments;
use sqlx::query::Query;

use crate::types::RowValues;

/// Bind parameters positionally onto `query`'s `?` placeholders.
pub fn bind_query_params<'q>(
    query: &'q str,
    params: &'q [RowValues],
) -> Query<'q, MySql, MySqlArguments> {
    let mut query_builder = sqlx::query(query);

    for param in params {
        query_builder = match param {
            RowValues::Int(i) => query_builder.bind(*i),
            RowValues::Float(f) => query_builder.bind(*f),
            RowValues::Text(s) => query_builder.bind(s.as_str()),
            RowValues::Bool(b) => query_builder.bind(*b),
            RowValues::Timestamp(dt) => query_builder.bind(*dt),
            RowValues::Null => query_builder.bind(Option::<String>::None),
            RowValues::JSON(jsval) => query_builder.bind(jsval.to_string()),
            RowValues::Blob(bytes) => query_builder.bind(bytes.as_slice()),
        };
    }

    query_builder
}
