use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

const TRANSLATION_CACHE_TABLE: Table = Table {
    name: "translation_cache",
    columns: &[
        Column {
            name: "id",
            sql_type: SqlType::Integer,
            primary_key: true,
            non_null: false,
            default_value: None,
        },
        Column {
            name: "engine",
            sql_type: SqlType::Text,
            primary_key: false,
            non_null: true,
            default_value: None,
        },
        Column {
            name: "engine_params",
            sql_type: SqlType::Text,
            primary_key: false,
            non_null: true,
            default_value: None,
        },
        Column {
            name: "source_text",
            sql_type: SqlType::Text,
            primary_key: false,
            non_null: true,
            default_value: None,
        },
        Column {
            name: "translation",
            sql_type: SqlType::Text,
            primary_key: false,
            non_null: true,
            default_value: None,
        },
    ],
    indices: &[],
    // Upserts key on this constraint; at most one row per (engine, params, text).
    unique_constraints: &[&["engine", "engine_params", "source_text"]],
};

pub const TRANSLATION_CACHE_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[TRANSLATION_CACHE_TABLE],
    migration: None,
}];
