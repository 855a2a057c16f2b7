#[cfg(test)]
mod record_tests {
    use crate::record::{Record, RecordCollection};
    use kestrel_common::datum::Value;

    fn record(id: i64) -> Record {
        let mut r = Record::new();
        r.set("ID", Value::Integer(id));
        r
    }

    #[test]
    fn test_next_id_empty_collection() {
        assert_eq!(RecordCollection::new().next_id(), 1);
    }

    #[test]
    fn test_next_id_is_max_based() {
        let mut records = RecordCollection::new();
        records.push(record(1));
        records.push(record(5));
        records.push(record(3));
        assert_eq!(records.next_id(), 6);
    }

    #[test]
    fn test_set_replaces_then_appends() {
        let mut r = record(1);
        r.set("name", Value::Text("a".into()));
        r.set("name", Value::Text("b".into()));
        assert_eq!(r.get("name"), Some(&Value::Text("b".into())));
        assert_eq!(r.len(), 2);
        r.set("extra", Value::Boolean(true));
        assert_eq!(r.len(), 3);
    }

    #[test]
    fn test_record_serde_preserves_field_order() {
        let mut r = record(7);
        r.set("name", Value::Text("x".into()));
        r.set("active", Value::Boolean(true));
        let text = serde_json::to_string(&r).unwrap();
        assert_eq!(text, r#"{"ID":7,"name":"x","active":true}"#);
        let back: Record = serde_json::from_str(&text).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn test_collection_serde_transparent() {
        let mut records = RecordCollection::new();
        records.push(record(1));
        let text = serde_json::to_string(&records).unwrap();
        assert_eq!(text, r#"[{"ID":1}]"#);
    }
}

#[cfg(test)]
mod crud_tests {
    use crate::engine::{Condition, Database};
    use crate::storage::MemoryStorage;
    use kestrel_common::datum::Value;
    use kestrel_common::error::{KestrelError, QueryError, SchemaError};

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn db() -> Database<MemoryStorage> {
        Database::open(MemoryStorage::new()).unwrap()
    }

    /// `create_table t a:int b:str` fixture with no records.
    fn db_with_table() -> Database<MemoryStorage> {
        let mut db = db();
        db.create_table("t", &["a:int", "b:str"]).unwrap();
        db
    }

    #[test]
    fn test_create_then_info_reports_id_first() {
        let db = db_with_table();
        let info = db.info("t").unwrap();
        assert_eq!(info.columns[0].to_string(), "ID:int");
        assert_eq!(info.columns[1].to_string(), "a:int");
        assert_eq!(info.columns[2].to_string(), "b:str");
        assert_eq!(info.record_count, 0);
    }

    #[test]
    fn test_create_duplicate_leaves_schema_unchanged() {
        let mut db = db_with_table();
        let err = db.create_table("t", &["other:bool"]).unwrap_err();
        assert!(matches!(
            err,
            KestrelError::Schema(SchemaError::DuplicateTable(_))
        ));
        assert_eq!(db.catalog().get("t").unwrap().describe(), "ID:int, a:int, b:str");
    }

    #[test]
    fn test_info_unknown_table() {
        let db = db();
        assert!(matches!(
            db.info("nope"),
            Err(KestrelError::Schema(SchemaError::UnknownTable(_)))
        ));
    }

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let mut db = db_with_table();
        for n in 1..=4 {
            let id = db.insert("t", &[Value::Integer(n), text("x")]).unwrap();
            assert_eq!(id, n);
        }
        let rows = db.select("t", None).unwrap();
        let ids: Vec<i64> = rows.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let mut db = db_with_table();
        for n in 1..=3 {
            db.insert("t", &[Value::Integer(n), text("x")]).unwrap();
        }
        let cond = Condition::new("ID", Value::Integer(2));
        assert_eq!(db.delete("t", Some(&cond)).unwrap(), 1);
        let id = db.insert("t", &[Value::Integer(9), text("y")]).unwrap();
        assert_eq!(id, 4);
    }

    #[test]
    fn test_insert_column_count_mismatch_leaves_collection_unchanged() {
        let mut db = db_with_table();
        db.insert("t", &[Value::Integer(1), text("x")]).unwrap();
        let err = db.insert("t", &[Value::Integer(2)]).unwrap_err();
        assert!(matches!(
            err,
            KestrelError::Query(QueryError::ColumnCountMismatch { expected: 2, got: 1 })
        ));
        assert_eq!(db.select("t", None).unwrap().len(), 1);
    }

    #[test]
    fn test_insert_type_mismatch_is_atomic() {
        let mut db = db_with_table();
        let err = db.insert("t", &[text("abc"), text("x")]).unwrap_err();
        assert!(matches!(
            err,
            KestrelError::Query(QueryError::TypeMismatch { .. })
        ));
        assert!(db.select("t", None).unwrap().is_empty());
    }

    #[test]
    fn test_insert_coerces_string_values() {
        let mut db = db();
        db.create_table("flags", &["n:int", "on:bool"]).unwrap();
        db.insert("flags", &[text("7"), text("TRUE")]).unwrap();
        let rows = db.select("flags", None).unwrap();
        assert_eq!(rows[0].get("n"), Some(&Value::Integer(7)));
        assert_eq!(rows[0].get("on"), Some(&Value::Boolean(true)));
    }

    #[test]
    fn test_select_no_condition_insertion_order() {
        let mut db = db_with_table();
        db.insert("t", &[Value::Integer(2), text("b")]).unwrap();
        db.insert("t", &[Value::Integer(1), text("a")]).unwrap();
        let rows = db.select("t", None).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("b"), Some(&text("b")));
        assert_eq!(rows[1].get("b"), Some(&text("a")));
    }

    #[test]
    fn test_select_normalized_equality_matches_boolean_with_one() {
        let mut db = db();
        db.create_table("users", &["name:str", "active:bool"]).unwrap();
        db.insert("users", &[text("ada"), text("true")]).unwrap();
        db.insert("users", &[text("bob"), text("false")]).unwrap();
        let cond = Condition::new("active", text("1"));
        let rows = db.select("users", Some(&cond)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some(&text("ada")));
    }

    #[test]
    fn test_select_condition_on_unknown_column_matches_nothing() {
        let mut db = db_with_table();
        db.insert("t", &[Value::Integer(1), text("x")]).unwrap();
        let cond = Condition::new("missing", text("1"));
        assert!(db.select("t", Some(&cond)).unwrap().is_empty());
    }

    #[test]
    fn test_select_unknown_table() {
        let db = db();
        assert!(matches!(
            db.select("nope", None),
            Err(KestrelError::Schema(SchemaError::UnknownTable(_)))
        ));
    }

    #[test]
    fn test_update_requires_condition() {
        let mut db = db_with_table();
        let set = vec![("a".to_string(), Value::Integer(1))];
        let err = db.update("t", &set, None).unwrap_err();
        assert!(matches!(
            err,
            KestrelError::Query(QueryError::MissingCondition { operation: "update" })
        ));
    }

    #[test]
    fn test_update_zero_matches_leaves_collection_unchanged() {
        let mut db = db_with_table();
        db.insert("t", &[Value::Integer(1), text("x")]).unwrap();
        let before = db.select("t", None).unwrap();
        let set = vec![("a".to_string(), Value::Integer(9))];
        let cond = Condition::new("b", text("nope"));
        assert_eq!(db.update("t", &set, Some(&cond)).unwrap(), 0);
        assert_eq!(db.select("t", None).unwrap(), before);
    }

    #[test]
    fn test_update_applies_set_clause_with_normalization() {
        let mut db = db_with_table();
        db.insert("t", &[Value::Integer(1), text("x")]).unwrap();
        db.insert("t", &[Value::Integer(2), text("x")]).unwrap();
        let set = vec![("a".to_string(), text("9"))];
        let cond = Condition::new("b", text("x"));
        assert_eq!(db.update("t", &set, Some(&cond)).unwrap(), 2);
        for row in db.select("t", None).unwrap() {
            assert_eq!(row.get("a"), Some(&Value::Integer(9)));
        }
    }

    #[test]
    fn test_delete_requires_condition() {
        let mut db = db_with_table();
        assert!(matches!(
            db.delete("t", None),
            Err(KestrelError::Query(QueryError::MissingCondition {
                operation: "delete"
            }))
        ));
    }

    #[test]
    fn test_delete_removes_exactly_matching_rows() {
        let mut db = db_with_table();
        db.insert("t", &[Value::Integer(1), text("keep")]).unwrap();
        db.insert("t", &[Value::Integer(2), text("drop")]).unwrap();
        db.insert("t", &[Value::Integer(3), text("keep")]).unwrap();
        let cond = Condition::new("b", text("drop"));
        assert_eq!(db.delete("t", Some(&cond)).unwrap(), 1);
        let rows = db.select("t", None).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id(), 1);
        assert_eq!(rows[1].id(), 3);
    }

    #[test]
    fn test_delete_zero_matches_leaves_collection_identical() {
        let mut db = db_with_table();
        db.insert("t", &[Value::Integer(1), text("x")]).unwrap();
        let before = db.select("t", None).unwrap();
        let cond = Condition::new("b", text("nothing"));
        assert_eq!(db.delete("t", Some(&cond)).unwrap(), 0);
        assert_eq!(db.select("t", None).unwrap(), before);
    }

    #[test]
    fn test_drop_table_then_redefine_fresh() {
        let mut db = db_with_table();
        db.insert("t", &[Value::Integer(1), text("x")]).unwrap();
        db.drop_table("t").unwrap();
        assert!(db.list_tables().is_empty());
        db.create_table("t", &["c:bool"]).unwrap();
        assert!(db.select("t", None).unwrap().is_empty());
        // IDs restart for the fresh table.
        let id = db.insert("t", &[text("true")]).unwrap();
        assert_eq!(id, 1);
    }

    #[test]
    fn test_drop_unknown_table() {
        let mut db = db();
        assert!(matches!(
            db.drop_table("nope"),
            Err(KestrelError::Schema(SchemaError::UnknownTable(_)))
        ));
    }

    #[test]
    fn test_list_tables_insertion_order() {
        let mut db = db();
        db.create_table("zeta", &["a:int"]).unwrap();
        db.create_table("alpha", &["b:str"]).unwrap();
        assert_eq!(db.list_tables(), vec!["zeta", "alpha"]);
    }
}

#[cfg(test)]
mod cache_tests {
    use crate::engine::{Condition, Database};
    use crate::storage::MemoryStorage;
    use kestrel_common::datum::Value;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn seeded_db() -> Database<MemoryStorage> {
        let mut db = Database::open(MemoryStorage::new()).unwrap();
        db.create_table("t", &["a:int"]).unwrap();
        db.insert("t", &[Value::Integer(1)]).unwrap();
        db
    }

    #[test]
    fn test_repeated_select_hits_cache() {
        let db = seeded_db();
        db.select("t", None).unwrap();
        assert_eq!(db.cache().hits(), 0);
        db.select("t", None).unwrap();
        assert_eq!(db.cache().hits(), 1);
    }

    #[test]
    fn test_conditions_cache_separately() {
        let db = seeded_db();
        let one = Condition::new("a", text("1"));
        let two = Condition::new("a", text("2"));
        db.select("t", Some(&one)).unwrap();
        db.select("t", Some(&two)).unwrap();
        assert_eq!(db.cache().hits(), 0);
        db.select("t", Some(&one)).unwrap();
        assert_eq!(db.cache().hits(), 1);
    }

    #[test]
    fn test_insert_invalidates_cache() {
        let mut db = seeded_db();
        assert_eq!(db.select("t", None).unwrap().len(), 1);
        db.insert("t", &[Value::Integer(2)]).unwrap();
        assert_eq!(db.select("t", None).unwrap().len(), 2);
    }

    #[test]
    fn test_update_invalidates_cache() {
        let mut db = seeded_db();
        let cond = Condition::new("a", Value::Integer(1));
        assert_eq!(db.select("t", Some(&cond)).unwrap().len(), 1);
        let set = vec![("a".to_string(), Value::Integer(5))];
        db.update("t", &set, Some(&cond)).unwrap();
        assert!(db.select("t", Some(&cond)).unwrap().is_empty());
    }

    #[test]
    fn test_delete_invalidates_cache() {
        let mut db = seeded_db();
        assert_eq!(db.select("t", None).unwrap().len(), 1);
        let cond = Condition::new("a", Value::Integer(1));
        db.delete("t", Some(&cond)).unwrap();
        assert!(db.select("t", None).unwrap().is_empty());
    }

    #[test]
    fn test_invalidation_is_table_scoped() {
        let mut db = seeded_db();
        db.create_table("other", &["x:int"]).unwrap();
        db.select("t", None).unwrap();
        db.insert("other", &[Value::Integer(1)]).unwrap();
        // The mutation touched "other"; "t" stays memoized.
        db.select("t", None).unwrap();
        assert_eq!(db.cache().hits(), 1);
    }

    #[test]
    fn test_cache_object_invalidate_all() {
        let db = seeded_db();
        db.select("t", None).unwrap();
        db.cache().invalidate_all();
        db.select("t", None).unwrap();
        assert_eq!(db.cache().hits(), 0);
    }
}

#[cfg(test)]
mod storage_tests {
    use crate::record::Record;
    use crate::storage::{JsonStorage, Storage};
    use kestrel_common::datum::Value;
    use kestrel_common::schema::Catalog;

    #[test]
    fn test_missing_documents_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());
        assert!(storage.load_catalog().unwrap().is_empty());
        assert!(storage.load_table("nope").unwrap().is_empty());
    }

    #[test]
    fn test_catalog_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());
        let mut catalog = Catalog::new();
        catalog.create("users", &["name:str"]).unwrap();
        storage.save_catalog(&catalog).unwrap();
        assert_eq!(storage.load_catalog().unwrap(), catalog);
    }

    #[test]
    fn test_metadata_document_shape_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());
        let mut catalog = Catalog::new();
        catalog.create("users", &["name:str"]).unwrap();
        storage.save_catalog(&catalog).unwrap();
        let text = std::fs::read_to_string(dir.path().join("db_meta.json")).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            doc,
            serde_json::json!({"users": [["ID", "int"], ["name", "str"]]})
        );
    }

    #[test]
    fn test_table_document_round_trip_and_location() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());
        let mut records = crate::record::RecordCollection::new();
        let mut r = Record::new();
        r.set("ID", Value::Integer(1));
        r.set("name", Value::Text("x".into()));
        records.push(r);
        storage.save_table("users", &records).unwrap();
        assert!(dir.path().join("data").join("users.json").exists());
        assert_eq!(storage.load_table("users").unwrap(), records);
    }

    #[test]
    fn test_save_is_whole_file_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());
        let mut records = crate::record::RecordCollection::new();
        let mut r = Record::new();
        r.set("ID", Value::Integer(1));
        records.push(r);
        storage.save_table("t", &records).unwrap();
        storage.save_table("t", &crate::record::RecordCollection::new()).unwrap();
        assert!(storage.load_table("t").unwrap().is_empty());
    }

    #[test]
    fn test_remove_table_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());
        storage.save_table("t", &crate::record::RecordCollection::new()).unwrap();
        storage.remove_table("t").unwrap();
        assert!(!dir.path().join("data").join("t.json").exists());
        // Absent file is fine.
        storage.remove_table("t").unwrap();
    }

    #[test]
    fn test_corrupt_document_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());
        std::fs::write(dir.path().join("db_meta.json"), "not json").unwrap();
        assert!(storage.load_catalog().is_err());
    }
}
