use docstore::collection::DocumentId;
use docstore::common::Value;
use docstore::doc;
use docstore::errors::ErrorKind;
use docstore_int_test::test_util::{cleanup, create_test_context, keys_of, run_test};

#[test]
fn test_insert_assigns_sequential_ids() {
    run_test(
        create_test_context,
        |ctx| {
            let planets = ctx.db().collection("planets")?;
            let first = planets.insert(doc! { name: "Mercury" })?;
            let rest = planets.insert_many(vec![doc! { name: "Venus" }, doc! { name: "Earth" }])?;

            assert_eq!(first.get("_id"), Some(&Value::I64(1)));
            assert_eq!(rest[0].get("_id"), Some(&Value::I64(2)));
            assert_eq!(rest[1].get("_id"), Some(&Value::I64(3)));
            assert_eq!(keys_of(&first), vec!["_id", "name", "_createdAt", "_updatedAt"]);

            let earth = planets.get_by_id(&DocumentId::Int(3))?;
            assert_eq!(earth.and_then(|d| d.get("name").cloned()), Some(Value::from("Earth")));
            assert_eq!(planets.size()?, 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_insert_rejects_document_with_id() {
    run_test(
        create_test_context,
        |ctx| {
            let planets = ctx.db().collection("planets")?;
            let err = planets.insert(doc! { _id: 5, name: "Mars" }).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidId);
            assert_eq!(planets.size()?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_timestamps_are_set_on_insert() {
    run_test(
        create_test_context,
        |ctx| {
            let planets = ctx.db().collection("planets")?;
            let mars = planets.insert(doc! { name: "Mars", _updatedAt: 1 })?;
            let created = mars.get("_createdAt").and_then(|v| v.as_i64());
            assert!(created.unwrap_or(0) > 1_600_000_000_000);
            assert_eq!(mars.get("_updatedAt"), mars.get("_createdAt"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_opaque_ids() {
    run_test(
        || {
            let path = docstore_int_test::test_util::random_path();
            let db = docstore::Database::builder()
                .id_strategy(docstore::collection::IdStrategy::Opaque)
                .open_or_create()?;
            Ok(docstore_int_test::test_util::TestContext::new(path, db))
        },
        |ctx| {
            let planets = ctx.db().collection("planets")?;
            let mars = planets.insert(doc! { name: "Mars" })?;
            let id = mars.get("_id").and_then(|v| v.as_string()).cloned().unwrap_or_default();
            assert_eq!(id.len(), 32);

            let found = planets.get_by_id(&DocumentId::from(id.as_str()))?;
            assert!(found.is_some());
            Ok(())
        },
        cleanup,
    )
}
