use docstore::collection::{QueryOptions, DocumentId};
use docstore::common::{SortOrder, Value};
use docstore::doc;
use docstore::errors::ErrorKind;
use docstore_int_test::test_util::{cleanup, create_test_context, insert_planets, run_test};
use std::thread;
use std::time::Duration;

#[test]
fn test_inc_flexible_and_top_level() {
    run_test(
        create_test_context,
        |ctx| {
            let planets = insert_planets(&ctx)?;
            let updated = planets.update(&doc! { name: "Venus" }, &doc! { "$inc": { avg: 5, visits: 1 } })?;

            assert_eq!(updated.len(), 1);
            let venus = &updated[0];
            let temp = venus.get("temp").and_then(|v| v.as_document()).cloned().unwrap_or_default();
            assert_eq!(temp.get("avg"), Some(&Value::I64(480)));
            assert!(!venus.contains_key("avg"));
            assert_eq!(venus.get("visits"), Some(&Value::I64(1)));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_zero_inc_is_idempotent() {
    run_test(
        create_test_context,
        |ctx| {
            let planets = insert_planets(&ctx)?;
            let before = planets.find(&doc! {})?;
            thread::sleep(Duration::from_millis(5));

            planets.update(&doc! {}, &doc! { "$inc": { moons: 0 } })?;
            let after = planets.update(&doc! {}, &doc! { "$inc": { moons: 0 } })?;

            for (old, new) in before.iter().zip(after.iter()) {
                for (key, value) in old.iter() {
                    if key != "_updatedAt" {
                        assert_eq!(new.get(key), Some(value));
                    }
                }
                let old_stamp = old.get("_updatedAt").and_then(|v| v.as_i64()).unwrap_or(0);
                let new_stamp = new.get("_updatedAt").and_then(|v| v.as_i64()).unwrap_or(0);
                assert!(new_stamp > old_stamp);
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_merge_anchors_to_nested_query() {
    run_test(
        create_test_context,
        |ctx| {
            let planets = insert_planets(&ctx)?;
            let updated = planets.update(
                &doc! { temp: { avg: 475 } },
                &doc! { "$merge": { max: 490, min: 440 } },
            )?;

            let venus = &updated[0];
            assert!(!venus.contains_key("max"));
            let temp = venus.get("temp").and_then(|v| v.as_document()).cloned().unwrap_or_default();
            assert_eq!(temp, doc! { avg: 475, max: 490, min: 440 });

            let updated = planets.update(
                &doc! { name: "Earth" },
                &doc! { "$merge": [ { habitable: true }, { temp: { max: 57 } } ] },
            )?;
            let earth = &updated[0];
            assert_eq!(earth.get("habitable"), Some(&Value::Bool(true)));
            let temp = earth.get("temp").and_then(|v| v.as_document()).cloned().unwrap_or_default();
            assert_eq!(temp, doc! { avg: 15, max: 57 });
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_set_unset_push() {
    run_test(
        create_test_context,
        |ctx| {
            let planets = insert_planets(&ctx)?;
            let updated = planets.update(
                &doc! { name: "Earth" },
                &doc! {
                    "$set": { avg: 16, color: "blue" },
                    "$unset": { moons: "" },
                    "$push": { rings: "dust", tags: "home" },
                },
            )?;

            let earth = &updated[0];
            let temp = earth.get("temp").and_then(|v| v.as_document()).cloned().unwrap_or_default();
            assert_eq!(temp.get("avg"), Some(&Value::I64(16)));
            assert_eq!(earth.get("color"), Some(&Value::from("blue")));
            assert!(!earth.contains_key("moons"));
            assert_eq!(earth.get("rings"), Some(&Value::Array(vec![Value::from("dust")])));
            assert_eq!(earth.get("tags"), Some(&Value::Array(vec![Value::from("home")])));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_identity_cannot_be_modified() {
    run_test(
        create_test_context,
        |ctx| {
            let planets = insert_planets(&ctx)?;
            let original = planets.find_one(&doc! { name: "Mercury" })?.unwrap_or_default();
            let updated = planets.update(
                &doc! { name: "Mercury" },
                &doc! { "$set": { _id: 99, _createdAt: 0 } },
            )?;

            assert_eq!(updated[0].get("_id"), original.get("_id"));
            assert_eq!(updated[0].get("_createdAt"), original.get("_createdAt"));
            assert!(planets.get_by_id(&DocumentId::Int(99))?.is_none());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_failed_update_changes_nothing() {
    run_test(
        create_test_context,
        |ctx| {
            let planets = insert_planets(&ctx)?;
            planets.update(&doc! { name: "Earth" }, &doc! { "$set": { moons: "one" } })?;
            let before = planets.find(&doc! {})?;

            let err = planets
                .update(&doc! {}, &doc! { "$inc": { moons: 1 } })
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidDataType);
            assert_eq!(planets.find(&doc! {})?, before);

            let err = planets
                .update(&doc! {}, &doc! { "$rename": { moons: "satellites" } })
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::UnknownOperator);
            assert!(err.message().contains("$rename"));

            let err = planets
                .update(&doc! {}, &doc! { "$inc": { moons: "many" } })
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::MalformedModifier);
            assert_eq!(planets.find(&doc! {})?, before);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_with_take_changes_one() {
    run_test(
        create_test_context,
        |ctx| {
            let planets = insert_planets(&ctx)?;
            let options = QueryOptions::new()
                .sort_by("diameter", SortOrder::Ascending)
                .take(1);
            let updated = planets.update_with_options(
                &doc! { moons: 0 },
                &doc! { "$set": { smallest: true } },
                &options,
            )?;

            assert_eq!(updated.len(), 1);
            assert_eq!(updated[0].get("name"), Some(&Value::from("Mercury")));
            assert_eq!(planets.find(&doc! { smallest: true })?.len(), 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_matching_nothing_returns_empty() {
    run_test(
        create_test_context,
        |ctx| {
            let planets = insert_planets(&ctx)?;
            let updated = planets.update(&doc! { name: "Pluto" }, &doc! { "$set": { dwarf: true } })?;
            assert!(updated.is_empty());
            Ok(())
        },
        cleanup,
    )
}
