use docstore::collection::QueryOptions;
use docstore::common::{SortOrder, Value};
use docstore::doc;
use docstore_int_test::test_util::{cleanup, create_test_context, insert_planets, run_test};

#[test]
fn test_remove_returns_removed_documents() {
    run_test(
        create_test_context,
        |ctx| {
            let planets = insert_planets(&ctx)?;
            let removed = planets.remove(&doc! { moons: 0 })?;

            assert_eq!(removed.len(), 2);
            assert_eq!(removed[0].get("name"), Some(&Value::from("Mercury")));
            assert_eq!(planets.size()?, 1);
            assert!(planets.find(&doc! { moons: 0 })?.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_remove_matching_nothing() {
    run_test(
        create_test_context,
        |ctx| {
            let planets = insert_planets(&ctx)?;
            assert!(planets.remove(&doc! { name: "Pluto" })?.is_empty());
            assert_eq!(planets.size()?, 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_remove_with_window_and_projection() {
    run_test(
        create_test_context,
        |ctx| {
            let planets = insert_planets(&ctx)?;
            let options = QueryOptions::new()
                .sort_by("diameter", SortOrder::Descending)
                .take(1)
                .include("name")
                .exclude("_id");
            let removed = planets.remove_with_options(&doc! {}, &options)?;

            assert_eq!(removed, vec![doc! { name: "Earth" }]);
            assert_eq!(planets.size()?, 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_remove_all_then_insert_keeps_ids_unique() {
    run_test(
        create_test_context,
        |ctx| {
            let planets = insert_planets(&ctx)?;
            planets.remove(&doc! {})?;
            let mars = planets.insert(doc! { name: "Mars" })?;
            assert_eq!(mars.get("_id"), Some(&Value::I64(4)));
            Ok(())
        },
        cleanup,
    )
}
