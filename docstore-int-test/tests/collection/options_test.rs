use docstore::collection::{QueryOptions, order_by, skip_by};
use docstore::common::{SortOrder, Value};
use docstore::doc;
use docstore::errors::ErrorKind;
use docstore_int_test::test_util::{
    cleanup, create_test_context, crew_documents, insert_planets, keys_of, run_test,
};

#[test]
fn test_sort_with_tie_break() {
    run_test(
        create_test_context,
        |ctx| {
            let crew = ctx.db().collection("crew")?;
            crew.insert_many(crew_documents())?;

            let options = QueryOptions::new()
                .sort_by("age", SortOrder::Ascending)
                .sort_by("name", SortOrder::Descending);
            let found = crew.find_with_options(&doc! {}, &options)?;
            let names: Vec<_> = found.iter().filter_map(|d| d.get("name").cloned()).collect();
            assert_eq!(
                names,
                vec![
                    Value::from("Zorf"),
                    Value::from("Xorf"),
                    Value::from("Worf"),
                    Value::from("Picard")
                ]
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_sort_options_from_document() {
    run_test(
        create_test_context,
        |ctx| {
            let crew = ctx.db().collection("crew")?;
            crew.insert_many(crew_documents())?;

            let options = QueryOptions::from_document(&doc! {
                sort: { age: 1, name: (-1) },
                skip: 1,
                take: 2,
            })?;
            let found = crew.find_with_options(&doc! {}, &options)?;
            let names: Vec<_> = found.iter().filter_map(|d| d.get("name").cloned()).collect();
            assert_eq!(names, vec![Value::from("Xorf"), Value::from("Worf")]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_missing_sort_key_sorts_last() {
    run_test(
        create_test_context,
        |ctx| {
            let crew = ctx.db().collection("crew")?;
            crew.insert_many(crew_documents())?;
            crew.insert(doc! { name: "Data" })?;

            for order in [SortOrder::Ascending, SortOrder::Descending] {
                let found = crew.find_with_options(&doc! {}, &order_by("age", order))?;
                assert_eq!(found[4].get("name"), Some(&Value::from("Data")));
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_skip_take() {
    run_test(
        create_test_context,
        |ctx| {
            let planets = insert_planets(&ctx)?;
            let options = QueryOptions::new().skip(1).take(1);
            let found = planets.find_with_options(&doc! {}, &options)?;
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].get("name"), Some(&Value::from("Venus")));

            assert!(planets.find_with_options(&doc! {}, &skip_by(10))?.is_empty());
            assert!(planets
                .find_with_options(&doc! {}, &QueryOptions::new().take(0))?
                .is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_projection_modes() {
    run_test(
        create_test_context,
        |ctx| {
            let letters = ctx.db().collection("letters")?;
            letters.insert(doc! { a: 1, b: 2, c: 3 })?;

            let found = letters.find_with_options(&doc! {}, &QueryOptions::new().include("b"))?;
            assert_eq!(keys_of(&found[0]), vec!["_id", "b"]);

            let found = letters.find_with_options(&doc! {}, &QueryOptions::new().exclude("b"))?;
            assert_eq!(
                keys_of(&found[0]),
                vec!["_id", "a", "c", "_createdAt", "_updatedAt"]
            );

            let mixed = QueryOptions::new().include("b").exclude("c");
            let found = letters.find_with_options(&doc! {}, &mixed)?;
            assert_eq!(
                keys_of(&found[0]),
                vec!["_id", "a", "b", "_createdAt", "_updatedAt"]
            );

            let no_id = QueryOptions::new().include("b").exclude("_id");
            let found = letters.find_with_options(&doc! {}, &no_id)?;
            assert_eq!(found[0], doc! { b: 2 });
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_sort_by_projected_out_property() {
    run_test(
        create_test_context,
        |ctx| {
            let planets = insert_planets(&ctx)?;
            let options = QueryOptions::new()
                .sort_by("diameter", SortOrder::Descending)
                .include("name")
                .exclude("_id");
            let found = planets.find_with_options(&doc! {}, &options)?;
            assert_eq!(
                found,
                vec![doc! { name: "Earth" }, doc! { name: "Venus" }, doc! { name: "Mercury" }]
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_malformed_options() {
    let err = QueryOptions::from_document(&doc! { limit: 1 }).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::MalformedQuery);
}
