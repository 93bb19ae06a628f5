use docstore::common::Value;
use docstore::doc;
use docstore::errors::ErrorKind;
use docstore_int_test::test_util::{cleanup, create_test_context, insert_planets, run_test};

fn names(documents: &[docstore::Document]) -> Vec<Value> {
    documents
        .iter()
        .filter_map(|d| d.get("name").cloned())
        .collect()
}

#[test]
fn test_empty_query_matches_everything() {
    run_test(
        create_test_context,
        |ctx| {
            let planets = insert_planets(&ctx)?;
            assert_eq!(planets.find(&doc! {})?.len(), 3);
            assert_eq!(planets.find(&doc! { "$and": [] })?.len(), 3);
            assert!(planets.find(&doc! { "$or": [] })?.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_flexible_lookup() {
    run_test(
        create_test_context,
        |ctx| {
            let planets = insert_planets(&ctx)?;
            let flat = planets.find(&doc! { avg: 475 })?;
            let nested = planets.find(&doc! { temp: { avg: 475 } })?;
            assert_eq!(flat.len(), 1);
            assert_eq!(flat, nested);
            assert_eq!(names(&flat), vec![Value::from("Venus")]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_comparison_ignores_insertion_order() {
    run_test(
        create_test_context,
        |ctx| {
            let planets = ctx.db().collection("planets")?;
            let mut documents = docstore_int_test::test_util::planet_documents();
            documents.reverse();
            planets.insert_many(documents)?;

            let found = planets.find(&doc! { diameter: { "$gt": 12000 } })?;
            let mut found = names(&found);
            found.sort();
            assert_eq!(found, vec![Value::from("Earth"), Value::from("Venus")]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_operators() {
    run_test(
        create_test_context,
        |ctx| {
            let planets = insert_planets(&ctx)?;

            let found = planets.find(&doc! { diameter: { "$gte": 4880, "$lt": 12742 } })?;
            assert_eq!(names(&found), vec![Value::from("Mercury"), Value::from("Venus")]);

            let found = planets.find(&doc! { name: { "$in": ["Earth", "Pluto"] } })?;
            assert_eq!(names(&found), vec![Value::from("Earth")]);

            let found = planets.find(&doc! { name: { "$nin": ["Earth", "Venus"] } })?;
            assert_eq!(names(&found), vec![Value::from("Mercury")]);

            let found = planets.find(&doc! { name: { "$regex": "^(Ve|Ea)" } })?;
            assert_eq!(found.len(), 2);

            let found = planets.find(&doc! { moons: { "$ne": 0 } })?;
            assert_eq!(names(&found), vec![Value::from("Earth")]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_type_mismatch_is_no_match() {
    run_test(
        create_test_context,
        |ctx| {
            let planets = insert_planets(&ctx)?;
            assert!(planets.find(&doc! { name: { "$gt": 3 } })?.is_empty());
            assert!(planets.find(&doc! { diameter: { "$lt": "big" } })?.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_logical_combinators() {
    run_test(
        create_test_context,
        |ctx| {
            let planets = insert_planets(&ctx)?;
            let found = planets.find(&doc! {
                "$or": [ { name: "Mercury" }, { avg: { "$gt": 400 } } ]
            })?;
            assert_eq!(names(&found), vec![Value::from("Mercury"), Value::from("Venus")]);

            let found = planets.find(&doc! {
                "$and": [ { moons: 0 }, { diameter: { "$gt": 10000 } } ]
            })?;
            assert_eq!(names(&found), vec![Value::from("Venus")]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_missing_property_never_matches() {
    run_test(
        create_test_context,
        |ctx| {
            let planets = insert_planets(&ctx)?;
            assert!(planets.find(&doc! { color: "red" })?.is_empty());
            assert!(planets.find(&doc! { color: { "$ne": "red" } })?.is_empty());
            assert!(planets.find_one(&doc! { color: "red" })?.is_none());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_unknown_operator_is_reported() {
    run_test(
        create_test_context,
        |ctx| {
            let planets = insert_planets(&ctx)?;
            let err = planets.find(&doc! { diameter: { "$between": [1, 2] } }).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::UnknownOperator);
            assert!(err.message().contains("$between"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_results_are_copies() {
    run_test(
        create_test_context,
        |ctx| {
            let planets = insert_planets(&ctx)?;
            let mut found = planets.find(&doc! { name: "Venus" })?;
            found[0].put("name", "Lucifer")?;
            assert_eq!(planets.find(&doc! { name: "Venus" })?.len(), 1);
            Ok(())
        },
        cleanup,
    )
}
