use docstore::collection::{JoinSpec, QueryOptions};
use docstore::common::{SortOrder, Value};
use docstore::doc;
use docstore::Document;
use docstore_int_test::test_util::{cleanup, create_test_context, run_test, TestContext};
use docstore::errors::{DocStoreResult, ErrorKind};

fn seed(ctx: &TestContext) -> DocStoreResult<()> {
    let tickets = ctx.db().collection("tickets")?;
    tickets.insert_many(vec![
        doc! { event: "opera", seat: "A1", venue: 10 },
        doc! { event: "ballet", seat: "B4", venue: 11 },
        doc! { event: "circus", seat: "C9", venue: 10 },
    ])?;

    let venues = ctx.db().collection("venues")?;
    venues.insert_many(vec![
        doc! { code: 10, city: "Vienna" },
        doc! { code: 11, city: "Paris" },
    ])?;

    let users = ctx.db().collection("users")?;
    users.insert_many(vec![
        doc! { name: "ann", purchased: [1, 2] },
        doc! { name: "bob", purchased: 3 },
        doc! { name: "cy", purchased: [] },
        doc! { name: "dee" },
    ])?;
    Ok(())
}

fn joined(document: &Document, name: &str) -> Vec<Document> {
    document
        .get(name)
        .and_then(|v| v.as_array())
        .map(|items| items.iter().filter_map(|i| i.as_document().cloned()).collect())
        .unwrap_or_default()
}

fn tickets_join() -> JoinSpec {
    JoinSpec::new("tickets", "purchased", "_id", "tickets")
}

#[test]
fn test_join_attaches_matching_documents() {
    run_test(
        create_test_context,
        |ctx| {
            seed(&ctx)?;
            let users = ctx.db().collection("users")?;
            let options = QueryOptions::new().join(tickets_join());
            let found = users.find_with_options(&doc! {}, &options)?;

            let ann = joined(&found[0], "tickets");
            assert_eq!(ann.len(), 2);
            assert_eq!(ann[0].get("seat"), Some(&Value::from("A1")));
            assert_eq!(ann[1].get("seat"), Some(&Value::from("B4")));

            let bob = joined(&found[1], "tickets");
            assert_eq!(bob.len(), 1);
            assert_eq!(bob[0].get("event"), Some(&Value::from("circus")));

            assert_eq!(found[2].get("tickets"), Some(&Value::Array(vec![])));
            assert_eq!(found[3].get("tickets"), Some(&Value::Array(vec![])));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_nested_join_with_options() {
    run_test(
        create_test_context,
        |ctx| {
            seed(&ctx)?;
            let users = ctx.db().collection("users")?;
            let venue_join = JoinSpec::new("venues", "venue", "code", "venue")
                .with_options(QueryOptions::new().include("city").exclude("_id"));
            let ticket_options = QueryOptions::new()
                .join(venue_join)
                .sort_by("seat", SortOrder::Descending)
                .include("seat")
                .include("venue")
                .exclude("_id");
            let options = QueryOptions::new()
                .join(tickets_join().with_options(ticket_options))
                .include("name")
                .include("tickets");

            let found = users.find_with_options(&doc! { name: "ann" }, &options)?;
            assert_eq!(found.len(), 1);
            let expected = doc! {
                _id: 1,
                name: "ann",
                tickets: [
                    { seat: "B4", venue: [ { city: "Paris" } ] },
                    { seat: "A1", venue: [ { city: "Vienna" } ] },
                ],
            };
            assert_eq!(found[0], expected);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_join_unknown_collection_is_empty() {
    run_test(
        create_test_context,
        |ctx| {
            seed(&ctx)?;
            let users = ctx.db().collection("users")?;
            let options = QueryOptions::new().join(JoinSpec::new("comets", "purchased", "_id", "comets"));
            let found = users.find_with_options(&doc! { name: "ann" }, &options)?;
            assert_eq!(found[0].get("comets"), Some(&Value::Array(vec![])));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_self_join() {
    run_test(
        create_test_context,
        |ctx| {
            let staff = ctx.db().collection("staff")?;
            staff.insert(doc! { name: "boss" })?;
            staff.insert(doc! { name: "worker", manager: 1 })?;

            let options = QueryOptions::new().join(JoinSpec::new("staff", "manager", "_id", "managers"));
            let found = staff.find_with_options(&doc! { name: "worker" }, &options)?;
            let managers = joined(&found[0], "managers");
            assert_eq!(managers.len(), 1);
            assert_eq!(managers[0].get("name"), Some(&Value::from("boss")));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_join_from_options_document() {
    run_test(
        create_test_context,
        |ctx| {
            seed(&ctx)?;
            let users = ctx.db().collection("users")?;
            let options = QueryOptions::from_document(&doc! {
                join: [ {
                    collection: "tickets",
                    from: "purchased",
                    to: "_id",
                    "as": "tickets",
                    options: { project: { event: 1, "_id": 0 } },
                } ],
                project: { purchased: 0, _createdAt: 0, _updatedAt: 0 },
            })?;
            let found = users.find_with_options(&doc! { name: "bob" }, &options)?;
            assert_eq!(found[0], doc! { _id: 2, name: "bob", tickets: [ { event: "circus" } ] });
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_returns_joined_documents() {
    run_test(
        create_test_context,
        |ctx| {
            seed(&ctx)?;
            let users = ctx.db().collection("users")?;
            let options = QueryOptions::new().join(tickets_join()).include("tickets");
            let updated = users.update_with_options(
                &doc! { name: "bob" },
                &doc! { "$set": { vip: true } },
                &options,
            )?;
            assert_eq!(joined(&updated[0], "tickets").len(), 1);
            let stored = users.find_one(&doc! { name: "bob" })?.unwrap_or_default();
            assert!(!stored.contains_key("tickets"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_invalid_join_aborts_write() {
    run_test(
        create_test_context,
        |ctx| {
            let planets = ctx.db().collection("planets")?;
            planets.insert(doc! { name: "Earth", moons: 1 })?;

            let options = QueryOptions::new().join(JoinSpec::new("planets", "name", "name", ""));
            let err = planets
                .update_with_options(&doc! {}, &doc! { "$inc": { moons: 1 } }, &options)
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::MalformedQuery);
            let err = planets.remove_with_options(&doc! {}, &options).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::MalformedQuery);

            let earth = planets.find_one(&doc! { name: "Earth" })?.unwrap_or_default();
            assert_eq!(earth.get("moons"), Some(&Value::I64(1)));
            assert_eq!(planets.size()?, 1);
            Ok(())
        },
        cleanup,
    )
}
