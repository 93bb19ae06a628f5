use docstore::collection::{Collection, Document};
use docstore::database::Database;
use docstore::doc;
use docstore::errors::DocStoreResult;
use std::backtrace::Backtrace;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::time::Instant;
use std::{env, fs};

/// Runs `test` between `before` and `after`, always running `after` once a
/// context exists, and panics with the first failure.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> DocStoreResult<()>,
    B: Fn() -> DocStoreResult<TestContext>,
    A: Fn(TestContext) -> DocStoreResult<()>,
{
    let start_time = Instant::now();
    let ctx = match before() {
        Ok(ctx) => ctx,
        Err(e) => panic!("Before run failed: {:?}", e),
    };

    let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
        let backtrace = Backtrace::capture();
        test(ctx.clone()).map_err(|e| (format!("Test failed: {:?}", e), backtrace.to_string()))
    }));
    let after_result = after(ctx);

    match result {
        Ok(Ok(())) => {}
        Ok(Err((e, bt))) => {
            eprintln!("\n==================== TEST FAILED ====================");
            eprintln!("Failed after {:?}", start_time.elapsed());
            if !bt.is_empty() && !bt.contains("disabled") {
                eprintln!("\nBacktrace:\n{}", bt);
            }
            eprintln!("=====================================================\n");
            panic!("{}", e);
        }
        Err(panic_err) => std::panic::resume_unwind(panic_err),
    }

    if let Err(e) = after_result {
        panic!("After run failed: {:?}", e);
    }
}

#[derive(Clone)]
pub struct TestContext {
    path: PathBuf,
    db: Database,
}

impl TestContext {
    pub fn new(path: PathBuf, db: Database) -> Self {
        Self { path, db }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn db(&self) -> Database {
        self.db.clone()
    }
}

pub fn random_path() -> PathBuf {
    let id = uuid::Uuid::new_v4();
    env::temp_dir().join(format!("docstore-{}", id))
}

#[cfg(not(feature = "memory"))]
pub fn create_test_context() -> DocStoreResult<TestContext> {
    let path = random_path();
    let db = Database::builder().directory(&path).open_or_create()?;
    Ok(TestContext::new(path, db))
}

#[cfg(feature = "memory")]
pub fn create_test_context() -> DocStoreResult<TestContext> {
    let path = random_path();
    let db = Database::builder().open_or_create()?;
    Ok(TestContext::new(path, db))
}

/// A context whose collections persist only on commit.
pub fn create_manual_sync_context() -> DocStoreResult<TestContext> {
    let path = random_path();
    let db = Database::builder()
        .directory(&path)
        .autosync(false)
        .open_or_create()?;
    Ok(TestContext::new(path, db))
}

pub fn cleanup(ctx: TestContext) -> DocStoreResult<()> {
    if !ctx.db().is_closed() {
        if let Err(e) = ctx.db().close() {
            eprintln!("Warning: Failed to close database: {:?}", e);
        }
    }

    match fs::remove_dir_all(ctx.path()) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => {
            eprintln!(
                "Warning: Failed to remove test directory {}: {:?}",
                ctx.path().display(),
                e
            );
            Ok(())
        }
    }
}

pub fn planet_documents() -> Vec<Document> {
    vec![
        doc! { name: "Mercury", diameter: 4880, temp: { avg: 167 }, moons: 0 },
        doc! { name: "Venus", diameter: 12104, temp: { avg: 475 }, moons: 0 },
        doc! { name: "Earth", diameter: 12742, temp: { avg: 15 }, moons: 1,
               rings: [] },
    ]
}

pub fn crew_documents() -> Vec<Document> {
    vec![
        doc! { age: 24, name: "Worf" },
        doc! { age: 59, name: "Picard" },
        doc! { age: 24, name: "Xorf" },
        doc! { age: 24, name: "Zorf" },
    ]
}

pub fn insert_planets(ctx: &TestContext) -> DocStoreResult<Collection> {
    let planets = ctx.db().collection("planets")?;
    planets.insert_many(planet_documents())?;
    Ok(planets)
}

/// Property names of a document, in order.
pub fn keys_of(document: &Document) -> Vec<String> {
    document.keys().cloned().collect()
}
