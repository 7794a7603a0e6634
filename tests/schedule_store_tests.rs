use cinema::CinemaError;
use cinema::config::DatabaseConfig;
use cinema::db::{self, Backend, Movie, Schedule};
use cinema::service::Catalog;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

async fn open_catalog(tag: &str) -> (Backend, Catalog, PathBuf) {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    let home = std::env::temp_dir().join(format!(
        "cinema-{tag}-{}-{}",
        std::process::id(),
        nanos
    ));

    let settings = DatabaseConfig {
        kind: "Embedded".to_string(),
        name: String::new(),
        home: home.display().to_string(),
        file: "schedules".to_string(),
        host: String::new(),
        port: 0,
        user: String::new(),
        pass: String::new(),
    };
    let mut backend = db::select(&settings).expect("select embedded backend");
    backend.connect().await.expect("connect embedded backend");
    let catalog = Catalog::new(backend.handle().expect("query handle"));
    catalog.install_schema().await.expect("install schema");
    (backend, catalog, home)
}

async fn close(mut backend: Backend, home: PathBuf) {
    backend.disconnect().await.expect("disconnect");
    let _ = std::fs::remove_dir_all(home);
}

async fn insert_movie(catalog: &Catalog, title: &str) -> i32 {
    catalog
        .create_movie(&Movie::new(title, 120, 2020))
        .await
        .expect("create movie");
    catalog
        .movies()
        .list((), 1, 100)
        .await
        .expect("list movies")
        .into_iter()
        .find(|m| m.title == title)
        .map(|m| m.id)
        .expect("movie just created")
}

#[tokio::test]
async fn schedule_for_missing_movie_is_refused_by_the_foreign_key() {
    let (backend, catalog, home) = open_catalog("schedule-fk").await;
    let movie_id = insert_movie(&catalog, "Dune").await;
    let schedules = catalog.schedules();

    schedules
        .save(&Schedule::new(movie_id, "2024-05-01T20:00", 3))
        .await
        .expect("valid schedule");

    let err = schedules
        .save(&Schedule::new(movie_id + 100, "2024-05-02T20:00", 1))
        .await
        .expect_err("foreign key violation");
    assert!(matches!(err, CinemaError::Storage(_)));
    assert_eq!(schedules.count(movie_id).await.expect("count"), 1);
    assert_eq!(schedules.count(movie_id + 100).await.expect("count"), 0);

    close(backend, home).await;
}

#[tokio::test]
async fn deleting_a_movie_cascades_to_its_schedules() {
    let (backend, catalog, home) = open_catalog("schedule-cascade").await;
    let doomed = insert_movie(&catalog, "Doomed").await;
    let kept = insert_movie(&catalog, "Kept").await;
    let schedules = catalog.schedules();

    for slot in ["2024-05-01T18:00", "2024-05-01T21:00"] {
        schedules
            .save(&Schedule::new(doomed, slot, 2))
            .await
            .expect("insert");
    }
    schedules
        .save(&Schedule::new(kept, "2024-05-03T19:00", 4))
        .await
        .expect("insert");
    let doomed_ids: Vec<i32> = schedules
        .list(doomed, 1, 10)
        .await
        .expect("list")
        .iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(doomed_ids.len(), 2);

    catalog.delete_movie(doomed).await.expect("delete movie");

    assert_eq!(schedules.count(doomed).await.expect("count"), 0);
    for id in doomed_ids {
        assert!(matches!(
            catalog.find_schedule(id).await,
            Err(CinemaError::NotFound {
                entity: "schedule",
                ..
            })
        ));
    }
    assert_eq!(schedules.count(kept).await.expect("count"), 1);

    close(backend, home).await;
}

#[tokio::test]
async fn listing_is_scoped_to_one_movie_and_newest_first() {
    let (backend, catalog, home) = open_catalog("schedule-list").await;
    let first = insert_movie(&catalog, "First").await;
    let second = insert_movie(&catalog, "Second").await;

    for slot in ["2024-05-01T18:00", "2024-05-03T18:00", "2024-05-02T18:00"] {
        catalog
            .create_schedule(&Schedule::new(first, slot, 1))
            .await
            .expect("create");
    }
    catalog
        .create_schedule(&Schedule::new(second, "2024-06-01T18:00", 1))
        .await
        .expect("create");

    let page = catalog.list_schedules(first, 1).await.expect("list");
    let slots: Vec<&str> = page
        .items
        .iter()
        .map(|s| s.date_and_time.as_str())
        .collect();
    assert_eq!(
        slots,
        vec!["2024-05-03T18:00", "2024-05-02T18:00", "2024-05-01T18:00"]
    );
    assert!(page.items.iter().all(|s| s.movie_id == first));
    assert_eq!(page.total, 3);
    assert_eq!(page.page_count, 0);

    close(backend, home).await;
}

#[tokio::test]
async fn catalog_checks_the_movie_before_writing_schedules() {
    let (backend, catalog, home) = open_catalog("schedule-validation").await;
    let movie_id = insert_movie(&catalog, "Solaris").await;

    assert!(matches!(
        catalog
            .create_schedule(&Schedule::new(movie_id + 1, "2024-05-01T20:00", 1))
            .await,
        Err(CinemaError::Validation(_))
    ));

    catalog
        .create_schedule(&Schedule::new(movie_id, "2024-05-01T20:00", 1))
        .await
        .expect("create");
    let mut stored = catalog
        .list_schedules(movie_id, 1)
        .await
        .expect("list")
        .items
        .remove(0);
    assert_eq!(stored.auditorium, 1);

    stored.auditorium = 5;
    catalog.modify_schedule(&stored).await.expect("modify");
    assert_eq!(
        catalog.find_schedule(stored.id).await.expect("find").auditorium,
        5
    );

    let mut moved = stored.clone();
    moved.movie_id = movie_id + 7;
    assert!(matches!(
        catalog.modify_schedule(&moved).await,
        Err(CinemaError::Validation(_))
    ));

    let mut unsaved = stored.clone();
    unsaved.id = 0;
    assert!(matches!(
        catalog.modify_schedule(&unsaved).await,
        Err(CinemaError::Validation(_))
    ));
    assert!(matches!(
        catalog.create_schedule(&stored).await,
        Err(CinemaError::Validation(_))
    ));
    assert!(matches!(
        catalog.delete_schedule(stored.id + 1).await,
        Err(CinemaError::Validation(_))
    ));

    catalog
        .delete_schedule(stored.id)
        .await
        .expect("delete schedule");
    assert_eq!(catalog.schedules().count(movie_id).await.expect("count"), 0);

    close(backend, home).await;
}
