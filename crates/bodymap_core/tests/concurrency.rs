use bodymap_core::db::open_db;
use bodymap_core::{
    ErrorKind, MapLifecycleService, QueryService, ScoringService, SqliteStores, UserId, UserLocks,
};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Barrier};
use std::thread;

fn user(name: &str) -> UserId {
    UserId::parse(name).unwrap()
}

fn current_map_count(path: &Path, owner: &str) -> i64 {
    let conn = Connection::open(path).unwrap();
    conn.query_row(
        "SELECT COUNT(*) FROM body_maps WHERE owner = ?1 AND status = 'current';",
        [owner],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn concurrent_generate_for_one_user_yields_single_current_map() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bodymap.db");
    drop(open_db(&path).unwrap());

    let locks = Arc::new(UserLocks::new());
    let barrier = Arc::new(Barrier::new(8));
    let handles = (0..8)
        .map(|_| {
            let path = path.clone();
            let locks = Arc::clone(&locks);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let conn = open_db(&path).unwrap();
                let lifecycle =
                    MapLifecycleService::new(SqliteStores::try_new(&conn).unwrap(), locks);
                barrier.wait();
                lifecycle.generate_map(&user("u1")).map_err(|err| err.kind())
            })
        })
        .collect::<Vec<_>>();

    let results = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect::<Vec<_>>();

    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|result| result.as_ref().err())
        .all(|kind| *kind == ErrorKind::Conflict));
    assert_eq!(current_map_count(&path, "u1"), 1);
}

#[test]
fn concurrent_region_adds_for_different_users_all_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bodymap.db");
    drop(open_db(&path).unwrap());

    let locks = Arc::new(UserLocks::new());
    let handles = (0..4)
        .map(|index| {
            let path = path.clone();
            let locks = Arc::clone(&locks);
            thread::spawn(move || {
                let owner = user(&format!("user-{index}"));
                let conn = open_db(&path).unwrap();
                let lifecycle = MapLifecycleService::new(
                    SqliteStores::try_new(&conn).unwrap(),
                    Arc::clone(&locks),
                );
                let scoring = ScoringService::new(SqliteStores::try_new(&conn).unwrap(), locks);

                let map_id = lifecycle.generate_map(&owner).unwrap();
                for region in 0..10 {
                    let region_id = scoring
                        .add_region(&owner, map_id, &format!("region-{region}"))
                        .unwrap();
                    scoring
                        .score_region(&owner, region_id, (region % 10) + 1)
                        .unwrap();
                }
                owner
            })
        })
        .collect::<Vec<_>>();

    let owners = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect::<Vec<_>>();

    let conn = open_db(&path).unwrap();
    let query = QueryService::new(SqliteStores::try_new(&conn).unwrap());
    for owner in owners {
        let current = query.get_current_map(&owner).unwrap().unwrap();
        assert_eq!(current.regions.len(), 10);
        assert_eq!(current.scored_count(), 10);
        assert!(current
            .regions
            .iter()
            .all(|region| region.map_id == current.map.id));
    }
}

#[test]
fn readers_see_either_before_or_after_clear() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bodymap.db");
    let locks = Arc::new(UserLocks::new());

    let setup_conn = open_db(&path).unwrap();
    let lifecycle = MapLifecycleService::new(
        SqliteStores::try_new(&setup_conn).unwrap(),
        Arc::clone(&locks),
    );
    let scoring = ScoringService::new(
        SqliteStores::try_new(&setup_conn).unwrap(),
        Arc::clone(&locks),
    );
    let owner = user("u1");
    let map_id = lifecycle.generate_map(&owner).unwrap();
    for region in 0..20 {
        scoring
            .add_region(&owner, map_id, &format!("region-{region}"))
            .unwrap();
    }

    let reader = {
        let path = path.clone();
        let owner = owner.clone();
        thread::spawn(move || {
            let conn = open_db(&path).unwrap();
            let query = QueryService::new(SqliteStores::try_new(&conn).unwrap());
            (0..50)
                .map(|_| {
                    query
                        .get_current_map(&owner)
                        .unwrap()
                        .map_or(0, |current| current.regions.len())
                })
                .collect::<Vec<_>>()
        })
    };

    lifecycle.clear_map(&owner).unwrap();

    let observed = reader.join().unwrap();
    assert!(observed.iter().all(|count| *count == 20 || *count == 0));
}
