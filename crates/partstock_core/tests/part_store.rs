use partstock_core::db::open_db_in_memory;
use partstock_core::{Part, PartRepository, RepoError, SqlitePartRepository};
use std::collections::HashSet;

#[test]
fn insert_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePartRepository::new(&conn);

    repo.insert_part("bolt", 10).unwrap();

    assert_eq!(repo.get_quantity("bolt").unwrap(), Some(10));
    assert_eq!(repo.get_quantity("nut").unwrap(), None);
}

#[test]
fn insert_existing_name_is_duplicate_key_and_keeps_quantity() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePartRepository::new(&conn);

    repo.insert_part("bolt", 10).unwrap();
    let err = repo.insert_part("bolt", 99).unwrap_err();

    assert!(matches!(err, RepoError::DuplicateKey(name) if name == "bolt"));
    assert_eq!(repo.get_quantity("bolt").unwrap(), Some(10));
}

#[test]
fn update_missing_part_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePartRepository::new(&conn);

    let err = repo.update_quantity("ghost", 1).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(name) if name == "ghost"));
}

#[test]
fn remove_is_safe_when_row_is_absent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePartRepository::new(&conn);

    repo.insert_part("bolt", 1).unwrap();
    assert!(repo.remove_part("bolt").unwrap());
    assert!(!repo.remove_part("bolt").unwrap());
    assert_eq!(repo.get_quantity("bolt").unwrap(), None);
}

#[test]
fn list_below_is_strictly_less_than_threshold() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePartRepository::new(&conn);
    repo.insert_part("bolt", 4).unwrap();
    repo.insert_part("nut", 5).unwrap();
    repo.insert_part("washer", 0).unwrap();

    let names: HashSet<String> = repo
        .list_below(5)
        .unwrap()
        .into_iter()
        .map(|part| part.name)
        .collect();

    assert_eq!(
        names,
        HashSet::from(["bolt".to_string(), "washer".to_string()])
    );
}

#[test]
fn search_is_case_insensitive_substring_match() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePartRepository::new(&conn);
    repo.insert_part("Hex Bolt", 2).unwrap();
    repo.insert_part("carriage bolt", 3).unwrap();
    repo.insert_part("nut", 4).unwrap();

    let hits = repo.search_parts("BOLT").unwrap();
    let names: HashSet<&str> = hits.iter().map(|part| part.name.as_str()).collect();

    assert_eq!(names, HashSet::from(["Hex Bolt", "carriage bolt"]));
}

#[test]
fn search_treats_like_wildcards_literally() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePartRepository::new(&conn);
    repo.insert_part("50% washer", 1).unwrap();
    repo.insert_part("500 washer", 1).unwrap();
    repo.insert_part("m4_screw", 1).unwrap();
    repo.insert_part("m4-screw", 1).unwrap();

    assert_eq!(
        repo.search_parts("50%").unwrap(),
        vec![Part::new("50% washer", 1)]
    );
    assert_eq!(
        repo.search_parts("4_s").unwrap(),
        vec![Part::new("m4_screw", 1)]
    );
}

#[test]
fn list_parts_returns_every_row_once() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePartRepository::new(&conn);
    repo.insert_part("a", 1).unwrap();
    repo.insert_part("b", 2).unwrap();
    repo.insert_part("c", 3).unwrap();
    repo.remove_part("b").unwrap();

    let mut parts = repo.list_parts().unwrap();
    parts.sort_by(|left, right| left.name.cmp(&right.name));

    assert_eq!(parts, vec![Part::new("a", 1), Part::new("c", 3)]);
}

#[test]
fn last_updated_at_is_absent_until_first_write() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePartRepository::new(&conn);

    assert_eq!(repo.last_updated_at().unwrap(), None);
    repo.insert_part("bolt", 1).unwrap();
    assert!(repo.last_updated_at().unwrap().is_some());
}
