//! Relational store conformance tests. They need a disposable PostgreSQL
//! database and only run when `TEST_DATABASE_URL` is set.

use devfile_service::store::{PostgresStore, Stores};
use devfile_service::{
    generate_name, Devfile, DevfileError, DevfileScope, Metadata, PersistentDevfile, User,
    UserDevfile,
};

async fn connect() -> Option<Stores> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        println!("TEST_DATABASE_URL not set, skipping PostgreSQL test");
        return None;
    };
    let store = PostgresStore::new(&url, 5).await.unwrap();
    store.migrate().await.unwrap();
    Some(Stores::postgres(&store))
}

/// Each test works on its own user so that runs do not interfere.
async fn fresh_user(stores: &Stores) -> String {
    let id = generate_name("pguser", 12);
    stores.users.create_user(User::new(id.as_str(), "pg")).await.unwrap();
    id
}

fn user_devfile(owner: &str, name: &str) -> UserDevfile {
    UserDevfile::new(
        DevfileScope::User.generate_id(),
        Some(owner.to_string()),
        Devfile {
            api_version: "1.0.0".to_string(),
            metadata: Metadata::named(name),
            ..Default::default()
        },
    )
}

#[tokio::test]
async fn test_create_get_update_remove() {
    let Some(stores) = connect().await else {
        return;
    };
    let owner = fresh_user(&stores).await;
    let dao = &stores.user_devfiles;

    let created = dao.create(user_devfile(&owner, "devfile-name")).await.unwrap();
    assert_eq!(dao.get_by_id(&created.id).await.unwrap(), created);

    let mut changed = created.clone();
    changed.devfile.api_version = "V15.0".to_string();
    changed.owner = None;
    let updated = dao.update(changed).await.unwrap();
    assert_eq!(updated.devfile.api_version, "V15.0");
    assert_eq!(updated.owner.as_deref(), Some(owner.as_str()));

    dao.remove(&created.id).await.unwrap();
    dao.remove(&created.id).await.unwrap();
    assert!(dao.get_by_id(&created.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_constraint_violations_are_conflicts() {
    let Some(stores) = connect().await else {
        return;
    };
    let owner = fresh_user(&stores).await;
    let dao = &stores.user_devfiles;
    let first = dao.create(user_devfile(&owner, "same")).await.unwrap();

    assert_eq!(
        dao.create(user_devfile(&owner, "same")).await.unwrap_err(),
        DevfileError::Conflict("Devfile with name 'same' already exists for current user".to_string())
    );

    let mut same_id = user_devfile(&owner, "other");
    same_id.id = first.id.clone();
    assert_eq!(
        dao.create(same_id).await.unwrap_err(),
        DevfileError::Conflict(format!("Devfile with id '{}' already exists", first.id))
    );

    let orphan = user_devfile(&generate_name("ghost", 12), "orphan");
    assert_eq!(
        dao.create(orphan).await.unwrap_err(),
        DevfileError::Conflict(
            "Could not create devfile with creator that refers on non-existent user".to_string()
        )
    );
}

#[tokio::test]
async fn test_update_missing_is_not_found() {
    let Some(stores) = connect().await else {
        return;
    };
    let owner = fresh_user(&stores).await;
    let missing = user_devfile(&owner, "missing");

    let err = stores.user_devfiles.update(missing.clone()).await.unwrap_err();

    assert_eq!(
        err,
        DevfileError::NotFound(format!(
            "Could not update devfile with id {} because it doesn't exist",
            missing.id
        ))
    );
    assert!(stores.user_devfiles.get_by_id(&missing.id).await.is_err());
}

#[tokio::test]
async fn test_pages_cover_owned_records_once() {
    let Some(stores) = connect().await else {
        return;
    };
    let owner = fresh_user(&stores).await;
    let dao = &stores.user_devfiles;
    let mut created = Vec::new();
    for name in ["a", "b", "c"] {
        created.push(dao.create(user_devfile(&owner, name)).await.unwrap().id);
    }

    let first = dao.get_devfiles(&owner, 2, 0).await.unwrap();
    let second = dao.get_devfiles(&owner, 2, 2).await.unwrap();

    assert_eq!(first.total_count, 3);
    assert_eq!(second.total_count, 3);
    let listed: Vec<String> = first
        .items
        .into_iter()
        .chain(second.items)
        .map(|record| record.id)
        .collect();
    assert_eq!(listed, created);
}

#[tokio::test]
async fn test_user_with_devfiles_cannot_be_removed() {
    let Some(stores) = connect().await else {
        return;
    };
    let owner = fresh_user(&stores).await;
    let record = PersistentDevfile::new(
        DevfileScope::Workspace.generate_id(),
        Some(owner.clone()),
        Devfile {
            api_version: "1.0.0".to_string(),
            metadata: Metadata::named("ws"),
            ..Default::default()
        },
    );
    let created = stores.devfiles.create(record).await.unwrap();

    assert!(stores.users.remove_user(&owner).await.unwrap_err().is_conflict());

    stores.devfiles.remove(&created.id).await.unwrap();
    stores.users.remove_user(&owner).await.unwrap();
    assert!(stores.users.get_user(&owner).await.unwrap_err().is_not_found());
}
