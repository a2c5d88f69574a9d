//! Store behaviour shared by both repository adapters.

mod common;

use mango::{CompletionWeight, DomainError, Goal, GoalRepository, GoalService, ImageStore};

use common::{completion_violation, memory_service, sqlite_service};

async fn weighted_scenario<R: GoalRepository>(service: &GoalService<R>) {
    let root = service.insert(Goal::new("R", "root"), None).await.unwrap();
    service
        .insert(Goal::new("A", "").with_completion(40), Some(root))
        .await
        .unwrap();
    let b = service
        .insert(Goal::new("B", "").with_completion(80).with_weight(CompletionWeight::High), Some(root))
        .await
        .unwrap();
    assert_eq!(service.get_goal(root).await.unwrap().completion, 70);

    service.set_leaf_completion(b, 0).await.unwrap();
    assert_eq!(service.get_goal(root).await.unwrap().completion, 10);

    service
        .insert(Goal::new("C", "").with_completion(100).with_weight(CompletionWeight::Medium), Some(root))
        .await
        .unwrap();
    assert_eq!(service.get_goal(root).await.unwrap().completion, 40);
    assert_eq!(completion_violation(service).await, None);
}

async fn cascading_delete<R: GoalRepository>(service: &GoalService<R>, images: &dyn ImageStore) {
    let keep = service.insert(Goal::new("Keep", ""), None).await.unwrap();
    let root = service.insert(Goal::new("Root", ""), None).await.unwrap();
    let mid = service.insert(Goal::new("Mid", ""), Some(root)).await.unwrap();
    let leaf = service.insert(Goal::new("Leaf", ""), Some(mid)).await.unwrap();
    let other = service.insert(Goal::new("Other", ""), Some(root)).await.unwrap();

    let leaf_image = service.attach_image(leaf, "leaf.jpg", b"jpg").await.unwrap();
    let root_image = service.attach_image(root, "root.jpg", b"jpg").await.unwrap();
    let keep_image = service.attach_image(keep, "keep.jpg", b"jpg").await.unwrap();

    assert!(service.delete(root).await.unwrap());

    for id in [root, mid, leaf, other] {
        let err = service.get_goal(id).await.unwrap_err();
        assert!(err.is_not_found(), "{id} should be gone");
    }
    assert!(!images.exists(&leaf_image).await.unwrap());
    assert!(!images.exists(&root_image).await.unwrap());
    assert!(images.exists(&keep_image).await.unwrap());

    assert_eq!(service.count_top_level().await.unwrap(), 1);
    assert_eq!(service.get_top_level(0).await.unwrap().id, keep);
}

async fn derived_completion_is_protected<R: GoalRepository>(service: &GoalService<R>) {
    let root = service.insert(Goal::new("R", ""), None).await.unwrap();
    service.insert(Goal::new("A", "").with_completion(30), Some(root)).await.unwrap();

    let before = service.get_goal(root).await.unwrap();
    let err = service.set_leaf_completion(root, 99).await.unwrap_err();
    assert!(err.is_invalid_state());
    assert_eq!(service.get_goal(root).await.unwrap(), before);
}

async fn ordering_and_lookup<R: GoalRepository>(service: &GoalService<R>) {
    let names = ["first", "second", "third"];
    for name in names {
        service.insert(Goal::new(name, ""), None).await.unwrap();
    }
    let top: Vec<String> = service.top_level_goals().await.unwrap().into_iter().map(|g| g.name).collect();
    assert_eq!(top, names);
    assert_eq!(service.get_top_level(2).await.unwrap().name, "third");
    assert!(matches!(
        service.get_top_level(3).await,
        Err(DomainError::TopLevelIndexOutOfRange { index: 3, count: 3 })
    ));

    let leaves = service.collect_leaves().await.unwrap();
    assert_eq!(leaves.len(), 3);
}

#[tokio::test]
async fn test_weighted_scenario_in_memory() {
    let (service, _) = memory_service();
    weighted_scenario(&service).await;
}

#[tokio::test]
async fn test_weighted_scenario_sqlite() {
    let (service, _) = sqlite_service().await;
    weighted_scenario(&service).await;
}

#[tokio::test]
async fn test_cascading_delete_in_memory() {
    let (service, images) = memory_service();
    cascading_delete(&service, &images).await;
}

#[tokio::test]
async fn test_cascading_delete_sqlite() {
    let (service, images) = sqlite_service().await;
    cascading_delete(&service, &images).await;
}

#[tokio::test]
async fn test_derived_completion_in_memory() {
    let (service, _) = memory_service();
    derived_completion_is_protected(&service).await;
}

#[tokio::test]
async fn test_derived_completion_sqlite() {
    let (service, _) = sqlite_service().await;
    derived_completion_is_protected(&service).await;
}

#[tokio::test]
async fn test_ordering_in_memory() {
    let (service, _) = memory_service();
    ordering_and_lookup(&service).await;
}

#[tokio::test]
async fn test_ordering_sqlite() {
    let (service, _) = sqlite_service().await;
    ordering_and_lookup(&service).await;
}

#[tokio::test]
async fn test_deep_tree_does_not_recurse() {
    let (service, _) = memory_service();
    let mut parent = service.insert(Goal::new("level 0", ""), None).await.unwrap();
    let root = parent;
    for level in 1..500 {
        parent = service.insert(Goal::new(format!("level {level}"), ""), Some(parent)).await.unwrap();
    }

    service.set_leaf_completion(parent, 100).await.unwrap();
    assert_eq!(service.get_goal(root).await.unwrap().completion, 100);

    assert_eq!(service.collect_all_post_order().await.unwrap().len(), 500);
    service.delete(root).await.unwrap();
    assert_eq!(service.count_top_level().await.unwrap(), 0);
}
