use crate::features::world::RampartWorld;
use cucumber::{given, then, when};
use rampart_core::prelude::*;

#[given(expr = "{string} implements the actions {string}")]
async fn given_actions(world: &mut RampartWorld, resource: String, actions: String) {
    let actions: Vec<String> = actions.split(',').map(|a| a.trim().to_string()).collect();
    world.catalog = world.catalog.clone().with_resource(resource, actions);
}

#[given(expr = "a persisted {string} number {string}")]
async fn given_instance(world: &mut RampartWorld, type_name: String, id: String) {
    world.persistence.insert(type_name, id).expect("persistence insert failed");
}

#[given(expr = "the principal {string} owns {string} number {string}")]
async fn given_owner(world: &mut RampartWorld, principal: String, type_name: String, id: String) {
    let context = ContextValue::Instance { type_name, id: Some(id) };
    world
        .directory
        .add_role(&Principal::new(principal), "owner", context)
        .await
        .expect("role assignment failed");
}

#[when(expr = "{string} number {string} is deleted")]
async fn when_instance_deleted(world: &mut RampartWorld, type_name: String, id: String) {
    world.persistence.remove(&type_name, &id).expect("persistence remove failed");
}

#[when("the integrity check runs")]
async fn when_integrity_runs(world: &mut RampartWorld) {
    match world.integrity_checker().run().await {
        Ok(report) => world.last_report = Some(report),
        Err(e) => world.last_error = Some(e),
    }
}

#[then(expr = "it fails naming {string} and the action {string}")]
async fn then_missing_action(world: &mut RampartWorld, resource: String, action: String) {
    match &world.last_error {
        Some(RampartError::Integrity(IntegrityError::MissingActions { resource: r, actions })) => {
            assert_eq!(r, &resource);
            assert!(actions.contains(&action), "{:?} does not mention {}", actions, action);
        }
        other => panic!("expected a missing action error, got {:?}", other),
    }
}

#[then(expr = "{int} orphaned role is removed")]
async fn then_orphans_removed(world: &mut RampartWorld, count: usize) {
    let report = world.last_report.as_ref().expect("integrity check did not pass");
    assert_eq!(report.orphaned_roles_removed, count);
}

#[then(expr = "{string} no longer owns {string} number {string}")]
async fn then_not_owner(world: &mut RampartWorld, principal: String, type_name: String, id: String) {
    let context = ContextValue::Instance { type_name, id: Some(id) };
    assert!(!world
        .directory
        .has_role(&Principal::new(principal), "owner", context)
        .await
        .expect("role lookup failed"));
}
