use crate::features::world::RampartWorld;
use cucumber::{then, when};
use rampart_core::prelude::*;

#[when(expr = "I resolve an unsaved {string}")]
async fn when_resolve_unsaved(world: &mut RampartWorld, type_name: String) {
    let raw = ContextValue::Instance { type_name, id: None };
    match resolve(&raw) {
        Ok(context) => world.last_context = Some(context),
        Err(e) => world.last_error = Some(e),
    }
}

#[when(expr = "I resolve {string} number {string}")]
async fn when_resolve_instance(world: &mut RampartWorld, type_name: String, id: String) {
    let raw = ContextValue::Instance { type_name, id: Some(id) };
    match resolve(&raw) {
        Ok(context) => world.last_context = Some(context),
        Err(e) => world.last_error = Some(e),
    }
}

#[then("resolution fails with an invalid context error")]
async fn then_invalid_context(world: &mut RampartWorld) {
    assert!(
        matches!(world.last_error, Some(RampartError::InvalidContext(_))),
        "expected an invalid context error, got {:?}",
        world.last_error
    );
}

#[then("resolving the result again returns it unchanged")]
async fn then_idempotent(world: &mut RampartWorld) {
    let context = world.last_context.clone().expect("nothing was resolved");
    let again = resolve(&ContextValue::from(context.clone())).expect("canonical context rejected");
    assert_eq!(context, again);
}

#[then(expr = "{string} holds role {string} on {string} but not globally")]
async fn then_role_scoped(world: &mut RampartWorld, principal: String, role: String, type_name: String) {
    let principal = Principal::new(principal);
    assert!(world
        .directory
        .has_role(&principal, &role, ContextValue::of_type(type_name))
        .await
        .expect("role lookup failed"));
    assert!(!world
        .directory
        .has_role(&principal, &role, ContextValue::Global)
        .await
        .expect("role lookup failed"));
}
