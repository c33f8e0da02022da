use crate::features::world::RampartWorld;
use cucumber::{given, then, when};
use rampart_core::prelude::*;

#[given(expr = "a resource {string}")]
async fn given_resource(world: &mut RampartWorld, name: String) {
    world.resource(&name);
}

#[given(expr = "a resource {string} inheriting from {string}")]
async fn given_subresource(world: &mut RampartWorld, name: String, parent: String) {
    let parent = world.resource(&parent);
    world.resources.insert(name.clone(), parent.subtype(name));
}

#[given(expr = "a resource rule on {string} requiring role {string}")]
async fn given_resource_rule(world: &mut RampartWorld, resource: String, role: String) {
    let resource = world.resource(&resource);
    world.registry.add(&resource, None, RuleDeclaration::new().role(role)).expect("resource rule rejected");
}

#[given(expr = "a resource rule on {string} with no roles")]
async fn given_open_resource_rule(world: &mut RampartWorld, resource: String) {
    let resource = world.resource(&resource);
    world.registry.add(&resource, None, RuleDeclaration::new()).expect("resource rule rejected");
}

#[given(expr = "an action rule on {string} for {string} with no roles")]
async fn given_open_action_rule(world: &mut RampartWorld, resource: String, action: String) {
    let resource = world.resource(&resource);
    world.registry.add(&resource, Some(&action), RuleDeclaration::new()).expect("action rule rejected");
}

#[given(expr = "an action rule on {string} for {string} requiring role {string}")]
async fn given_action_rule(world: &mut RampartWorld, resource: String, action: String, role: String) {
    let resource = world.resource(&resource);
    world
        .registry
        .add(&resource, Some(&action), RuleDeclaration::new().role(role))
        .expect("action rule rejected");
}

#[given(expr = "an action rule on {string} for {string} unless {string}")]
async fn given_negated_rule(world: &mut RampartWorld, resource: String, action: String, method: String) {
    let resource = world.resource(&resource);
    world
        .registry
        .add(&resource, Some(&action), RuleDeclaration::new().unless(Predicate::method(method)))
        .expect("action rule rejected");
}

#[given("roles are mandatory")]
async fn given_roles_mandatory(world: &mut RampartWorld) {
    world.config = world.config.clone().with_must_have_roles(true);
}

#[given(expr = "the principal {string} holds role {string} globally")]
async fn given_global_role(world: &mut RampartWorld, principal: String, role: String) {
    world
        .directory
        .add_role(&Principal::new(principal), &role, ContextValue::Global)
        .await
        .expect("role assignment failed");
}

#[given(expr = "the principal {string} holds role {string} on {string}")]
async fn given_typed_role(world: &mut RampartWorld, principal: String, role: String, type_name: String) {
    world
        .directory
        .add_role(&Principal::new(principal), &role, ContextValue::of_type(type_name))
        .await
        .expect("role assignment failed");
}

#[given(expr = "the request is flagged {string}")]
async fn given_flag(world: &mut RampartWorld, flag: String) {
    world.request.flags.insert(flag, true);
}

#[when(expr = "the principal {string} loses role {string} globally")]
async fn when_role_removed(world: &mut RampartWorld, principal: String, role: String) {
    world
        .directory
        .remove_role(&Principal::new(principal), &role, ContextValue::Global)
        .await
        .expect("role revocation failed");
}

#[then(expr = "{string} is granted {string} on {string}")]
async fn then_granted(world: &mut RampartWorld, principal: String, action: String, resource: String) {
    assert!(
        world.decide(&principal, &action, &resource).await,
        "expected {} to be granted {} on {}",
        principal,
        action,
        resource
    );
}

#[then(expr = "{string} is denied {string} on {string}")]
async fn then_denied(world: &mut RampartWorld, principal: String, action: String, resource: String) {
    assert!(
        !world.decide(&principal, &action, &resource).await,
        "expected {} to be denied {} on {}",
        principal,
        action,
        resource
    );
}
