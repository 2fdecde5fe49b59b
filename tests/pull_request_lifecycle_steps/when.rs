//! When steps for pull request lifecycle BDD scenarios.

use super::world::{PullRequestWorld, run_async};
use guig::pull_request::services::CreatePullRequestRequest;
use rstest_bdd_macros::when;

#[when(r#"a pull request "{title}" is opened from "{source}" into "{destiny}""#)]
fn open_pull_request(
    world: &mut PullRequestWorld,
    title: String,
    source: String,
    destiny: String,
) -> Result<(), eyre::Report> {
    let request = CreatePullRequestRequest::new(title, source, destiny);
    let result = run_async(world.service.create(request));
    world.record(result);
    Ok(())
}

#[when("the pull request is merged")]
fn merge_pull_request(world: &mut PullRequestWorld) -> Result<(), eyre::Report> {
    let id = world.current()?.id();
    let result = run_async(world.service.merge(id));
    world.record(result);
    Ok(())
}

#[when("the pull request is closed")]
fn close_pull_request(world: &mut PullRequestWorld) -> Result<(), eyre::Report> {
    let id = world.current()?.id();
    let result = run_async(world.service.close(id));
    world.record(result);
    Ok(())
}
