//! Behavioural tests for the lending-mock crate.
//!
//! These scenarios drive the query service, record cache, and session guard
//! over file-backed storage, reopening the store between steps the way
//! separate CLI invocations would.

#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]


use std::future::Future;

use camino::Utf8PathBuf;
use lending_mock::{
    DEFAULT_USER_COUNT, FileStorage, Latency, RecordCache, RecordGenerator, SessionError,
    SessionGuard, UserField, UserFilter, UserRecord, UserStatus, UserStore, UsersApi,
    UsersService,
};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use test_support::unique_data_dir;

const FIRST_SEED: u64 = 2024;

#[derive(Default, ScenarioState)]
struct World {
    data_dir: Slot<Utf8PathBuf>,
    opened: Slot<u64>,
    first_listing: Slot<Vec<UserRecord>>,
    second_listing: Slot<Vec<UserRecord>>,
    update_result: Slot<bool>,
    cached_user: Slot<UserRecord>,
    login_result: Slot<Result<String, SessionError>>,
}

#[fixture]
fn world() -> World {
    World::default()
}

// ============================================================================
// Helpers
// ============================================================================

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("runtime")
        .block_on(future)
}

fn data_dir(world: &World) -> Utf8PathBuf {
    world.data_dir.get().expect("data directory should be set")
}

fn storage(world: &World) -> FileStorage {
    FileStorage::open(&data_dir(world)).expect("open storage")
}

/// Opens a fresh service over the data directory.
///
/// Each opening seeds its generator differently, so any regeneration would be
/// visible as a change of ids while every scenario stays reproducible.
fn open_service(world: &World) -> UsersService<FileStorage> {
    let opened = world.opened.get().unwrap_or(0);
    world.opened.set(opened + 1);
    let generator = RecordGenerator::seeded(FIRST_SEED + opened, DEFAULT_USER_COUNT);
    let store = UserStore::new(storage(world), generator);
    UsersService::new(store, Latency::NONE)
}

fn list_all(world: &World) -> Vec<UserRecord> {
    block_on(open_service(world).list_users(&UserFilter::new())).expect("list users")
}

fn first_listing(world: &World) -> Vec<UserRecord> {
    world
        .first_listing
        .get()
        .expect("users should have been listed")
}

fn first_user(world: &World) -> UserRecord {
    first_listing(world)
        .first()
        .cloned()
        .expect("listing should not be empty")
}

fn parse_status(name: &str) -> UserStatus {
    name.parse().expect("valid status name")
}

fn set_status(world: &World, id: &str, status: &str) {
    let updated = block_on(open_service(world).update_status(id, parse_status(status)))
        .expect("update status");
    world.update_result.set(updated);
}

// ============================================================================
// Given steps
// ============================================================================

#[given("an empty data directory")]
fn an_empty_data_directory(world: &World) {
    let dir = unique_data_dir("bdd").expect("create data directory");
    world.data_dir.set(dir);
}

#[given("a listing of the users")]
fn a_listing_of_the_users(world: &World) {
    world.first_listing.set(list_all(world));
}

#[given("the first user cached by the details screen")]
fn the_first_user_cached_by_the_details_screen(world: &World) {
    let id = first_user(world).id;
    let cache = RecordCache::new(storage(world));
    let cached = block_on(cache.get_or_fetch(&open_service(world), &id))
        .expect("fetch")
        .expect("user exists");
    world.cached_user.set(cached);
}

// ============================================================================
// When steps
// ============================================================================

#[when("the users are listed")]
fn the_users_are_listed(world: &World) {
    world.first_listing.set(list_all(world));
}

#[when("the users are listed again from a reopened store")]
fn the_users_are_listed_again_from_a_reopened_store(world: &World) {
    world.second_listing.set(list_all(world));
}

#[when("the users are listed with status \"{status}\"")]
fn the_users_are_listed_with_status(world: &World, status: String) {
    let filter = UserFilter::new().with(UserField::Status, status);
    let users = block_on(open_service(world).list_users(&filter)).expect("list users");
    world.first_listing.set(users);
}

#[when("the first user's status is set to \"{status}\"")]
fn the_first_users_status_is_set_to(world: &World, status: String) {
    let id = first_user(world).id;
    set_status(world, &id, &status);
}

#[when("the status of user \"{id}\" is set to \"{status}\"")]
fn the_status_of_user_is_set_to(world: &World, id: String, status: String) {
    set_status(world, &id, &status);
}

#[when("logging in as \"{email}\" with password \"{password}\"")]
fn logging_in_as_with_password(world: &World, email: String, password: String) {
    let result = SessionGuard::new(storage(world))
        .login(&email, &password)
        .map(|session| session.user.username);
    world.login_result.set(result);
}

// ============================================================================
// Then steps
// ============================================================================

#[then("both listings hold {count:usize} users")]
fn both_listings_hold_users(world: &World, count: usize) {
    let second = world.second_listing.get().expect("second listing");
    assert_eq!(first_listing(world).len(), count);
    assert_eq!(second.len(), count);
}

#[then("both listings have the same ids in the same order")]
fn both_listings_have_the_same_ids_in_the_same_order(world: &World) {
    let ids = |users: Vec<UserRecord>| users.into_iter().map(|u| u.id).collect::<Vec<_>>();
    let second = world.second_listing.get().expect("second listing");
    assert_eq!(ids(first_listing(world)), ids(second));
}

#[then("the update reports success")]
fn the_update_reports_success(world: &World) {
    assert_eq!(world.update_result.get(), Some(true));
}

#[then("the update reports failure")]
fn the_update_reports_failure(world: &World) {
    assert_eq!(world.update_result.get(), Some(false));
}

#[then("the first user is \"{status}\" after reopening the store")]
fn the_first_user_is_after_reopening_the_store(world: &World, status: String) {
    let id = first_user(world).id;
    let user = block_on(open_service(world).get_user_by_id(&id))
        .expect("get user")
        .expect("user exists");
    assert_eq!(user.status, parse_status(&status));
}

#[then("a reopened store returns the original listing")]
fn a_reopened_store_returns_the_original_listing(world: &World) {
    assert_eq!(list_all(world), first_listing(world));
}

#[then("the cached copy keeps the original status")]
fn the_cached_copy_keeps_the_original_status(world: &World) {
    let original = world.cached_user.get().expect("cached user");
    let cache = RecordCache::new(storage(world));
    let copy = block_on(cache.get_or_fetch(&open_service(world), &original.id))
        .expect("fetch")
        .expect("user exists");
    assert_eq!(copy.status, original.status);
}

#[then("a refreshed fetch shows \"{status}\"")]
fn a_refreshed_fetch_shows(world: &World, status: String) {
    let id = first_user(world).id;
    let cache = RecordCache::new(storage(world));
    cache.evict(&id).expect("evict");
    let fresh = block_on(cache.get_or_fetch(&open_service(world), &id))
        .expect("fetch")
        .expect("user exists");
    assert_eq!(fresh.status, parse_status(&status));
}

#[then("every listed user is \"{status}\"")]
fn every_listed_user_is(world: &World, status: String) {
    let expected = parse_status(&status);
    let users = first_listing(world);
    assert!(!users.is_empty(), "seeded dataset should contain {status} users");
    assert!(users.iter().all(|u| u.status == expected));
}

#[then("login fails with \"{message}\"")]
fn login_fails_with(world: &World, message: String) {
    let result = world.login_result.get().expect("login attempted");
    let err = result.expect_err("login should fail");
    assert_eq!(err.to_string(), message);
}

#[then("nobody is signed in")]
fn nobody_is_signed_in(world: &World) {
    let guard = SessionGuard::new(storage(world));
    assert!(!guard.is_authenticated().expect("read session"));
}

#[then("the signed-in username is \"{username}\"")]
fn the_signed_in_username_is(world: &World, username: String) {
    let result = world.login_result.get().expect("login attempted");
    assert_eq!(result.expect("login should succeed"), username);

    let current = SessionGuard::new(storage(world))
        .current()
        .expect("read session")
        .expect("session persisted");
    assert_eq!(current.user.username, username);
}

#[then("nobody is signed in after logging out")]
fn nobody_is_signed_in_after_logging_out(world: &World) {
    let guard = SessionGuard::new(storage(world));
    guard.logout().expect("logout");
    assert_eq!(guard.current().expect("read session"), None);
}

// ============================================================================
// Scenario bindings
// ============================================================================

#[scenario(path = "tests/features/lending_mock.feature", index = 0)]
fn dataset_is_generated_once(world: World) {
    drop(world);
}

#[scenario(path = "tests/features/lending_mock.feature", index = 1)]
fn status_change_survives_reopening(world: World) {
    drop(world);
}

#[scenario(path = "tests/features/lending_mock.feature", index = 2)]
fn unknown_user_update_changes_nothing(world: World) {
    drop(world);
}

#[scenario(path = "tests/features/lending_mock.feature", index = 3)]
fn cached_record_goes_stale(world: World) {
    drop(world);
}

#[scenario(path = "tests/features/lending_mock.feature", index = 4)]
fn status_filter_is_exact(world: World) {
    drop(world);
}

#[scenario(path = "tests/features/lending_mock.feature", index = 5)]
fn login_rejects_short_password(world: World) {
    drop(world);
}

#[scenario(path = "tests/features/lending_mock.feature", index = 6)]
fn login_persists_session(world: World) {
    drop(world);
}
