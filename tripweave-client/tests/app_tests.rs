//! End-to-end command handling through [`App`] with a scripted backend.

use std::sync::Arc;
use tripweave_client::app::{App, Flow};
use tripweave_client::SessionStore;
use tripweave_test_utils::{
    fixtures, BackendCall, EntityIdType, ItemRef, ItemType, LocationId, LoginResponse, MapId,
    MockBackend, MockFailure, RouteId, UserId,
};

fn app(mock: &Arc<MockBackend>) -> App {
    App::new(
        mock.clone(),
        SessionStore::in_memory(),
        fixtures::params(),
        fixtures::settings(),
    )
}

async fn run(app: &mut App, line: &str) -> Vec<String> {
    let mut out = Vec::new();
    let flow = app.handle_line(line, &mut out).await;
    assert_eq!(flow, Flow::Continue);
    out
}

async fn logged_in_app(mock: &Arc<MockBackend>) -> App {
    mock.queue_login(Ok(LoginResponse {
        message: Some("ok".to_string()),
        user_id: UserId::new(42),
    }));
    let mut app = app(mock);
    let out = run(&mut app, "/login ann@example.com secret").await;
    assert_eq!(out, vec!["Logged in as user 42.".to_string()]);
    app
}

#[tokio::test]
async fn greeting_is_printed_once() {
    let mock = Arc::new(MockBackend::new());
    let mut app = app(&mock);

    let first = app.drain_transcript();
    assert_eq!(first.len(), 2);
    assert!(first.iter().all(|line| line.starts_with("bot> ")));
    assert!(app.drain_transcript().is_empty());
}

#[tokio::test]
async fn message_before_login_is_refused() {
    let mock = Arc::new(MockBackend::new());
    let mut app = app(&mock);
    app.drain_transcript();

    let out = run(&mut app, "Weekend in Rome").await;

    assert!(out.is_empty());
    let printed = app.drain_transcript();
    assert_eq!(printed[0], "you> Weekend in Rome");
    assert!(printed[1].starts_with("bot! "));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn failed_login_is_reported() {
    let mock = Arc::new(MockBackend::new());
    mock.queue_login(Err(MockFailure::status(401, "Invalid credentials")));
    let mut app = app(&mock);

    let out = run(&mut app, "/login ann@example.com wrong").await;

    assert_eq!(out, vec!["! Login failed: Invalid credentials".to_string()]);
    assert!(!app.conversation().session().is_authenticated());
}

#[tokio::test]
async fn query_flow_prints_route() {
    let mock = Arc::new(MockBackend::new());
    mock.queue_route(fixtures::route(3, &["Colosseum", "Forum"]));
    let mut app = logged_in_app(&mock).await;
    app.drain_transcript();

    run(&mut app, "Weekend in Rome").await;
    let printed = app.drain_transcript();

    assert_eq!(printed[0], "you> Weekend in Rome");
    assert_eq!(printed[1], "bot> Here is your route:");
    assert!(printed[2].contains("== Route 3 (draft) =="));
    assert!(printed[2].contains("Colosseum"));
    assert!(matches!(
        mock.calls().last(),
        Some(BackendCall::SubmitQuery { user_id, .. }) if *user_id == UserId::new(42)
    ));
}

#[tokio::test]
async fn delete_asks_for_confirmation() {
    let mock = Arc::new(MockBackend::new());
    mock.queue_route(fixtures::route(3, &["Colosseum", "Forum"]))
        .queue_route_result(Ok(fixtures::route(3, &["Colosseum"])));
    let mut app = logged_in_app(&mock).await;
    run(&mut app, "Weekend in Rome").await;
    run(&mut app, "/edit 3").await;

    let prompt = run(&mut app, "/delete 301").await;
    assert_eq!(prompt, vec!["Remove 'Forum' from the route? [y/N]".to_string()]);
    assert_eq!(app.awaiting_delete_confirmation(), Some(MapId::new(301)));

    let out = run(&mut app, "y").await;

    assert!(app.awaiting_delete_confirmation().is_none());
    assert!(out[0].contains("Point removed."));
    assert_eq!(
        mock.calls().last(),
        Some(&BackendCall::DeletePoi {
            user_id: UserId::new(42),
            route_id: RouteId::new(3),
            map_id: MapId::new(301),
        })
    );
}

#[tokio::test]
async fn anything_but_yes_keeps_the_point() {
    let mock = Arc::new(MockBackend::new());
    mock.queue_route(fixtures::route(3, &["Colosseum", "Forum"]));
    let mut app = logged_in_app(&mock).await;
    run(&mut app, "Weekend in Rome").await;
    run(&mut app, "/edit 3").await;
    run(&mut app, "/delete 301").await;
    let calls = mock.call_count();

    let out = run(&mut app, "no").await;

    assert_eq!(out[0], "Kept.");
    assert_eq!(mock.call_count(), calls);
}

#[tokio::test]
async fn edit_then_save_updates_transcript() {
    let mock = Arc::new(MockBackend::new());
    mock.queue_route(fixtures::route(3, &["Colosseum", "Forum"]))
        .queue_route_result(Ok(fixtures::route(3, &["Colosseum"])));
    let mut app = logged_in_app(&mock).await;
    run(&mut app, "Weekend in Rome").await;
    app.drain_transcript();
    run(&mut app, "/edit 3").await;
    run(&mut app, "/delete 301").await;
    run(&mut app, "yes").await;

    let out = run(&mut app, "/save").await;

    assert!(out.is_empty());
    assert!(app.conversation().editor().is_none());
    let printed = app.drain_transcript();
    assert_eq!(
        printed.last().map(String::as_str),
        Some("bot> Route (ID: 3) updated. Finalize it to approve.")
    );
    let route = app.conversation().transcript().route(RouteId::new(3)).unwrap();
    assert_eq!(route.points_of_interest.len(), 1);
}

#[tokio::test]
async fn editor_commands_need_an_open_editor() {
    let mock = Arc::new(MockBackend::new());
    let mut app = app(&mock);

    for line in ["/delete 1", "/add", "/search tower", "/pick 1", "/close"] {
        let out = run(&mut app, line).await;
        assert!(out[0].starts_with("! No route is being edited"), "{line}: {out:?}");
    }
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn parse_errors_are_printed() {
    let mock = Arc::new(MockBackend::new());
    let mut app = app(&mock);

    let out = run(&mut app, "/teleport").await;

    assert_eq!(out, vec!["! Unknown command: /teleport (try /help)".to_string()]);
}

#[tokio::test]
async fn invalid_params_are_printed() {
    let mock = Arc::new(MockBackend::new());
    let mut app = app(&mock);
    let before = app.conversation().params().clone();

    let out = run(&mut app, "/params 2026-06-10 2026-06-01").await;

    assert_eq!(out.len(), 1);
    assert!(out[0].starts_with("! "));
    assert_eq!(app.conversation().params(), &before);
}

#[tokio::test]
async fn reviews_are_shown_with_load_errors() {
    let mock = Arc::new(MockBackend::new());
    mock.queue_review_list(Err(MockFailure::network("connection refused")));
    let mut app = app(&mock);

    let out = run(&mut app, "/reviews location 10").await;

    assert!(out[0].contains("Failed to load reviews: connection refused"));
    assert!(app.reviews().is_some());
}

#[tokio::test]
async fn profile_is_shown_and_edited() {
    let mock = Arc::new(MockBackend::new());
    let mut edited = fixtures::profile(42, "ann@example.com");
    edited.interests = Some("museums;food".to_string());
    mock.queue_profile(Ok(fixtures::profile(42, "ann@example.com")))
        .queue_profile(Ok(edited));
    let mut app = logged_in_app(&mock).await;

    let shown = run(&mut app, "/profile").await;
    assert!(shown[0].contains("Email: ann@example.com"));
    assert!(shown[0].contains("Interests: not set"));

    let out = run(&mut app, "/profile set interests museums, food").await;

    assert_eq!(out[0], "Profile saved.");
    assert!(out[1].contains("Interests: museums, food"));
    match mock.calls().last() {
        Some(BackendCall::UpdateProfile { user_id, update }) => {
            assert_eq!(*user_id, UserId::new(42));
            assert_eq!(update.interests.as_deref(), Some("museums;food"));
        }
        other => panic!("expected a profile update, got {:?}", other),
    }
}

#[tokio::test]
async fn profile_needs_a_login() {
    let mock = Arc::new(MockBackend::new());
    let mut app = app(&mock);

    let out = run(&mut app, "/profile").await;

    assert!(out[0].contains("User ID not available. Please log in."));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn bad_profile_value_is_reported_without_saving() {
    let mock = Arc::new(MockBackend::new());
    mock.queue_profile(Ok(fixtures::profile(42, "ann@example.com")));
    let mut app = logged_in_app(&mock).await;
    run(&mut app, "/profile").await;
    let calls = mock.call_count();

    let out = run(&mut app, "/profile set currency yen").await;

    assert_eq!(out.len(), 1);
    assert!(out[0].contains("! Invalid value for budget_currency"));
    assert_eq!(mock.call_count(), calls);
}

#[tokio::test]
async fn recommended_item_opens_its_reviews() {
    let mock = Arc::new(MockBackend::new());
    mock.queue_recommendations(Ok(vec![
        fixtures::recommended(3, ItemType::Location, "Pantheon", Some(4.9)),
        fixtures::recommended(7, ItemType::Activity, "Pasta class", None),
    ]))
    .queue_review_list(Ok(vec![fixtures::review(
        1,
        5,
        ItemRef::Location(LocationId::new(3)),
        Some("Breathtaking"),
    )]));
    let mut app = logged_in_app(&mock).await;

    let listed = run(&mut app, "/recommend").await;
    assert!(listed[0].contains("1) Pantheon [location] 4.9/5 - Rome, Italy"));
    assert!(listed[0].contains("2) Pasta class [activity]"));

    let out = run(&mut app, "/recommend 1").await;

    assert!(out[0].contains("Breathtaking"));
    assert_eq!(
        app.reviews().map(|panel| panel.target()),
        Some(ItemRef::Location(LocationId::new(3)))
    );
    assert_eq!(
        mock.calls().last(),
        Some(&BackendCall::ListReviews {
            target: ItemRef::Location(LocationId::new(3))
        })
    );
}

#[tokio::test]
async fn empty_recommendations_suggest_the_profile() {
    let mock = Arc::new(MockBackend::new());
    mock.queue_recommendations(Ok(Vec::new()));
    let mut app = logged_in_app(&mock).await;

    let out = run(&mut app, "/recommend").await;

    assert!(out[0].contains("/profile set interests"));
    let missing = run(&mut app, "/recommend 1").await;
    assert_eq!(missing, vec!["! List recommendations with /recommend first.".to_string()]);
}

#[tokio::test]
async fn recommendation_number_out_of_range() {
    let mock = Arc::new(MockBackend::new());
    mock.queue_recommendations(Ok(vec![fixtures::recommended(
        3,
        ItemType::Location,
        "Pantheon",
        None,
    )]));
    let mut app = logged_in_app(&mock).await;
    run(&mut app, "/recommend").await;
    let calls = mock.call_count();

    let out = run(&mut app, "/recommend 4").await;

    assert_eq!(out, vec!["! There is no recommendation number 4.".to_string()]);
    assert_eq!(mock.call_count(), calls);
    assert!(app.reviews().is_none());
}

#[tokio::test]
async fn logout_drops_the_user() {
    let mock = Arc::new(MockBackend::new());
    let mut app = logged_in_app(&mock).await;

    let out = run(&mut app, "/logout").await;

    assert_eq!(out, vec!["Logged out.".to_string()]);
    assert!(!app.conversation().session().is_authenticated());
}

#[tokio::test]
async fn quit_stops_the_loop() {
    let mock = Arc::new(MockBackend::new());
    let mut app = app(&mock);
    let mut out = Vec::new();

    assert_eq!(app.handle_line("/quit", &mut out).await, Flow::Quit);
}
