//! Route editing and debounced search against a scripted backend.
//!
//! Search tests run on a paused clock so the debounce delay elapses without
//! real sleeping.

use std::sync::Arc;
use std::time::Duration;
use tripweave_client::edit_session::{EditError, PoiMutation, NOT_LOGGED_IN};
use tripweave_client::poi_search::SearchMessage;
use tripweave_client::{
    Confirmation, EditorSettings, PoiSearch, PoiSelection, RouteEditSession, SearchMode,
    SessionContext,
};
use tripweave_test_utils::{
    fixtures, ActivityId, BackendCall, EntityIdType, ItemRef, ItemType, LocationId, MapId,
    MockBackend, MockFailure, RouteId, UserId,
};

fn editor(mock: &Arc<MockBackend>, route_id: i64, names: &[&str]) -> RouteEditSession {
    RouteEditSession::new(
        mock.clone(),
        SessionContext::authenticated(UserId::new(42)),
        fixtures::route(route_id, names),
        fixtures::settings(),
    )
}

fn search(mock: &Arc<MockBackend>) -> PoiSearch {
    PoiSearch::new(mock.clone(), fixtures::settings().search)
}

// ============================================================================
// EDIT SESSION
// ============================================================================

#[tokio::test]
async fn delete_adopts_server_document_verbatim() {
    let mock = Arc::new(MockBackend::new());
    let mut server = fixtures::route(1, &["Louvre", "Orsay"]);
    server.points_of_interest[0].visit_order = 4;
    server.points_of_interest[1].visit_order = 2;
    mock.queue_route_result(Ok(server.clone()));
    let mut session = editor(&mock, 1, &["Louvre", "Eiffel", "Orsay"]);

    let removed = session
        .delete_poi(MapId::new(101), Confirmation::Confirmed)
        .await
        .unwrap();

    assert!(removed);
    assert_eq!(session.working(), &server);
    assert_eq!(session.notice().unwrap().message, "Point removed.");
    assert!(session.error().is_none());
    assert!(!session.is_loading());
    assert_eq!(
        mock.calls(),
        vec![BackendCall::DeletePoi {
            user_id: UserId::new(42),
            route_id: RouteId::new(1),
            map_id: MapId::new(101),
        }]
    );
}

#[tokio::test]
async fn declined_delete_sends_nothing() {
    let mock = Arc::new(MockBackend::new());
    let mut session = editor(&mock, 1, &["Louvre", "Orsay"]);
    let before = session.working().clone();

    let removed = session
        .delete_poi(MapId::new(100), Confirmation::Declined)
        .await
        .unwrap();

    assert!(!removed);
    assert_eq!(session.working(), &before);
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn failed_mutation_keeps_working_copy() {
    let mock = Arc::new(MockBackend::new());
    mock.queue_route_result(Err(MockFailure::status(409, "Route is finalized")));
    let mut session = editor(&mock, 2, &["A", "B"]);
    let before = session.working().clone();

    let err = session
        .delete_poi(MapId::new(200), Confirmation::Confirmed)
        .await
        .unwrap_err();

    assert!(matches!(err, EditError::Backend(_)));
    assert_eq!(session.working(), &before);
    assert_eq!(session.error(), Some("Delete failed: Route is finalized"));
    assert!(session.notice().is_none());
    assert!(!session.is_loading());
}

#[tokio::test]
async fn unknown_point_is_refused_locally() {
    let mock = Arc::new(MockBackend::new());
    let mut session = editor(&mock, 2, &["A"]);

    let err = session
        .delete_poi(MapId::new(999), Confirmation::Confirmed)
        .await
        .unwrap_err();

    assert!(matches!(err, EditError::UnknownPoi { .. }));
    assert!(session.open_replace(MapId::new(999), "ghost").is_err());
    assert!(!session.search().is_open());
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn anonymous_editor_reports_login_error() {
    let mock = Arc::new(MockBackend::new());
    let mut session = RouteEditSession::new(
        mock.clone(),
        SessionContext::anonymous(),
        fixtures::route(3, &["A"]),
        fixtures::settings(),
    );

    let err = session
        .delete_poi(MapId::new(300), Confirmation::Confirmed)
        .await
        .unwrap_err();

    assert!(matches!(err, EditError::Unauthenticated));
    assert_eq!(session.error(), Some(NOT_LOGGED_IN));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn one_mutation_at_a_time() {
    let mock = Arc::new(MockBackend::new());
    let mut session = editor(&mock, 4, &["A", "B"]);

    let prepared = session
        .prepare(PoiMutation::Delete {
            map_id: MapId::new(400),
        })
        .unwrap();
    assert!(session.is_loading());
    assert!(matches!(
        session.prepare(PoiMutation::Delete {
            map_id: MapId::new(401)
        }),
        Err(EditError::Busy)
    ));
    assert!(matches!(session.save(), Err(EditError::Busy)));

    let result = prepared.execute(mock.as_ref()).await;
    assert!(result.is_err());
    assert!(session.apply_mutation(result).is_err());
    assert!(!session.is_loading());
    assert!(matches!(
        session.apply_mutation(Ok(fixtures::route(4, &[]))),
        Err(EditError::NothingInFlight)
    ));
}

#[tokio::test]
async fn expired_notice_is_hidden() {
    let mock = Arc::new(MockBackend::new());
    mock.queue_route_result(Ok(fixtures::route(5, &["A"])));
    let settings = EditorSettings {
        notice_ttl: Duration::ZERO,
        ..fixtures::settings()
    };
    let mut session = RouteEditSession::new(
        mock.clone(),
        SessionContext::authenticated(UserId::new(42)),
        fixtures::route(5, &["A", "B"]),
        settings,
    );

    session
        .delete_poi(MapId::new(501), Confirmation::Confirmed)
        .await
        .unwrap();

    assert!(session.notice().is_none());
    session.clear_expired_notice();
    assert!(session.notice().is_none());
}

#[tokio::test]
async fn add_selection_posts_the_chosen_item() {
    let mock = Arc::new(MockBackend::new());
    mock.queue_route_result(Ok(fixtures::route(6, &["A", "B"])));
    let mut session = editor(&mock, 6, &["A"]);
    session.open_add();

    let selection = PoiSelection {
        item: ItemRef::Activity(ActivityId::new(77)),
        mode: SearchMode::Add,
    };
    session.on_poi_chosen(selection).await.unwrap();

    assert!(!session.search().is_open());
    assert_eq!(session.working().points_of_interest.len(), 2);
    assert_eq!(session.notice().unwrap().message, "Point added.");
    assert_eq!(
        mock.calls(),
        vec![BackendCall::AddPoi {
            user_id: UserId::new(42),
            route_id: RouteId::new(6),
            item: ItemRef::Activity(ActivityId::new(77)),
        }]
    );
}

#[tokio::test]
async fn failed_choice_still_closes_search() {
    let mock = Arc::new(MockBackend::new());
    mock.queue_route_result(Err(MockFailure::network("connection reset")));
    let mut session = editor(&mock, 7, &["A"]);
    session.open_replace(MapId::new(700), "A").unwrap();

    let selection = PoiSelection {
        item: ItemRef::Location(LocationId::new(5)),
        mode: SearchMode::Replace {
            map_id: MapId::new(700),
            current_name: "A".to_string(),
        },
    };
    let err = session.on_poi_chosen(selection).await.unwrap_err();

    assert!(matches!(err, EditError::Backend(_)));
    assert!(!session.search().is_open());
    assert_eq!(session.error(), Some("Replace failed: connection reset"));
}

#[tokio::test(start_paused = true)]
async fn replace_through_search_results() {
    let mock = Arc::new(MockBackend::new());
    mock.set_search_results(
        "tower",
        Ok(vec![
            fixtures::search_item(31, ItemType::Location, "Eiffel Tower"),
            fixtures::search_item(32, ItemType::Activity, "Tower climb"),
        ]),
    );
    let mut replaced = fixtures::route(8, &["A", "Tower climb"]);
    replaced.points_of_interest[1].activity_id = Some(ActivityId::new(32));
    mock.queue_route_result(Ok(replaced.clone()));
    let mut session = editor(&mock, 8, &["A", "B"]);

    session.open_replace(MapId::new(801), "B").unwrap();
    session.search_mut().on_query_change("tower");
    assert!(session.search_mut().next_outcome().await);
    assert_eq!(session.search().results().len(), 2);

    let chosen = session.choose_result(1).await.unwrap();

    assert!(chosen);
    assert!(!session.search().is_open());
    assert_eq!(session.working(), &replaced);
    assert_eq!(session.notice().unwrap().message, "Point replaced.");
    assert_eq!(
        mock.calls().last(),
        Some(&BackendCall::ReplacePoi {
            user_id: UserId::new(42),
            route_id: RouteId::new(8),
            map_id: MapId::new(801),
            item: ItemRef::Activity(ActivityId::new(32)),
        })
    );
}

#[tokio::test]
async fn choosing_missing_result_does_nothing() {
    let mock = Arc::new(MockBackend::new());
    let mut session = editor(&mock, 9, &["A"]);
    session.open_add();

    assert!(!session.choose_result(0).await.unwrap());
    assert!(session.search().is_open());
    assert_eq!(mock.call_count(), 0);
}

// ============================================================================
// SEARCH
// ============================================================================

#[tokio::test(start_paused = true)]
async fn rapid_typing_fires_one_search() {
    let mock = Arc::new(MockBackend::new());
    mock.set_search_results(
        "louvre",
        Ok(vec![fixtures::search_item(1, ItemType::Location, "Louvre")]),
    );
    let mut search = search(&mock);
    search.open(SearchMode::Add);

    search.on_query_change("lo");
    search.on_query_change("lou");
    search.on_query_change("louvre");
    assert!(search.is_searching());

    assert!(search.next_outcome().await);
    assert_eq!(mock.search_queries(), vec!["louvre".to_string()]);
    assert_eq!(search.results().len(), 1);
    assert!(search.message().is_none());
    assert!(!search.is_searching());
}

#[tokio::test(start_paused = true)]
async fn nothing_fires_before_the_delay() {
    let mock = Arc::new(MockBackend::new());
    let mut search = search(&mock);
    search.open(SearchMode::Add);

    search.on_query_change("museum");
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(mock.search_queries().is_empty());
    assert!(!search.poll_outcomes());
}

#[tokio::test(start_paused = true)]
async fn short_query_shows_hint_without_searching() {
    let mock = Arc::new(MockBackend::new());
    let mut search = search(&mock);
    search.open(SearchMode::Add);

    search.on_query_change("a");
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(
        search.message(),
        Some(&SearchMessage::TooShort { min_chars: 2 })
    );
    assert!(!search.is_searching());
    assert!(mock.search_queries().is_empty());
    assert!(!search.next_outcome().await);
}

#[tokio::test(start_paused = true)]
async fn emptied_box_clears_everything() {
    let mock = Arc::new(MockBackend::new());
    mock.set_search_results(
        "park",
        Ok(vec![fixtures::search_item(4, ItemType::Location, "Park")]),
    );
    let mut search = search(&mock);
    search.open(SearchMode::Add);
    search.on_query_change("park");
    search.next_outcome().await;

    search.on_query_change("");

    assert!(search.results().is_empty());
    assert!(search.message().is_none());
    assert!(!search.is_searching());
}

#[tokio::test(start_paused = true)]
async fn empty_result_says_nothing_found() {
    let mock = Arc::new(MockBackend::new());
    let mut search = search(&mock);
    search.open(SearchMode::Add);

    search.on_query_change("zzzz");
    assert!(search.next_outcome().await);

    assert!(search.results().is_empty());
    assert_eq!(search.message(), Some(&SearchMessage::NothingFound));
}

#[tokio::test(start_paused = true)]
async fn search_failure_is_shown_inline() {
    let mock = Arc::new(MockBackend::new());
    mock.set_search_results("rome", Err(MockFailure::status(502, "Upstream down")));
    let mut search = search(&mock);
    search.open(SearchMode::Add);

    search.on_query_change("rome");
    assert!(search.next_outcome().await);

    assert!(search.results().is_empty());
    assert_eq!(
        search.message().map(ToString::to_string),
        Some("Search failed: Upstream down".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn outcome_for_an_older_query_is_discarded() {
    let mock = Arc::new(MockBackend::new());
    mock.set_search_results(
        "paris",
        Ok(vec![fixtures::search_item(1, ItemType::Location, "Paris")]),
    );
    mock.set_search_results(
        "rome",
        Ok(vec![fixtures::search_item(2, ItemType::Location, "Rome")]),
    );
    let mut search = search(&mock);
    search.open(SearchMode::Add);

    search.on_query_change("paris");
    tokio::time::sleep(Duration::from_millis(600)).await;
    // The paris outcome is queued but not applied yet.
    search.on_query_change("rome");
    assert!(search.next_outcome().await);

    assert_eq!(
        mock.search_queries(),
        vec!["paris".to_string(), "rome".to_string()]
    );
    let names: Vec<&str> = search.results().iter().map(|item| item.name.as_str()).collect();
    assert_eq!(names, vec!["Rome"]);
}

#[tokio::test(start_paused = true)]
async fn outcome_after_close_is_discarded() {
    let mock = Arc::new(MockBackend::new());
    mock.set_search_results(
        "paris",
        Ok(vec![fixtures::search_item(1, ItemType::Location, "Paris")]),
    );
    let mut search = search(&mock);
    search.open(SearchMode::Add);

    search.on_query_change("paris");
    tokio::time::sleep(Duration::from_millis(600)).await;
    search.close();

    assert!(!search.poll_outcomes());
    assert!(search.results().is_empty());
    assert!(!search.is_open());
}

#[tokio::test(start_paused = true)]
async fn closing_before_the_delay_cancels_the_call() {
    let mock = Arc::new(MockBackend::new());
    let mut search = search(&mock);
    search.open(SearchMode::Add);

    search.on_query_change("berlin");
    search.close();
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert!(mock.search_queries().is_empty());
}

#[tokio::test(start_paused = true)]
async fn closed_search_ignores_typing() {
    let mock = Arc::new(MockBackend::new());
    let mut search = search(&mock);

    search.on_query_change("berlin");
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(search.query(), "");
    assert!(mock.search_queries().is_empty());
}

#[tokio::test(start_paused = true)]
async fn selection_carries_mode_and_closes() {
    let mock = Arc::new(MockBackend::new());
    mock.set_search_results(
        "opera",
        Ok(vec![fixtures::search_item(9, ItemType::Activity, "Opera night")]),
    );
    let mut search = search(&mock);
    let mode = SearchMode::Replace {
        map_id: MapId::new(12),
        current_name: "Museum".to_string(),
    };
    search.open(mode.clone());
    search.on_query_change("opera");
    search.next_outcome().await;

    let selection = search.select_index(0).unwrap();

    assert_eq!(selection.item, ItemRef::Activity(ActivityId::new(9)));
    assert_eq!(selection.mode, mode);
    assert!(!search.is_open());
    assert!(search.select_index(0).is_none());
}
