//! End-to-end HTTP behaviour against the in-memory preference store.

use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use user_preferences::Trace;
use user_preferences::domain::Username;
use user_preferences::domain::ports::{FixturePreferenceStore, PreferenceStore};
use user_preferences::inbound::http::preferences::{GREETING, configure};
use user_preferences::inbound::http::state::HttpState;

const USER: &str = "test-user";

fn username() -> Username {
    Username::new(USER).expect("valid username")
}

#[fixture]
fn store() -> Arc<FixturePreferenceStore> {
    Arc::new(FixturePreferenceStore::with_users([username()]))
}

async fn send(store: &Arc<FixturePreferenceStore>, request: test::TestRequest) -> ServiceResponse {
    let state = web::Data::new(HttpState::from_store(store.clone()));
    let app =
        test::init_service(App::new().app_data(state).wrap(Trace).configure(configure)).await;
    test::call_service(&app, request.to_request()).await
}

async fn body_text(response: ServiceResponse) -> String {
    let bytes = test::read_body(response).await;
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

#[rstest]
#[actix_web::test]
async fn greeting_is_fixed_text(store: Arc<FixturePreferenceStore>) {
    let response = send(&store, test::TestRequest::get().uri("/")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, GREETING);
}

#[rstest]
#[actix_web::test]
async fn get_returns_stored_document_flat(store: Arc<FixturePreferenceStore>) {
    store
        .seed_text(&username(), Some(r#"{"one":"two"}"#))
        .expect("seed");

    let response = send(&store, test::TestRequest::get().uri("/test-user")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("trace-id"));
    assert_eq!(body_text(response).await, r#"{"one":"two"}"#);
}

#[rstest]
#[actix_web::test]
async fn get_without_document_is_empty_object(store: Arc<FixturePreferenceStore>) {
    let response = send(&store, test::TestRequest::get().uri("/test-user")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "{}");
}

#[rstest]
#[actix_web::test]
async fn get_legacy_wrapped_document_unwraps(store: Arc<FixturePreferenceStore>) {
    store
        .seed_text(&username(), Some(r#"{"preferences":{"foo":"bar"}}"#))
        .expect("seed");

    let response = send(&store, test::TestRequest::get().uri("/test-user")).await;

    assert_eq!(body_text(response).await, r#"{"foo":"bar"}"#);
}

#[rstest]
#[actix_web::test]
async fn get_corrupt_document_is_server_error(store: Arc<FixturePreferenceStore>) {
    store
        .seed_text(&username(), Some("------------"))
        .expect("seed");

    let response = send(&store, test::TestRequest::get().uri("/test-user")).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(response).await.ends_with('\n'));
}

#[rstest]
#[case(test::TestRequest::get())]
#[case(test::TestRequest::put().set_payload(r#"{"one":"two"}"#))]
#[case(test::TestRequest::post().set_payload(r#"{"one":"two"}"#))]
#[case(test::TestRequest::delete())]
#[actix_web::test]
async fn unknown_user_is_rejected_for_every_method(
    store: Arc<FixturePreferenceStore>,
    #[case] request: test::TestRequest,
) {
    let response = send(&store, request.uri("/stranger")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "{\"user\":\"stranger\"}\n");
}

#[rstest]
#[case(test::TestRequest::get().uri("/%20ghost"), " ghost".to_owned())]
#[case(test::TestRequest::delete().uri(&format!("/{}", "a".repeat(300))), "a".repeat(300))]
#[actix_web::test]
async fn unusual_unknown_usernames_are_echoed(
    store: Arc<FixturePreferenceStore>,
    #[case] request: test::TestRequest,
    #[case] name: String,
) {
    let response = send(&store, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, format!("{}\n", json!({ "user": name })));
}

#[rstest]
#[actix_web::test]
async fn padded_username_resolves_when_registered() {
    let padded = Username::new(" padded ").expect("valid username");
    let store = Arc::new(FixturePreferenceStore::with_users([padded.clone()]));
    store
        .seed_text(&padded, Some(r#"{"one":"two"}"#))
        .expect("seed");

    let response = send(&store, test::TestRequest::get().uri("/%20padded%20")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, r#"{"one":"two"}"#);
}

#[rstest]
#[case(test::TestRequest::put())]
#[case(test::TestRequest::post())]
#[actix_web::test]
async fn first_write_inserts_and_responds_wrapped(
    store: Arc<FixturePreferenceStore>,
    #[case] request: test::TestRequest,
) {
    let response = send(
        &store,
        request.uri("/test-user").set_payload(r#"{"one":"two"}"#),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body, json!({"preferences": {"one": "two"}}));
    assert!(
        store
            .has_preferences(&username())
            .await
            .expect("presence lookup")
    );
    assert_eq!(
        store.stored_text(&username()).as_deref(),
        Some(r#"{"one":"two"}"#)
    );
}

#[rstest]
#[actix_web::test]
async fn post_over_existing_document_replaces_it(store: Arc<FixturePreferenceStore>) {
    store
        .seed_text(&username(), Some(r#"{"one":"two","three":"four"}"#))
        .expect("seed");

    let response = send(
        &store,
        test::TestRequest::post()
            .uri("/test-user")
            .set_payload(r#"{"one":"five"}"#),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        store.stored_text(&username()).as_deref(),
        Some(r#"{"one":"five"}"#)
    );
}

#[rstest]
#[actix_web::test]
async fn wrapped_input_round_trips_flat(store: Arc<FixturePreferenceStore>) {
    send(
        &store,
        test::TestRequest::put()
            .uri("/test-user")
            .set_payload(r#"{"preferences":{"one":"two"}}"#),
    )
    .await;

    let response = send(&store, test::TestRequest::get().uri("/test-user")).await;
    assert_eq!(body_text(response).await, r#"{"one":"two"}"#);
}

#[rstest]
#[case("------------")]
#[case(r#"["one","two"]"#)]
#[case("42")]
#[actix_web::test]
async fn malformed_body_is_rejected_without_mutation(
    store: Arc<FixturePreferenceStore>,
    #[case] payload: &'static str,
) {
    store
        .seed_text(&username(), Some(r#"{"keep":"me"}"#))
        .expect("seed");

    let response = send(
        &store,
        test::TestRequest::put().uri("/test-user").set_payload(payload),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.ends_with('\n'));
    assert_eq!(
        store.stored_text(&username()).as_deref(),
        Some(r#"{"keep":"me"}"#)
    );
}

#[rstest]
#[actix_web::test]
async fn delete_is_idempotent(store: Arc<FixturePreferenceStore>) {
    store
        .seed_text(&username(), Some(r#"{"one":"two"}"#))
        .expect("seed");

    for _ in 0..2 {
        let response = send(&store, test::TestRequest::delete().uri("/test-user")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.is_empty());
    }

    assert_eq!(store.stored_text(&username()), None);
    let response = send(&store, test::TestRequest::get().uri("/test-user")).await;
    assert_eq!(body_text(response).await, "{}");
}
