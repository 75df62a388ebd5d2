//! Store-backed properties, run against a local MongoDB. Ignored by
//! default; with mongod on 127.0.0.1:27017 run them via
//! `cargo test -- --ignored`. Each test works in its own database and
//! drops it on the way out.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use tower::ServiceExt;
use uuid::Uuid;

use todolist::{app, config::Config, models::PLACEHOLDER_ITEMS, state::AppData, store::Store};

const MONGO_URL: &str = "mongodb://127.0.0.1:27017";

struct TestDb {
    name: String,
    store: Store,
    router: Router,
}

async fn test_db() -> TestDb {
    let name = format!("todolist_test_{}", Uuid::new_v4().simple());
    let config = Config {
        bind_addr: "127.0.0.1:0".into(),
        mongodb_url: MONGO_URL.into(),
        mongodb_db: name.clone(),
        google: None,
    };
    let store = Store::connect(MONGO_URL, &name).await.unwrap();
    let router = app(AppData::new(store.clone(), &config).unwrap());
    TestDb {
        name,
        store,
        router,
    }
}

async fn drop_db(name: &str) {
    let client = mongodb::Client::with_uri_str(MONGO_URL).await.unwrap();
    client.database(name).drop().await.unwrap();
}

async fn get(router: &Router, path: &str, cookie: Option<&str>) -> Response {
    let mut request = Request::get(path);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    router
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_form(router: &Router, path: &str, cookie: Option<&str>, body: String) -> Response {
    let mut request = Request::post(path).header(
        header::CONTENT_TYPE,
        "application/x-www-form-urlencoded",
    );
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    router
        .clone()
        .oneshot(request.body(Body::from(body)).unwrap())
        .await
        .unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect carries a Location header")
        .to_str()
        .unwrap()
}

/// The `session_id=...` pair from a Set-Cookie header, for replaying.
fn session_cookie(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("response sets a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn register(db: &TestDb, username: &str) -> String {
    let response = post_form(
        &db.router,
        "/register",
        None,
        format!("username={username}&password=pw"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    session_cookie(&response)
}

#[tokio::test]
#[ignore = "requires a local mongod"]
async fn register_then_sign_in_reaches_the_list_view() {
    let db = test_db().await;

    let response = post_form(
        &db.router,
        "/register",
        None,
        "username=alice&password=hunter2".into(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/list");
    assert!(response.headers().contains_key(header::SET_COOKIE));

    // A wrong password re-renders the form and starts no session.
    let response = post_form(
        &db.router,
        "/login",
        None,
        "username=alice&password=wrong".into(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.headers().contains_key(header::SET_COOKIE));

    let response = post_form(
        &db.router,
        "/login",
        None,
        "username=alice&password=hunter2".into(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/list");
    let cookie = session_cookie(&response);

    let response = get(&db.router, "/list", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    drop_db(&db.name).await;
}

#[tokio::test]
#[ignore = "requires a local mongod"]
async fn default_list_seeds_three_placeholders_exactly_once() {
    let db = test_db().await;
    let cookie = register(&db, "bob").await;

    for _ in 0..2 {
        let response = get(&db.router, "/list", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let list = db.store.ensure_list("Today").await.unwrap();
    let names: Vec<&str> = list.items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, PLACEHOLDER_ITEMS);

    drop_db(&db.name).await;
}

#[tokio::test]
#[ignore = "requires a local mongod"]
async fn add_then_delete_restores_the_prior_item_set() {
    let db = test_db().await;
    let cookie = register(&db, "carol").await;

    let response = get(&db.router, "/Chores", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let before: Vec<_> = db
        .store
        .ensure_list("Chores")
        .await
        .unwrap()
        .items
        .iter()
        .map(|i| i.id)
        .collect();
    assert_eq!(before.len(), 3);

    let response = post_form(
        &db.router,
        "/list",
        Some(&cookie),
        "new_item=Sweep&list=Chores".into(),
    )
    .await;
    assert_eq!(location(&response), "/Chores");

    let after_add = db.store.ensure_list("Chores").await.unwrap();
    assert_eq!(after_add.items.len(), 4);
    let added = after_add.items.iter().find(|i| i.name == "Sweep").unwrap();

    let response = post_form(
        &db.router,
        "/delete",
        Some(&cookie),
        format!("checkbox={}&list_name=Chores", added.id.to_hex()),
    )
    .await;
    assert_eq!(location(&response), "/Chores");

    let after_delete: Vec<_> = db
        .store
        .ensure_list("Chores")
        .await
        .unwrap()
        .items
        .iter()
        .map(|i| i.id)
        .collect();
    assert_eq!(after_delete, before);

    drop_db(&db.name).await;
}

#[tokio::test]
#[ignore = "requires a local mongod"]
async fn google_find_or_create_is_idempotent() {
    let db = test_db().await;

    let first = db.store.find_or_create_google_user("sub-123").await.unwrap();
    let second = db.store.find_or_create_google_user("sub-123").await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.username, "google-sub-123");

    let by_name = db
        .store
        .find_user_by_username("google-sub-123")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_name.id, first.id);

    drop_db(&db.name).await;
}

#[tokio::test]
#[ignore = "requires a local mongod"]
async fn case_variant_paths_resolve_to_one_list() {
    let db = test_db().await;
    let cookie = register(&db, "dave").await;

    for path in ["/Weekend", "/weekend", "/WEEKEND"] {
        let response = get(&db.router, path, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let list = db.store.ensure_list("Weekend").await.unwrap();
    assert_eq!(list.items.len(), 3);

    drop_db(&db.name).await;
}
