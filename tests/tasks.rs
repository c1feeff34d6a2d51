mod common;

use std::net::TcpListener;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use actix_web::{rt, web, App, HttpServer};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use boardforge::auth::AuthMiddleware;
use boardforge::models::NewComment;
use boardforge::{routes, SharedStore, Store};
use common::{ids, new_store, seed_user, send, TestUser};

async fn create_board<S, B>(app: &S, owner: &TestUser, members: &[i32]) -> i64
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: actix_web::body::MessageBody,
{
    let req = TestRequest::post()
        .uri("/api/boards")
        .append_header(owner.bearer())
        .set_json(json!({ "title": "Board", "members": members }))
        .to_request();
    let (status, board) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "board creation failed: {}", board);
    board["id"].as_i64().unwrap()
}

async fn create_task<S, B>(app: &S, user: &TestUser, payload: Value) -> (StatusCode, Value)
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: actix_web::body::MessageBody,
{
    let req = TestRequest::post()
        .uri("/api/tasks")
        .append_header(user.bearer())
        .set_json(payload)
        .to_request();
    send(app, req).await
}

#[actix_rt::test]
async fn test_create_task_applies_defaults() {
    let store = new_store();
    let owner = seed_user(&store, "Owner").await;
    let member = seed_user(&store, "Member").await;
    let app = test_app!(store.clone());
    let board_id = create_board(&app, &owner, &[member.id]).await;

    let (status, task) = create_task(
        &app,
        &member,
        json!({ "board": board_id, "title": "Write docs", "reviewer_id": owner.id }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["board"], board_id);
    assert_eq!(task["status"], "to-do");
    assert_eq!(task["priority"], "medium");
    assert_eq!(task["description"], "");
    assert_eq!(task["assignee"], Value::Null);
    assert_eq!(task["reviewer"]["id"], owner.id);
    assert_eq!(task["reviewer"]["fullname"], "Owner Tester");
    assert_eq!(task["comments_count"], 0);

    let stored = store
        .find_task(task["id"].as_i64().unwrap() as i32)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.created_by, member.id);
}

#[actix_rt::test]
async fn test_create_task_rejections() {
    let store = new_store();
    let owner = seed_user(&store, "Owner").await;
    let outsider = seed_user(&store, "Outsider").await;
    let app = test_app!(store.clone());
    let board_id = create_board(&app, &owner, &[]).await;

    let (status, _) = create_task(
        &app,
        &outsider,
        json!({ "board": board_id, "title": "Sneaky" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = create_task(
        &app,
        &owner,
        json!({ "board": board_id, "title": "Hand off", "assignee_id": outsider.id }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["error"],
        format!("assignee_id {} is not a member of board {}", outsider.id, board_id)
    );

    let (status, _) = create_task(&app, &owner, json!({ "board": 999_999, "title": "Nowhere" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = create_task(&app, &owner, json!({ "title": "No board" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "board is required");

    let (status, _) = create_task(&app, &owner, json!({ "board": board_id, "title": "" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert!(store.tasks_for_board(board_id as i32).await.unwrap().is_empty());
}

#[actix_rt::test]
async fn test_create_task_authorizes_before_validating_payload() {
    let store = new_store();
    let owner = seed_user(&store, "Owner").await;
    let outsider = seed_user(&store, "Outsider").await;
    let app = test_app!(store.clone());
    let board_id = create_board(&app, &owner, &[]).await;

    let (status, _) = create_task(&app, &outsider, json!({ "board": board_id, "title": "" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = create_task(&app, &outsider, json!({ "board": 999_999, "title": "" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert!(store.tasks_for_board(board_id as i32).await.unwrap().is_empty());
}

#[actix_rt::test]
async fn test_outsider_cannot_read_update_or_delete_task() {
    let store = new_store();
    let owner = seed_user(&store, "Owner").await;
    let outsider = seed_user(&store, "Outsider").await;
    let app = test_app!(store.clone());
    let board_id = create_board(&app, &owner, &[]).await;
    let (_, task) = create_task(&app, &owner, json!({ "board": board_id, "title": "Private" })).await;
    let task_id = task["id"].as_i64().unwrap();
    let uri = format!("/api/tasks/{}", task_id);
    let before = store.find_task(task_id as i32).await.unwrap();

    let requests = [
        TestRequest::get().uri(&uri),
        TestRequest::patch()
            .uri(&uri)
            .set_json(json!({ "title": "Hijacked", "assignee_id": outsider.id })),
        TestRequest::delete().uri(&uri),
    ];
    for req in requests {
        let (status, _) = send(&app, req.append_header(outsider.bearer()).to_request()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    assert_eq!(store.find_task(task_id as i32).await.unwrap(), before);
}

#[actix_rt::test]
async fn test_task_links_are_checked_against_current_members() {
    let store = new_store();
    let owner = seed_user(&store, "Owner").await;
    let member = seed_user(&store, "Member").await;
    let app = test_app!(store.clone());
    let board_id = create_board(&app, &owner, &[member.id]).await;
    let (_, task) = create_task(&app, &owner, json!({ "board": board_id, "title": "Later" })).await;
    let task_id = task["id"].as_i64().unwrap();

    let req = TestRequest::patch()
        .uri(&format!("/api/boards/{}", board_id))
        .append_header(owner.bearer())
        .set_json(json!({ "members": [owner.id] }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);

    let req = TestRequest::patch()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header(owner.bearer())
        .set_json(json!({ "assignee_id": member.id }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["error"],
        format!("assignee_id {} is not a member of board {}", member.id, board_id)
    );

    let stored = store.find_task(task_id as i32).await.unwrap().unwrap();
    assert_eq!(stored.assignee_id, None);
}

#[actix_rt::test]
async fn test_update_rejects_board_key_even_when_unchanged() {
    let store = new_store();
    let owner = seed_user(&store, "Owner").await;
    let app = test_app!(store.clone());
    let board_id = create_board(&app, &owner, &[]).await;
    let (_, task) = create_task(&app, &owner, json!({ "board": board_id, "title": "Fixed" })).await;
    let task_id = task["id"].as_i64().unwrap();

    let req = TestRequest::patch()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header(owner.bearer())
        .set_json(json!({ "board": board_id, "title": "Moved?" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Changing the board of a task is not allowed");

    let stored = store.find_task(task_id as i32).await.unwrap().unwrap();
    assert_eq!(stored.title, "Fixed");
}

#[actix_rt::test]
async fn test_patch_response_and_partial_semantics() {
    let store = new_store();
    let owner = seed_user(&store, "Owner").await;
    let member = seed_user(&store, "Member").await;
    let app = test_app!(store.clone());
    let board_id = create_board(&app, &owner, &[member.id]).await;
    let (_, task) = create_task(
        &app,
        &owner,
        json!({
            "board": board_id,
            "title": "Partial",
            "description": "keep me",
            "assignee_id": member.id,
            "due_date": "2026-01-31"
        }),
    )
    .await;
    let task_id = task["id"].as_i64().unwrap();

    let req = TestRequest::patch()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header(member.bearer())
        .set_json(json!({ "status": "in-progress", "due_date": null }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("board").is_none());
    assert!(body.get("comments_count").is_none());
    assert_eq!(body["status"], "in-progress");
    assert_eq!(body["description"], "keep me");
    assert_eq!(body["assignee"]["id"], member.id);
    assert_eq!(body["due_date"], Value::Null);

    let req = TestRequest::patch()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header(owner.bearer())
        .set_json(json!({ "reviewer_id": 424242 }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_rt::test]
async fn test_task_deletion_rules() {
    let store = new_store();
    let owner = seed_user(&store, "Owner").await;
    let creator = seed_user(&store, "Creator").await;
    let bystander = seed_user(&store, "Bystander").await;
    let app = test_app!(store.clone());
    let board_id = create_board(&app, &owner, &[creator.id, bystander.id]).await;

    let mut task_ids = Vec::new();
    for _ in 0..2 {
        let (_, task) =
            create_task(&app, &creator, json!({ "board": board_id, "title": "Mine" })).await;
        task_ids.push(task["id"].as_i64().unwrap());
    }

    let req = TestRequest::delete()
        .uri(&format!("/api/tasks/{}", task_ids[0]))
        .append_header(bystander.bearer())
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    for (user, task_id) in [(&creator, task_ids[0]), (&owner, task_ids[1])] {
        let req = TestRequest::delete()
            .uri(&format!("/api/tasks/{}", task_id))
            .append_header(user.bearer())
            .to_request();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    assert!(store.tasks_for_board(board_id as i32).await.unwrap().is_empty());

    let req = TestRequest::get()
        .uri(&format!("/api/tasks/{}", task_ids[0]))
        .append_header(owner.bearer())
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_assigned_and_reviewing_views() {
    let store = new_store();
    let owner = seed_user(&store, "Owner").await;
    let member = seed_user(&store, "Member").await;
    let app = test_app!(store.clone());
    let board_id = create_board(&app, &owner, &[member.id]).await;

    let (_, both) = create_task(
        &app,
        &owner,
        json!({
            "board": board_id,
            "title": "Self review",
            "assignee_id": member.id,
            "reviewer_id": member.id
        }),
    )
    .await;
    let (_, assigned) = create_task(
        &app,
        &owner,
        json!({ "board": board_id, "title": "Assigned only", "assignee_id": member.id }),
    )
    .await;
    create_task(&app, &owner, json!({ "board": board_id, "title": "Unlinked" })).await;

    store
        .insert_comment(NewComment {
            task_id: both["id"].as_i64().unwrap() as i32,
            author_id: owner.id,
            content: "looks good".to_string(),
        })
        .await
        .unwrap();

    let req = TestRequest::get()
        .uri("/api/tasks/assigned-to-me")
        .append_header(member.bearer())
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        ids(&body),
        vec![assigned["id"].as_i64().unwrap(), both["id"].as_i64().unwrap()]
    );
    assert_eq!(body[1]["comments_count"], 1);
    assert_eq!(body[0]["comments_count"], 0);

    let req = TestRequest::get()
        .uri("/api/tasks/reviewing")
        .append_header(member.bearer())
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![both["id"].as_i64().unwrap()]);

    let req = TestRequest::get()
        .uri("/api/tasks/reviewing")
        .append_header(owner.bearer())
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body, json!([]));
}

#[actix_rt::test]
async fn test_list_all_tasks_is_not_allowed() {
    let store = new_store();
    let owner = seed_user(&store, "Owner").await;
    let app = test_app!(store.clone());

    let req = TestRequest::get()
        .uri("/api/tasks/")
        .append_header(owner.bearer())
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Listing all Tasks is not allowed");
}

#[actix_rt::test]
async fn test_requests_without_valid_token_are_rejected() {
    let store = new_store();
    let app = test_app!(store.clone());

    let req = TestRequest::get().uri("/api/tasks/assigned-to-me").to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = TestRequest::get()
        .uri("/api/boards")
        .append_header(("Authorization", "Bearer not-a-token"))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_create_task_unauthorized_over_http() {
    let store: SharedStore = new_store();

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::from(store.clone()))
            .service(routes::health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            )
    })
    .workers(1)
    .listen(listener)
    .expect("Failed to listen")
    .run();
    let handle = server.handle();
    rt::spawn(server);

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://127.0.0.1:{}/api/tasks", port))
        .json(&json!({ "board": 1, "title": "Unauthorized Task" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.expect("JSON error body");
    assert_eq!(body["error"], "Missing token");

    handle.stop(true).await;
}
