use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn deposit_increases_the_budget() {
    let app = TestApp::spawn().await;
    let token = app
        .create_user_with_budget("alice", "securepass", 100)
        .await;

    let res = app
        .post_with_token(routes::DEPOSIT, &json!({"amount": 50}), &token)
        .await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["budget"], 150);
    assert_eq!(app.budget_of(&token).await, 150);
}

#[tokio::test]
async fn zero_and_negative_amounts_are_rejected() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("alice", "securepass").await;

    for amount in [0, -5] {
        let res = app
            .post_with_token(routes::DEPOSIT, &json!({"amount": amount}), &token)
            .await;

        assert_eq!(res.status, 400, "amount {amount} should be rejected");
        assert_eq!(res.body["code"], "INVALID_AMOUNT");
    }

    assert_eq!(app.budget_of(&token).await, 0);
}

#[tokio::test]
async fn non_numeric_amount_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("alice", "securepass").await;

    let res = app
        .post_with_token(routes::DEPOSIT, &json!({"amount": "abc"}), &token)
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn deposits_require_authentication() {
    let app = TestApp::spawn().await;

    let res = app
        .post_without_token(routes::DEPOSIT, &json!({"amount": 50}))
        .await;

    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "TOKEN_MISSING");
}
