use crate::common::{TestApp, routes};

#[tokio::test]
async fn favorited_products_appear_in_the_list() {
    let app = TestApp::spawn().await;
    let seller = app.create_authenticated_user("seller", "securepass").await;
    let alice = app.create_authenticated_user("alice", "securepass").await;
    let id = app.create_product(&seller, "Field Guide", 40).await;

    let res = app
        .put_with_token(&routes::product_favorite(id), &alice)
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["favorited"], true);

    let list = app.get_with_token(routes::FAVORITES, &alice).await;
    let items = list.body.as_array().expect("favorites array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Field Guide");
    assert_eq!(items[0]["product_id"].as_i64().unwrap() as i32, id);
}

#[tokio::test]
async fn favoriting_twice_is_idempotent() {
    let app = TestApp::spawn().await;
    let seller = app.create_authenticated_user("seller", "securepass").await;
    let alice = app.create_authenticated_user("alice", "securepass").await;
    let id = app.create_product(&seller, "Field Guide", 40).await;

    app.put_with_token(&routes::product_favorite(id), &alice)
        .await;
    let second = app
        .put_with_token(&routes::product_favorite(id), &alice)
        .await;
    assert_eq!(second.status, 200);

    let list = app.get_with_token(routes::FAVORITES, &alice).await;
    assert_eq!(list.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn removing_a_favorite_empties_the_list() {
    let app = TestApp::spawn().await;
    let seller = app.create_authenticated_user("seller", "securepass").await;
    let alice = app.create_authenticated_user("alice", "securepass").await;
    let id = app.create_product(&seller, "Field Guide", 40).await;

    app.put_with_token(&routes::product_favorite(id), &alice)
        .await;
    let res = app
        .delete_with_token(&routes::product_favorite(id), &alice)
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["favorited"], false);

    let list = app.get_with_token(routes::FAVORITES, &alice).await;
    assert_eq!(list.body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn removing_an_absent_favorite_is_a_no_op() {
    let app = TestApp::spawn().await;
    let seller = app.create_authenticated_user("seller", "securepass").await;
    let alice = app.create_authenticated_user("alice", "securepass").await;
    let id = app.create_product(&seller, "Field Guide", 40).await;

    let res = app
        .delete_with_token(&routes::product_favorite(id), &alice)
        .await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["favorited"], false);
}

#[tokio::test]
async fn favoriting_a_missing_product_is_not_found() {
    let app = TestApp::spawn().await;
    let alice = app.create_authenticated_user("alice", "securepass").await;

    let res = app
        .put_with_token(&routes::product_favorite(777777), &alice)
        .await;

    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn favorites_are_scoped_to_the_user() {
    let app = TestApp::spawn().await;
    let seller = app.create_authenticated_user("seller", "securepass").await;
    let alice = app.create_authenticated_user("alice", "securepass").await;
    let bob = app.create_authenticated_user("bob", "securepass").await;
    let id = app.create_product(&seller, "Field Guide", 40).await;

    app.put_with_token(&routes::product_favorite(id), &alice)
        .await;

    let list = app.get_with_token(routes::FAVORITES, &bob).await;
    assert_eq!(list.body.as_array().unwrap().len(), 0);
}
