use serde_json::json;

use crate::common::{TestApp, routes};

mod reviewing {
    use super::*;

    #[tokio::test]
    async fn review_is_created_and_listed_with_the_reviewers_name() {
        let app = TestApp::spawn().await;
        let seller = app.create_authenticated_user("seller", "securepass").await;
        let reviewer = app.create_authenticated_user("reviewer", "securepass").await;
        let id = app.create_product(&seller, "Field Guide", 40).await;

        let res = app
            .post_with_token(
                &routes::product_reviews(id),
                &json!({"rating": 4, "comment": "Well worth it"}),
                &reviewer,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["rating"], 4);
        assert_eq!(res.body["username"], "reviewer");
        assert_eq!(res.body["likes"], 0);

        let list = app.get_without_token(&routes::product_reviews(id)).await;
        let reviews = list.body.as_array().expect("reviews array");
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0]["comment"], "Well worth it");
    }

    #[tokio::test]
    async fn empty_comment_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("seller", "securepass").await;
        let id = app.create_product(&token, "Field Guide", 40).await;

        let res = app
            .post_with_token(
                &routes::product_reviews(id),
                &json!({"rating": 3, "comment": "   "}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn a_user_may_review_the_same_product_twice() {
        let app = TestApp::spawn().await;
        let seller = app.create_authenticated_user("seller", "securepass").await;
        let reviewer = app.create_authenticated_user("reviewer", "securepass").await;
        let id = app.create_product(&seller, "Field Guide", 40).await;

        app.create_review(id, &reviewer, 2, "First impression").await;
        app.create_review(id, &reviewer, 4, "Better on reread").await;

        let list = app.get_without_token(&routes::product_reviews(id)).await;
        assert_eq!(list.body.as_array().unwrap().len(), 2);
    }
}

mod likes {
    use super::*;

    #[tokio::test]
    async fn first_like_increments_the_counter() {
        let app = TestApp::spawn().await;
        let seller = app.create_authenticated_user("seller", "securepass").await;
        let liker = app.create_authenticated_user("liker", "securepass").await;
        let product_id = app.create_product(&seller, "Field Guide", 40).await;
        let review_id = app.create_review(product_id, &seller, 5, "My own book").await;

        let res = app
            .post_with_token(&routes::review_like(review_id), &json!({}), &liker)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["liked"], true);
        assert_eq!(res.body["likes"], 1);
    }

    #[tokio::test]
    async fn repeat_like_by_the_same_user_is_a_no_op() {
        let app = TestApp::spawn().await;
        let seller = app.create_authenticated_user("seller", "securepass").await;
        let liker = app.create_authenticated_user("liker", "securepass").await;
        let product_id = app.create_product(&seller, "Field Guide", 40).await;
        let review_id = app.create_review(product_id, &seller, 5, "My own book").await;

        app.post_with_token(&routes::review_like(review_id), &json!({}), &liker)
            .await;
        let second = app
            .post_with_token(&routes::review_like(review_id), &json!({}), &liker)
            .await;

        assert_eq!(second.status, 200);
        assert_eq!(second.body["liked"], false);
        assert_eq!(second.body["likes"], 1);
    }

    #[tokio::test]
    async fn likes_from_different_users_accumulate() {
        let app = TestApp::spawn().await;
        let seller = app.create_authenticated_user("seller", "securepass").await;
        let product_id = app.create_product(&seller, "Field Guide", 40).await;
        let review_id = app.create_review(product_id, &seller, 5, "My own book").await;

        for name in ["liker_a", "liker_b", "liker_c"] {
            let token = app.create_authenticated_user(name, "securepass").await;
            let res = app
                .post_with_token(&routes::review_like(review_id), &json!({}), &token)
                .await;
            assert_eq!(res.body["liked"], true);
        }

        let list = app
            .get_without_token(&routes::product_reviews(product_id))
            .await;
        assert_eq!(list.body[0]["likes"], 3);
    }

    #[tokio::test]
    async fn liking_a_missing_review_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("liker", "securepass").await;

        let res = app
            .post_with_token(&routes::review_like(987654), &json!({}), &token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}
