use serde_json::json;

use crate::common::{TestApp, TestResponse, routes};

mod catalog {
    use super::*;

    #[tokio::test]
    async fn published_product_appears_in_the_public_catalog() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("seller", "securepass").await;

        let id = app.create_product(&token, "Sourdough Field Guide", 40).await;

        let res = app.get_without_token(routes::PRODUCTS).await;
        assert_eq!(res.status, 200);

        let data = res.body["data"].as_array().expect("data array");
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["id"].as_i64().unwrap() as i32, id);
        assert_eq!(data[0]["name"], "Sourdough Field Guide");
        assert_eq!(data[0]["price"], 40);
        assert_eq!(res.body["pagination"]["total"], 1);
    }

    #[tokio::test]
    async fn search_matches_name_case_insensitively() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("seller", "securepass").await;
        app.create_product(&token, "Sourdough Field Guide", 40).await;
        app.create_product(&token, "Espresso Notes", 25).await;

        let res = app
            .get_without_token(&format!("{}?search=SOURDOUGH", routes::PRODUCTS))
            .await;

        let data = res.body["data"].as_array().expect("data array");
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["name"], "Sourdough Field Guide");
    }

    #[tokio::test]
    async fn search_treats_like_wildcards_as_literals() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("seller", "securepass").await;
        app.create_product(&token, "100% Cotton Patterns", 15).await;
        app.create_product(&token, "Espresso Notes", 25).await;

        let res = app
            .get_without_token(&format!("{}?search=%25", routes::PRODUCTS))
            .await;

        let data = res.body["data"].as_array().expect("data array");
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["name"], "100% Cotton Patterns");
    }

    #[tokio::test]
    async fn pagination_limits_and_reports_totals() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("seller", "securepass").await;
        for i in 0..5 {
            app.create_product(&token, &format!("Item {i}"), 10).await;
        }

        let res = app
            .get_without_token(&format!("{}?page=2&per_page=2", routes::PRODUCTS))
            .await;

        assert_eq!(res.body["data"].as_array().unwrap().len(), 2);
        assert_eq!(res.body["pagination"]["total"], 5);
        assert_eq!(res.body["pagination"]["total_pages"], 3);
    }

    #[tokio::test]
    async fn product_detail_includes_publisher_and_reviews() {
        let app = TestApp::spawn().await;
        let seller = app.create_authenticated_user("seller", "securepass").await;
        let buyer = app
            .create_user_with_budget("buyer", "securepass", 100)
            .await;

        let id = app.create_product(&seller, "Field Guide", 40).await;
        app.purchase(id, &buyer).await;
        app.create_review(id, &buyer, 5, "Excellent").await;

        let res = app.get_without_token(&routes::product(id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["publisher"], "seller");
        let reviews = res.body["reviews"].as_array().expect("reviews array");
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0]["username"], "buyer");
    }

    #[tokio::test]
    async fn missing_product_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(&routes::product(9999)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod publishing {
    use super::*;

    #[tokio::test]
    async fn publishing_requires_authentication() {
        let app = TestApp::spawn().await;

        let res = app
            .client
            .post(format!("http://{}{}", app.addr, routes::PRODUCTS))
            .multipart(reqwest::multipart::Form::new().text("name", "X"))
            .send()
            .await
            .expect("Failed to send request");

        let res = TestResponse::from_response(res).await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn publishing_without_files_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("seller", "securepass").await;

        let form = reqwest::multipart::Form::new()
            .text("name", "No files")
            .text("price", "10");
        let res = app
            .client
            .post(format!("http://{}{}", app.addr, routes::PRODUCTS))
            .header("Authorization", format!("Bearer {token}"))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send request");

        let res = TestResponse::from_response(res).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn non_numeric_price_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("seller", "securepass").await;

        let form = reqwest::multipart::Form::new()
            .text("name", "Bad price")
            .text("price", "abc")
            .part(
                "image",
                reqwest::multipart::Part::bytes(b"img".to_vec()).file_name("c.png"),
            )
            .part(
                "pdf",
                reqwest::multipart::Part::bytes(b"pdf".to_vec()).file_name("b.pdf"),
            );
        let res = app
            .client
            .post(format!("http://{}{}", app.addr, routes::PRODUCTS))
            .header("Authorization", format!("Bearer {token}"))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send request");

        let res = TestResponse::from_response(res).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod downloads {
    use super::*;

    #[tokio::test]
    async fn cover_image_is_public() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("seller", "securepass").await;
        let id = app.create_product(&token, "Field Guide", 40).await;

        let res = app.get_without_token(&routes::product_image(id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.text, "fake png bytes");
    }

    #[tokio::test]
    async fn image_download_supports_etag_revalidation() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("seller", "securepass").await;
        let id = app.create_product(&token, "Field Guide", 40).await;

        let first = app
            .client
            .get(format!("http://{}{}", app.addr, routes::product_image(id)))
            .send()
            .await
            .expect("Failed to send request");
        let etag = first
            .headers()
            .get("etag")
            .expect("response should carry an ETag")
            .to_str()
            .unwrap()
            .to_string();

        let second = app
            .client
            .get(format!("http://{}{}", app.addr, routes::product_image(id)))
            .header("If-None-Match", etag)
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(second.status().as_u16(), 304);
    }

    #[tokio::test]
    async fn pdf_requires_a_purchase() {
        let app = TestApp::spawn().await;
        let seller = app.create_authenticated_user("seller", "securepass").await;
        let buyer = app
            .create_user_with_budget("buyer", "securepass", 100)
            .await;
        let id = app.create_product(&seller, "Field Guide", 40).await;

        let before = app.get_with_token(&routes::product_pdf(id), &buyer).await;
        assert_eq!(before.status, 403);
        assert_eq!(before.body["code"], "PERMISSION_DENIED");

        app.purchase(id, &buyer).await;

        let after = app.get_with_token(&routes::product_pdf(id), &buyer).await;
        assert_eq!(after.status, 200);
        assert_eq!(after.text, "%PDF-1.4 fake");
    }

    #[tokio::test]
    async fn publisher_can_download_their_own_pdf() {
        let app = TestApp::spawn().await;
        let seller = app.create_authenticated_user("seller", "securepass").await;
        let id = app.create_product(&seller, "Field Guide", 40).await;

        let res = app.get_with_token(&routes::product_pdf(id), &seller).await;

        assert_eq!(res.status, 200);
    }

    #[tokio::test]
    async fn pdf_download_requires_authentication() {
        let app = TestApp::spawn().await;
        let seller = app.create_authenticated_user("seller", "securepass").await;
        let id = app.create_product(&seller, "Field Guide", 40).await;

        let res = app.get_without_token(&routes::product_pdf(id)).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }
}

mod reviews_listing {
    use super::*;

    #[tokio::test]
    async fn reviews_for_a_missing_product_are_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(&routes::product_reviews(424242)).await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn invalid_rating_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("seller", "securepass").await;
        let id = app.create_product(&token, "Field Guide", 40).await;

        for rating in [0, 6] {
            let res = app
                .post_with_token(
                    &routes::product_reviews(id),
                    &json!({"rating": rating, "comment": "hm"}),
                    &token,
                )
                .await;
            assert_eq!(res.status, 400, "rating {rating} should be rejected");
            assert_eq!(res.body["code"], "VALIDATION_ERROR");
        }
    }
}
