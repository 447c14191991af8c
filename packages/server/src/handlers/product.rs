use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{product, purchase, review, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::handlers::files::{store_multipart_field, stream_blob_response};
use crate::models::product::*;
use crate::models::review::ReviewResponse;
use crate::models::shared::{Pagination, escape_like};
use crate::state::AppState;
use crate::utils::filename::validate_upload_filename;

/// Body limit layer for product uploads (two files; 160 MB).
pub fn upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(160 * 1024 * 1024)
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Products",
    operation_id = "listProducts",
    summary = "List products with pagination and search",
    description = "Public. Supports case-insensitive name search; newest first.",
    params(ProductListQuery),
    responses(
        (status = 200, description = "List of products", body = ProductListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ProductListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select = product::Entity::find();

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(product::Column::Name)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    let data = select
        .order_by_desc(product::Column::CreatedAt)
        .select_only()
        .column(product::Column::Id)
        .column(product::Column::Name)
        .column(product::Column::Price)
        .column(product::Column::UserId)
        .column(product::Column::ImageName)
        .column(product::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .into_model::<ProductListItem>()
        .all(&state.db)
        .await?;

    Ok(Json(ProductListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    operation_id = "getProduct",
    summary = "Get a product with its reviews",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product detail", body = ProductDetailResponse),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductDetailResponse>, AppError> {
    let model = find_product(&state.db, id).await?;

    let publisher = user::Entity::find_by_id(model.user_id)
        .one(&state.db)
        .await?
        .map(|u| u.username)
        .unwrap_or_default();

    let reviews = list_product_reviews(&state.db, id).await?;

    Ok(Json(ProductDetailResponse {
        product: model.into(),
        publisher,
        reviews,
    }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Products",
    operation_id = "createProduct",
    summary = "Publish a new product",
    description = "Multipart form with `name` and `price` text fields and `image` and `pdf` \
        file fields, all required. Body limit: 160 MB.",
    request_body(content_type = "multipart/form-data", description = "Product metadata and files"),
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = auth_user.user_id))]
pub async fn create_product(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut name: Option<String> = None;
    let mut price: Option<i64> = None;
    let mut image: Option<(common::storage::StoredBlob, String)> = None;
    let mut pdf: Option<(common::storage::StoredBlob, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("name") => {
                name = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read name: {e}"))
                })?);
            }
            Some("price") => {
                let text = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read price: {e}"))
                })?;
                price = Some(text.trim().parse::<i64>().map_err(|_| {
                    AppError::Validation("Price must be an integer".into())
                })?);
            }
            Some(kind @ ("image" | "pdf")) => {
                let is_image = kind == "image";
                let filename = field
                    .file_name()
                    .ok_or_else(|| {
                        AppError::Validation("File field must have a filename".into())
                    })?;
                let filename = validate_upload_filename(filename)
                    .map_err(|e| AppError::Validation(e.message().into()))?
                    .to_string();
                let blob = store_multipart_field(
                    field,
                    &*state.blob_store,
                    state.config.storage.max_upload_size,
                )
                .await?;
                if is_image {
                    image = Some((blob, filename));
                } else {
                    pdf = Some((blob, filename));
                }
            }
            _ => {} // Ignore unknown fields.
        }
    }

    let name = name.ok_or_else(|| AppError::Validation("Missing 'name' field".into()))?;
    let price = price.ok_or_else(|| AppError::Validation("Missing 'price' field".into()))?;
    let (image_blob, image_name) =
        image.ok_or_else(|| AppError::Validation("Missing 'image' file".into()))?;
    let (pdf_blob, pdf_name) =
        pdf.ok_or_else(|| AppError::Validation("Missing 'pdf' file".into()))?;

    let fields = validate_product_fields(&name, price)?;

    let new_product = product::ActiveModel {
        name: Set(fields.name),
        price: Set(fields.price),
        image_hash: Set(image_blob.hash.to_hex()),
        image_name: Set(image_name),
        image_size: Set(image_blob.size as i64),
        pdf_hash: Set(pdf_blob.hash.to_hex()),
        pdf_name: Set(pdf_name),
        pdf_size: Set(pdf_blob.size as i64),
        user_id: Set(auth_user.user_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_product.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(ProductResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}/image",
    tag = "Products",
    operation_id = "getProductImage",
    summary = "Download a product's cover image",
    description = "Public. Supports ETag caching via If-None-Match.",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Image content"),
        (status = 304, description = "Not Modified (ETag match)"),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers), fields(id))]
pub async fn get_product_image(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let model = find_product(&state.db, id).await?;

    stream_blob_response(
        &model.image_hash,
        &model.image_name,
        Some(model.image_size),
        false,
        &headers,
        &*state.blob_store,
    )
    .await
}

#[utoipa::path(
    get,
    path = "/{id}/pdf",
    tag = "Products",
    operation_id = "downloadProductPdf",
    summary = "Download the product file",
    description = "Only the publisher, a purchaser, or an admin may download the PDF.",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "PDF content"),
        (status = 304, description = "Not Modified (ETag match)"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not purchased (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, headers), fields(id, user_id = auth_user.user_id))]
pub async fn download_product_pdf(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let model = find_product(&state.db, id).await?;

    if model.user_id != auth_user.user_id && !auth_user.is_admin {
        let owned = purchase::Entity::find_by_id((auth_user.user_id, id))
            .one(&state.db)
            .await?;
        if owned.is_none() {
            return Err(AppError::PermissionDenied);
        }
    }

    stream_blob_response(
        &model.pdf_hash,
        &model.pdf_name,
        Some(model.pdf_size),
        true,
        &headers,
        &*state.blob_store,
    )
    .await
}

pub(crate) async fn find_product<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<product::Model, AppError> {
    product::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))
}

/// Load a product's reviews with reviewer usernames attached.
pub(crate) async fn list_product_reviews<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
) -> Result<Vec<ReviewResponse>, AppError> {
    let reviews = review::Entity::find()
        .filter(review::Column::ProductId.eq(product_id))
        .order_by_asc(review::Column::CreatedAt)
        .all(db)
        .await?;

    let user_ids: Vec<i32> = reviews.iter().map(|r| r.user_id).collect();
    let users: std::collections::HashMap<i32, String> = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();

    Ok(reviews
        .into_iter()
        .map(|r| {
            let username = users.get(&r.user_id).cloned().unwrap_or_default();
            ReviewResponse::from_model(r, username)
        })
        .collect())
}
