use std::sync::Arc;

use axum::{
    Extension,
    Json,
    extract::{Multipart, Path, multipart::MultipartError},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::{debug, info};

// Import schemas and the in-memory store
use crate::models::ProfileImage;
use crate::schemas::UserStoreRequestSchema;
use crate::store::{NewUser, StoreError, UserStore};

// Import util response API
use crate::utils::handler::{HandlerReply, HandlerResult};
use crate::utils::response::ApiResponse;
use crate::utils::validation::validate_payload;

const EMAIL_TAKEN: &str = "The email has already been taken.";
const ROLE_INVALID: &str = "The selected role id is invalid.";
const IMAGE_REQUIRED: &str = "The profile image field is required.";

fn bad_multipart(e: MultipartError) -> HandlerReply {
    let response = ApiResponse::error_with_data(
        "Invalid multipart body",
        json!({ "error": e.body_text() }),
    );
    (StatusCode::BAD_REQUEST, Json(response))
}

fn field_error(field: &str, message: &str) -> HandlerReply {
    let mut errors = serde_json::Map::new();
    errors.insert(field.to_string(), json!([message]));
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse::validation_error(errors)),
    )
}

pub async fn index(Extension(store): Extension<Arc<UserStore>>) -> HandlerResult {
    let users = store.list().await;
    let response = ApiResponse::success_with_data("Users fetched successfully", json!(users));
    Ok((StatusCode::OK, Json(response)))
}

/// Read the create request parts into the request schema.
async fn read_payload(multipart: &mut Multipart) -> Result<UserStoreRequestSchema, HandlerReply> {
    let mut payload = UserStoreRequestSchema::default();
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == "profile_image" {
            let file_name = field.file_name().unwrap_or("profile_image").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field.bytes().await.map_err(bad_multipart)?;
            if !bytes.is_empty() {
                let image = ProfileImage::new(file_name, content_type, bytes.to_vec());
                payload.profile_image = Some(image);
            }
            continue;
        }

        let value = field.text().await.map_err(bad_multipart)?;
        match name.as_str() {
            "name" => payload.name = value,
            "email" => payload.email = value,
            "phone" => payload.phone = value,
            "description" => payload.description = value,
            // Unparsable ids fall through to the range check.
            "role_id" => payload.role_id = value.trim().parse().unwrap_or(0),
            other => debug!(field = other, "Ignoring unknown multipart field"),
        }
    }
    Ok(payload)
}

pub async fn store(
    Extension(store): Extension<Arc<UserStore>>,
    mut multipart: Multipart,
) -> HandlerResult {
    let payload = read_payload(&mut multipart).await?;

    // Validate the incoming payload
    let mut errors = validate_payload(&payload).err().unwrap_or_default();
    if payload.role_id > 0 && !store.roles().contains(payload.role_id) {
        errors.insert("role_id".to_string(), json!([ROLE_INVALID]));
    }
    if !errors.is_empty() {
        debug!(fields = errors.len(), "Rejected create request");
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::validation_error(errors)),
        ));
    }

    let Some(profile_image) = payload.profile_image else {
        return Err(field_error("profile_image", IMAGE_REQUIRED));
    };

    let new_user = NewUser {
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        description: payload.description,
        profile_image,
        role_id: payload.role_id,
    };

    match store.insert(new_user).await {
        Ok(user) => {
            info!(user_id = user.id, "User created");
            let response = ApiResponse::success_with_data("User created", json!(user));
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(StoreError::EmailTaken) => Err(field_error("email", EMAIL_TAKEN)),
        Err(StoreError::UnknownRole(_)) => Err(field_error("role_id", ROLE_INVALID)),
    }
}

pub async fn profile_image(
    Extension(store): Extension<Arc<UserStore>>,
    Path(id): Path<i64>,
) -> Response {
    match store.profile_image(id).await {
        Some(image) => ([(header::CONTENT_TYPE, image.content_type)], image.bytes).into_response(),
        None => {
            let response: ApiResponse<Value> =
                ApiResponse::error_with_data("Not found", json!({ "error": "User not found" }));
            (StatusCode::NOT_FOUND, Json(response)).into_response()
        }
    }
}
