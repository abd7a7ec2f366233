pub mod user_schema;

pub use user_schema::{
    CreateUserForm, FormPart, PartValue, UserListResponse, UserStoreRequestSchema,
    field_errors_from_body, user_from_body,
};
