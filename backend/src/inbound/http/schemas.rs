//! OpenAPI schema definitions for types owned by other crates.
//!
//! `pagination::Page` stays framework-agnostic by not deriving `ToSchema`;
//! this mirror documents the envelope for utoipa.

use utoipa::ToSchema;

/// OpenAPI schema for `pagination::Page`.
///
/// One page of results and the opaque cursor for the next page.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PageSchema<T: ToSchema> {
    /// Items on this page, in result order.
    items: Vec<T>,
    /// Cursor for the following page; absent on the last page.
    #[schema(example = "eyJvZmZzZXQiOjIwfQ")]
    next_cursor: Option<String>,
}
