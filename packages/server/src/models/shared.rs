use serde::Serialize;

/// Pagination metadata attached to list responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Pagination {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

/// Escape `%`, `_`, and `\` for use inside a SQL LIKE pattern.
pub fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
