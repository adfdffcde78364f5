// ============================================================================
// Queries - Read-Only Use Cases
// ============================================================================

#[derive(Debug, Clone)]
pub struct GetUserQuery {
    pub user_id: String,
}

#[derive(Debug, Clone)]
pub struct GetUsersQuery {
    pub limit: i64,
    pub offset: i64,
    /// Accepted but not wired to the repository yet.
    pub search_term: Option<String>,
}

impl Default for GetUsersQuery {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
            search_term: None,
        }
    }
}
