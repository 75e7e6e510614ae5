// handlers/protected/me.rs - GET /api/users/me

use axum::extract::State;

use crate::api::UserView;
use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// Profile of the token's owner, read fresh from the store.
pub async fn me_get(State(state): State<AppState>, auth_user: AuthUser) -> ApiResult<UserView> {
    let record = state.repository::<User>().select_404(auth_user.id).await?;
    Ok(ApiResponse::success(UserView::from(record)))
}

#[cfg(test)]
mod tests {
    use crate::testing::TestContext;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn token_gate_messages() {
        let ctx = TestContext::new();
        let res = ctx.get("/api/users/me").await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
        assert_eq!(res.body["message"], "No token, authorization denied.");

        let res = ctx.get_with_token("/api/users/me", "not-a-token").await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
        assert_eq!(res.body["message"], "Token is not valid.");
    }

    #[tokio::test]
    async fn deleted_owner_is_not_found() {
        let ctx = TestContext::new();
        let id = ctx.create_parent("sam@example.com").await;
        let token = ctx.login("sam@example.com", crate::testing::PASSWORD).await;

        let res = ctx.get_with_token("/api/users/me", &token).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["email"], "sam@example.com");

        let admin = ctx.admin_token().await;
        let res = ctx.delete_with_token(&format!("/api/users/{}", id), &admin).await;
        assert_eq!(res.status, StatusCode::OK);

        let res = ctx.get_with_token("/api/users/me", &token).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.body["message"], "User not found");
    }
}
