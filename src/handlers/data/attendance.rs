// handlers/data/attendance.rs - /api/attendance handlers

use axum::extract::{Path, State};

use super::{create_record, delete_record, find_record, single, update_record};
use crate::api::AttendanceView;
use crate::database::models::{Attendance, AttendancePatch, NewAttendance};
use crate::database::record::parse_id;
use crate::filter::Filter;
use crate::middleware::{ApiResponse, ApiResult, JsonBody, Message};
use crate::state::AppState;

/// POST /api/attendance - one record per child, group and date
pub async fn attendance_create(
    State(state): State<AppState>,
    JsonBody(draft): JsonBody<NewAttendance>,
) -> ApiResult<AttendanceView> {
    let record = create_record(&state, draft).await?;
    let view = single(state.populator().attendance(vec![record]).await?)?;
    Ok(ApiResponse::created(view))
}

/// GET /api/attendance
pub async fn attendance_list(State(state): State<AppState>) -> ApiResult<Vec<AttendanceView>> {
    let records = state.repository::<Attendance>().select_all().await?;
    Ok(ApiResponse::success(state.populator().attendance(records).await?))
}

async fn attendance_where(state: &AppState, field: &str, id: &str) -> ApiResult<Vec<AttendanceView>> {
    let id = parse_id(id)?;
    let records = state
        .repository::<Attendance>()
        .select_any(&Filter::by(field, id.to_string()))
        .await?;
    Ok(ApiResponse::success(state.populator().attendance(records).await?))
}

/// GET /api/attendance/child/:childId
pub async fn attendance_by_child(
    State(state): State<AppState>,
    Path(child_id): Path<String>,
) -> ApiResult<Vec<AttendanceView>> {
    attendance_where(&state, "childId", &child_id).await
}

/// GET /api/attendance/group/:groupId
pub async fn attendance_by_group(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> ApiResult<Vec<AttendanceView>> {
    attendance_where(&state, "groupId", &group_id).await
}

/// GET /api/attendance/:id
pub async fn attendance_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<AttendanceView> {
    let record = find_record::<Attendance>(&state, &id).await?;
    Ok(ApiResponse::success(single(state.populator().attendance(vec![record]).await?)?))
}

/// PUT /api/attendance/:id
pub async fn attendance_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<AttendancePatch>,
) -> ApiResult<AttendanceView> {
    let record = update_record::<Attendance>(&state, &id, patch).await?;
    Ok(ApiResponse::success(single(state.populator().attendance(vec![record]).await?)?))
}

/// DELETE /api/attendance/:id
pub async fn attendance_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Message> {
    delete_record::<Attendance>(&state, &id).await
}

#[cfg(test)]
mod tests {
    use crate::testing::TestContext;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn duplicate_session_is_rejected() {
        let ctx = TestContext::new();
        let child = ctx.create_child("Ana").await;
        let body = json!({
            "childId": child.id,
            "groupId": child.group_id,
            "date": "2024-09-02",
            "status": "present"
        });

        let first = ctx.post("/api/attendance", body.clone()).await;
        assert_eq!(first.status, StatusCode::CREATED);
        assert_eq!(first.body["groupId"]["schedule"], "Mon 16:00");

        // Same day written as a timestamp is the same session
        let mut again = body.clone();
        again["date"] = json!("2024-09-02T00:00:00Z");
        again["status"] = json!("absent");
        let second = ctx.post("/api/attendance", again).await;
        assert_eq!(second.status, StatusCode::BAD_REQUEST);
        assert_eq!(second.body["message"], "Attendance for this session already exists.");

        let all = ctx.get("/api/attendance").await;
        assert_eq!(all.body.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn update_cannot_collide_with_another_session() {
        let ctx = TestContext::new();
        let child = ctx.create_child("Ana").await;
        let mut ids = vec![];
        for date in ["2024-09-02", "2024-09-03"] {
            let res = ctx
                .post(
                    "/api/attendance",
                    json!({"childId": child.id, "groupId": child.group_id, "date": date, "status": "present"}),
                )
                .await;
            ids.push(res.body["id"].as_str().unwrap().to_string());
        }

        let res = ctx
            .put(&format!("/api/attendance/{}", ids[1]), json!({"date": "2024-09-02"}))
            .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);

        let res = ctx
            .put(&format!("/api/attendance/{}", ids[1]), json!({"status": "absent"}))
            .await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["status"], "absent");
        assert_eq!(res.body["date"], "2024-09-03T00:00:00.000Z");
    }

    #[tokio::test]
    async fn lookups_by_child_and_group_return_arrays() {
        let ctx = TestContext::new();
        let child = ctx.create_child("Ana").await;
        ctx.post(
            "/api/attendance",
            json!({"childId": child.id, "groupId": child.group_id, "date": "2024-09-02", "status": "present"}),
        )
        .await;

        let by_child = ctx.get(&format!("/api/attendance/child/{}", child.id)).await;
        assert_eq!(by_child.status, StatusCode::OK);
        assert_eq!(by_child.body.as_array().map(Vec::len), Some(1));

        let by_group = ctx.get(&format!("/api/attendance/group/{}", child.group_id)).await;
        assert_eq!(by_group.body.as_array().map(Vec::len), Some(1));

        let nobody = ctx.get(&format!("/api/attendance/child/{}", uuid::Uuid::new_v4())).await;
        assert_eq!(nobody.status, StatusCode::OK);
        assert_eq!(nobody.body, json!([]));
    }

    #[tokio::test]
    async fn invalid_status_is_rejected() {
        let ctx = TestContext::new();
        let child = ctx.create_child("Ana").await;
        let res = ctx
            .post(
                "/api/attendance",
                json!({"childId": child.id, "groupId": child.group_id, "date": "2024-09-02", "status": "late"}),
            )
            .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn record_is_read_by_id_until_deleted() {
        let ctx = TestContext::new();
        let child = ctx.create_child("Ana").await;
        let created = ctx
            .post(
                "/api/attendance",
                json!({"childId": child.id, "groupId": child.group_id, "date": "2024-09-02", "status": "present"}),
            )
            .await;
        let uri = format!("/api/attendance/{}", created.body["id"].as_str().unwrap());

        let res = ctx.get(&uri).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["status"], "present");
        assert_eq!(res.body["childId"]["name"], "Ana");

        assert_eq!(ctx.delete(&uri).await.status, StatusCode::OK);
        let res = ctx.get(&uri).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.body["message"], "Attendance not found");
    }

    #[tokio::test]
    async fn unknown_record_cannot_be_updated_or_deleted() {
        let ctx = TestContext::new();
        let uri = format!("/api/attendance/{}", uuid::Uuid::new_v4());

        let res = ctx.put(&uri, json!({"status": "absent"})).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(ctx.delete(&uri).await.status, StatusCode::NOT_FOUND);
        assert_eq!(ctx.get(&uri).await.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn status_update_survives_a_deleted_group() {
        let ctx = TestContext::new();
        let child = ctx.create_child("Ana").await;
        let created = ctx
            .post(
                "/api/attendance",
                json!({"childId": child.id, "groupId": child.group_id, "date": "2024-09-02", "status": "present"}),
            )
            .await;
        let uri = format!("/api/attendance/{}", created.body["id"].as_str().unwrap());
        assert_eq!(ctx.delete(&format!("/api/groups/{}", child.group_id)).await.status, StatusCode::OK);

        let res = ctx.put(&uri, json!({"status": "absent"})).await;
        assert_eq!(res.status, StatusCode::OK, "{}", res.body);
        assert_eq!(res.body["status"], "absent");
        assert_eq!(res.body["groupId"], child.group_id.to_string());

        // Pointing at a different missing group is still checked
        let res = ctx.put(&uri, json!({"groupId": uuid::Uuid::new_v4()})).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.body["message"], "Group not found");
    }
}
