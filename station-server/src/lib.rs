use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use warp::Filter;
use warp::http::StatusCode;

use crate::station_manager::{
    BlockRequest, DisplayUpdate, ManagerError, NewMemberRequest, StartRequest, StationManager,
};
use station_core::EngineError;
use station_types::{BoxId, DisplayKey};

#[derive(Deserialize)]
struct NewTeamRequest {
    name: String,
}

pub mod config;
pub mod link;
pub mod station_manager;

type JsonReply = warp::reply::WithStatus<warp::reply::Json>;

pub fn create_routes(
    manager: Arc<StationManager>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let manager_filter = warp::any().map(move || manager.clone());

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    // Dashboard
    let snapshot = warp::path!("snapshot")
        .and(warp::get())
        .and(manager_filter.clone())
        .and_then(handle_snapshot_request);

    let box_status = warp::path!("boxes" / "status")
        .and(warp::get())
        .and(manager_filter.clone())
        .and_then(handle_box_status_request);

    let lines = warp::path!("lines")
        .and(warp::get())
        .and(manager_filter.clone())
        .and_then(handle_lines_request);

    // Session control
    let start = warp::path!("session" / "start")
        .and(warp::post())
        .and(warp::body::json::<StartRequest>())
        .and(manager_filter.clone())
        .and_then(handle_start_request);

    let pause = warp::path!("session" / "pause")
        .and(warp::post())
        .and(manager_filter.clone())
        .and_then(|manager: Arc<StationManager>| async move {
            Ok::<_, warp::Rejection>(json_ok(&manager.pause().await))
        });

    let reset = warp::path!("session" / "reset")
        .and(warp::post())
        .and(manager_filter.clone())
        .and_then(|manager: Arc<StationManager>| async move {
            Ok::<_, warp::Rejection>(json_ok(&manager.reset().await))
        });

    // Enrollment
    let select_tag = warp::path!("tags" / String / "select")
        .and(warp::post())
        .and(manager_filter.clone())
        .and_then(handle_select_tag_request);

    let add_team = warp::path!("teams")
        .and(warp::post())
        .and(warp::body::json::<NewTeamRequest>())
        .and(manager_filter.clone())
        .and_then(handle_add_team_request);

    let add_member = warp::path!("members")
        .and(warp::post())
        .and(warp::body::json::<NewMemberRequest>())
        .and(manager_filter.clone())
        .and_then(handle_add_member_request);

    // Blocks
    let block_box = warp::path!("boxes" / BoxId / "block")
        .and(warp::post())
        .and(warp::body::json::<BlockRequest>())
        .and(manager_filter.clone())
        .and_then(handle_block_box_request);

    let unblock_box = warp::path!("boxes" / BoxId / "block")
        .and(warp::delete())
        .and(manager_filter.clone())
        .and_then(|box_id: BoxId, manager: Arc<StationManager>| async move {
            let was_blocked = manager.unblock_box(box_id).await;
            Ok::<_, warp::Rejection>(json_ok(&serde_json::json!({ "was_blocked": was_blocked })))
        });

    let block_member = warp::path!("members" / Uuid / "block")
        .and(warp::post())
        .and(warp::body::json::<BlockRequest>())
        .and(manager_filter.clone())
        .and_then(handle_block_member_request);

    let unblock_member = warp::path!("members" / Uuid / "block")
        .and(warp::delete())
        .and(manager_filter.clone())
        .and_then(handle_unblock_member_request);

    // Display settings
    let get_display = warp::path!("display" / String)
        .and(warp::get())
        .and(manager_filter.clone())
        .and_then(handle_get_display_request);

    let update_display = warp::path!("display" / String)
        .and(warp::put())
        .and(warp::body::json::<DisplayUpdate>())
        .and(manager_filter.clone())
        .and_then(handle_update_display_request);

    // CORS configuration
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "POST", "PUT", "DELETE"]);

    health
        .or(snapshot)
        .or(box_status)
        .or(lines)
        .or(start)
        .or(pause)
        .or(reset)
        .or(select_tag)
        .or(add_team)
        .or(add_member)
        .or(block_box)
        .or(unblock_box)
        .or(block_member)
        .or(unblock_member)
        .or(get_display)
        .or(update_display)
        .with(cors)
        .with(warp::log("station_server"))
}

fn json_ok<T: serde::Serialize>(value: &T) -> JsonReply {
    warp::reply::with_status(warp::reply::json(value), StatusCode::OK)
}

fn json_error(message: impl std::fmt::Display, status: StatusCode) -> JsonReply {
    warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message.to_string()
        })),
        status,
    )
}

fn manager_error_reply(err: ManagerError) -> JsonReply {
    let status = match &err {
        ManagerError::Engine(
            EngineError::TeamNotFound(_)
            | EngineError::TagNotFound(_)
            | EngineError::MemberNotFound(_),
        ) => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_REQUEST,
    };
    json_error(err, status)
}

async fn handle_snapshot_request(
    manager: Arc<StationManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(json_ok(&manager.snapshot().await))
}

async fn handle_box_status_request(
    manager: Arc<StationManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(json_ok(&manager.box_status().await))
}

async fn handle_lines_request(
    manager: Arc<StationManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(json_ok(&manager.recent_lines().await))
}

async fn handle_start_request(
    request: StartRequest,
    manager: Arc<StationManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match manager.start(request).await {
        Ok(state) => Ok(json_ok(&state)),
        Err(err) => Ok(manager_error_reply(err)),
    }
}

async fn handle_select_tag_request(
    tag: String,
    manager: Arc<StationManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match manager.select_tag(&tag).await {
        Ok(()) => Ok(json_ok(&serde_json::json!({ "selected": tag }))),
        Err(err) => Ok(manager_error_reply(err)),
    }
}

async fn handle_add_team_request(
    request: NewTeamRequest,
    manager: Arc<StationManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let name = request.name.trim();
    if name.is_empty() {
        return Ok(json_error("Team name is empty", StatusCode::BAD_REQUEST));
    }

    if manager.add_team(name).await {
        Ok(json_ok(&serde_json::json!({ "name": name })))
    } else {
        Ok(json_error(
            format!("Team {} already exists", name),
            StatusCode::CONFLICT,
        ))
    }
}

async fn handle_add_member_request(
    request: NewMemberRequest,
    manager: Arc<StationManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match manager.add_member(request).await {
        Ok(member_id) => Ok(json_ok(&serde_json::json!({ "member_id": member_id }))),
        Err(err) => Ok(manager_error_reply(err)),
    }
}

async fn handle_block_box_request(
    box_id: BoxId,
    request: BlockRequest,
    manager: Arc<StationManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match manager.block_box(box_id, request).await {
        Ok(()) => Ok(json_ok(&serde_json::json!({ "blocked": box_id }))),
        Err(err) => Ok(manager_error_reply(err)),
    }
}

async fn handle_block_member_request(
    member_id: Uuid,
    request: BlockRequest,
    manager: Arc<StationManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match manager.block_member(member_id, request).await {
        Ok(()) => Ok(json_ok(&serde_json::json!({ "blocked": member_id }))),
        Err(err) => Ok(manager_error_reply(err)),
    }
}

async fn handle_unblock_member_request(
    member_id: Uuid,
    manager: Arc<StationManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match manager.unblock_member(member_id).await {
        Ok(was_blocked) => Ok(json_ok(&serde_json::json!({ "was_blocked": was_blocked }))),
        Err(err) => Ok(manager_error_reply(err)),
    }
}

async fn handle_get_display_request(
    key: String,
    manager: Arc<StationManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match key.parse::<DisplayKey>() {
        Ok(key) => Ok(json_ok(&manager.display_setting(key).await)),
        Err(err) => Ok(json_error(err, StatusCode::NOT_FOUND)),
    }
}

async fn handle_update_display_request(
    key: String,
    update: DisplayUpdate,
    manager: Arc<StationManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let key = match key.parse::<DisplayKey>() {
        Ok(key) => key,
        Err(err) => return Ok(json_error(err, StatusCode::NOT_FOUND)),
    };

    match manager.update_display(key, update).await {
        Ok(setting) => Ok(json_ok(&setting)),
        Err(err) => Ok(manager_error_reply(err)),
    }
}
