//! Card API Handlers

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
};
use serde::Serialize;
use shared::models::{Card, CardStatus, Dataset, LogEntry, ProcessState};
use std::collections::HashSet;

use crate::audit::sorted_logs;
use crate::cards::{
    archive_card, create_card, duplicate_card, process_state as card_process_state,
    save_card_edit,
};
use crate::core::ServerState;
use crate::persistence::parse_object;
use crate::services::dataset::{self, card_not_found};
use crate::utils::AppResult;

fn barcodes(cards: &[Card]) -> HashSet<String> {
    cards.iter().map(|c| c.barcode.clone()).collect()
}

fn saved_card(data: &Dataset, id: &str) -> AppResult<Card> {
    data.card(id).cloned().ok_or_else(|| card_not_found(id))
}

/// GET /api/cards/{id} - 获取单张卡片
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Card>> {
    Ok(Json(dataset::load_card(&state, &id).await?))
}

/// POST /api/cards - 由草稿创建卡片
pub async fn create(State(state): State<ServerState>, body: Bytes) -> AppResult<Json<Card>> {
    let draft: Card = parse_object(&body, state.config.max_body_bytes)?;
    let (saved, id) = dataset::commit(&state, move |current, now| {
        let card = create_card(draft, &barcodes(&current.cards), now)?;
        let id = card.id.clone();
        let mut next = current.clone();
        next.cards.push(card);
        Ok((next, id))
    })
    .await?;
    tracing::info!(card_id = %id, "Card created");
    Ok(Json(saved_card(&saved, &id)?))
}

/// PUT /api/cards/{id} - 用编辑后的草稿覆盖卡片
///
/// 变更由 diff 推导并记录；`createdAt` / `initialSnapshot` / 日志以存储为准。
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Json<Card>> {
    let draft: Card = parse_object(&body, state.config.max_body_bytes)?;
    let (card, ()) = dataset::mutate_card(&state, &id, move |card, now| {
        *card = save_card_edit(card, draft, now);
        Ok(())
    })
    .await?;
    Ok(Json(card))
}

/// 删除响应
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    status: &'static str,
    id: String,
}

/// DELETE /api/cards/{id} - 删除卡片
///
/// 不可恢复，不写审计日志。
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteResponse>> {
    let target = id.clone();
    dataset::commit(&state, move |current, _| {
        let mut next = current.clone();
        let before = next.cards.len();
        next.cards.retain(|c| c.id != target);
        if next.cards.len() == before {
            return Err(card_not_found(&target));
        }
        Ok((next, ()))
    })
    .await?;
    tracing::warn!(card_id = %id, "Card deleted; this bypasses the audit trail");
    Ok(Json(DeleteResponse { status: "ok", id }))
}

/// POST /api/cards/{id}/duplicate - 复制卡片
pub async fn duplicate(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Card>> {
    let source_id = id.clone();
    let (saved, copy_id) = dataset::commit(&state, move |current, now| {
        let source = current
            .card(&source_id)
            .ok_or_else(|| card_not_found(&source_id))?;
        let copy = duplicate_card(source, &barcodes(&current.cards), now)?;
        let copy_id = copy.id.clone();
        let mut next = current.clone();
        next.cards.push(copy);
        Ok((next, copy_id))
    })
    .await?;
    tracing::info!(source_id = %id, card_id = %copy_id, "Card duplicated");
    Ok(Json(saved_card(&saved, &copy_id)?))
}

/// POST /api/cards/{id}/archive - 归档卡片
pub async fn archive(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Card>> {
    let (card, changed) =
        dataset::mutate_card(&state, &id, |card, now| Ok(archive_card(card, now))).await?;
    if changed {
        tracing::info!(card_id = %id, "Card archived");
    }
    Ok(Json(card))
}

/// GET /api/cards/{id}/logs - 按 `ts` 稳定排序的日志
pub async fn logs(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<LogEntry>>> {
    let card = dataset::load_card(&state, &id).await?;
    Ok(Json(sorted_logs(&card)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessStateResponse {
    card_id: String,
    /// 持久化状态
    status: CardStatus,
    /// 展示用状态，读取时计算
    state: ProcessState,
}

/// GET /api/cards/{id}/state - 展示用状态
pub async fn process_state(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ProcessStateResponse>> {
    let card = dataset::load_card(&state, &id).await?;
    Ok(Json(ProcessStateResponse {
        state: card_process_state(&card),
        status: card.status,
        card_id: card.id,
    }))
}
