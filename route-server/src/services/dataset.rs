//! 数据集服务
//!
//! handler 不直接碰存储。读取走 redb 读事务；每一次写入
//! (整体提交、卡片级操作、附件上传) 都在同一个写事务里完成
//! 规范化 → 标识符去重 → 合并 → 提交。

use shared::models::{Attachment, Card, Dataset, Operation, RouteOperation, WorkCenter};
use shared::util::gen_id;

use crate::core::ServerState;
use crate::persistence;
use crate::registry::unique_operation_code;
use crate::storage::StorageError;
use crate::utils::{AppError, AppResult, ErrorCode};

/// 在阻塞线程池执行存储操作
async fn blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::from(StorageError::Task(e.to_string())))?
}

pub fn card_not_found(card_id: &str) -> AppError {
    AppError::with_message(ErrorCode::CardNotFound, format!("Card not found: {}", card_id))
        .with_detail("cardId", card_id)
}

/// 最近一次提交的数据集
pub async fn load(state: &ServerState) -> AppResult<Dataset> {
    let storage = state.storage.clone();
    blocking(move || Ok(storage.load()?)).await
}

pub async fn revision(state: &ServerState) -> AppResult<u64> {
    let storage = state.storage.clone();
    blocking(move || Ok(storage.revision()?)).await
}

pub async fn load_card(state: &ServerState, card_id: &str) -> AppResult<Card> {
    let data = load(state).await?;
    data.card(card_id)
        .cloned()
        .ok_or_else(|| card_not_found(card_id))
}

/// 独占提交
///
/// `build` 在写事务内拿到当前数据集和时间，返回待提交的数据集草稿；
/// 草稿随后经过完整的合并流程。任何一步失败都不会写入。
pub async fn commit<T, F>(state: &ServerState, build: F) -> AppResult<(Dataset, T)>
where
    F: FnOnce(&Dataset, i64) -> AppResult<(Dataset, T)> + Send + 'static,
    T: Send + 'static,
{
    let storage = state.storage.clone();
    let now = state.now();
    let (saved, extra) = blocking(move || {
        storage.update(|current| {
            let (draft, extra) = build(&current, now)?;
            let merged = persistence::submit(&current, draft, now)?;
            Ok::<_, AppError>((merged, extra))
        })
    })
    .await?;
    tracing::info!(
        cards = saved.cards.len(),
        ops = saved.ops.len(),
        centers = saved.centers.len(),
        "Dataset committed"
    );
    Ok((saved, extra))
}

/// 客户端提交完整数据集
pub async fn submit_dataset(state: &ServerState, incoming: Dataset) -> AppResult<Dataset> {
    let (saved, ()) = commit(state, move |_, _| Ok((incoming, ()))).await?;
    Ok(saved)
}

/// 修改单张卡片并提交，返回合并后的卡片
///
/// `f` 作用在当前数据集的独立副本上；返回错误时什么都不写。
pub async fn mutate_card<T, F>(state: &ServerState, card_id: &str, f: F) -> AppResult<(Card, T)>
where
    F: FnOnce(&mut Card, i64) -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    let id = card_id.to_string();
    let (saved, extra) = commit(state, move |current, now| {
        let mut draft = current.clone();
        let card = draft.card_mut(&id).ok_or_else(|| card_not_found(&id))?;
        let extra = f(card, now)?;
        Ok((draft, extra))
    })
    .await?;
    let card = saved
        .card(card_id)
        .cloned()
        .ok_or_else(|| card_not_found(card_id))?;
    Ok((card, extra))
}

/// 按附件 id 在所有卡片中查找
pub fn find_attachment<'a>(data: &'a Dataset, attachment_id: &str) -> Option<(&'a Card, &'a Attachment)> {
    data.cards.iter().find_map(|card| {
        card.attachments
            .iter()
            .find(|a| a.id == attachment_id)
            .map(|a| (card, a))
    })
}

// ============================================================================
// 示例数据
// ============================================================================

/// 默认目录：三个工作中心、三道工序和一张示例卡片
pub fn demo_dataset() -> AppResult<Dataset> {
    let centers = vec![
        center("Machining", "Turning and milling"),
        center("Coating / spraying", "Coatings, thermal spraying"),
        center("Quality control", "Measurement, inspection, visual check"),
    ];

    let mut used = std::collections::HashSet::new();
    let mut ops = Vec::with_capacity(3);
    for (name, desc, rec_time) in [
        ("Turning", "Roughing and finishing", 40),
        ("Coating", "HVOF / APS", 60),
        ("Dimensional inspection", "Measurements, inspection report", 20),
    ] {
        let code = unique_operation_code(&used)?;
        used.insert(code.clone());
        ops.push(Operation {
            id: gen_id("op"),
            code,
            name: name.to_string(),
            desc: desc.to_string(),
            rec_time,
        });
    }

    let operations = [("Ivanov I.", 40), ("Petrov P.", 60), ("Sidorov S.", 20)]
        .into_iter()
        .enumerate()
        .map(|(idx, (executor, minutes))| {
            RouteOperation::from_refs(
                &ops[idx],
                &centers[idx],
                executor,
                Some(minutes),
                idx as i64 + 1,
                None,
                false,
                None,
            )
        })
        .collect();

    let card = Card {
        id: gen_id("card"),
        name: "Drive shaft Ø60".to_string(),
        order_no: "DEMO-001".to_string(),
        desc: "Demo card".to_string(),
        operations,
        ..Default::default()
    };

    Ok(Dataset {
        cards: vec![card],
        ops,
        centers,
    })
}

fn center(name: &str, desc: &str) -> WorkCenter {
    WorkCenter {
        id: gen_id("wc"),
        name: name.to_string(),
        desc: desc.to_string(),
    }
}

/// 空库时写入示例数据，返回是否写入
pub async fn seed_if_empty(state: &ServerState) -> AppResult<bool> {
    if !load(state).await?.is_empty() {
        return Ok(false);
    }
    let seeded = commit(state, |current, _| {
        if !current.is_empty() {
            return Ok((current.clone(), false));
        }
        Ok((demo_dataset()?, true))
    })
    .await?
    .1;
    if seeded {
        tracing::info!("Seeded demo dataset");
    }
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use crate::storage::DatasetStorage;
    use crate::utils::ManualClock;
    use std::sync::Arc;

    fn state() -> ServerState {
        let storage = DatasetStorage::open_in_memory().unwrap();
        let config = Config::with_overrides("/tmp/route-server-unit", 0);
        ServerState::new(config, storage, Arc::new(ManualClock::new(1_700_000_000_000)))
    }

    #[test]
    fn test_demo_dataset_shape() {
        let data = demo_dataset().unwrap();
        assert_eq!(data.centers.len(), 3);
        assert_eq!(data.ops.len(), 3);
        let card = &data.cards[0];
        assert_eq!(card.operations.len(), 3);
        assert_eq!(card.operations[0].op_code, data.ops[0].code);
        assert_eq!(card.operations[1].planned_minutes, 60);
        assert_eq!(card.operations[2].center_name, "Quality control");
    }

    #[tokio::test]
    async fn test_seed_only_once() {
        let state = state();
        assert!(seed_if_empty(&state).await.unwrap());
        assert!(!seed_if_empty(&state).await.unwrap());

        let data = load(&state).await.unwrap();
        assert_eq!(data.cards.len(), 1);
        assert!(data.cards[0].initial_snapshot.is_some());
        assert_eq!(data.cards[0].barcode.len(), 13);
        assert_eq!(revision(&state).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_mutation_writes_nothing() {
        let state = state();
        seed_if_empty(&state).await.unwrap();
        let before = load(&state).await.unwrap();
        let card_id = before.cards[0].id.clone();

        let result: AppResult<(Card, ())> = mutate_card(&state, &card_id, |card, _| {
            card.name = "half-written".into();
            Err(AppError::validation("rejected"))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(load(&state).await.unwrap(), before);

        let err = load_card(&state, "missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CardNotFound);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_commits_are_serialized() {
        use crate::audit::{LogChange, actions, record_log};

        let state = state();
        seed_if_empty(&state).await.unwrap();
        let card_id = load(&state).await.unwrap().cards[0].id.clone();
        let logs_before = load_card(&state, &card_id).await.unwrap().logs.len();

        let mut handles = Vec::new();
        for i in 0..40 {
            let state = state.clone();
            let card_id = card_id.clone();
            handles.push(tokio::spawn(async move {
                mutate_card(&state, &card_id, move |card, now| {
                    let change = LogChange::card(actions::FIELD_CHANGE, Some("desc"), "", i.to_string());
                    record_log(card, change, now);
                    Ok(())
                })
                .await
            }));
        }
        for i in 0..10 {
            let state = state.clone();
            handles.push(tokio::spawn(async move {
                commit(&state, move |current, _| {
                    let mut next = current.clone();
                    next.cards.push(Card {
                        id: format!("card_extra_{i}"),
                        name: format!("Extra {i}"),
                        ..Default::default()
                    });
                    Ok((next, ()))
                })
                .await
                .map(|(data, ())| (data.cards[0].clone(), ()))
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let data = load(&state).await.unwrap();
        assert_eq!(data.cards.len(), 11);
        let card = data.card(&card_id).unwrap();
        assert_eq!(card.logs.len(), logs_before + 40);
        let barcodes: std::collections::HashSet<_> = data.cards.iter().map(|c| &c.barcode).collect();
        assert_eq!(barcodes.len(), 11);
        assert_eq!(revision(&state).await.unwrap(), 51);
    }
}
