//! 数据集级别的标识符去重

use shared::models::Dataset;
use std::collections::{HashMap, HashSet};

use super::barcode::{is_valid_ean13, unique_barcode};
use super::op_code::unique_operation_code;
use super::RegistryResult;

/// 对整个数据集执行标识符去重
///
/// 1. 目录工序代码：空白或重复的分配新代码
/// 2. 路线工序代码：引用的目录项有代码时沿用目录代码；
///    自动步骤代码 (`auto_code`) 为卡片内编号，不参与全局去重；
///    其余空白或与已占用代码冲突的分配新代码
/// 3. 卡片条码：缺失、校验失败或与前面卡片重复的分配新条码
///
/// 悬空引用（目录项已删除）不是错误，路线工序保留自己的代码。
pub fn ensure_identifiers(data: &mut Dataset) -> RegistryResult<()> {
    let mut used_codes: HashSet<String> = HashSet::new();
    for op in data.ops.iter_mut() {
        if op.code.is_empty() || used_codes.contains(&op.code) {
            op.code = unique_operation_code(&used_codes)?;
        }
        used_codes.insert(op.code.clone());
    }

    let catalog_codes: HashMap<&str, &str> = data
        .ops
        .iter()
        .map(|op| (op.id.as_str(), op.code.as_str()))
        .collect();

    for card in data.cards.iter_mut() {
        for route_op in card.operations.iter_mut() {
            if route_op.auto_code {
                continue;
            }
            if let Some(code) = catalog_codes
                .get(route_op.op_id.as_str())
                .filter(|c| !c.is_empty())
            {
                route_op.op_code = (*code).to_string();
                continue;
            }
            if route_op.op_code.is_empty() || used_codes.contains(&route_op.op_code) {
                route_op.op_code = unique_operation_code(&used_codes)?;
            }
            used_codes.insert(route_op.op_code.clone());
        }
    }

    let mut taken: HashSet<String> = data
        .cards
        .iter()
        .filter(|c| is_valid_ean13(&c.barcode))
        .map(|c| c.barcode.clone())
        .collect();
    let mut claimed: HashSet<String> = HashSet::new();
    for card in data.cards.iter_mut() {
        if is_valid_ean13(&card.barcode) && claimed.insert(card.barcode.clone()) {
            continue;
        }
        let fresh = unique_barcode(&taken)?;
        tracing::debug!(card_id = %card.id, old = %card.barcode, new = %fresh, "Assigned barcode");
        taken.insert(fresh.clone());
        claimed.insert(fresh.clone());
        card.barcode = fresh;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Card, Operation, RouteOperation};

    fn catalog_op(id: &str, code: &str) -> Operation {
        Operation {
            id: id.into(),
            code: code.into(),
            name: id.into(),
            ..Default::default()
        }
    }

    fn route_op(id: &str, op_id: &str, code: &str) -> RouteOperation {
        RouteOperation {
            id: id.into(),
            op_id: op_id.into(),
            op_code: code.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_catalog_codes_deduplicated() {
        let mut data = Dataset {
            ops: vec![
                catalog_op("a", "OP-AAAA"),
                catalog_op("b", "OP-AAAA"),
                catalog_op("c", ""),
            ],
            ..Default::default()
        };
        ensure_identifiers(&mut data).unwrap();

        let codes: HashSet<_> = data.ops.iter().map(|o| o.code.clone()).collect();
        assert_eq!(codes.len(), 3);
        assert_eq!(data.ops[0].code, "OP-AAAA");
        assert!(!data.ops[2].code.is_empty());
    }

    #[test]
    fn test_route_code_follows_catalog() {
        let mut data = Dataset {
            ops: vec![catalog_op("a", "OP-AAAA")],
            cards: vec![Card {
                id: "card_1".into(),
                operations: vec![route_op("r1", "a", "OP-OLD1")],
                ..Default::default()
            }],
            ..Default::default()
        };
        ensure_identifiers(&mut data).unwrap();
        assert_eq!(data.cards[0].operations[0].op_code, "OP-AAAA");
    }

    #[test]
    fn test_dangling_reference_keeps_or_fills_code() {
        let mut data = Dataset {
            ops: vec![catalog_op("a", "OP-AAAA")],
            cards: vec![Card {
                id: "card_1".into(),
                operations: vec![
                    route_op("r1", "deleted", "OP-KEEP"),
                    route_op("r2", "deleted", ""),
                    route_op("r3", "deleted", "OP-AAAA"),
                ],
                ..Default::default()
            }],
            ..Default::default()
        };
        ensure_identifiers(&mut data).unwrap();

        let ops = &data.cards[0].operations;
        assert_eq!(ops[0].op_code, "OP-KEEP");
        assert!(ops[1].op_code.starts_with("OP-"));
        assert_ne!(ops[2].op_code, "OP-AAAA");
        assert_ne!(ops[1].op_code, ops[2].op_code);
    }

    #[test]
    fn test_auto_codes_untouched() {
        let mut op = route_op("r1", "a", "005");
        op.auto_code = true;
        let mut data = Dataset {
            ops: vec![catalog_op("a", "OP-AAAA")],
            cards: vec![Card {
                id: "card_1".into(),
                operations: vec![op],
                ..Default::default()
            }],
            ..Default::default()
        };
        ensure_identifiers(&mut data).unwrap();
        assert_eq!(data.cards[0].operations[0].op_code, "005");
    }

    #[test]
    fn test_barcodes_fixed_and_unique() {
        let card = |id: &str, barcode: &str| Card {
            id: id.into(),
            barcode: barcode.into(),
            ..Default::default()
        };
        let mut data = Dataset {
            cards: vec![
                card("c1", "4006381333931"),
                card("c2", "4006381333931"),
                card("c3", "4006381333932"),
                card("c4", ""),
                card("c5", ""),
            ],
            ..Default::default()
        };
        ensure_identifiers(&mut data).unwrap();

        assert_eq!(data.cards[0].barcode, "4006381333931");
        let codes: HashSet<_> = data.cards.iter().map(|c| c.barcode.clone()).collect();
        assert_eq!(codes.len(), 5);
        assert!(data.cards.iter().all(|c| is_valid_ean13(&c.barcode)));
    }
}
