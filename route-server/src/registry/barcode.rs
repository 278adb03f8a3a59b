//! EAN-13 条码

use rand::Rng;
use std::collections::HashSet;

use super::{RegistryError, RegistryResult};

pub const BARCODE_LEN: usize = 13;

/// 随机尝试次数，之后退化为确定性扫描
const RANDOM_ATTEMPTS: usize = 500;

/// 12 位数据位的取值空间
const DATA_SPACE: u64 = 1_000_000_000_000;

/// 计算 EAN-13 校验位
///
/// 奇数位（从 1 开始计）权重 1，偶数位权重 3，
/// 校验位 = (10 - 加权和 % 10) % 10。输入不是 12 位数字时返回 `None`。
pub fn check_digit(base12: &str) -> Option<u8> {
    if base12.len() != BARCODE_LEN - 1 || !base12.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let total: u32 = base12
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let digit = (b - b'0') as u32;
            if i % 2 == 0 { digit } else { digit * 3 }
        })
        .sum();
    Some(((10 - total % 10) % 10) as u8)
}

/// 13 位数字且校验位正确
pub fn is_valid_ean13(code: &str) -> bool {
    if code.len() != BARCODE_LEN || !code.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let last = code.as_bytes()[BARCODE_LEN - 1] - b'0';
    check_digit(&code[..BARCODE_LEN - 1]) == Some(last)
}

fn compose(data: u64) -> String {
    let base = format!("{:012}", data);
    // base 恒为 12 位数字
    let digit = check_digit(&base).unwrap_or(0);
    format!("{}{}", base, digit)
}

/// 生成一个不在 `existing` 中的合法条码
pub fn unique_barcode(existing: &HashSet<String>) -> RegistryResult<String> {
    unique_barcode_with(existing, &mut rand::thread_rng())
}

/// 同 [`unique_barcode`]，使用调用方提供的随机源
///
/// 随机尝试失败后从随机起点线性扫描数据空间，
/// 最多 `existing.len() + 1` 步即可找到空位，因此总会终止。
pub fn unique_barcode_with<R: Rng + ?Sized>(
    existing: &HashSet<String>,
    rng: &mut R,
) -> RegistryResult<String> {
    for _ in 0..RANDOM_ATTEMPTS {
        let candidate = compose(rng.gen_range(0..DATA_SPACE));
        if !existing.contains(&candidate) {
            return Ok(candidate);
        }
    }

    let start = rng.gen_range(0..DATA_SPACE);
    let limit = (existing.len() as u64 + 1).min(DATA_SPACE);
    for offset in 0..limit {
        let candidate = compose((start + offset) % DATA_SPACE);
        if !existing.contains(&candidate) {
            return Ok(candidate);
        }
    }

    Err(RegistryError::Exhausted { kind: "barcode" })
}
