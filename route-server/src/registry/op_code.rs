//! 工序代码

use rand::Rng;
use std::collections::HashSet;

use super::{RegistryError, RegistryResult};

const PREFIX: &str = "OP-";
const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const CODE_CHARS: u32 = 4;
const RANDOM_ATTEMPTS: usize = 1000;

fn encode(mut n: u64) -> String {
    let mut chars = [b'0'; CODE_CHARS as usize];
    for slot in chars.iter_mut().rev() {
        *slot = ALPHABET[(n % 36) as usize];
        n /= 36;
    }
    format!("{}{}", PREFIX, String::from_utf8_lossy(&chars))
}

fn space() -> u64 {
    36u64.pow(CODE_CHARS)
}

/// 生成一个不在 `existing` 中的 `OP-XXXX` 代码
pub fn unique_operation_code(existing: &HashSet<String>) -> RegistryResult<String> {
    unique_operation_code_with(existing, &mut rand::thread_rng())
}

/// 同 [`unique_operation_code`]，使用调用方提供的随机源
pub fn unique_operation_code_with<R: Rng + ?Sized>(
    existing: &HashSet<String>,
    rng: &mut R,
) -> RegistryResult<String> {
    let space = space();
    for _ in 0..RANDOM_ATTEMPTS {
        let candidate = encode(rng.gen_range(0..space));
        if !existing.contains(&candidate) {
            return Ok(candidate);
        }
    }

    let start = rng.gen_range(0..space);
    for offset in 0..space {
        let candidate = encode((start + offset) % space);
        if !existing.contains(&candidate) {
            return Ok(candidate);
        }
    }

    Err(RegistryError::Exhausted {
        kind: "operation code",
    })
}

/// 自动步骤代码：第 n 步为 `n * 5`，补零到 3 位 (`005`, `010`, ...)
pub fn step_code(step: usize) -> String {
    format!("{:03}", step * 5)
}
