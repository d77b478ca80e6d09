//! リクエスト ID 生成: 固定長ASCII・辞書順＝時系列・同一ms内単調増加
//!
//! 形式: `req_` + base62(0-9,A-Z,a-z) 8文字。値 = (ms since 2020-01-01)<<8 | seq(0..255)。

use crate::domain::RequestId;
use crate::ports::outbound::IdGenerator;
use std::sync::atomic::{AtomicU64, Ordering};

static LAST_ID: AtomicU64 = AtomicU64::new(0);

const PREFIX: &str = "req_";
const EPOCH_MS: u64 = 1577836800000; // 2020-01-01 00:00:00 UTC
const SEQ_BITS: u64 = 8;
const SEQ_MASK: u64 = (1 << SEQ_BITS) - 1;
const BASE: u64 = 62;
const WIDTH: usize = 8;
const MAX_VAL: u64 = BASE.pow(WIDTH as u32) - 1;

const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// 新規リクエスト ID を1つ生成する。並行実行中の複数ランでも重複しない。
pub fn generate_request_id() -> RequestId {
    let ms_rel = now_ms_u64().saturating_sub(EPOCH_MS);
    let base = (ms_rel << SEQ_BITS).min(MAX_VAL);

    loop {
        let prev = LAST_ID.load(Ordering::SeqCst);
        let next = if (prev >> SEQ_BITS) < ms_rel {
            base
        } else {
            if (prev & SEQ_MASK) == SEQ_MASK {
                continue; // 同一msでseq枯渇
            }
            (prev + 1).min(MAX_VAL)
        };
        if LAST_ID
            .compare_exchange(prev, next, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            return RequestId::new(format!("{}{}", PREFIX, to_base62(next)));
        }
    }
}

fn to_base62(mut n: u64) -> String {
    let mut buf = [b'0'; WIDTH];
    for slot in buf.iter_mut().rev() {
        *slot = ALPHABET[(n % BASE) as usize];
        n /= BASE;
    }
    buf.iter().map(|&b| b as char).collect()
}

fn now_ms_u64() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// 時刻ベースの標準 IdGenerator
#[derive(Debug, Clone, Default)]
pub struct StdIdGenerator;

impl IdGenerator for StdIdGenerator {
    fn next_id(&self) -> RequestId {
        generate_request_id()
    }
}
