use std::sync::atomic::{AtomicI64, Ordering};

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

static LAST_ID_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Generate a time-based document id such as `zone_1718000000000`.
///
/// The numeric part is the creation time in milliseconds, bumped by one when
/// two ids are requested within the same millisecond so ids stay unique
/// within the process.
pub fn timestamped_id(prefix: &str) -> String {
    let now = now_millis();
    let mut last = LAST_ID_MILLIS.load(Ordering::Relaxed);
    let stamp = loop {
        let next = now.max(last + 1);
        match LAST_ID_MILLIS.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed)
        {
            Ok(_) => break next,
            Err(current) => last = current,
        }
    };
    format!("{}_{}", prefix, stamp)
}
