/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Calendar day key (`YYYYMMDD`, UTC) of an epoch-millis timestamp
pub fn day_key(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .unwrap_or_default()
        .format("%Y%m%d")
        .to_string()
}

/// Whole minutes elapsed between two epoch-millis timestamps, never negative
pub fn elapsed_minutes(since: i64, now: i64) -> i64 {
    (now - since).max(0) / 60_000
}
