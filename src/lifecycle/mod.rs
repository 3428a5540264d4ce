use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 경매 수명주기 상태
/// 저장된 컬럼이 아니라 시작/종료 시각과 현재 시각에서 매번 유도한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuctionStatus {
    Scheduled,
    Active,
    Ended,
}

/// 경매 상태 계산. now == end_time 은 ENDED 다 (종료 경계 포함).
pub fn status_at(
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    now: DateTime<Utc>,
) -> AuctionStatus {
    if now < start_time {
        AuctionStatus::Scheduled
    } else if now < end_time {
        AuctionStatus::Active
    } else {
        AuctionStatus::Ended
    }
}
