/// 경매 시작/종료 알림 스케줄러
/// 상태는 시각에서 유도되므로 여기서는 아무것도 변경하지 않는다.
/// 틱 구간 안에서 시작/종료 경계를 지난 경매를 찾아 알림 로그만 남긴다.
// region:    --- Imports
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::time::{interval, Duration};
use tracing::{error, info};

use crate::error::BidError;
use crate::store::{AuctionFilter, AuctionStore};

// endregion: --- Imports

// region:    --- Auction Scheduler
/// 경매 시작/종료 알림 스케줄러
pub struct AuctionScheduler {
    store: Arc<dyn AuctionStore>,
}

impl AuctionScheduler {
    pub fn new(store: Arc<dyn AuctionStore>) -> Self {
        Self { store }
    }

    /// 스케줄러 시작
    pub async fn start(&self) {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(1)); // 1초마다 실행
            let mut last_tick = Utc::now();
            loop {
                interval.tick().await;
                let now = Utc::now();
                if let Err(e) = Self::notify_transitions(store.as_ref(), last_tick, now).await {
                    error!(
                        "{:<12} --> 경매 상태 알림 중 오류 발생: {:?}",
                        "Scheduler", e
                    );
                }
                last_tick = now;
            }
        });
    }

    /// 틱 구간 (since, now] 에서 경계를 지난 경매 알림. 같은 경매를 두 번 알리지 않는다.
    async fn notify_transitions(
        store: &dyn AuctionStore,
        since: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), BidError> {
        let auctions = store.list_auctions(&AuctionFilter::default(), now).await?;

        for auction in auctions {
            if since < auction.start_time && auction.start_time <= now {
                info!(
                    "{:<12} --> 경매 시작: id {}, 시작가 {}",
                    "Scheduler", auction.id, auction.starting_price
                );
            }
            if since < auction.end_time && auction.end_time <= now {
                match auction.current_winner {
                    Some(winner) => info!(
                        "{:<12} --> 경매 종료: id {}, 낙찰자 {}, 낙찰가 {}",
                        "Scheduler", auction.id, winner, auction.current_price
                    ),
                    None => info!(
                        "{:<12} --> 경매 종료: id {}, 입찰 없음",
                        "Scheduler", auction.id
                    ),
                }
            }
        }

        Ok(())
    }
}
// endregion: --- Auction Scheduler
