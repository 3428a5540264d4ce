/// 입찰 관련 커맨드 처리
/// 1. 입찰
/// 2. 경매 등록
// region:    --- Imports
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bidding::model::{Auction, Bid, BidPolicy};
use crate::error::BidError;
use crate::store::AuctionStore;
// endregion: --- Imports

// region:    --- Commands
/// 입찰 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub auction_id: i64,
    pub bidder_id: i64,
    pub amount: Decimal,
}

/// 경매 등록 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateAuctionCommand {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub starting_price: Decimal,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub seller_id: i64,
}

impl CreateAuctionCommand {
    /// 경매 등록 검증: 시작가 > 0, 종료 시간 > 시작 시간
    pub fn validate(&self) -> Result<(), BidError> {
        if self.starting_price <= Decimal::ZERO {
            return Err(BidError::InvalidSpec("시작가는 0보다 커야 합니다."));
        }
        if self.end_time <= self.start_time {
            return Err(BidError::InvalidSpec(
                "종료 시간은 시작 시간 이후여야 합니다.",
            ));
        }
        Ok(())
    }
}
// endregion: --- Commands

// region:    --- Command Handlers

/// 1. 입찰
/// 사전 검증 후 저장소의 경매 단위 직렬화 구간에서 재검증과 원자적 커밋을 수행한다.
pub async fn handle_place_bid(
    store: &dyn AuctionStore,
    policy: &BidPolicy,
    cmd: PlaceBidCommand,
    now: DateTime<Utc>,
) -> Result<Bid, BidError> {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);

    // 직렬화 구간 진입 전 사전 검증 (조회 + 상태/판매자/금액 확인)
    let auction = store.auction(cmd.auction_id).await?;
    auction.check_bid(cmd.bidder_id, cmd.amount, now, policy)?;

    // 사전 검증과 커밋 사이에 경매가 종료되거나 가격이 오를 수 있으므로
    // 저장소가 직렬화 구간 안에서 다시 검증한 뒤 커밋한다.
    let bid = store.place_bid(&cmd, now, policy).await?;

    info!(
        "{:<12} --> 입찰 성공: 경매 {}, 입찰자 {}, 금액 {}",
        "Command", bid.auction_id, bid.bidder_id, bid.amount
    );
    Ok(bid)
}

/// 2. 경매 등록
pub async fn handle_create_auction(
    store: &dyn AuctionStore,
    cmd: CreateAuctionCommand,
    now: DateTime<Utc>,
) -> Result<Auction, BidError> {
    info!("{:<12} --> 경매 등록 처리 시작: {}", "Command", cmd.title);
    store.create_auction(&cmd, now).await
}
// endregion: --- Command Handlers
