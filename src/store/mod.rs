// region:    --- Imports
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::bidding::commands::{CreateAuctionCommand, PlaceBidCommand};
use crate::bidding::model::{Auction, Bid, BidPolicy};
use crate::error::BidError;
use crate::lifecycle::AuctionStatus;

pub mod memory;
pub mod postgres;
mod queries;

// endregion: --- Imports

/// 기본 페이지 크기
pub const DEFAULT_PAGE_LIMIT: i64 = 100;

// region:    --- Read Types
/// 경매 목록 필터. 상태는 유도값이므로 조회 시각 기준으로 판정한다.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuctionFilter {
    pub status: Option<AuctionStatus>,
    pub seller_id: Option<i64>,
    pub search: Option<String>,
}

/// 입찰 이력 페이징
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}
// endregion: --- Read Types

// region:    --- Auction Store Trait
/// 경매 저장소 트레이트.
/// `place_bid` 는 current_price / current_winner 를 변경하는 유일한 경로이며,
/// 경매 단위 직렬화 구간 안에서 재검증, 입찰 기록 추가, 가격/낙찰자 갱신을
/// 하나의 원자적 단위로 커밋해야 한다. 서로 다른 경매는 병렬로 처리된다.
#[async_trait]
pub trait AuctionStore: Send + Sync {
    /// 경매 등록 (시작가/시간 검증 포함)
    async fn create_auction(
        &self,
        cmd: &CreateAuctionCommand,
        now: DateTime<Utc>,
    ) -> Result<Auction, BidError>;

    /// 경매 단건 조회. current_price 와 current_winner 는 같은 스냅샷에서 읽는다.
    async fn auction(&self, auction_id: i64) -> Result<Auction, BidError>;

    /// 경매 목록 조회 (최신 등록 순)
    async fn list_auctions(
        &self,
        filter: &AuctionFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<Auction>, BidError>;

    /// 입찰 처리
    async fn place_bid(
        &self,
        cmd: &PlaceBidCommand,
        now: DateTime<Utc>,
        policy: &BidPolicy,
    ) -> Result<Bid, BidError>;

    /// 입찰 이력 조회 (오래된 순)
    async fn bid_history(&self, auction_id: i64, page: &Page) -> Result<Vec<Bid>, BidError>;

    /// 입찰자별 입찰 조회
    async fn bids_by_bidder(&self, bidder_id: i64) -> Result<Vec<Bid>, BidError>;

    /// 최신(최고) 입찰 조회
    async fn highest_bid(&self, auction_id: i64) -> Result<Option<Bid>, BidError>;
}
// endregion: --- Auction Store Trait
