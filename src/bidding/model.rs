use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::BidError;
use crate::lifecycle::{self, AuctionStatus};

// 경매 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Auction {
    pub id: i64,
    pub seller_id: i64,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub starting_price: Decimal,
    pub current_price: Decimal,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub current_winner: Option<i64>,
    pub created_at: DateTime<Utc>,
}

// 입찰 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: i64,
    pub auction_id: i64,
    pub bidder_id: i64,
    pub amount: Decimal,
    pub bid_time: DateTime<Utc>,
}

/// 입찰 정책. 최소 인상폭이 없으면 현재 가격 초과만 요구한다.
#[derive(Debug, Clone, Copy, Default)]
pub struct BidPolicy {
    pub min_increment: Option<Decimal>,
}

impl Auction {
    /// 현재 시각 기준 경매 상태
    pub fn status_at(&self, now: DateTime<Utc>) -> AuctionStatus {
        lifecycle::status_at(self.start_time, self.end_time, now)
    }

    /// 입찰 유효성 검증. 직렬화 구간 진입 전과 구간 내부 양쪽에서 호출된다.
    pub fn check_bid(
        &self,
        bidder_id: i64,
        amount: Decimal,
        now: DateTime<Utc>,
        policy: &BidPolicy,
    ) -> Result<(), BidError> {
        match self.status_at(now) {
            AuctionStatus::Scheduled => return Err(BidError::NotStarted),
            AuctionStatus::Ended => return Err(BidError::AlreadyEnded),
            AuctionStatus::Active => {}
        }

        if bidder_id == self.seller_id {
            return Err(BidError::SelfBid);
        }

        let meets_floor = match policy.min_increment {
            Some(increment) => amount >= self.current_price + increment,
            None => amount > self.current_price,
        };
        if !meets_floor {
            return Err(BidError::TooLow {
                current_price: self.current_price,
            });
        }

        Ok(())
    }

    /// 낙찰 후보 반영. 입찰 기록 추가와 같은 직렬화 구간 안에서만 호출된다.
    pub fn apply_bid(&mut self, bid: &Bid) {
        self.current_price = bid.amount;
        self.current_winner = Some(bid.bidder_id);
    }
}

// 경매 조회 응답 (유도된 상태 포함)
#[derive(Debug, Serialize)]
pub struct AuctionView {
    #[serde(flatten)]
    pub auction: Auction,
    pub status: AuctionStatus,
}

impl AuctionView {
    pub fn new(auction: Auction, now: DateTime<Utc>) -> Self {
        let status = auction.status_at(now);
        Self { auction, status }
    }
}
