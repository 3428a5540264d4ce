// region:    --- Imports
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};

use super::{AuctionFilter, AuctionStore, Page};
use crate::bidding::commands::{CreateAuctionCommand, PlaceBidCommand};
use crate::bidding::model::{Auction, Bid, BidPolicy};
use crate::error::BidError;

// endregion: --- Imports

// region:    --- Memory Store

/// 경매 하나의 가격/낙찰자와 입찰 이력. 셀 뮤텍스가 해당 경매의 직렬화 구간이다.
struct AuctionCell {
    auction: Auction,
    bids: Vec<Bid>,
}

/// 인메모리 경매 저장소. DATABASE_URL 미설정 시 기본으로 사용한다.
/// 경매별 뮤텍스로 입찰을 직렬화하고, 서로 다른 경매는 완전히 병렬로 처리된다.
/// 맵 잠금은 셀 Arc 복제 동안만 유지하므로 전역 잠금 구간이 없다.
pub struct MemoryStore {
    auctions: RwLock<HashMap<i64, Arc<Mutex<AuctionCell>>>>,
    next_auction_id: AtomicI64,
    next_bid_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            auctions: RwLock::new(HashMap::new()),
            next_auction_id: AtomicI64::new(1),
            next_bid_id: AtomicI64::new(1),
        }
    }

    /// 경매 셀 조회
    async fn cell(&self, auction_id: i64) -> Result<Arc<Mutex<AuctionCell>>, BidError> {
        let auctions = self.auctions.read().await;
        auctions
            .get(&auction_id)
            .cloned()
            .ok_or(BidError::NotFound)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuctionStore for MemoryStore {
    async fn create_auction(
        &self,
        cmd: &CreateAuctionCommand,
        now: DateTime<Utc>,
    ) -> Result<Auction, BidError> {
        cmd.validate()?;

        let auction = Auction {
            id: self.next_auction_id.fetch_add(1, Ordering::SeqCst),
            seller_id: cmd.seller_id,
            title: cmd.title.clone(),
            description: cmd.description.clone(),
            image_url: cmd.image_url.clone(),
            starting_price: cmd.starting_price,
            current_price: cmd.starting_price,
            start_time: cmd.start_time,
            end_time: cmd.end_time,
            current_winner: None,
            created_at: now,
        };

        let cell = Arc::new(Mutex::new(AuctionCell {
            auction: auction.clone(),
            bids: Vec::new(),
        }));
        self.auctions.write().await.insert(auction.id, cell);

        Ok(auction)
    }

    async fn auction(&self, auction_id: i64) -> Result<Auction, BidError> {
        let cell = self.cell(auction_id).await?;
        let cell = cell.lock().await;
        Ok(cell.auction.clone())
    }

    async fn list_auctions(
        &self,
        filter: &AuctionFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<Auction>, BidError> {
        let cells: Vec<_> = {
            let auctions = self.auctions.read().await;
            auctions.values().cloned().collect()
        };

        let mut result = Vec::with_capacity(cells.len());
        for cell in cells {
            let cell = cell.lock().await;
            let auction = &cell.auction;

            if let Some(status) = filter.status {
                if auction.status_at(now) != status {
                    continue;
                }
            }
            if let Some(seller_id) = filter.seller_id {
                if auction.seller_id != seller_id {
                    continue;
                }
            }
            if let Some(search) = &filter.search {
                if !auction
                    .title
                    .to_lowercase()
                    .contains(&search.to_lowercase())
                {
                    continue;
                }
            }

            result.push(auction.clone());
        }

        result.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(result)
    }

    async fn place_bid(
        &self,
        cmd: &PlaceBidCommand,
        now: DateTime<Utc>,
        policy: &BidPolicy,
    ) -> Result<Bid, BidError> {
        let cell = self.cell(cmd.auction_id).await?;

        // 경매 단위 직렬화 구간 시작
        let mut cell = cell.lock().await;

        // 구간 내 재검증: 잠금 대기 중 경매가 종료되었거나 가격이 올랐을 수 있다
        cell.auction
            .check_bid(cmd.bidder_id, cmd.amount, now, policy)?;

        let bid = Bid {
            id: self.next_bid_id.fetch_add(1, Ordering::SeqCst),
            auction_id: cmd.auction_id,
            bidder_id: cmd.bidder_id,
            amount: cmd.amount,
            bid_time: now,
        };

        // 이력 추가와 가격/낙찰자 갱신은 같은 잠금 아래에서 한 번에 반영된다
        cell.auction.apply_bid(&bid);
        cell.bids.push(bid.clone());

        Ok(bid)
    }

    async fn bid_history(&self, auction_id: i64, page: &Page) -> Result<Vec<Bid>, BidError> {
        let cell = self.cell(auction_id).await?;
        let cell = cell.lock().await;

        let offset = page.offset.max(0) as usize;
        let limit = page.limit.max(0) as usize;
        Ok(cell.bids.iter().skip(offset).take(limit).cloned().collect())
    }

    async fn bids_by_bidder(&self, bidder_id: i64) -> Result<Vec<Bid>, BidError> {
        let cells: Vec<_> = {
            let auctions = self.auctions.read().await;
            auctions.values().cloned().collect()
        };

        let mut result = Vec::new();
        for cell in cells {
            let cell = cell.lock().await;
            result.extend(
                cell.bids
                    .iter()
                    .filter(|bid| bid.bidder_id == bidder_id)
                    .cloned(),
            );
        }

        result.sort_by_key(|bid| bid.id);
        Ok(result)
    }

    async fn highest_bid(&self, auction_id: i64) -> Result<Option<Bid>, BidError> {
        let cell = self.cell(auction_id).await?;
        let cell = cell.lock().await;
        Ok(cell.bids.last().cloned())
    }
}
// endregion: --- Memory Store
