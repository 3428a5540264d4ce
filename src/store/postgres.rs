// region:    --- Imports
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use super::{queries, AuctionFilter, AuctionStore, Page};
use crate::bidding::commands::{CreateAuctionCommand, PlaceBidCommand};
use crate::bidding::model::{Auction, Bid, BidPolicy};
use crate::error::BidError;

// endregion: --- Imports

// region:    --- Postgres Store

/// Postgres 경매 저장소.
/// `SELECT ... FOR UPDATE` 행 잠금이 경매 단위 직렬화 구간이고,
/// 입찰 기록 추가와 가격/낙찰자 갱신은 같은 트랜잭션으로 커밋된다.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// 풀 생성 및 스키마 초기화
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.initialize_schema().await?;
        Ok(store)
    }

    /// 스키마 적용
    async fn initialize_schema(&self) -> Result<(), sqlx::Error> {
        let schema_sql = include_str!("../sql/01-create-schema.sql");
        for query in schema_sql.split(';') {
            let query = query.trim();
            if !query.is_empty() {
                sqlx::query(query).execute(&self.pool).await?;
            }
        }
        info!("{:<12} --> 데이터베이스 스키마 초기화 성공", "Store");
        Ok(())
    }
}

#[async_trait]
impl AuctionStore for PostgresStore {
    async fn create_auction(
        &self,
        cmd: &CreateAuctionCommand,
        now: DateTime<Utc>,
    ) -> Result<Auction, BidError> {
        cmd.validate()?;

        let auction = sqlx::query_as::<_, Auction>(queries::INSERT_AUCTION)
            .bind(cmd.seller_id)
            .bind(&cmd.title)
            .bind(&cmd.description)
            .bind(cmd.image_url.as_deref())
            .bind(cmd.starting_price)
            .bind(cmd.start_time)
            .bind(cmd.end_time)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;
        Ok(auction)
    }

    async fn auction(&self, auction_id: i64) -> Result<Auction, BidError> {
        sqlx::query_as::<_, Auction>(queries::GET_AUCTION)
            .bind(auction_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(BidError::NotFound)
    }

    async fn list_auctions(
        &self,
        filter: &AuctionFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<Auction>, BidError> {
        let auctions = sqlx::query_as::<_, Auction>(queries::LIST_AUCTIONS)
            .bind(filter.seller_id)
            .bind(filter.search.as_deref())
            .fetch_all(&self.pool)
            .await?;

        // 상태는 유도값이므로 조회 후 걸러낸다
        Ok(match filter.status {
            Some(status) => auctions
                .into_iter()
                .filter(|auction| auction.status_at(now) == status)
                .collect(),
            None => auctions,
        })
    }

    async fn place_bid(
        &self,
        cmd: &PlaceBidCommand,
        now: DateTime<Utc>,
        policy: &BidPolicy,
    ) -> Result<Bid, BidError> {
        let mut tx = self.pool.begin().await?;

        // 행 잠금으로 경매 단위 직렬화 구간 진입
        let auction = sqlx::query_as::<_, Auction>(queries::GET_AUCTION_FOR_UPDATE)
            .bind(cmd.auction_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(BidError::NotFound)?;

        // 구간 내 재검증: 잠금 대기 중 경매가 종료되었거나 가격이 올랐을 수 있다
        auction.check_bid(cmd.bidder_id, cmd.amount, now, policy)?;

        // 입찰 기록 추가와 가격/낙찰자 갱신을 같은 트랜잭션으로 커밋한다
        let bid = sqlx::query_as::<_, Bid>(queries::INSERT_BID)
            .bind(cmd.auction_id)
            .bind(cmd.bidder_id)
            .bind(cmd.amount)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(queries::APPLY_BID)
            .bind(cmd.amount)
            .bind(cmd.bidder_id)
            .bind(cmd.auction_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(bid)
    }

    async fn bid_history(&self, auction_id: i64, page: &Page) -> Result<Vec<Bid>, BidError> {
        // 없는 경매와 빈 이력을 구분한다
        self.auction(auction_id).await?;

        let bids = sqlx::query_as::<_, Bid>(queries::GET_BID_HISTORY)
            .bind(auction_id)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(bids)
    }

    async fn bids_by_bidder(&self, bidder_id: i64) -> Result<Vec<Bid>, BidError> {
        let bids = sqlx::query_as::<_, Bid>(queries::GET_BIDS_BY_BIDDER)
            .bind(bidder_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(bids)
    }

    async fn highest_bid(&self, auction_id: i64) -> Result<Option<Bid>, BidError> {
        self.auction(auction_id).await?;

        let bid = sqlx::query_as::<_, Bid>(queries::GET_HIGHEST_BID)
            .bind(auction_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(bid)
    }
}
// endregion: --- Postgres Store
