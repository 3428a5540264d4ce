// region:    --- Imports
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::bidding::commands::{self, CreateAuctionCommand, PlaceBidCommand};
use crate::bidding::model::{AuctionView, Bid, BidPolicy};
use crate::error::BidError;
use crate::store::{AuctionFilter, AuctionStore, Page, DEFAULT_PAGE_LIMIT};

// endregion: --- Imports

/// 라우터 공유 상태: 저장소와 입찰 정책
pub type AppState = (Arc<dyn AuctionStore>, BidPolicy);

// region:    --- Router

/// 라우터 설정
pub fn app(state: AppState) -> Router {
    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/bid", post(handle_bid))
        .route(
            "/auctions",
            post(handle_create_auction).get(handle_list_auctions),
        )
        .route("/auctions/:id", get(handle_get_auction))
        .route("/auctions/:id/bids", get(handle_get_bid_history))
        .route("/auctions/:id/highest-bid", get(handle_get_highest_bid))
        .route("/bidders/:id/bids", get(handle_get_bidder_bids))
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .with_state(state)
}
// endregion: --- Router

// region:    --- Command Handlers

/// 입찰 요청 처리
pub async fn handle_bid(
    State((store, policy)): State<AppState>,
    Json(cmd): Json<PlaceBidCommand>,
) -> Result<Json<Value>, BidError> {
    let bid = commands::handle_place_bid(store.as_ref(), &policy, cmd, Utc::now()).await?;
    Ok(Json(json!({ "success": true, "bid": bid })))
}

/// 경매 등록 요청 처리
pub async fn handle_create_auction(
    State((store, _)): State<AppState>,
    Json(cmd): Json<CreateAuctionCommand>,
) -> Result<Json<Value>, BidError> {
    let auction = commands::handle_create_auction(store.as_ref(), cmd, Utc::now()).await?;
    Ok(Json(json!({ "success": true, "auction": auction })))
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

/// 경매 조회
pub async fn handle_get_auction(
    State((store, _)): State<AppState>,
    Path(auction_id): Path<i64>,
) -> Result<Json<AuctionView>, BidError> {
    info!("{:<12} --> 경매 조회 id: {}", "HandlerQuery", auction_id);
    let auction = store.auction(auction_id).await?;
    Ok(Json(AuctionView::new(auction, Utc::now())))
}

/// 경매 목록 조회 (상태/판매자/검색어 필터)
pub async fn handle_list_auctions(
    State((store, _)): State<AppState>,
    Query(filter): Query<AuctionFilter>,
) -> Result<Json<Vec<AuctionView>>, BidError> {
    info!("{:<12} --> 경매 목록 조회: {:?}", "HandlerQuery", filter);
    let now = Utc::now();
    let auctions = store.list_auctions(&filter, now).await?;
    Ok(Json(
        auctions
            .into_iter()
            .map(|auction| AuctionView::new(auction, now))
            .collect(),
    ))
}

/// 입찰 이력 페이징 파라미터
#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

/// 입찰 이력 조회 (오래된 순)
pub async fn handle_get_bid_history(
    State((store, _)): State<AppState>,
    Path(auction_id): Path<i64>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<Bid>>, BidError> {
    info!("{:<12} --> 입찰 이력 조회 id: {}", "HandlerQuery", auction_id);
    let page = Page {
        offset: params.offset.unwrap_or(0).max(0),
        limit: params.limit.unwrap_or(DEFAULT_PAGE_LIMIT).max(0),
    };
    let bids = store.bid_history(auction_id, &page).await?;
    Ok(Json(bids))
}

/// 최신(최고) 입찰 조회
pub async fn handle_get_highest_bid(
    State((store, _)): State<AppState>,
    Path(auction_id): Path<i64>,
) -> Result<Json<Option<Bid>>, BidError> {
    info!(
        "{:<12} --> 최고 입찰 조회 id: {}",
        "HandlerQuery", auction_id
    );
    let bid = store.highest_bid(auction_id).await?;
    Ok(Json(bid))
}

/// 입찰자별 입찰 조회
pub async fn handle_get_bidder_bids(
    State((store, _)): State<AppState>,
    Path(bidder_id): Path<i64>,
) -> Result<Json<Vec<Bid>>, BidError> {
    info!(
        "{:<12} --> 입찰자별 입찰 조회 id: {}",
        "HandlerQuery", bidder_id
    );
    let bids = store.bids_by_bidder(bidder_id).await?;
    Ok(Json(bids))
}

// endregion: --- Query Handlers
