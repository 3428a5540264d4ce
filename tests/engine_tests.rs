use std::sync::Arc;

use bidding_engine::bidding::commands::{self, CreateAuctionCommand, PlaceBidCommand};
use bidding_engine::bidding::model::BidPolicy;
use bidding_engine::error::BidError;
use bidding_engine::lifecycle::AuctionStatus;
use bidding_engine::store::memory::MemoryStore;
use bidding_engine::store::{AuctionStore, Page};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// 테스트용 경매 등록 명령 (시작/종료는 현재 시각 기준 오프셋)
fn auction_cmd(seller_id: i64, start_offset_secs: i64, end_offset_secs: i64) -> CreateAuctionCommand {
    let now = Utc::now();
    CreateAuctionCommand {
        title: "테스트 경매".to_string(),
        description: "엔진 테스트를 위한 경매입니다.".to_string(),
        image_url: None,
        starting_price: dec("10.00"),
        start_time: now + Duration::seconds(start_offset_secs),
        end_time: now + Duration::seconds(end_offset_secs),
        seller_id,
    }
}

fn bid_cmd(auction_id: i64, bidder_id: i64, amount: &str) -> PlaceBidCommand {
    PlaceBidCommand {
        auction_id,
        bidder_id,
        amount: dec(amount),
    }
}

async fn place(
    store: &MemoryStore,
    policy: &BidPolicy,
    auction_id: i64,
    bidder_id: i64,
    amount: &str,
    now: DateTime<Utc>,
) -> Result<bidding_engine::bidding::model::Bid, BidError> {
    commands::handle_place_bid(store, policy, bid_cmd(auction_id, bidder_id, amount), now).await
}

/// 입찰은 현재 가격을 초과해야 하고, 수락되면 가격/낙찰자/이력이 함께 갱신된다
#[tokio::test]
async fn test_bid_must_exceed_current_price() {
    let store = MemoryStore::new();
    let policy = BidPolicy::default();
    let now = Utc::now();

    let auction = store
        .create_auction(&auction_cmd(1, -3600, 3600), now)
        .await
        .unwrap();
    assert_eq!(auction.current_price, dec("10.00"));
    assert_eq!(auction.status_at(now), AuctionStatus::Active);

    // 시작가와 같은 금액은 거절된다
    let err = place(&store, &policy, auction.id, 2, "10.00", now)
        .await
        .unwrap_err();
    assert!(matches!(err, BidError::TooLow { current_price } if current_price == dec("10.00")));

    // 최소 화폐 단위만 높아도 수락된다
    let bid = place(&store, &policy, auction.id, 2, "10.01", now)
        .await
        .unwrap();
    assert_eq!(bid.amount, dec("10.01"));

    // 가격과 낙찰자는 같은 스냅샷에서 함께 갱신되어 보인다
    let updated = store.auction(auction.id).await.unwrap();
    assert_eq!(updated.current_price, dec("10.01"));
    assert_eq!(updated.current_winner, Some(2));

    let highest = store.highest_bid(auction.id).await.unwrap().unwrap();
    assert_eq!(highest.amount, updated.current_price);
    assert_eq!(Some(highest.bidder_id), updated.current_winner);

    // 현재 가격과 같은 금액은 여전히 거절된다
    let err = place(&store, &policy, auction.id, 3, "10.01", now)
        .await
        .unwrap_err();
    assert!(matches!(err, BidError::TooLow { .. }));
}

/// 판매자는 금액과 무관하게 자기 경매에 입찰할 수 없다
#[tokio::test]
async fn test_self_bid_rejected() {
    let store = MemoryStore::new();
    let policy = BidPolicy::default();
    let now = Utc::now();

    let auction = store
        .create_auction(&auction_cmd(7, -3600, 3600), now)
        .await
        .unwrap();

    let err = place(&store, &policy, auction.id, 7, "1000.00", now)
        .await
        .unwrap_err();
    assert!(matches!(err, BidError::SelfBid));

    let unchanged = store.auction(auction.id).await.unwrap();
    assert_eq!(unchanged.current_price, dec("10.00"));
    assert_eq!(unchanged.current_winner, None);
}

/// 종료 시각 정각의 입찰은 거절된다 (종료 경계 포함)
#[tokio::test]
async fn test_bid_at_end_time_rejected() {
    let store = MemoryStore::new();
    let policy = BidPolicy::default();
    let now = Utc::now();

    let auction = store
        .create_auction(&auction_cmd(1, -3600, 3600), now)
        .await
        .unwrap();

    // 종료 직전에는 수락된다
    let just_before = auction.end_time - Duration::seconds(1);
    place(&store, &policy, auction.id, 2, "11.00", just_before)
        .await
        .unwrap();

    // now == end_time 은 ENDED
    let err = place(&store, &policy, auction.id, 3, "20.00", auction.end_time)
        .await
        .unwrap_err();
    assert!(matches!(err, BidError::AlreadyEnded));

    // 종료 이후에도 거절되고 낙찰자는 그대로다
    let after = auction.end_time + Duration::seconds(30);
    let err = place(&store, &policy, auction.id, 3, "20.00", after)
        .await
        .unwrap_err();
    assert!(matches!(err, BidError::AlreadyEnded));

    let final_state = store.auction(auction.id).await.unwrap();
    assert_eq!(final_state.current_price, dec("11.00"));
    assert_eq!(final_state.current_winner, Some(2));
}

/// 시작 전 경매에는 입찰할 수 없다
#[tokio::test]
async fn test_bid_before_start_rejected() {
    let store = MemoryStore::new();
    let policy = BidPolicy::default();
    let now = Utc::now();

    let auction = store
        .create_auction(&auction_cmd(1, 3600, 7200), now)
        .await
        .unwrap();
    assert_eq!(auction.status_at(now), AuctionStatus::Scheduled);

    let err = place(&store, &policy, auction.id, 2, "11.00", now)
        .await
        .unwrap_err();
    assert!(matches!(err, BidError::NotStarted));
}

/// 없는 경매에 대한 입찰은 NotFound
#[tokio::test]
async fn test_unknown_auction_rejected() {
    let store = MemoryStore::new();
    let policy = BidPolicy::default();

    let err = place(&store, &policy, 999, 2, "11.00", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, BidError::NotFound));
}

/// 경매 등록 검증: 시작가 > 0, 종료 시간 > 시작 시간
#[tokio::test]
async fn test_invalid_auction_spec_rejected() {
    let store = MemoryStore::new();
    let now = Utc::now();

    let mut cmd = auction_cmd(1, 0, 3600);
    cmd.starting_price = dec("0.00");
    let err = store.create_auction(&cmd, now).await.unwrap_err();
    assert!(matches!(err, BidError::InvalidSpec(_)));

    let mut cmd = auction_cmd(1, 0, 3600);
    cmd.end_time = cmd.start_time;
    let err = store.create_auction(&cmd, now).await.unwrap_err();
    assert!(matches!(err, BidError::InvalidSpec(_)));

    let mut cmd = auction_cmd(1, 0, 3600);
    cmd.end_time = cmd.start_time - Duration::hours(1);
    let err = store.create_auction(&cmd, now).await.unwrap_err();
    assert!(matches!(err, BidError::InvalidSpec(_)));
}

/// 최소 인상폭이 설정되면 현재 가격 + 인상폭 이상만 수락된다
#[tokio::test]
async fn test_min_increment_policy() {
    let store = MemoryStore::new();
    let policy = BidPolicy {
        min_increment: Some(dec("1.00")),
    };
    let now = Utc::now();

    let auction = store
        .create_auction(&auction_cmd(1, -3600, 3600), now)
        .await
        .unwrap();

    // 현재 가격보다 높지만 인상폭에는 못 미치는 금액은 거절된다
    let err = place(&store, &policy, auction.id, 2, "10.50", now)
        .await
        .unwrap_err();
    assert!(matches!(err, BidError::TooLow { .. }));

    // 현재 가격 + 인상폭과 같은 금액은 수락된다
    let bid = place(&store, &policy, auction.id, 2, "11.00", now)
        .await
        .unwrap();
    assert_eq!(bid.amount, dec("11.00"));
}

/// 동시 입찰: 하나의 경매에 대해 수락된 입찰은 총순서를 이루고
/// 최고 금액 입찰자가 최종 낙찰자가 된다
#[tokio::test]
async fn test_concurrent_bids_single_winner() {
    let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
    let now = Utc::now();

    let auction = store
        .create_auction(&auction_cmd(1, -3600, 3600), now)
        .await
        .unwrap();

    // 50개의 서로 다른 금액으로 동시 입찰
    let mut handles = vec![];
    for i in 1..=50i64 {
        let store = Arc::clone(&store);
        let auction_id = auction.id;
        let amount = dec(&format!("{}.00", 10 + i));
        let handle = tokio::spawn(async move {
            let cmd = PlaceBidCommand {
                auction_id,
                bidder_id: i,
                amount,
            };
            commands::handle_place_bid(store.as_ref(), &BidPolicy::default(), cmd, Utc::now()).await
        });
        handles.push(handle);
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(BidError::TooLow { .. }) => {}
            Err(e) => panic!("예상하지 못한 오류: {:?}", e),
        }
    }
    assert!(accepted >= 1);

    // 최고 금액(60.00)은 언제 실행되어도 수락되므로 최종 가격이 된다
    let final_state = store.auction(auction.id).await.unwrap();
    assert_eq!(final_state.current_price, dec("60.00"));
    assert_eq!(final_state.current_winner, Some(50));

    // 이력은 수락 순서대로 금액이 강증가하고, 수락 수와 길이가 같다
    let history = store
        .bid_history(auction.id, &Page::default())
        .await
        .unwrap();
    assert_eq!(history.len(), accepted);
    for pair in history.windows(2) {
        assert!(pair[1].amount > pair[0].amount);
        assert!(pair[1].id > pair[0].id);
    }
    assert_eq!(history.last().unwrap().amount, final_state.current_price);
}

/// 서로 다른 경매에 대한 동시 입찰은 서로를 막지 않는다
#[tokio::test]
async fn test_concurrent_auctions_do_not_interfere() {
    let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
    let now = Utc::now();

    let first = store
        .create_auction(&auction_cmd(1, -3600, 3600), now)
        .await
        .unwrap();
    let second = store
        .create_auction(&auction_cmd(2, -3600, 3600), now)
        .await
        .unwrap();

    let mut handles = vec![];
    for i in 1..=20i64 {
        for auction_id in [first.id, second.id] {
            let store = Arc::clone(&store);
            let amount = dec(&format!("{}.00", 10 + i));
            let handle = tokio::spawn(async move {
                let cmd = PlaceBidCommand {
                    auction_id,
                    bidder_id: 100 + i,
                    amount,
                };
                commands::handle_place_bid(store.as_ref(), &BidPolicy::default(), cmd, Utc::now())
                    .await
            });
            handles.push(handle);
        }
    }

    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) | Err(BidError::TooLow { .. }) => {}
            Err(e) => panic!("예상하지 못한 오류: {:?}", e),
        }
    }

    // 두 경매 모두 최고 금액으로 끝난다
    for auction_id in [first.id, second.id] {
        let state = store.auction(auction_id).await.unwrap();
        assert_eq!(state.current_price, dec("30.00"));
        assert_eq!(state.current_winner, Some(120));
    }
}

/// 입찰 이력 페이징 (오래된 순)
#[tokio::test]
async fn test_bid_history_paging() {
    let store = MemoryStore::new();
    let policy = BidPolicy::default();
    let now = Utc::now();

    let auction = store
        .create_auction(&auction_cmd(1, -3600, 3600), now)
        .await
        .unwrap();

    for i in 1..=5i64 {
        place(
            &store,
            &policy,
            auction.id,
            2,
            &format!("{}.00", 10 + i),
            now,
        )
        .await
        .unwrap();
    }

    let page = Page {
        offset: 1,
        limit: 2,
    };
    let bids = store.bid_history(auction.id, &page).await.unwrap();
    assert_eq!(bids.len(), 2);
    assert_eq!(bids[0].amount, dec("12.00"));
    assert_eq!(bids[1].amount, dec("13.00"));

    let err = store
        .bid_history(999, &Page::default())
        .await
        .unwrap_err();
    assert!(matches!(err, BidError::NotFound));
}

/// 입찰자별 입찰 조회
#[tokio::test]
async fn test_bids_by_bidder() {
    let store = MemoryStore::new();
    let policy = BidPolicy::default();
    let now = Utc::now();

    let first = store
        .create_auction(&auction_cmd(1, -3600, 3600), now)
        .await
        .unwrap();
    let second = store
        .create_auction(&auction_cmd(1, -3600, 3600), now)
        .await
        .unwrap();

    place(&store, &policy, first.id, 2, "11.00", now).await.unwrap();
    place(&store, &policy, second.id, 2, "12.00", now).await.unwrap();
    place(&store, &policy, first.id, 3, "13.00", now).await.unwrap();

    let bids = store.bids_by_bidder(2).await.unwrap();
    assert_eq!(bids.len(), 2);
    assert!(bids.windows(2).all(|pair| pair[0].id < pair[1].id));
    assert!(bids.iter().all(|bid| bid.bidder_id == 2));

    let none = store.bids_by_bidder(42).await.unwrap();
    assert!(none.is_empty());
}

/// 두 입찰자가 경쟁하고 종료 후 입찰이 거절되는 종단 시나리오
#[tokio::test]
async fn test_end_to_end_scenario() {
    let store = MemoryStore::new();
    let policy = BidPolicy::default();
    let now = Utc::now();

    // startingPrice=10.00, startTime=now, endTime=now+1h
    let auction = store
        .create_auction(&auction_cmd(1, 0, 3600), now)
        .await
        .unwrap();

    // A 가 12.00 입찰 → 수락
    place(&store, &policy, auction.id, 2, "12.00", now).await.unwrap();
    assert_eq!(
        store.auction(auction.id).await.unwrap().current_price,
        dec("12.00")
    );

    // B 가 11.00 입찰 → LOW_BID
    let err = place(&store, &policy, auction.id, 3, "11.00", now)
        .await
        .unwrap_err();
    assert!(matches!(err, BidError::TooLow { .. }));

    // B 가 15.00 입찰 → 수락, 낙찰자 B
    place(&store, &policy, auction.id, 3, "15.00", now).await.unwrap();
    let state = store.auction(auction.id).await.unwrap();
    assert_eq!(state.current_price, dec("15.00"));
    assert_eq!(state.current_winner, Some(3));

    // 종료 후 C 가 20.00 입찰 → 거절, 낙찰자는 B 그대로
    let after_end = auction.end_time + Duration::seconds(1);
    let err = place(&store, &policy, auction.id, 4, "20.00", after_end)
        .await
        .unwrap_err();
    assert!(matches!(err, BidError::AlreadyEnded));

    let final_state = store.auction(auction.id).await.unwrap();
    assert_eq!(final_state.current_price, dec("15.00"));
    assert_eq!(final_state.current_winner, Some(3));
}
