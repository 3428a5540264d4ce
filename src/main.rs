// region:    --- Imports
use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::bidding::commands::{self, CreateAuctionCommand};
use crate::bidding::model::BidPolicy;
use crate::error::BidError;
use crate::scheduler::AuctionScheduler;
use crate::store::memory::MemoryStore;
use crate::store::postgres::PostgresStore;
use crate::store::AuctionStore;
// endregion: --- Imports

// region:    --- Modules
mod bidding;
mod error;
mod handlers;
mod lifecycle;
mod scheduler;
mod store;

// endregion: --- Modules

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // 저장소 선택: DATABASE_URL 이 있으면 Postgres, 없으면 인메모리
    let store: Arc<dyn AuctionStore> = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let store = PostgresStore::new(&database_url).await?;
            info!("{:<12} --> Postgres 저장소 초기화 성공", "Main");
            Arc::new(store)
        }
        Err(_) => {
            info!("{:<12} --> DATABASE_URL 미설정: 인메모리 저장소 사용", "Main");
            Arc::new(MemoryStore::new())
        }
    };

    // 입찰 정책: 최소 인상폭 (미설정 시 현재 가격 초과면 허용)
    let min_increment = std::env::var("BID_MIN_INCREMENT")
        .ok()
        .and_then(|v| v.parse::<Decimal>().ok());
    let policy = BidPolicy { min_increment };

    // 데모 경매 생성
    if std::env::var("SEED_DEMO").is_ok() {
        seed_demo_auctions(store.as_ref()).await?;
        info!("{:<12} --> 데모 경매 생성 완료", "Main");
    }

    // 경매 시작/종료 알림 스케줄러 시작
    let scheduler = AuctionScheduler::new(Arc::clone(&store));
    scheduler.start().await;

    // 라우터 설정
    let routes_all = handlers::app((store, policy));

    // 리스너 생성
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main

// region:    --- Demo Seed
/// 데모 경매 생성 (테스트 페이지용)
async fn seed_demo_auctions(store: &dyn AuctionStore) -> Result<(), BidError> {
    let now = Utc::now();
    let samples = vec![
        CreateAuctionCommand {
            title: "빈티지 롤렉스 시계".to_string(),
            description: "1980년대 빈티지 롤렉스. 박스와 보증서 포함, 상태 최상.".to_string(),
            image_url: Some(
                "https://images.unsplash.com/photo-1523275335684-37898b6baf30?w=800".to_string(),
            ),
            starting_price: Decimal::new(5_000_00, 2),
            start_time: now - Duration::days(2),
            end_time: now + Duration::days(5),
            seller_id: 1,
        },
        CreateAuctionCommand {
            title: "희귀 초판 만화책".to_string(),
            description: "1963년 스파이더맨 초판. 전문 감정 완료, 민트 등급.".to_string(),
            image_url: Some(
                "https://images.unsplash.com/photo-1612198188060-c7c2a3b66eae?w=800".to_string(),
            ),
            starting_price: Decimal::new(2_000_00, 2),
            start_time: now - Duration::days(1),
            end_time: now + Duration::days(7),
            seller_id: 2,
        },
        CreateAuctionCommand {
            title: "앤티크 페르시안 러그".to_string(),
            description: "1900년대 초 수공예 페르시안 러그. 섬세한 문양, 보존 상태 양호."
                .to_string(),
            image_url: None,
            starting_price: Decimal::new(3_000_00, 2),
            start_time: now,
            end_time: now + Duration::days(3),
            seller_id: 1,
        },
    ];

    for cmd in samples {
        commands::handle_create_auction(store, cmd, now).await?;
    }
    Ok(())
}
// endregion: --- Demo Seed
