/// 경매 등록
pub const INSERT_AUCTION: &str = r#"
    INSERT INTO auctions (seller_id, title, description, image_url, starting_price, current_price, start_time, end_time, current_winner, created_at)
    VALUES ($1, $2, $3, $4, $5, $5, $6, $7, NULL, $8)
    RETURNING id, seller_id, title, description, image_url, starting_price, current_price, start_time, end_time, current_winner, created_at
"#;

/// 경매 조회
pub const GET_AUCTION: &str =
    "SELECT id, seller_id, title, description, image_url, starting_price, current_price, start_time, end_time, current_winner, created_at FROM auctions WHERE id = $1";

/// 경매 조회 (행 잠금, 입찰 직렬화 구간 진입용)
pub const GET_AUCTION_FOR_UPDATE: &str =
    "SELECT id, seller_id, title, description, image_url, starting_price, current_price, start_time, end_time, current_winner, created_at FROM auctions WHERE id = $1 FOR UPDATE";

/// 경매 목록 조회 (상태 필터는 유도값이라 조회 후 적용한다)
pub const LIST_AUCTIONS: &str = r#"
    SELECT id, seller_id, title, description, image_url, starting_price, current_price, start_time, end_time, current_winner, created_at
    FROM auctions
    WHERE ($1::BIGINT IS NULL OR seller_id = $1)
      AND ($2::TEXT IS NULL OR title ILIKE '%' || $2 || '%')
    ORDER BY created_at DESC, id DESC
"#;

/// 입찰 기록 추가
pub const INSERT_BID: &str = r#"
    INSERT INTO bids (auction_id, bidder_id, amount, bid_time)
    VALUES ($1, $2, $3, $4)
    RETURNING id, auction_id, bidder_id, amount, bid_time
"#;

/// 가격/낙찰자 갱신 (입찰 기록 추가와 같은 트랜잭션에서만 실행한다)
pub const APPLY_BID: &str =
    "UPDATE auctions SET current_price = $1, current_winner = $2 WHERE id = $3";

/// 입찰 이력 조회 (오래된 순)
pub const GET_BID_HISTORY: &str = r#"
    SELECT id, auction_id, bidder_id, amount, bid_time
    FROM bids
    WHERE auction_id = $1
    ORDER BY id ASC
    LIMIT $2 OFFSET $3
"#;

/// 입찰자별 입찰 조회
pub const GET_BIDS_BY_BIDDER: &str = r#"
    SELECT id, auction_id, bidder_id, amount, bid_time
    FROM bids
    WHERE bidder_id = $1
    ORDER BY id ASC
"#;

/// 최신(최고) 입찰 조회
pub const GET_HIGHEST_BID: &str = r#"
    SELECT id, auction_id, bidder_id, amount, bid_time
    FROM bids
    WHERE auction_id = $1
    ORDER BY id DESC
    LIMIT 1
"#;
