// region:    --- Imports
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;

// endregion: --- Imports

// region:    --- Bid Error
/// 입찰/경매 처리 오류.
/// 검증 실패는 전부 코드와 함께 요청자에게 반환되고, 저장소 오류만 5xx 로 처리한다.
/// 거절된 요청은 상태를 바꾸지 않으므로 재시도해도 안전하다.
#[derive(Debug, Error)]
pub enum BidError {
    #[error("경매를 찾을 수 없습니다.")]
    NotFound,
    #[error("경매가 아직 시작되지 않았습니다.")]
    NotStarted,
    #[error("경매가 이미 종료되었습니다.")]
    AlreadyEnded,
    #[error("판매자는 자신의 경매에 입찰할 수 없습니다.")]
    SelfBid,
    #[error("입찰 금액이 현재 가격보다 낮습니다.")]
    TooLow { current_price: Decimal },
    #[error("잘못된 경매 정보입니다: {0}")]
    InvalidSpec(&'static str),
    #[error("저장소 오류: {0}")]
    Storage(#[from] sqlx::Error),
}

impl BidError {
    /// 클라이언트가 분기할 수 있는 오류 코드
    pub fn code(&self) -> &'static str {
        match self {
            BidError::NotFound => "NOT_FOUND",
            BidError::NotStarted => "NOT_STARTED",
            BidError::AlreadyEnded => "ALREADY_ENDED",
            BidError::SelfBid => "SELF_BID",
            BidError::TooLow { .. } => "LOW_BID",
            BidError::InvalidSpec(_) => "INVALID_SPEC",
            BidError::Storage(_) => "STORAGE_ERROR",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            BidError::NotFound => StatusCode::NOT_FOUND,
            BidError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for BidError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "success": false,
            "error": self.to_string(),
            "code": self.code(),
        });
        if let BidError::TooLow { current_price } = &self {
            body["current_price"] = json!(current_price);
        }
        (self.status_code(), Json(body)).into_response()
    }
}
// endregion: --- Bid Error
