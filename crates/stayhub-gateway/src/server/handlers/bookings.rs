//! `/bookings` handlers

use axum::{extract::State, http::StatusCode, response::Json};
use stayhub_core::NewBooking;

use crate::api::{
    ApiJson, ApiPath, ApiResult, BookingDetailResponse, BookingMutationResponse,
    BookingSummaryResponse, CreateBookingRequest,
};
use crate::auth::CurrentCaller;
use crate::server::AppState;

pub async fn my_bookings(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
) -> ApiResult<Json<Vec<BookingSummaryResponse>>> {
    let bookings = state.bookings.list_mine(&caller).await?;
    Ok(Json(
        bookings.into_iter().map(BookingSummaryResponse::from).collect(),
    ))
}

pub async fn get_booking(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<BookingDetailResponse>> {
    let detail = state.bookings.get(&caller, &id).await?;
    Ok(Json(detail.into()))
}

pub async fn create_booking(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    ApiJson(request): ApiJson<CreateBookingRequest>,
) -> ApiResult<(StatusCode, Json<BookingMutationResponse>)> {
    let booking = state
        .bookings
        .create(&caller, NewBooking::from(request))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(BookingMutationResponse::created(&booking)),
    ))
}

pub async fn cancel_booking(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<BookingMutationResponse>> {
    let booking = state.bookings.cancel(&caller, &id).await?;
    Ok(Json(BookingMutationResponse::cancelled(&booking)))
}
