//! `/properties` handlers

use axum::{extract::State, http::StatusCode, response::Json};

use crate::api::{
    ApiJson, ApiPath, ApiQuery, ApiResult, CreatePropertyRequest, CreatePropertyResponse,
    MessageResponse, PropertyDetailResponse, PropertyListQuery, PropertyListResponse,
    PropertyResponse, UpdatePropertyRequest, UpdatePropertyResponse,
};
use crate::auth::CurrentCaller;
use crate::server::AppState;

pub async fn list_properties(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PropertyListQuery>,
) -> ApiResult<Json<PropertyListResponse>> {
    let (filter, page) = query.into_parts()?;
    let result = state.catalog.list(&filter, page).await?;
    Ok(Json(result.into()))
}

pub async fn get_property(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<PropertyDetailResponse>> {
    let detail = state.catalog.get_detail(&id).await?;
    Ok(Json(detail.into()))
}

pub async fn create_property(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    ApiJson(request): ApiJson<CreatePropertyRequest>,
) -> ApiResult<(StatusCode, Json<CreatePropertyResponse>)> {
    let property = state.catalog.create(&caller, request.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatePropertyResponse {
            message: "Property created successfully",
            property_id: property.id,
        }),
    ))
}

pub async fn update_property(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    ApiPath(id): ApiPath<String>,
    ApiJson(request): ApiJson<UpdatePropertyRequest>,
) -> ApiResult<Json<UpdatePropertyResponse>> {
    let property = state.catalog.update(&caller, &id, request.into()).await?;
    Ok(Json(UpdatePropertyResponse {
        message: "Property updated successfully",
        property: PropertyResponse::from(property),
    }))
}

pub async fn delete_property(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.catalog.delete(&caller, &id).await?;
    Ok(Json(MessageResponse {
        message: "Property deleted successfully",
    }))
}
