// web-server/src/api/agents.rs
use actix_multipart::Multipart;
use actix_web::{http::header, http::StatusCode, web, HttpResponse};
use common::models::agent::FilterCriteria;
use reqwest::Method;
use serde_json::json;
use std::collections::HashMap;

use crate::error::GatewayError;
use crate::middleware::{AuthenticatedAgent, ENTRY_PATH};
use crate::state::GatewayState;
use crate::upload::receive_spreadsheet;
use crate::upstream::{endpoints, UpstreamBody};
use crate::views::View;

const FILE_REQUIRED: &str = "Excel file is required.";

fn redirect_to_entry() -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, ENTRY_PATH))
        .finish()
}

/// Shared failure policy for the report routes: an upstream token rejection
/// sends the browser back to login, anything else is an error envelope
fn report_failure(state: &GatewayState, err: &GatewayError) -> HttpResponse {
    if err.is_expired_token() {
        tracing::info!("Upstream rejected the access token, redirecting to entry");
        return redirect_to_entry();
    }
    state.responses.error(err)
}

pub async fn upload_agents_from_excel(
    state: web::Data<GatewayState>,
    agent: web::ReqData<AuthenticatedAgent>,
    payload: Multipart,
) -> HttpResponse {
    let upload = match receive_spreadsheet(payload, &state.uploads).await {
        Ok(Some(upload)) => upload,
        Ok(None) => return state.responses.send(400, false, FILE_REQUIRED, None),
        Err(e) => {
            tracing::warn!("Upload rejected: {}", e);
            return state.responses.error(&e);
        }
    };

    tracing::info!(
        file = %upload.original_name,
        extension = %upload.declared_extension,
        size = upload.size_bytes,
        "File received"
    );

    let result = state
        .upstream
        .call(
            Method::POST,
            endpoints::AGENTS_UPLOAD,
            Some(agent.token.as_str()),
            UpstreamBody::File(upload.attachment()),
        )
        .await;

    // The temp file goes away whatever upstream said
    upload.discard();

    match result {
        Ok(result) => state.responses.send(
            200,
            true,
            "Excel uploaded and agents added successfully.",
            Some(result.data),
        ),
        Err(e) => {
            tracing::error!("Error during Excel agents upload: {}", e);
            state.responses.error(&e)
        }
    }
}

pub async fn get_all_agents(
    state: web::Data<GatewayState>,
    agent: web::ReqData<AuthenticatedAgent>,
) -> HttpResponse {
    match state
        .upstream
        .call(Method::GET, endpoints::AGENTS_LIST, Some(agent.token.as_str()), UpstreamBody::Empty)
        .await
    {
        Ok(result) => state.render(
            StatusCode::OK,
            &View::Report {
                agents: result.data_list(),
            },
        ),
        Err(e) => {
            tracing::error!("Error retrieving agents: {}", e);
            report_failure(&state, &e)
        }
    }
}

pub async fn get_filtered_results(
    state: web::Data<GatewayState>,
    agent: web::ReqData<AuthenticatedAgent>,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    if query.is_empty() {
        tracing::debug!("No query parameters provided, returning empty dataset");
        return HttpResponse::Ok().json(json!({
            "status": 200,
            "message": "No filters provided, returning empty dataset.",
            "data": []
        }));
    }

    let query_string = FilterCriteria::from_query(&query).to_query_string();
    let path = if query_string.is_empty() {
        endpoints::AGENTS_FILTER.to_string()
    } else {
        format!("{}?{}", endpoints::AGENTS_FILTER, query_string)
    };

    match state
        .upstream
        .call(Method::GET, &path, Some(agent.token.as_str()), UpstreamBody::Empty)
        .await
    {
        Ok(result) => state.responses.send(
            200,
            true,
            "Filtered results retrieved successfully.",
            Some(json!(result)),
        ),
        Err(e) => {
            tracing::error!("Error retrieving filtered results: {}", e);
            report_failure(&state, &e)
        }
    }
}
