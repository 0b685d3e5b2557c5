// web-server/src/api/auth.rs
use actix_web::{http::header, http::StatusCode, web, Either, HttpRequest, HttpResponse, ResponseError};
use common::models::session::SessionRecord;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::GatewayError;
use crate::middleware::ENTRY_PATH;
use crate::state::GatewayState;
use crate::upstream::{endpoints, UpstreamBody};
use crate::utils::token::create_session_id;
use crate::views::View;

/// Where a successful login lands
pub const AFTER_LOGIN_PATH: &str = "/agent/upload";

const REGISTERED_MESSAGE: &str = "Registration successful. Please log in.";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    #[serde(alias = "first_name")]
    pub first_name: Option<String>,
    #[serde(alias = "last_name")]
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// JSON or urlencoded. A missing or unreadable body is `None` and reaches
/// the handler as an empty form, so it re-renders with a validation message.
type Body<T> = Option<Either<web::Json<T>, web::Form<T>>>;

fn into_inner<T: Default>(body: Body<T>) -> T {
    match body {
        Some(Either::Left(json)) => json.into_inner(),
        Some(Either::Right(form)) => form.into_inner(),
        None => T::default(),
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// The upstream login payload: `data: { user: {...}, token }`
#[derive(Debug, Deserialize)]
struct LoginPayload {
    user: UpstreamUser,
    #[serde(alias = "accessToken")]
    token: String,
}

#[derive(Debug, Deserialize)]
struct UpstreamUser {
    #[serde(alias = "_id", alias = "userId")]
    id: Value,
    #[serde(rename = "firstName", alias = "first_name", default)]
    first_name: String,
    #[serde(default)]
    email: String,
}

fn id_to_string(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn redirect(location: &str) -> actix_web::HttpResponseBuilder {
    let mut response = HttpResponse::Found();
    response.insert_header((header::LOCATION, location));
    response
}

pub async fn register(state: web::Data<GatewayState>, body: Body<RegisterForm>) -> HttpResponse {
    let form = into_inner(body);

    let (Some(first_name), Some(last_name), Some(email), Some(password)) = (
        present(&form.first_name),
        present(&form.last_name),
        present(&form.email),
        present(&form.password),
    ) else {
        let err = GatewayError::Validation("All fields are required.".into());
        return render_register_error(&state, &err);
    };

    let payload = json!({
        "firstName": first_name,
        "lastName": last_name,
        "email": email,
        "password": password,
    });

    match state
        .upstream
        .call(Method::POST, endpoints::USER_REGISTER, None, UpstreamBody::Json(payload))
        .await
    {
        Ok(result) => {
            tracing::info!(%email, "User registered");
            let success = if result.message.is_empty() {
                REGISTERED_MESSAGE.to_string()
            } else {
                result.message
            };
            state.render(
                StatusCode::OK,
                &View::Login {
                    error: None,
                    success: Some(success),
                },
            )
        }
        Err(e) => {
            tracing::error!(%email, "Registration failed: {}", e);
            render_register_error(&state, &e)
        }
    }
}

fn render_register_error(state: &GatewayState, err: &GatewayError) -> HttpResponse {
    state.render(
        err.status_code(),
        &View::Register {
            error: Some(err.message()),
            success: None,
        },
    )
}

fn render_login_error(state: &GatewayState, err: &GatewayError) -> HttpResponse {
    state.render(
        err.status_code(),
        &View::Login {
            error: Some(err.message()),
            success: None,
        },
    )
}

pub async fn login(
    req: HttpRequest,
    state: web::Data<GatewayState>,
    body: Body<LoginForm>,
) -> HttpResponse {
    let form = into_inner(body);

    let (Some(email), Some(password)) = (present(&form.email), present(&form.password)) else {
        let err = GatewayError::Validation("Email and password are required.".into());
        return render_login_error(&state, &err);
    };

    let payload = json!({ "email": email, "password": password });
    let result = match state
        .upstream
        .call(Method::POST, endpoints::USER_LOGIN, None, UpstreamBody::Json(payload))
        .await
    {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(%email, "Login rejected: {}", e);
            return render_login_error(&state, &e);
        }
    };

    let login: LoginPayload = match serde_json::from_value(result.data) {
        Ok(login) => login,
        Err(e) => {
            tracing::error!(%email, "Unexpected login response shape: {}", e);
            let err = GatewayError::Auth("Login failed. Please try again.".into());
            return render_login_error(&state, &err);
        }
    };

    // A fresh id per login; any previous record of this browser is dropped
    if let Some(previous) = state.cookies.session_id(&req) {
        if let Err(e) = state.sessions.delete(&previous).await {
            tracing::warn!("Failed to drop previous session: {}", e);
        }
    }

    let session_id = create_session_id();
    let session_cookie = match state.cookies.session_cookie(&session_id) {
        Ok(cookie) => cookie,
        Err(e) => {
            tracing::error!("Failed to sign session cookie: {}", e);
            return render_login_error(&state, &e);
        }
    };
    let record = SessionRecord::new(
        login.user.first_name,
        if login.user.email.is_empty() { email.to_string() } else { login.user.email },
        id_to_string(&login.user.id),
    );
    let user_id = record.user_id.clone();

    if let Err(e) = state.sessions.set(&session_id, record).await {
        tracing::error!(%user_id, "Failed to store session: {}", e);
        return render_login_error(&state, &e);
    }

    tracing::info!(%user_id, "User logged in");
    redirect(AFTER_LOGIN_PATH)
        .cookie(session_cookie)
        .cookie(state.cookies.access_cookie(&login.token))
        .finish()
}

pub async fn logout(req: HttpRequest, state: web::Data<GatewayState>) -> HttpResponse {
    if let Some(session_id) = state.cookies.session_id(&req) {
        match state.sessions.delete(&session_id).await {
            Ok(true) => tracing::info!("Session ended"),
            Ok(false) => tracing::debug!("Logout without a live session"),
            Err(e) => tracing::error!("Failed to destroy session: {}", e),
        }
    }

    redirect(ENTRY_PATH)
        .cookie(state.cookies.clear_session())
        .cookie(state.cookies.clear_access())
        .finish()
}
