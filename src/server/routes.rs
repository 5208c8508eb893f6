//! HTTP route handlers for the chat front-end.
//!
//! The HTML routes re-render the whole page after every action. The session
//! is carried in a cookie; a request without a known session opens a new one.

use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Form, Multipart, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::ApiError;
use super::render::{Notice, PageView};
use super::state::AppState;
use crate::chat::{ChatError, ConversationId, ConversationTitle, validate_input};
use crate::session::{DisplayOptions, Session, SessionId, Upload};
use crate::table::check_file_name;

/// Cookie carrying the session identifier.
pub const SESSION_COOKIE: &str = "gemini_chat_session";

/// `Set-Cookie` value removing the session cookie.
const CLEAR_SESSION_COOKIE: &str = "gemini_chat_session=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax";

/// Create the router with all routes.
#[must_use]
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/chat", post(chat_submit).layer(DefaultBodyLimit::disable()))
        .route("/conversations", post(new_conversation))
        .route("/conversations/select", post(select_conversation))
        .route("/upload/clear", post(clear_upload))
        .route("/session/end", post(end_session))
        .route("/health", get(health_check))
        .route("/api/chat", post(api_chat))
        .route("/api/conversations", get(api_conversations))
        .with_state(state)
}

fn session_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| value.parse().ok())
}

fn with_session_cookie(mut response: Response, session: &Session, created: bool) -> Response {
    if created {
        let cookie = format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
            session.id()
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
    response
}

async fn render_page(
    state: &AppState,
    session: &Session,
    notices: Vec<Notice>,
    draft: String,
) -> Response {
    let view = {
        let guard = session.lock().await;
        PageView::build(&guard, state.chat.model_name(), notices, draft)
    };

    match state.renderer.render(&view) {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            warn!(%err, "Failed to render page");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render page").into_response()
        }
    }
}

/// Render the page for the caller's session.
async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let (session, created) = state.sessions.resolve(session_from_headers(&headers));
    let response = render_page(&state, &session, Vec::new(), String::new()).await;
    with_session_cookie(response, &session, created)
}

/// Fields of the main form.
#[derive(Debug, Default)]
struct ChatForm {
    message: String,
    file: Option<Upload>,
    show_table: bool,
    show_stats: bool,
    send: bool,
}

async fn read_chat_form(mut multipart: Multipart) -> Result<ChatForm, MultipartError> {
    let mut form = ChatForm {
        send: true,
        ..ChatForm::default()
    };

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "message" => form.message = field.text().await?,
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                if !file_name.is_empty() && !bytes.is_empty() {
                    form.file = Some(Upload {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            "show_table" => form.show_table = true,
            "show_stats" => form.show_stats = true,
            "action" => form.send = field.text().await? != "refresh",
            _ => {}
        }
    }

    Ok(form)
}

/// Handle the main form: store the upload and toggles, then optionally run
/// one submit pass.
async fn chat_submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let (session, created) = state.sessions.resolve(session_from_headers(&headers));

    let form = match read_chat_form(multipart).await {
        Ok(form) => form,
        Err(err) => {
            let response = (StatusCode::BAD_REQUEST, format!("Invalid form: {err}")).into_response();
            return with_session_cookie(response, &session, created);
        }
    };

    let mut notices = Vec::new();
    let summary = {
        let mut guard = session.lock().await;
        guard.display = DisplayOptions {
            show_table: form.show_table,
            show_stats: form.show_stats,
        };

        if let Some(upload) = form.file {
            match check_file_name(&upload.file_name) {
                Ok(()) => {
                    debug!(session = %session.id(), file = %upload.file_name, size = upload.bytes.len(), "Stored upload");
                    guard.upload = Some(upload);
                }
                Err(err) => notices.push(Notice::from(&ChatError::from(err))),
            }
        }

        // A broken upload is reported by the page itself; the question is
        // still sent, without the table.
        guard
            .upload
            .as_ref()
            .filter(|_| form.send)
            .and_then(|upload| upload.summary().ok())
    };

    let draft = if form.send {
        match state.chat.submit(&session, &form.message, summary.as_deref()).await {
            Ok(_) => notices.push(Notice::success("Gemini replied:")),
            Err(err) => notices.push(Notice::from(&err)),
        }
        String::new()
    } else {
        form.message
    };

    let response = render_page(&state, &session, notices, draft).await;
    with_session_cookie(response, &session, created)
}

/// Create and select an empty conversation.
async fn new_conversation(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let (session, created) = state.sessions.resolve(session_from_headers(&headers));
    let id = session.lock().await.conversations.create_conversation(None);
    debug!(session = %session.id(), conversation = %id, "New conversation");
    with_session_cookie(Redirect::to("/").into_response(), &session, created)
}

/// Conversation selector form.
#[derive(Debug, Deserialize)]
pub struct SelectForm {
    /// Conversation to open.
    pub id: String,
}

/// Open another conversation of the session.
async fn select_conversation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<SelectForm>,
) -> Response {
    let (session, created) = state.sessions.resolve(session_from_headers(&headers));
    let result = session
        .lock()
        .await
        .conversations
        .select(&ConversationId::from(form.id));

    let response = match result {
        Ok(()) => Redirect::to("/").into_response(),
        Err(err) => {
            let mut response = render_page(&state, &session, vec![Notice::from(&err)], String::new()).await;
            *response.status_mut() = StatusCode::NOT_FOUND;
            response
        }
    };
    with_session_cookie(response, &session, created)
}

/// Forget the uploaded file.
async fn clear_upload(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let (session, created) = state.sessions.resolve(session_from_headers(&headers));
    session.lock().await.upload = None;
    with_session_cookie(Redirect::to("/").into_response(), &session, created)
}

/// End the caller's session and drop its cookie.
async fn end_session(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let ended = session_from_headers(&headers).is_some_and(|id| state.sessions.end(id));
    debug!(ended, "Session end requested");
    let mut response = Redirect::to("/").into_response();
    response
        .headers_mut()
        .append(SET_COOKIE, HeaderValue::from_static(CLEAR_SESSION_COOKIE));
    response
}

/// Health check endpoint.
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "gemini-chat",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.chat.model_name(),
        "sessions": state.sessions.len(),
    }))
}

/// Chat request of the JSON API.
#[derive(Debug, Deserialize)]
pub struct ApiChatRequest {
    /// The user's message.
    pub message: String,
    /// Conversation to select before sending.
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// Chat response of the JSON API.
#[derive(Debug, Serialize)]
pub struct ApiChatResponse {
    /// Conversation holding the exchange.
    pub conversation_id: String,
    /// The assistant's reply.
    pub reply: String,
    /// Model used.
    pub model: String,
}

/// Conversation list of the JSON API.
#[derive(Debug, Serialize)]
pub struct ConversationList {
    /// Selected conversation.
    pub current: Option<String>,
    /// All conversations in creation order.
    pub conversations: Vec<ConversationTitle>,
}

/// Handle chat requests from API clients.
async fn api_chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<ApiChatRequest>, JsonRejection>,
) -> Response {
    let (session, created) = state.sessions.resolve(session_from_headers(&headers));
    let result = match payload {
        Ok(Json(request)) => submit_json(&state, &session, request).await,
        Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
    };
    let response = match result {
        Ok(body) => Json(body).into_response(),
        Err(err) => err.into_response(),
    };
    with_session_cookie(response, &session, created)
}

async fn submit_json(
    state: &AppState,
    session: &Session,
    request: ApiChatRequest,
) -> Result<ApiChatResponse, ApiError> {
    // Nothing in the session changes unless the request is going to be sent.
    validate_input(&request.message)?;
    let target = request.conversation_id.map(ConversationId::from);

    let summary = {
        let mut guard = session.lock().await;
        if let Some(id) = target.as_ref().filter(|id| !guard.conversations.contains(id)) {
            return Err(ChatError::UnknownConversation(id.clone()).into());
        }
        let summary = guard
            .upload
            .as_ref()
            .map(Upload::summary)
            .transpose()
            .map_err(ChatError::from)?;
        if let Some(id) = &target {
            guard.conversations.select(id)?;
        }
        summary
    };

    let outcome = state
        .chat
        .submit(session, &request.message, summary.as_deref())
        .await?;

    Ok(ApiChatResponse {
        conversation_id: outcome.conversation_id.to_string(),
        reply: outcome.reply,
        model: state.chat.model_name().to_string(),
    })
}

/// List the conversations of the caller's session.
async fn api_conversations(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let (session, created) = state.sessions.resolve(session_from_headers(&headers));
    let body = {
        let guard = session.lock().await;
        ConversationList {
            current: guard.conversations.current_id().map(ToString::to_string),
            conversations: guard.conversations.list_titles(),
        }
    };
    with_session_cookie(Json(body).into_response(), &session, created)
}
