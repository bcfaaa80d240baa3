#![cfg(not(tarpaulin_include))]

use axum::{
    Form, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use handlebars::Handlebars;
use log::{error, info, warn};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::downloader::XLSX_CONTENT_TYPE;
use crate::error::Error;
use crate::pipeline::{UploadOutcome, process_save, process_upload};
use crate::render::RenderedTable;
use crate::session::{FILE_NAME_KEY, SESSION_COOKIE, SessionStore, new_session_id};

pub struct AppState {
    pub config: AppConfig,
    pub store: SessionStore,
    templates: Handlebars<'static>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, Error> {
        let mut templates = Handlebars::new();
        templates
            .register_template_string("upload", include_str!("./static/upload.html"))
            .map_err(|e| Error::Template(e.to_string()))?;

        Ok(AppState {
            store: SessionStore::new(config.session_ttl),
            config,
            templates,
        })
    }

    fn page(&self, page: &UploadPage<'_>) -> Result<Html<String>, AppError> {
        self.templates
            .render("upload", page)
            .map(Html)
            .map_err(|e| AppError(Error::Template(e.to_string())))
    }

    fn message_page(&self, err: &Error) -> Result<Html<String>, AppError> {
        warn!("{}", err);
        let message = err.to_string();
        self.page(&UploadPage {
            message: Some(&message),
            ..Default::default()
        })
    }
}

#[derive(Serialize, Default)]
struct UploadPage<'a> {
    message: Option<&'a str>,
    table: Option<&'a RenderedTable>,
    total: Option<String>,
}

/// Failure that reached the HTTP boundary.
#[derive(Debug)]
pub struct AppError(pub Error);

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        AppError(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::InvalidUpload | Error::NoUpload => StatusCode::BAD_REQUEST,
            Error::UnreadableFormat(_)
            | Error::MissingColumn { .. }
            | Error::Overflow { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("request failed: {}", self.0);
        } else {
            warn!("request rejected: {}", self.0);
        }

        let body = format!(
            "<!DOCTYPE html><html><head><title>Error</title></head><body>\
             <h1>Something went wrong</h1><p>{}</p><p><a href=\"/upload\">Back</a></p>\
             </body></html>",
            handlebars::html_escape(&self.0.to_string())
        );
        (status, Html(body)).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(|| async { Redirect::to("/upload") }))
        .route("/upload", get(serve_upload).post(handle_upload))
        .route("/save", post(handle_save))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}

pub async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.addr.clone();
    let state = Arc::new(AppState::new(config)?);
    let app = router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_upload(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    state.page(&UploadPage::default())
}

/// Existing session id from the cookie, or a new one added to the jar.
fn ensure_session(jar: CookieJar) -> (CookieJar, String) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let id = cookie.value().to_string();
        return (jar, id);
    }

    let id = new_session_id();
    let mut cookie = Cookie::new(SESSION_COOKIE, id.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    (jar.add(cookie), id)
}

/// Strips any client-side directory from an uploaded file name.
fn base_name(file_name: &str) -> &str {
    file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
}

async fn read_upload(multipart: &mut Multipart) -> Result<(String, Vec<u8>), Error> {
    let mut upload = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("malformed upload: {}", e);
                return Err(Error::InvalidUpload);
            }
        };
        if field.name() != Some("file") {
            continue;
        }

        let file_name = base_name(field.file_name().unwrap_or_default()).to_string();
        let bytes = field.bytes().await.map_err(|e| {
            warn!("failed to read upload: {}", e);
            Error::InvalidUpload
        })?;
        upload = Some((file_name, bytes.to_vec()));
    }

    match upload {
        Some((file_name, bytes)) if !bytes.is_empty() => Ok((file_name, bytes)),
        _ => Err(Error::InvalidUpload),
    }
}

async fn upload_page(
    state: &AppState,
    session_id: &str,
    multipart: &mut Multipart,
) -> Result<Html<String>, AppError> {
    let (file_name, bytes) = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(e) => return state.message_page(&e),
    };

    state.store.put(session_id, bytes.clone());
    state.store.put_string(session_id, FILE_NAME_KEY, &file_name);
    info!("stored {:?} ({} bytes) for session", file_name, bytes.len());

    let UploadOutcome { table, total, .. } =
        match process_upload(&bytes, &file_name, &state.config.roles) {
            Ok(outcome) => outcome,
            Err(e) if e.is_user_message() => return state.message_page(&e),
            Err(e) => return Err(e.into()),
        };

    state.page(&UploadPage {
        message: None,
        table: Some(&table),
        total: Some(total.normalize().to_string()),
    })
}

async fn handle_upload(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let (jar, session_id) = ensure_session(jar);
    let page = upload_page(&state, &session_id, &mut multipart).await;
    (jar, page)
}

fn content_disposition(file_name: &str) -> String {
    let ascii: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c == ' ' || c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii,
        urlencoding::encode(file_name)
    )
}

async fn handle_save(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let session_id = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let canonical = session_id.as_deref().and_then(|id| state.store.get(id));

    let Some(canonical) = canonical else {
        return Ok(state.message_page(&Error::NoUpload)?.into_response());
    };
    let stored_name = session_id
        .as_deref()
        .and_then(|id| state.store.get_string(id, FILE_NAME_KEY));

    let outcome = process_save(&canonical, fields, stored_name.as_deref(), &state.config.roles)?;

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&outcome.file_name),
            ),
        ],
        outcome.bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_keeps_ascii_and_encodes_the_rest() {
        assert_eq!(
            content_disposition("book 1.xlsx"),
            "attachment; filename=\"book 1.xlsx\"; filename*=UTF-8''book%201.xlsx"
        );
        let value = content_disposition("bü\"ro.xlsx");
        assert!(value.starts_with("attachment; filename=\"b__ro.xlsx\""));
        assert!(value.ends_with("filename*=UTF-8''b%C3%BC%22ro.xlsx"));
    }

    #[test]
    fn unprocessable_workbooks_are_422() {
        let overflow = AppError(Error::Overflow { row: 2, col: 9 }).into_response();
        assert_eq!(overflow.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let encode = AppError(Error::Encode("disk".into())).into_response();
        assert_eq!(encode.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn client_paths_are_stripped() {
        assert_eq!(base_name("C:\\Users\\me\\book.xlsx"), "book.xlsx");
        assert_eq!(base_name("dir/book.xlsx"), "book.xlsx");
        assert_eq!(base_name("book.xlsx"), "book.xlsx");
    }
}
