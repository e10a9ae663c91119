use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Form, Router,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::debug;

use super::pages::{self, ContactView, Notice};
use super::SiteState;
use crate::auth::{require_admin, Access, AdminUser, AuthError};
use crate::contact::{ContactError, ContactSubmission, MailTransport, SENT_MESSAGE};
use crate::error::AppError;
use crate::records::{LeavePeriod, NewLeavePeriod, NewPopup, RecordId, StoreError};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// Router for the public pages and the session-gated backoffice.
pub fn site_router<T>(state: Arc<SiteState<T>>) -> Router
where
    T: MailTransport,
{
    let backoffice = Router::new()
        .route("/backoffice", get(dashboard::<T>))
        .route("/backoffice/verlof", get(leave_index::<T>))
        .route("/backoffice/verlof/add", post(leave_add::<T>))
        .route("/backoffice/verlof/delete/:id", post(leave_delete::<T>))
        .route("/backoffice/popups", get(popup_index::<T>))
        .route("/backoffice/popups/add", post(popup_add::<T>))
        .route("/backoffice/popups/toggle/:id", post(popup_toggle::<T>))
        .route("/backoffice/popups/delete/:id", post(popup_delete::<T>))
        .route_layer(middleware::from_fn_with_state(
            state.gate.clone(),
            require_admin,
        ));

    Router::new()
        .route("/", get(home::<T>))
        .route("/treatments", get(treatments))
        .route("/behandelingen", get(treatments))
        .route("/info", get(info))
        .route("/contact", get(contact_form::<T>).post(contact_submit::<T>))
        .route(
            "/backoffice/login",
            get(login_form::<T>).post(login_submit::<T>),
        )
        .route("/backoffice/logout", get(logout::<T>))
        .merge(backoffice)
        .fallback(not_found)
        .with_state(state)
}

/// Run store work on the blocking pool so file I/O and the store lock stay off runtime workers.
pub(crate) async fn offload<F, R>(work: F) -> Result<R, AppError>
where
    F: FnOnce() -> Result<R, StoreError> + Send + 'static,
    R: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(work).await??)
}

pub(crate) async fn home<T: MailTransport>(
    State(state): State<Arc<SiteState<T>>>,
) -> Result<Html<String>, AppError> {
    let popups = state.popups.clone();
    let active = offload(move || Ok(popups.active())).await?;
    Ok(Html(pages::home(&active)))
}

pub(crate) async fn treatments() -> Html<String> {
    Html(pages::treatments())
}

pub(crate) async fn info() -> Html<String> {
    Html(pages::info())
}

async fn current_leave_periods<T: MailTransport>(
    state: &SiteState<T>,
) -> Result<Vec<LeavePeriod>, AppError> {
    let leave_periods = state.leave_periods.clone();
    offload(move || Ok(leave_periods.list())).await
}

pub(crate) async fn contact_form<T: MailTransport>(
    State(state): State<Arc<SiteState<T>>>,
) -> Result<Html<String>, AppError> {
    Ok(Html(pages::contact(&ContactView {
        leave_periods: current_leave_periods(&state).await?,
        ..ContactView::default()
    })))
}

pub(crate) async fn contact_submit<T: MailTransport>(
    State(state): State<Arc<SiteState<T>>>,
    Form(submission): Form<ContactSubmission>,
) -> Result<Response, AppError> {
    let outcome = state.contact.submit(&submission).await;
    let leave_periods = current_leave_periods(&state).await?;

    let (status, view) = match outcome {
        Ok(()) => (
            StatusCode::OK,
            ContactView {
                leave_periods,
                notice: Some(Notice::Success(SENT_MESSAGE.to_string())),
                values: ContactSubmission::default(),
            },
        ),
        Err(err) => {
            let status = match err {
                ContactError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ContactError::Delivery(_) => StatusCode::BAD_GATEWAY,
            };
            (
                status,
                ContactView {
                    leave_periods,
                    notice: Some(Notice::Error(err.to_string())),
                    values: submission,
                },
            )
        }
    };

    Ok((status, Html(pages::contact(&view))).into_response())
}

pub(crate) async fn login_form<T: MailTransport>(
    State(state): State<Arc<SiteState<T>>>,
    session: Session,
) -> Result<Response, AppError> {
    if let Access::Allow { .. } = state.gate.guard(&session).await? {
        return Ok(Redirect::to("/backoffice").into_response());
    }
    Ok(Html(pages::login(None)).into_response())
}

pub(crate) async fn login_submit<T: MailTransport>(
    State(state): State<Arc<SiteState<T>>>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match state
        .gate
        .login(&session, &form.username, &form.password)
        .await
    {
        Ok(()) => Ok(Redirect::to("/backoffice").into_response()),
        Err(err @ AuthError::InvalidCredentials) => Ok((
            StatusCode::UNAUTHORIZED,
            Html(pages::login(Some(&err.to_string()))),
        )
            .into_response()),
        Err(err) => Err(err.into()),
    }
}

pub(crate) async fn logout<T: MailTransport>(
    State(state): State<Arc<SiteState<T>>>,
    session: Session,
) -> Result<Redirect, AppError> {
    state.gate.logout(&session).await?;
    Ok(Redirect::to("/"))
}

pub(crate) async fn dashboard<T: MailTransport>(
    State(state): State<Arc<SiteState<T>>>,
    Extension(AdminUser(username)): Extension<AdminUser>,
) -> Result<Html<String>, AppError> {
    let (leave_periods, popups) = (state.leave_periods.clone(), state.popups.clone());
    let (leave_count, popups) =
        offload(move || Ok((leave_periods.list().len(), popups.list()))).await?;
    let active = popups.iter().filter(|popup| popup.active).count();
    Ok(Html(pages::dashboard(
        &username,
        leave_count,
        popups.len(),
        active,
    )))
}

pub(crate) async fn leave_index<T: MailTransport>(
    State(state): State<Arc<SiteState<T>>>,
) -> Result<Html<String>, AppError> {
    Ok(Html(pages::leave_admin(&current_leave_periods(&state).await?)))
}

pub(crate) async fn leave_add<T: MailTransport>(
    State(state): State<Arc<SiteState<T>>>,
    Form(draft): Form<NewLeavePeriod>,
) -> Result<Redirect, AppError> {
    let leave_periods = state.leave_periods.clone();
    offload(move || leave_periods.add(draft)).await?;
    Ok(Redirect::to("/backoffice/verlof"))
}

pub(crate) async fn leave_delete<T: MailTransport>(
    State(state): State<Arc<SiteState<T>>>,
    Path(raw_id): Path<String>,
) -> Result<Redirect, AppError> {
    if let Some(id) = parse_id(&raw_id) {
        let leave_periods = state.leave_periods.clone();
        offload(move || leave_periods.delete(id)).await?;
    }
    Ok(Redirect::to("/backoffice/verlof"))
}

pub(crate) async fn popup_index<T: MailTransport>(
    State(state): State<Arc<SiteState<T>>>,
) -> Result<Html<String>, AppError> {
    let popups = state.popups.clone();
    let listed = offload(move || Ok(popups.list())).await?;
    Ok(Html(pages::popups_admin(&listed)))
}

pub(crate) async fn popup_add<T: MailTransport>(
    State(state): State<Arc<SiteState<T>>>,
    Form(draft): Form<NewPopup>,
) -> Result<Redirect, AppError> {
    let popups = state.popups.clone();
    offload(move || popups.add(draft)).await?;
    Ok(Redirect::to("/backoffice/popups"))
}

pub(crate) async fn popup_toggle<T: MailTransport>(
    State(state): State<Arc<SiteState<T>>>,
    Path(raw_id): Path<String>,
) -> Result<Redirect, AppError> {
    if let Some(id) = parse_id(&raw_id) {
        let popups = state.popups.clone();
        offload(move || popups.toggle(id, "active")).await?;
    }
    Ok(Redirect::to("/backoffice/popups"))
}

pub(crate) async fn popup_delete<T: MailTransport>(
    State(state): State<Arc<SiteState<T>>>,
    Path(raw_id): Path<String>,
) -> Result<Redirect, AppError> {
    if let Some(id) = parse_id(&raw_id) {
        let popups = state.popups.clone();
        offload(move || popups.delete(id)).await?;
    }
    Ok(Redirect::to("/backoffice/popups"))
}

/// The 404 page, also used as the fallback for unmatched static assets.
pub async fn not_found() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html(pages::not_found()))
}

fn parse_id(raw: &str) -> Option<RecordId> {
    let parsed = raw.trim().parse().ok();
    if parsed.is_none() {
        debug!(raw, "ignoring non-numeric record id");
    }
    parsed
}
