// SPDX-License-Identifier: MIT

//! Page routes: JSON payloads behind the route guard.
//!
//! Protected pages can assume the guard already redirected anonymous
//! visitors, except when the store is unconfigured, in which case every
//! data-dependent page answers with a blocking setup message instead.

use crate::error::{AppError, Result};
use crate::models::{Category, Collection, Prompt, Role};
use crate::services::Session;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const LANDING_COLLECTIONS: u32 = 4;
const TRENDING_PROMPTS: u32 = 8;
const GALLERY_PROMPTS: u32 = 24;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(landing))
        .route("/gallery", get(gallery))
        .route("/home", get(home))
        .route("/profile", get(profile_page))
        .route("/admin", get(admin))
        .route("/login", get(login_page))
        .route("/signup", get(signup_page))
        .route("/contributor/{username}", get(contributor))
        .route("/prompts/{id}", get(prompt_detail))
        .route("/checkout/{id}", get(checkout))
}

/// Identity subset embedded in page payloads.
#[derive(Serialize)]
pub struct SessionUser {
    pub id: String,
    pub email: Option<String>,
}

impl From<&Session> for SessionUser {
    fn from(session: &Session) -> Self {
        Self {
            id: session.user_id.clone(),
            email: session.email.clone(),
        }
    }
}

/// Blocking setup message for data-dependent pages when the store is not
/// configured. A 200, not an error: the page renders this state.
fn setup_required() -> Response {
    Json(serde_json::json!({
        "configured": false,
        "setup_message": "External store is not configured. Set STORE_URL and STORE_ANON_KEY.",
    }))
    .into_response()
}

// ─── Public Pages ────────────────────────────────────────────

#[derive(Serialize)]
struct LandingPage {
    configured: bool,
    collections: Vec<Collection>,
    trending: Vec<Prompt>,
}

/// Landing page: curated collections plus the newest prompts.
async fn landing(State(state): State<Arc<AppState>>) -> Result<Response> {
    if !state.config.store_configured() {
        return Ok(setup_required());
    }

    let (collections, trending) = tokio::try_join!(
        state.store.list_collections(LANDING_COLLECTIONS),
        state.store.list_prompts(TRENDING_PROMPTS),
    )?;

    Ok(Json(LandingPage {
        configured: true,
        collections,
        trending: trending.into_iter().map(Prompt::redacted).collect(),
    })
    .into_response())
}

#[derive(Deserialize)]
struct GalleryQuery {
    /// Full-text search over title/description.
    q: Option<String>,
}

#[derive(Serialize)]
struct GalleryPage {
    configured: bool,
    prompts: Vec<Prompt>,
    categories: Vec<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<String>,
}

/// Public gallery grid, optionally filtered by a search query.
async fn gallery(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GalleryQuery>,
) -> Result<Response> {
    if !state.config.store_configured() {
        return Ok(setup_required());
    }

    let query = params.q.map(|q| q.trim().to_string()).filter(|q| !q.is_empty());

    let prompts_fut = async {
        match &query {
            Some(q) => state.store.search_prompts(q, GALLERY_PROMPTS).await,
            None => state.store.list_prompts(GALLERY_PROMPTS).await,
        }
    };

    let (prompts, categories) = tokio::try_join!(prompts_fut, state.store.list_categories())?;

    Ok(Json(GalleryPage {
        configured: true,
        prompts: prompts.into_iter().map(Prompt::redacted).collect(),
        categories,
        query,
    })
    .into_response())
}

#[derive(Serialize)]
struct AuthPage {
    page: &'static str,
    /// Path to restore after a successful login.
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect_to: Option<String>,
}

#[derive(Deserialize)]
struct AuthPageQuery {
    #[serde(rename = "redirectTo")]
    redirect_to: Option<String>,
}

async fn login_page(Query(params): Query<AuthPageQuery>) -> Json<AuthPage> {
    Json(AuthPage {
        page: "login",
        redirect_to: params.redirect_to,
    })
}

async fn signup_page() -> Json<AuthPage> {
    Json(AuthPage {
        page: "signup",
        redirect_to: None,
    })
}

// ─── Protected Pages ─────────────────────────────────────────

#[derive(Serialize)]
struct HomePage {
    configured: bool,
    user: SessionUser,
    trending: Vec<Prompt>,
}

/// Authenticated landing page.
async fn home(
    State(state): State<Arc<AppState>>,
    session: Option<Extension<Session>>,
) -> Result<Response> {
    if !state.config.store_configured() {
        return Ok(setup_required());
    }
    let Extension(session) = session.ok_or(AppError::Unauthorized)?;

    let trending = state.store.list_prompts(TRENDING_PROMPTS).await?;

    Ok(Json(HomePage {
        configured: true,
        user: SessionUser::from(&session),
        trending: trending.into_iter().map(Prompt::redacted).collect(),
    })
    .into_response())
}

/// Profile page: the full aggregate from the profile façade.
async fn profile_page(
    State(state): State<Arc<AppState>>,
    session: Option<Extension<Session>>,
) -> Result<Response> {
    if !state.config.store_configured() {
        return Ok(setup_required());
    }
    let Extension(session) = session.ok_or(AppError::Unauthorized)?;

    let data = state.profile.load_all(&session).await?;
    Ok(Json(data).into_response())
}

#[derive(Serialize)]
struct ContributorPage {
    configured: bool,
    contributor: ContributorSummary,
    prompts: Vec<Prompt>,
}

#[derive(Serialize)]
struct ContributorSummary {
    id: String,
    full_name: Option<String>,
    avatar_url: Option<String>,
}

/// Public creator profile for an authenticated viewer.
async fn contributor(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Response> {
    if !state.config.store_configured() {
        return Ok(setup_required());
    }

    let profile = state
        .store
        .get_profile_by_name(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contributor {} not found", username)))?;

    let prompts = state.store.list_prompts_by_author(&profile.id).await?;

    Ok(Json(ContributorPage {
        configured: true,
        contributor: ContributorSummary {
            id: profile.id,
            full_name: profile.full_name,
            avatar_url: profile.avatar_url,
        },
        prompts: prompts.into_iter().map(Prompt::redacted).collect(),
    })
    .into_response())
}

#[derive(Serialize)]
struct PromptDetailPage {
    configured: bool,
    prompt: Prompt,
    /// Premium prompt whose body is withheld from this viewer.
    locked: bool,
}

/// Whether this viewer may see the prompt body.
async fn is_unlocked(state: &AppState, session: &Session, prompt: &Prompt) -> Result<bool> {
    if !prompt.premium {
        return Ok(true);
    }
    if prompt.author_id.as_deref() == Some(session.user_id.as_str()) {
        return Ok(true);
    }
    state
        .store
        .has_unlock(&session.access_token, &session.user_id, &prompt.id)
        .await
}

/// Prompt detail; premium bodies require ownership or an unlock.
async fn prompt_detail(
    State(state): State<Arc<AppState>>,
    session: Option<Extension<Session>>,
    Path(id): Path<String>,
) -> Result<Response> {
    if !state.config.store_configured() {
        return Ok(setup_required());
    }
    let Extension(session) = session.ok_or(AppError::Unauthorized)?;

    let prompt = state
        .store
        .get_prompt(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Prompt {} not found", id)))?;

    let unlocked = is_unlocked(&state, &session, &prompt).await?;

    Ok(Json(PromptDetailPage {
        configured: true,
        prompt: if unlocked { prompt } else { prompt.redacted() },
        locked: !unlocked,
    })
    .into_response())
}

#[derive(Serialize)]
struct CheckoutPage {
    configured: bool,
    prompt: Prompt,
    already_unlocked: bool,
}

/// Checkout summary. Purchase processing happens elsewhere; this page only
/// shows what is being bought and whether it is already owned.
async fn checkout(
    State(state): State<Arc<AppState>>,
    session: Option<Extension<Session>>,
    Path(id): Path<String>,
) -> Result<Response> {
    if !state.config.store_configured() {
        return Ok(setup_required());
    }
    let Extension(session) = session.ok_or(AppError::Unauthorized)?;

    let prompt = state
        .store
        .get_prompt(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Prompt {} not found", id)))?;

    let already_unlocked = is_unlocked(&state, &session, &prompt).await?;

    Ok(Json(CheckoutPage {
        configured: true,
        prompt: prompt.redacted(),
        already_unlocked,
    })
    .into_response())
}

// ─── Admin ───────────────────────────────────────────────────

#[derive(Serialize)]
struct AdminPage {
    configured: bool,
    user: SessionUser,
    role: Role,
    recent_prompts: Vec<Prompt>,
}

/// Admin dashboard.
///
/// Exempt from the route guard's redirect handling: this handler answers
/// 401 for "not logged in" and 403 for "logged in without the admin role"
/// so the page can show the specific message instead of bouncing to login.
async fn admin(
    State(state): State<Arc<AppState>>,
    session: Option<Extension<Session>>,
) -> Result<Response> {
    if !state.config.store_configured() {
        return Ok(setup_required());
    }

    let Some(Extension(session)) = session else {
        return Err(AppError::Unauthorized);
    };

    let profile = state
        .store
        .get_profile(&session.access_token, &session.user_id)
        .await?;

    let role = profile.map(|p| p.role).unwrap_or_default();
    if role != Role::Admin {
        return Err(AppError::Forbidden(
            "Admin role required for this page".to_string(),
        ));
    }

    let recent_prompts = state.store.list_prompts(20).await?;

    Ok(Json(AdminPage {
        configured: true,
        user: SessionUser::from(&session),
        role,
        recent_prompts,
    })
    .into_response())
}
