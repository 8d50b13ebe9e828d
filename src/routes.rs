use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;

use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::forms::{AdvisoryPolicy, FormData, FormErrors};
use crate::models::{Aprendiz, AprendizCurso, Curso, Instructor, InstructorCurso, Programa};
use crate::render;
use crate::resource::Resource;
use crate::store::{Backend, Repository};

const FIX_ERRORS: &str = "Por favor, corrija los errores en el formulario.";

#[derive(Clone)]
pub struct AppState<B> {
    pub backend: B,
    pub policy: AdvisoryPolicy,
}

impl<B> AppState<B> {
    pub fn new(backend: B, policy: AdvisoryPolicy) -> Self {
        Self { backend, policy }
    }
}

pub fn router<B: Backend>(state: AppState<B>) -> Router {
    Router::new()
        .route("/", get(home::<B>))
        .route("/health", get(|| async { "ok" }))
        .merge(crud::<Aprendiz, B>())
        .merge(crud::<Instructor, B>())
        .merge(crud::<Programa, B>())
        .merge(crud::<Curso, B>())
        .merge(crud::<InstructorCurso, B>())
        .merge(crud::<AprendizCurso, B>())
        .with_state(state)
}

fn crud<R, B>() -> Router<AppState<B>>
where
    R: Resource,
    B: Backend + Repository<R>,
{
    let base = format!("/{}", R::PATH);
    Router::new()
        .route(&format!("{base}/"), get(list::<R, B>))
        .route(&format!("{base}/crear/"), get(create_form::<R, B>).post(create::<R, B>))
        .route(&format!("{base}/:id/"), get(detail::<R, B>))
        .route(&format!("{base}/:id/editar/"), get(edit_form::<R, B>).post(update::<R, B>))
        .route(
            &format!("{base}/:id/eliminar/"),
            get(confirm_delete::<R, B>).post(delete::<R, B>),
        )
}

fn list_url<R: Resource>() -> String {
    format!("/{}/", R::PATH)
}

async fn home<B: Backend>(
    State(state): State<AppState<B>>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), AppError> {
    let totales = state.backend.totales().await?;
    let (jar, flashes) = flash::take(jar);
    Ok((jar, Html(render::home(&totales, &flashes))))
}

async fn list<R, B>(
    State(state): State<AppState<B>>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), AppError>
where
    R: Resource,
    B: Backend + Repository<R>,
{
    let rows = Repository::<R>::list(&state.backend).await?;
    let (jar, flashes) = flash::take(jar);
    Ok((jar, Html(render::list(&rows, &flashes))))
}

async fn fetch<R, B>(backend: &B, id: i64) -> Result<R, AppError>
where
    R: Resource,
    B: Backend + Repository<R>,
{
    Repository::<R>::get(backend, id)
        .await?
        .ok_or_else(|| AppError::not_found(R::NOUN, id))
}

async fn detail<R, B>(
    State(state): State<AppState<B>>,
    Path(id): Path<i64>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), AppError>
where
    R: Resource,
    B: Backend + Repository<R>,
{
    let row: R = fetch(&state.backend, id).await?;
    let sections = row.related(&state.backend).await?;
    let (jar, flashes) = flash::take(jar);
    Ok((jar, Html(render::detail(&row, &sections, &flashes))))
}

/// Re-displays a rejected submission with its messages.
fn redisplay<R: Resource>(
    ctx: &R::Context,
    title: &str,
    action: &str,
    data: &FormData,
    errors: &FormErrors,
) -> Response {
    tracing::warn!(entity = R::PATH, errors = errors.len(), "form rejected");
    let html = render::form(
        title,
        action,
        &R::fields(ctx),
        data,
        Some(errors),
        &[Flash::error(FIX_ERRORS)],
    );
    (StatusCode::OK, Html(html)).into_response()
}

fn create_title<R: Resource>() -> String {
    format!("{}: nuevo registro", R::TITLE)
}

fn edit_title<R: Resource>(row: &R) -> String {
    format!("Editar {}", row.display())
}

async fn create_form<R, B>(
    State(state): State<AppState<B>>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), AppError>
where
    R: Resource,
    B: Backend + Repository<R>,
{
    let ctx = R::context(&state.backend).await?;
    let (jar, flashes) = flash::take(jar);
    let html = render::form(
        &create_title::<R>(),
        &format!("/{}/crear/", R::PATH),
        &R::fields(&ctx),
        &R::blank(),
        None,
        &flashes,
    );
    Ok((jar, Html(html)))
}

async fn create<R, B>(
    State(state): State<AppState<B>>,
    jar: CookieJar,
    Form(data): Form<FormData>,
) -> Result<Response, AppError>
where
    R: Resource,
    B: Backend + Repository<R>,
{
    let ctx = R::context(&state.backend).await?;
    let action = format!("/{}/crear/", R::PATH);
    let validated = match R::validate(&data, &ctx, None).and_then(|v| state.policy.enforce(v)) {
        Ok(v) => v,
        Err(errors) => return Ok(redisplay::<R>(&ctx, &create_title::<R>(), &action, &data, &errors)),
    };

    match Repository::<R>::insert(&state.backend, &validated.value).await {
        Ok(row) => {
            tracing::info!(entity = R::PATH, id = row.id(), "record created");
            let mut flashes = vec![Flash::success(row.created_message())];
            flashes.extend(validated.advisories.into_iter().map(|a| Flash::warning(a.message)));
            Ok((flash::push(jar, &flashes), Redirect::to(&list_url::<R>())).into_response())
        }
        Err(AppError::Duplicate { key, .. }) => {
            let errors = duplicate::<R>(&key);
            Ok(redisplay::<R>(&ctx, &create_title::<R>(), &action, &data, &errors))
        }
        Err(e) => Err(e),
    }
}

fn duplicate<R: Resource>(key: &str) -> FormErrors {
    let mut errors = FormErrors::default();
    errors.add_non_field(R::duplicate_message(key));
    errors
}

async fn edit_form<R, B>(
    State(state): State<AppState<B>>,
    Path(id): Path<i64>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), AppError>
where
    R: Resource,
    B: Backend + Repository<R>,
{
    let row: R = fetch(&state.backend, id).await?;
    let ctx = R::context(&state.backend).await?;
    let (jar, flashes) = flash::take(jar);
    let html = render::form(
        &edit_title(&row),
        &format!("/{}/{}/editar/", R::PATH, id),
        &R::fields(&ctx),
        &row.initial(),
        None,
        &flashes,
    );
    Ok((jar, Html(html)))
}

async fn update<R, B>(
    State(state): State<AppState<B>>,
    Path(id): Path<i64>,
    jar: CookieJar,
    Form(data): Form<FormData>,
) -> Result<Response, AppError>
where
    R: Resource,
    B: Backend + Repository<R>,
{
    let existing: R = fetch(&state.backend, id).await?;
    let ctx = R::context(&state.backend).await?;
    let title = edit_title(&existing);
    let action = format!("/{}/{}/editar/", R::PATH, id);
    let validated = match R::validate(&data, &ctx, Some(&existing))
        .and_then(|v| state.policy.enforce(v))
    {
        Ok(v) => v,
        Err(errors) => return Ok(redisplay::<R>(&ctx, &title, &action, &data, &errors)),
    };

    match Repository::<R>::update(&state.backend, id, &validated.value).await {
        Ok(Some(row)) => {
            tracing::info!(entity = R::PATH, id, "record updated");
            let mut flashes = vec![Flash::success(row.updated_message())];
            flashes.extend(validated.advisories.into_iter().map(|a| Flash::warning(a.message)));
            Ok((flash::push(jar, &flashes), Redirect::to(&list_url::<R>())).into_response())
        }
        Ok(None) => Err(AppError::not_found(R::NOUN, id)),
        Err(AppError::Duplicate { key, .. }) => {
            Ok(redisplay::<R>(&ctx, &title, &action, &data, &duplicate::<R>(&key)))
        }
        Err(e) => Err(e),
    }
}

async fn confirm_delete<R, B>(
    State(state): State<AppState<B>>,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError>
where
    R: Resource,
    B: Backend + Repository<R>,
{
    let row: R = fetch(&state.backend, id).await?;
    Ok(Html(render::confirm_delete(&row)))
}

async fn delete<R, B>(
    State(state): State<AppState<B>>,
    Path(id): Path<i64>,
    jar: CookieJar,
) -> Result<Response, AppError>
where
    R: Resource,
    B: Backend + Repository<R>,
{
    let row: R = fetch(&state.backend, id).await?;
    if !Repository::<R>::delete(&state.backend, id).await? {
        return Err(AppError::not_found(R::NOUN, id));
    }
    tracing::info!(entity = R::PATH, id, "record deleted");
    let jar = flash::push(jar, &[Flash::success(row.deleted_message())]);
    Ok((jar, Redirect::to(&list_url::<R>())).into_response())
}
