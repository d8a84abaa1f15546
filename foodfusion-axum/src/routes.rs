use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use foodfusion::{
    FoodFusion, PostInput, RecipeInput, Registration, RepositoryProvider, ResourceInput,
    ResourceKind, UserId,
};

use crate::{
    error::{ApiError, Result},
    extractors::{AuthUser, BearerToken, ClientIp, ClientIpConfig},
    middleware::auth_middleware,
    types::*,
};

pub struct AppState<R: RepositoryProvider> {
    pub app: Arc<FoodFusion<R>>,
}

impl<R: RepositoryProvider> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            app: self.app.clone(),
        }
    }
}

pub fn create_router<R>(app: Arc<FoodFusion<R>>, client_ip_config: ClientIpConfig) -> Router
where
    R: RepositoryProvider,
{
    let state = AppState { app };

    Router::new()
        .route("/health", get(health_handler))
        .route("/login", post(login_handler))
        .route("/check-block-status", get(check_block_status_handler))
        .route("/refresh", post(refresh_handler))
        .route("/signup", post(signup_handler))
        .route(
            "/resources/{kind}",
            get(list_resources_handler).post(create_resource_handler),
        )
        .route("/edit-resource", put(edit_resource_handler))
        .route(
            "/recipes",
            get(list_recipes_handler).post(create_recipe_handler),
        )
        .route("/recipe-detail", get(recipe_detail_handler))
        .route("/edit-recipe", put(edit_recipe_handler))
        .route(
            "/community",
            get(list_posts_handler).post(create_post_handler),
        )
        .route("/post-detail", get(post_detail_handler))
        .route("/edit-post", put(edit_post_handler))
        .route("/add-comment", post(add_comment_handler))
        .route("/like-post", post(like_post_handler))
        .route(
            "/profile",
            get(get_profile_handler)
                .put(update_profile_handler)
                .delete(deactivate_account_handler),
        )
        .route("/dashboard", get(dashboard_handler))
        .route("/my-content", get(my_content_handler))
        .route("/logout", post(logout_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<R>,
        ))
        .with_state(state)
        .layer(axum::Extension(client_ip_config))
}

async fn health_handler<R>(State(state): State<AppState<R>>) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    state
        .app
        .health_check()
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(ApiResponse::ok(
        "Service is healthy",
        HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    )))
}

async fn login_handler<R>(
    State(state): State<AppState<R>>,
    ClientIp(client_id): ClientIp,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let Json(payload) = payload?;

    let outcome = state
        .app
        .login(&client_id, &payload.email, &payload.password)
        .await?;

    Ok(Json(ApiResponse::ok(
        "Login successful! Welcome back to FoodFusion!",
        outcome,
    )))
}

async fn check_block_status_handler<R>(
    State(state): State<AppState<R>>,
    ClientIp(client_id): ClientIp,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let status = state.app.block_status(&client_id).await?;
    let data = BlockStatusResponse::from(status);

    Ok(Json(ApiResponse::ok(data.message.clone(), data)))
}

async fn refresh_handler<R>(
    State(state): State<AppState<R>>,
    BearerToken(token): BearerToken,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let token = state.app.refresh(&token).map_err(|e| {
        tracing::debug!(error = %e, "Token refresh rejected");
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })?;

    Ok(Json(ApiResponse::ok("Token refreshed", TokenResponse { token })))
}

async fn signup_handler<R>(
    State(state): State<AppState<R>>,
    payload: std::result::Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let Json(payload) = payload?;

    if let Some(confirm) = payload.confirm_password.as_deref() {
        if confirm != payload.password {
            return Err(ApiError::BadRequest("Passwords do not match".to_string()));
        }
    }

    let user = state
        .app
        .register(Registration {
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            password: payload.password,
        })
        .await?;

    let token = state.app.token_issuer().issue(user.id, &user.email)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Account created successfully! Welcome to FoodFusion!",
            SignupResponse {
                user_id: user.id,
                token,
                user,
            },
        )),
    ))
}

async fn list_resources_handler<R>(
    State(state): State<AppState<R>>,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let kind = parse_kind(&kind)?;
    let resources = state.app.list_resources(kind).await?;

    Ok(Json(ApiResponse::ok(
        format!("{} resources retrieved successfully", kind_label(kind)),
        ResourceListResponse { resources },
    )))
}

async fn create_resource_handler<R>(
    State(state): State<AppState<R>>,
    AuthUser(user): AuthUser,
    Path(kind): Path<String>,
    payload: std::result::Result<Json<ResourceRequest>, JsonRejection>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let kind = parse_kind(&kind)?;
    let Json(payload) = payload?;

    let resource = state
        .app
        .create_resource(user.id, kind, payload.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            format!("{} resource created successfully", kind_label(kind)),
            ResourceCreatedResponse {
                resource_id: resource.id,
                resource,
            },
        )),
    ))
}

async fn edit_resource_handler<R>(
    State(state): State<AppState<R>>,
    AuthUser(user): AuthUser,
    payload: std::result::Result<Json<EditResourceRequest>, JsonRejection>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let Json(payload) = payload?;

    let (Some(resource_id), Some(kind), Some(title)) = (
        payload.resource_id,
        payload.kind.filter(|k| !k.trim().is_empty()),
        payload.title.filter(|t| !t.trim().is_empty()),
    ) else {
        return Err(ApiError::BadRequest(
            "Resource ID, type, and title are required".to_string(),
        ));
    };
    let kind = parse_kind(&kind)?;

    let resource = state
        .app
        .edit_resource(
            user.id,
            kind,
            resource_id,
            ResourceInput {
                title,
                description: payload.description,
                link: payload.link,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok("Resource updated successfully", resource)))
}

async fn list_recipes_handler<R>(State(state): State<AppState<R>>) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let recipes = state.app.list_recipes().await?;

    Ok(Json(ApiResponse::ok(
        "Recipes retrieved successfully",
        recipes,
    )))
}

async fn create_recipe_handler<R>(
    State(state): State<AppState<R>>,
    AuthUser(user): AuthUser,
    payload: std::result::Result<Json<RecipeInput>, JsonRejection>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let Json(payload) = payload?;

    let recipe = state.app.create_recipe(user.id, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Recipe created successfully",
            RecipeCreatedResponse {
                recipe_id: recipe.id,
                recipe,
            },
        )),
    ))
}

async fn recipe_detail_handler<R>(
    State(state): State<AppState<R>>,
    query: std::result::Result<Query<IdQuery>, QueryRejection>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let Query(query) = query?;
    let not_found = || ApiError::NotFound("Recipe not found".to_string());

    let id = required_id(query.id, "Recipe ID is required")?;
    let recipe_id = id.parse::<i64>().map_err(|_| not_found())?;
    let recipe = state
        .app
        .get_recipe(recipe_id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(ApiResponse::ok("Recipe retrieved successfully", recipe)))
}

async fn edit_recipe_handler<R>(
    State(state): State<AppState<R>>,
    AuthUser(user): AuthUser,
    payload: std::result::Result<Json<EditRecipeRequest>, JsonRejection>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let Json(payload) = payload?;

    let Some(recipe_id) = payload
        .recipe_id
        .filter(|_| !payload.recipe.title.trim().is_empty())
    else {
        return Err(ApiError::BadRequest(
            "Recipe ID and title are required".to_string(),
        ));
    };

    let recipe = state
        .app
        .edit_recipe(user.id, recipe_id, payload.recipe)
        .await?;

    Ok(Json(ApiResponse::ok("Recipe updated successfully", recipe)))
}

/// Members see the whole feed; guests only the site's own posts.
async fn list_posts_handler<R>(
    State(state): State<AppState<R>>,
    viewer: Option<AuthUser>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let viewer = viewer.map(|AuthUser(user)| user.id);
    let posts = state.app.list_posts(viewer).await?;

    Ok(Json(ApiResponse::ok(
        "Community posts retrieved successfully",
        posts,
    )))
}

async fn create_post_handler<R>(
    State(state): State<AppState<R>>,
    AuthUser(user): AuthUser,
    payload: std::result::Result<Json<PostInput>, JsonRejection>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let Json(payload) = payload?;

    let post = state.app.create_post(user.id, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Community post created successfully",
            PostCreatedResponse {
                post_id: post.id,
                post,
            },
        )),
    ))
}

async fn post_detail_handler<R>(
    State(state): State<AppState<R>>,
    query: std::result::Result<Query<IdQuery>, QueryRejection>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let Query(query) = query?;

    let id = required_id(query.id, "Post ID is required")?;
    let detail = match id.parse::<i64>() {
        Ok(post_id) => state.app.post_detail(post_id).await?,
        Err(_) => None,
    }
    .ok_or_else(post_not_found)?;

    Ok(Json(ApiResponse::ok("Post retrieved successfully", detail)))
}

async fn edit_post_handler<R>(
    State(state): State<AppState<R>>,
    AuthUser(user): AuthUser,
    payload: std::result::Result<Json<EditPostRequest>, JsonRejection>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let Json(payload) = payload?;

    let Some(post_id) = payload
        .post_id
        .filter(|_| !payload.post.title.trim().is_empty())
    else {
        return Err(ApiError::BadRequest(
            "Post ID and title are required".to_string(),
        ));
    };

    let post = state.app.edit_post(user.id, post_id, payload.post).await?;

    Ok(Json(ApiResponse::ok("Post updated successfully", post)))
}

async fn add_comment_handler<R>(
    State(state): State<AppState<R>>,
    AuthUser(user): AuthUser,
    payload: std::result::Result<Json<CommentRequest>, JsonRejection>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let Json(payload) = payload?;

    let (Some(post_id), Some(comment)) = (payload.post_id, payload.comment) else {
        return Err(ApiError::BadRequest(
            "Post ID and comment are required".to_string(),
        ));
    };

    let comment = state
        .app
        .add_comment(user.id, post_id, &comment)
        .await?
        .ok_or_else(post_not_found)?;

    Ok(Json(ApiResponse::ok("Comment added successfully", comment)))
}

async fn like_post_handler<R>(
    State(state): State<AppState<R>>,
    AuthUser(user): AuthUser,
    payload: std::result::Result<Json<LikeRequest>, JsonRejection>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let Json(payload) = payload?;

    let Some(post_id) = payload.post_id else {
        return Err(ApiError::BadRequest("Post ID is required".to_string()));
    };

    let outcome = state
        .app
        .toggle_like(user.id, post_id)
        .await?
        .ok_or_else(post_not_found)?;

    Ok(Json(ApiResponse::ok(
        outcome.message(),
        LikeResponse { status: outcome },
    )))
}

async fn get_profile_handler<R>(
    State(state): State<AppState<R>>,
    BearerToken(token): BearerToken,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let user_id = token_subject(&state, &token)?;
    let user = state.app.get_profile(user_id).await?;

    Ok(Json(ApiResponse::ok("Profile retrieved successfully", user)))
}

async fn update_profile_handler<R>(
    State(state): State<AppState<R>>,
    BearerToken(token): BearerToken,
    payload: std::result::Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let user_id = token_subject(&state, &token)?;
    let Json(payload) = payload?;

    let user = state.app.update_profile(user_id, payload.into()).await?;

    Ok(Json(ApiResponse::ok("Profile updated successfully", user)))
}

async fn deactivate_account_handler<R>(
    State(state): State<AppState<R>>,
    BearerToken(token): BearerToken,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let user_id = token_subject(&state, &token)?;
    state.app.deactivate_account(user_id).await?;

    Ok(Json(ApiResponse::without_data("Account deactivated successfully")))
}

async fn dashboard_handler<R>(
    State(state): State<AppState<R>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let stats = state.app.dashboard(user.id).await?;

    Ok(Json(ApiResponse::ok(
        "Dashboard data retrieved successfully",
        DashboardResponse { stats },
    )))
}

async fn my_content_handler<R>(
    State(state): State<AppState<R>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let content = state.app.my_content(user.id).await?;

    Ok(Json(ApiResponse::ok(
        "User content retrieved successfully",
        content,
    )))
}

/// Tokens are stateless; logging out is the client discarding its token.
async fn logout_handler() -> impl IntoResponse {
    Json(ApiResponse::without_data(
        "Logged out (client should delete JWT from storage)",
    ))
}

/// The user a profile request acts on, taken from the token itself.
fn token_subject<R>(state: &AppState<R>, token: &str) -> Result<UserId>
where
    R: RepositoryProvider,
{
    state
        .app
        .verify_token(token)
        .and_then(|claims| claims.user_id())
        .map_err(|e| {
            tracing::debug!(error = %e, "Profile token rejected");
            ApiError::Unauthorized("Invalid or expired token".to_string())
        })
}

fn required_id(id: Option<String>, message: &str) -> Result<String> {
    id.map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest(message.to_string()))
}

fn post_not_found() -> ApiError {
    ApiError::NotFound("Post not found".to_string())
}

fn parse_kind(kind: &str) -> Result<ResourceKind> {
    kind.parse::<ResourceKind>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid resource type: {kind}")))
}

fn kind_label(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Culinary => "Culinary",
        ResourceKind::Educational => "Educational",
    }
}
