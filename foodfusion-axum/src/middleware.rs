use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use foodfusion::RepositoryProvider;

use crate::{error::ApiError, routes::AppState};

/// Resolves a bearer token to its user and stores it in the request extensions.
///
/// A missing or rejected token is not an error here: handlers that need a user
/// take [`AuthUser`](crate::AuthUser), which fails when nothing was stored.
/// A storage failure while resolving the user ends the request with a 500.
pub async fn auth_middleware<R>(
    State(state): State<AppState<R>>,
    mut request: Request,
    next: Next,
) -> Response
where
    R: RepositoryProvider,
{
    let bearer = request.headers().typed_get::<Authorization<Bearer>>();

    if let Some(Authorization(bearer)) = bearer {
        match state.app.authorize(bearer.token()).await {
            Ok(user) => {
                request.extensions_mut().insert(user);
            }
            Err(e) if e.is_storage_error() => {
                tracing::error!(error = %e, "Failed to resolve user for token");
                return ApiError::InternalError(e.to_string()).into_response();
            }
            Err(e) => {
                tracing::debug!(error = %e, "Rejected bearer token");
            }
        }
    }

    next.run(request).await
}
