//! Request-scoped session middleware

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::error::ApiError;
use crate::db::SessionFactory;

/// Open a session for the request and put it in the request extensions.
///
/// The connection goes back to the pool once the response is produced and
/// every clone handed to handlers has dropped.
///
/// ```ignore
/// let app = Router::new()
///     .route("/users", get(list_users))
///     .layer(middleware::from_fn_with_state(pool.clone(), db_session::<SqlitePool>));
/// ```
pub async fn db_session<F: SessionFactory>(
    State(factory): State<F>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = match factory.session().await {
        Ok(session) => session,
        Err(e) => return ApiError::Unavailable(e).into_response(),
    };

    tracing::debug!(uri = %request.uri(), "opened db session");
    request.extensions_mut().insert(session);
    next.run(request).await
}
