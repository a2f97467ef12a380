//! Router and listener.

use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use super::{admin, auth, courses, grades};
use crate::app::App;
use crate::error::Result;

/// Every route, bound to `app`.
pub fn router(app: App) -> Router {
    Router::new()
        .route("/", get(auth::register_form))
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/home", get(courses::home))
        .route("/catalog", get(courses::catalog))
        .route("/createcourse", post(courses::create_course))
        .route("/enroll", get(courses::enroll).post(courses::enroll))
        .route("/unenroll", get(courses::unenroll).post(courses::unenroll))
        .route("/unenroll/:name/:course", post(courses::unenroll_user))
        .route("/grades/:course", get(grades::sheet).post(grades::assign))
        .route("/admin", get(admin::index))
        .route("/admin/users", get(admin::users).post(admin::create_user))
        .route("/admin/users/:id", post(admin::update_user))
        .route("/admin/users/:id/delete", post(admin::delete_user))
        .route("/admin/courses", get(admin::courses).post(admin::create_course))
        .route("/admin/courses/:id", post(admin::update_course))
        .route("/admin/courses/:id/delete", post(admin::delete_course))
        .route("/admin/grades", get(admin::grades))
        .route("/admin/grades/:id", post(admin::update_grade))
        .route("/admin/grades/:id/delete", post(admin::delete_grade))
        .with_state(app)
}

/// Serve `app` on an already-bound listener until `shutdown` resolves.
///
/// # Errors
/// Returns an error if the server fails.
pub async fn serve<F>(app: App, listener: TcpListener, shutdown: F) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(%addr, "Listening");
    axum::serve(
        listener,
        router(app).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;
    Ok(())
}
