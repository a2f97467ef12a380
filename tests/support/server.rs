//! A live HTTP server over the testkit app, bound to an ephemeral port.

use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::header::{COOKIE, LOCATION, SET_COOKIE};
use reqwest::redirect::Policy;
use reqwest::{Client, Response, StatusCode};
use roster::adapter::inbound::http::{self, SESSION_COOKIE};
use roster::app::App;
use roster::testkit::clock::ManualClock;
use roster::testkit::config::app;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

pub struct TestServer {
    pub app: App,
    pub clock: Arc<ManualClock>,
    addr: SocketAddr,
    client: Client,
    stop: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub async fn start() -> Self {
        let (app, clock) = app();
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let (stop, stopped) = oneshot::channel::<()>();

        let served = app.clone();
        tokio::spawn(async move {
            let shutdown = async {
                let _ = stopped.await;
            };
            http::serve(served, listener, shutdown).await.expect("serve");
        });

        let client = Client::builder()
            .redirect(Policy::none())
            .user_agent("roster-http-tests")
            .build()
            .expect("client");

        Self {
            app,
            clock,
            addr,
            client,
            stop: Some(stop),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response {
        let mut request = self.client.get(self.url(path));
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        request.send().await.expect("GET")
    }

    pub async fn post(&self, path: &str, cookie: Option<&str>, form: &[(&str, &str)]) -> Response {
        let mut request = self.client.post(self.url(path)).form(form);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        request.send().await.expect("POST")
    }

    /// Log in and return the `name=value` session cookie.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post("/login", None, &[("username", username), ("password", password)])
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "login failed for {username}");
        session_cookie(&response).expect("session cookie")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

/// The `name=value` pair of the session cookie set by `response`.
pub fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .find(|pair| pair.starts_with(&format!("{SESSION_COOKIE}=")))
        .map(str::to_string)
}

pub fn location(response: &Response) -> Option<&str> {
    response.headers().get(LOCATION).and_then(|value| value.to_str().ok())
}
