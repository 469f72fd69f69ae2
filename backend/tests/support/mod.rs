//! Fake upstream HTTP server shared by the integration suites.
//!
//! Each test spawns an Actix server on an ephemeral port that answers every
//! `POST` with a scripted reply and records the JSON bodies it received.

use std::collections::VecDeque;
use std::net::TcpListener;
use std::sync::{Arc, Mutex, PoisonError};

use actix_web::dev::ServerHandle;
use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, HttpServer, web};
use reqwest::Url;
use serde_json::Value;

/// Reply served by the fake upstream.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    pub fn json(body: &Value) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.to_string(),
        }
    }

    pub fn status(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: body.to_owned(),
        }
    }
}

#[derive(Default)]
struct Script {
    replies: Mutex<VecDeque<Reply>>,
    fallback: Mutex<Option<Reply>>,
    received: Mutex<Vec<Value>>,
}

impl Script {
    fn next_reply(&self) -> Reply {
        let scripted = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        scripted
            .or_else(|| {
                self.fallback
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone()
            })
            .unwrap_or_else(|| Reply::json(&serde_json::json!({})))
    }
}

async fn answer(script: web::Data<Script>, body: web::Bytes) -> HttpResponse {
    if let Ok(value) = serde_json::from_slice::<Value>(&body) {
        script
            .received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(value);
    }
    let reply = script.next_reply();
    HttpResponse::build(reply.status)
        .content_type("application/json")
        .body(reply.body)
}

/// Running fake upstream.
pub struct FakeUpstream {
    script: web::Data<Script>,
    handle: ServerHandle,
    url: Url,
}

impl FakeUpstream {
    /// Bind to an ephemeral port and start serving.
    pub fn start() -> Self {
        let script = web::Data::new(Script::default());
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let data = script.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .route("/api/tracker", web::post().to(answer))
                .route("/api/tracker", web::head().to(HttpResponse::Ok))
        })
        .workers(1)
        .listen(listener)
        .expect("listen")
        .run();
        let handle = server.handle();
        actix_web::rt::spawn(server);
        let url = Url::parse(&format!("http://{addr}/api/tracker")).expect("upstream url");
        Self {
            script,
            handle,
            url,
        }
    }

    pub fn url(&self) -> Url {
        self.url.clone()
    }

    /// Queue a reply for the next request.
    pub fn push(&self, reply: Reply) {
        self.script
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
    }

    /// Reply used once the queue is empty.
    pub fn always(&self, reply: Reply) {
        *self
            .script
            .fallback
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(reply);
    }

    /// JSON bodies received so far.
    pub fn received(&self) -> Vec<Value> {
        self.script
            .received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub async fn stop(self) {
        self.handle.stop(true).await;
    }
}
