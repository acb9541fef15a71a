//! Actix-web/actix-ws transport binding for the dispatcher (spec.md §1 "the
//! core assumes a reliable, ordered, text-framed bidirectional channel per
//! client" — this module *is* that assumed channel, grounded on the
//! teacher's `hosting::server`/`hosting::casino` WebSocket bridge).

use crate::dispatcher::Connection;
use crate::dispatcher::Dispatcher;
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use futures::StreamExt;
use std::sync::Arc;

pub struct Hosting {
    dispatcher: Arc<Dispatcher>,
}

impl Hosting {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub async fn run(self, bind_addr: &str) -> std::io::Result<()> {
        let dispatcher = web::Data::new(self.dispatcher);
        log::info!("starting fbf-server on {}", bind_addr);
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header(),
                )
                .app_data(dispatcher.clone())
                .route("/health", web::get().to(health))
                .route("/ws", web::get().to(connect))
        })
        .bind(bind_addr)?
        .run()
        .await
    }
}

async fn health() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

/// Upgrades one HTTP request into a WebSocket connection and spawns the
/// bridge task that feeds every inbound text frame to the dispatcher and
/// every outbound frame from the dispatcher's per-connection channel back
/// out to the socket (mirrors `hosting::Casino::bridge`).
async fn connect(
    dispatcher: web::Data<Arc<Dispatcher>>,
    body: web::Payload,
    req: HttpRequest,
) -> impl Responder {
    let (response, mut session, mut stream) = match actix_ws::handle(&req, body) {
        Ok(triple) => triple,
        Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
    };

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<String>();
    let mut conn = Connection::new(tx);
    let dispatcher = dispatcher.get_ref().clone();

    actix_web::rt::spawn(async move {
        'bridge: loop {
            tokio::select! {
                biased;
                outbound = rx.recv() => match outbound {
                    Some(text) => if session.text(text).await.is_err() { break 'bridge },
                    None => break 'bridge,
                },
                inbound = stream.next() => match inbound {
                    Some(Ok(actix_ws::Message::Text(text))) => {
                        dispatcher.handle_frame(&mut conn, &text).await;
                    }
                    Some(Ok(actix_ws::Message::Close(_))) => break 'bridge,
                    Some(Err(_)) => break 'bridge,
                    None => break 'bridge,
                    _ => continue 'bridge,
                },
            }
        }
        dispatcher.handle_disconnect(&conn).await;
    });

    response
}
