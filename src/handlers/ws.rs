//! Realtime notification push. Each authenticated client opens one socket;
//! the shared map fans a stored notification out to every open socket of
//! its recipient, once per socket. Connections deregister themselves on
//! close, so a discarded view stops receiving events.

use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use actix_ws::Message;
use std::collections::HashMap;
use std::sync::RwLock;
use tokio::sync::mpsc;

use crate::auth::session::get_user_id;
use crate::models::notification::Notification;

pub type ConnectionMap = std::sync::Arc<RwLock<HashMap<i64, Vec<mpsc::UnboundedSender<String>>>>>;

pub fn new_connection_map() -> ConnectionMap {
    std::sync::Arc::new(RwLock::new(HashMap::new()))
}

/// Push a freshly inserted notification to its recipient's open sockets.
pub fn push_notification(conn_map: &ConnectionMap, notification: &Notification) {
    let map = match conn_map.read() {
        Ok(m) => m,
        Err(_) => return,
    };
    if let Some(senders) = map.get(&notification.user_id) {
        let msg = serde_json::json!({
            "type": "notification",
            "notification": notification,
        })
        .to_string();
        for sender in senders {
            let _ = sender.send(msg.clone());
        }
    }
}

/// WebSocket upgrade handler.
pub async fn connect(
    req: HttpRequest,
    body: web::Payload,
    session: Session,
    conn_map: web::Data<ConnectionMap>,
) -> Result<HttpResponse, actix_web::Error> {
    let user_id = match get_user_id(&session) {
        Some(id) => id,
        None => return Ok(HttpResponse::Unauthorized().finish()),
    };

    let (response, mut ws_session, mut msg_stream) = actix_ws::handle(&req, body)?;

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // Register this connection
    {
        let mut map = conn_map.write().unwrap();
        map.entry(user_id).or_default().push(tx);
    }

    let conn_map_clone = conn_map.into_inner().clone();

    actix_web::rt::spawn(async move {
        loop {
            tokio::select! {
                Some(msg) = rx.recv() => {
                    if ws_session.text(msg).await.is_err() {
                        break;
                    }
                }
                Some(Ok(msg)) = msg_stream.recv() => {
                    match msg {
                        Message::Ping(bytes) => {
                            if ws_session.pong(&bytes).await.is_err() {
                                break;
                            }
                        }
                        Message::Close(_) => break,
                        Message::Text(_) => {
                            // Client mutations go through HTTP, not the socket
                        }
                        _ => {}
                    }
                }
                else => break,
            }
        }

        // Clean up on disconnect
        if let Ok(mut map) = conn_map_clone.write() {
            if let Some(senders) = map.get_mut(&user_id) {
                senders.retain(|s| !s.is_closed());
                if senders.is_empty() {
                    map.remove(&user_id);
                }
            }
        }
    });

    Ok(response)
}
