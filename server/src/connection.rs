use actix::{Actor, ActorContext, AsyncContext, Handler, Message, Running, StreamHandler};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use actix_web_actors::ws::{CloseCode, CloseReason};
use tokio::sync::mpsc;

use system::{bincode, IdentifiableCommand, IdentifiableEvent};

use crate::config::ServerConfig;
use crate::handle::WhiteboardHandle;
use crate::peer::PeerHandle;
use crate::session::PeerSession;

const EGRESS_BUFFER: usize = 64;
const INGRESS_BUFFER: usize = 32;

#[derive(Message)]
#[rtype(result = "()")]
struct ConnectionActorMessage(IdentifiableEvent);

struct ConnectionActor {
    whiteboard: WhiteboardHandle,
    ingress_tx: Option<mpsc::Sender<IdentifiableCommand>>,
}

impl Actor for ConnectionActor {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let (peer, mut egress_rx) = PeerHandle::channel(EGRESS_BUFFER);
        let (ingress_tx, mut ingress_rx) = mpsc::channel::<IdentifiableCommand>(INGRESS_BUFFER);
        self.ingress_tx = Some(ingress_tx);

        let addr = ctx.address();
        tokio::spawn(async move {
            log::debug!("connection egress - started");
            while let Some(event) = egress_rx.recv().await {
                addr.do_send(ConnectionActorMessage(event));
            }
            log::debug!("connection egress - terminated");
        });

        // Commands of one connection run strictly one after another.
        let mut session = PeerSession::new(self.whiteboard.clone(), peer);
        tokio::spawn(async move {
            while let Some(IdentifiableCommand {
                command_id,
                command,
            }) = ingress_rx.recv().await
            {
                let result = session.execute(command).await;
                if let Err(e) = session.peer().reply(command_id, result).await {
                    log::debug!("Dropping reply to {}: {}", command_id, e);
                }
            }
            session.close().await;
        });
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        // Dropping the sender ends the ingress task, which then cleans up.
        self.ingress_tx = None;
        Running::Stop
    }
}

/// Ingress
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ConnectionActor {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Binary(bin)) => {
                log::debug!("Ingress size: {}", bin.len());
                match bincode::deserialize::<IdentifiableCommand>(&bin) {
                    Ok(command) => {
                        log::debug!("Ingress {:?}", command.command_id);
                        let accepted = self
                            .ingress_tx
                            .as_ref()
                            .map_or(false, |tx| tx.try_send(command).is_ok());
                        if !accepted {
                            log::warn!("Closing connection that floods commands");
                            ctx.close(Some(CloseReason {
                                code: CloseCode::Policy,
                                description: None,
                            }));
                            ctx.stop();
                        }
                    }
                    Err(e) => {
                        log::warn!("Closing connection after undecodable frame: {}", e);
                        ctx.close(Some(CloseReason {
                            code: CloseCode::Invalid,
                            description: None,
                        }));
                        ctx.stop();
                    }
                }
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Err(e) => {
                log::warn!("Websocket protocol error: {}", e);
                ctx.stop();
            }
            _ => (),
        }
    }
}

/// Egress
impl Handler<ConnectionActorMessage> for ConnectionActor {
    type Result = ();

    fn handle(&mut self, msg: ConnectionActorMessage, ctx: &mut Self::Context) -> Self::Result {
        let event = &msg.0;
        log::debug!("Egress {:?}", event);
        match bincode::serialize(event) {
            Ok(serialized) => ctx.binary(serialized),
            Err(e) => log::warn!("Cannot encode outgoing event: {}", e),
        }
    }
}

pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    whiteboard: web::Data<WhiteboardHandle>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, Error> {
    let actor = ConnectionActor {
        whiteboard: whiteboard.get_ref().clone(),
        ingress_tx: None,
    };
    ws::WsResponseBuilder::new(actor, &req, stream)
        .frame_size(config.max_frame_size)
        .start()
}
