use crate::registry::{ClientRegistry, RoomMembership};
use crate::relay::{NoopObserver, RelayCommand, RelayConfig, RelayObserver};
use crate::room::RoomDirectory;
use crate::router::MessageRouter;
use axum::extract::ws::Message;
use huddle_core::{
    AnswerForward, CandidateForward, ClientId, ClientMessage, MediaPeers, MemberInfo, OfferForward,
    ResponseData, ServerMessage,
};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Handle used by the transport layer and embedders to talk to the relay
/// actor.
#[derive(Clone)]
pub struct RelayHandle {
    tx: mpsc::Sender<RelayCommand>,
}

impl RelayHandle {
    /// Register a fresh connection and learn its assigned id. Returns
    /// `None` only when the relay is shutting down.
    pub async fn connect(
        &self,
        origin: String,
        tx: mpsc::UnboundedSender<Message>,
    ) -> Option<ClientId> {
        let (reply, assigned) = oneshot::channel();
        self.tx
            .send(RelayCommand::Connect { origin, tx, reply })
            .await
            .ok()?;
        assigned.await.ok()
    }

    pub async fn frame(&self, id: ClientId, message: ClientMessage) {
        if self
            .tx
            .send(RelayCommand::Frame { id, message })
            .await
            .is_err()
        {
            warn!("Relay is gone; dropping frame");
        }
    }

    pub async fn pong(&self, id: ClientId) {
        let _ = self.tx.send(RelayCommand::Pong { id }).await;
    }

    pub async fn disconnect(&self, id: ClientId) {
        let _ = self.tx.send(RelayCommand::Disconnect { id }).await;
    }
}

/// The signaling relay actor. Sole owner of the connection registry and the
/// room directory; every structural mutation funnels through its command
/// channel, which is what makes the roster's positional indices safe.
pub struct Relay {
    registry: ClientRegistry,
    rooms: RoomDirectory,
    router: MessageRouter,
    observer: Arc<dyn RelayObserver>,
    command_rx: mpsc::Receiver<RelayCommand>,
    config: RelayConfig,
}

impl Relay {
    pub fn spawn(config: RelayConfig, router: MessageRouter) -> RelayHandle {
        Self::spawn_with(config, router, Arc::new(NoopObserver))
    }

    pub fn spawn_with(
        config: RelayConfig,
        router: MessageRouter,
        observer: Arc<dyn RelayObserver>,
    ) -> RelayHandle {
        let (tx, command_rx) = mpsc::channel(config.command_capacity);
        let relay = Relay {
            registry: ClientRegistry::new(),
            rooms: RoomDirectory::new(),
            router,
            observer,
            command_rx,
            config,
        };
        tokio::spawn(relay.run());
        RelayHandle { tx }
    }

    async fn run(mut self) {
        info!("Relay event loop started");

        let mut sweep = tokio::time::interval(self.config.sweep_interval);
        sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick of an interval completes immediately.
        sweep.tick().await;

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("Command channel closed. Shutting down relay.");
                            break;
                        }
                    }
                }

                _ = sweep.tick() => self.sweep(),
            }
        }

        info!("Relay event loop finished");
    }

    async fn handle_command(&mut self, cmd: RelayCommand) {
        match cmd {
            RelayCommand::Connect { origin, tx, reply } => {
                let id = self.registry.register(&origin);
                self.router.add_peer(id.clone(), tx);
                info!("Client connected: {}", id);
                let _ = reply.send(id);
            }

            RelayCommand::Frame { id, message } => self.handle_frame(id, message).await,

            RelayCommand::Pong { id } => self.registry.mark_alive(&id),

            RelayCommand::Disconnect { id } => {
                info!("Client disconnected: {}", id);
                self.handle_leave(&id).await;
                self.drop_client(&id);
            }
        }
    }

    async fn handle_frame(&mut self, id: ClientId, message: ClientMessage) {
        if self.registry.find(&id).is_none() {
            warn!("Frame from unregistered client {}", id);
            return;
        }

        match message {
            ClientMessage::JoinRoom {
                room_id,
                name,
                role,
            } => self.handle_join(&id, room_id, name, role).await,

            ClientMessage::LeaveRoom => self.handle_leave(&id).await,

            ClientMessage::SendMessage { message } => self.handle_chat(&id, message).await,

            ClientMessage::PushMessage { to, message } => self.handle_push(&id, to, message),

            ClientMessage::SendOffer { to, offer } => self.relay_offer(&id, &to, offer),

            ClientMessage::SendAnswer { to, answer } => self.relay_answer(&id, &to, answer),

            ClientMessage::SendCandidate { to, candidate } => {
                self.relay_candidate(&id, to, candidate)
            }

            ClientMessage::MediaOpened => self.handle_media_opened(&id),

            ClientMessage::GetPersonalInfo => self.handle_personal(&id),

            ClientMessage::Ping => self.router.transport_ping(&id),
        }
    }

    async fn handle_join(
        &mut self,
        id: &ClientId,
        room_id: Option<String>,
        name: Option<String>,
        role: Option<String>,
    ) {
        let Some(room_id) = room_id.filter(|r| !r.is_empty()) else {
            self.router
                .unicast(id, &ServerMessage::bad_request("room id is required"));
            return;
        };

        let (member, previous, already_there) = {
            let Some(state) = self.registry.find_mut(id) else {
                return;
            };
            if let Some(name) = name.filter(|n| !n.is_empty()) {
                state.name = name;
            }
            if let Some(role) = role {
                state.role = role;
            }
            (state.member_info(), state.room.clone(), state.in_room(&room_id))
        };

        if already_there {
            // Rejoining the same room keeps membership as-is but still
            // re-announces presence to the rest of the room.
            self.announce_joined(&room_id, &member);
            return;
        }

        if let Some(membership) = previous {
            self.detach_from_room(id, &membership);
        }

        let index = self.rooms.join(&room_id, id.clone());
        let profile = {
            let Some(state) = self.registry.find_mut(id) else {
                return;
            };
            state.room = Some(RoomMembership {
                room_id: room_id.clone(),
                index,
            });
            state.profile()
        };

        info!("{} joined room '{}'", id, room_id);
        self.router.unicast(
            id,
            &ServerMessage::ok_with("success", ResponseData::Profile(profile)),
        );
        self.announce_joined(&room_id, &member);
        self.observer.on_join(id, &room_id).await;
    }

    async fn handle_leave(&mut self, id: &ClientId) {
        let Some((member, membership)) = self
            .registry
            .find(id)
            .and_then(|s| s.room.clone().map(|m| (s.member_info(), m)))
        else {
            // Leaving while not a member is a silent no-op.
            return;
        };

        self.detach_from_room(id, &membership);

        info!("{} left room '{}'", id, membership.room_id);
        let notice = ServerMessage::MemberLeft {
            message: format!("{} left the room", member.name),
            data: member,
        };
        self.room_broadcast(&membership.room_id, id, &notice);
        self.observer.on_leave(id, &membership.room_id).await;
    }

    async fn handle_chat(&mut self, id: &ClientId, text: String) {
        let Some(state) = self.registry.find(id) else {
            return;
        };
        let Some(membership) = state.room.clone() else {
            self.router
                .unicast(id, &ServerMessage::bad_request("join a room first"));
            return;
        };
        let member = state.member_info();

        let msg = ServerMessage::Message {
            message: text.clone(),
            data: member,
        };
        self.room_broadcast(&membership.room_id, id, &msg);
        self.router.unicast(id, &ServerMessage::ok("ok"));
        self.observer.on_message(id, &text).await;
    }

    fn handle_push(&mut self, id: &ClientId, to: Vec<ClientId>, text: String) {
        if to.is_empty() || text.is_empty() {
            self.router.unicast(
                id,
                &ServerMessage::bad_request("multicast target and message are required"),
            );
            return;
        }
        let Some(member) = self.registry.find(id).map(|s| s.member_info()) else {
            return;
        };

        let msg = ServerMessage::Message {
            message: text,
            data: member,
        };
        let unreached = self.router.multicast(&to, &msg);
        let reply = if unreached.is_empty() {
            ServerMessage::ok("ok")
        } else {
            ServerMessage::ok_with("partial", ResponseData::Unreached { unreached })
        };
        self.router.unicast(id, &reply);
    }

    fn relay_offer(&self, from: &ClientId, to: &ClientId, offer: Value) {
        let Some(sender) = self.signal_route(from, to) else {
            debug!("Dropping offer from {} to unroutable {}", from, to);
            return;
        };
        self.router.unicast(
            to,
            &ServerMessage::ReceiveOffer {
                data: OfferForward {
                    id: sender.id,
                    name: sender.name,
                    offer,
                },
            },
        );
    }

    fn relay_answer(&self, from: &ClientId, to: &ClientId, answer: Value) {
        let Some(sender) = self.signal_route(from, to) else {
            debug!("Dropping answer from {} to unroutable {}", from, to);
            return;
        };
        self.router.unicast(
            to,
            &ServerMessage::ReceiveAnswer {
                data: AnswerForward {
                    id: sender.id,
                    name: sender.name,
                    answer,
                },
            },
        );
    }

    fn relay_candidate(&self, from: &ClientId, to: Option<ClientId>, candidate: Value) {
        let Some(state) = self.registry.find(from) else {
            return;
        };
        let sender = state.member_info();

        match to {
            Some(to) => {
                if self.signal_route(from, &to).is_none() {
                    debug!("Dropping candidate from {} to unroutable {}", from, to);
                    return;
                }
                self.router.unicast(
                    &to,
                    &ServerMessage::ReceiveCandidate {
                        data: CandidateForward {
                            id: sender.id,
                            name: sender.name,
                            candidate,
                        },
                    },
                );
            }
            None => {
                // No explicit target: fan out to every media-open member of
                // the sender's room.
                let Some(membership) = state.room.as_ref() else {
                    return;
                };
                let targets = self.media_open_members(&membership.room_id, from);
                let msg = ServerMessage::ReceiveCandidate {
                    data: CandidateForward {
                        id: sender.id,
                        name: sender.name,
                        candidate,
                    },
                };
                let unreached = self.router.multicast(&targets, &msg);
                if !unreached.is_empty() {
                    debug!("Candidate fan-out missed {} peers", unreached.len());
                }
            }
        }
    }

    fn handle_media_opened(&mut self, id: &ClientId) {
        let room_id = {
            let Some(state) = self.registry.find_mut(id) else {
                return;
            };
            state.media_open = true;
            state.room.as_ref().map(|m| m.room_id.clone())
        };

        let client_ids = room_id
            .map(|room_id| self.media_open_members(&room_id, id))
            .unwrap_or_default();

        self.router.unicast(
            id,
            &ServerMessage::MediaOpenedAck {
                data: MediaPeers { client_ids },
            },
        );
    }

    fn handle_personal(&self, id: &ClientId) {
        let Some(profile) = self.registry.find(id).map(|s| s.profile()) else {
            return;
        };
        self.router.unicast(
            id,
            &ServerMessage::ok_with("success", ResponseData::Profile(profile)),
        );
    }

    /// Periodic housekeeping: drop empty rooms, terminate connections that
    /// failed to answer a heartbeat since the previous pass, then clear all
    /// liveness flags for the next round.
    fn sweep(&mut self) {
        let dropped = self.rooms.sweep_empty();
        if dropped > 0 {
            info!("Swept {} empty rooms", dropped);
        }

        for id in self.registry.unresponsive() {
            warn!("Terminating unresponsive client {}", id);
            if let Some(membership) = self.registry.find(&id).and_then(|s| s.room.clone()) {
                // Silent purge; the sweep does not announce departures.
                self.detach_from_room(&id, &membership);
            }
            self.drop_client(&id);
        }

        self.registry.reset_liveness();
    }

    /// Take a connection out of its room's roster and write the corrected
    /// index back to every member that shifted.
    fn detach_from_room(&mut self, id: &ClientId, membership: &RoomMembership) {
        let shifted = self.rooms.leave(&membership.room_id, membership.index);
        for (moved, index) in shifted {
            if let Some(state) = self.registry.find_mut(&moved) {
                if let Some(m) = state.room.as_mut() {
                    m.index = index;
                }
            }
        }
        if let Some(state) = self.registry.find_mut(id) {
            state.room = None;
        }
    }

    fn drop_client(&mut self, id: &ClientId) {
        self.registry.remove(id);
        self.router.remove_peer(id);
    }

    fn announce_joined(&self, room_id: &str, member: &MemberInfo) {
        let notice = ServerMessage::MemberJoined {
            message: format!("{} joined the room", member.name),
            data: member.clone(),
        };
        self.room_broadcast(room_id, &member.id, &notice);
    }

    /// Broadcast scoped to one room via the router's filter hook.
    fn room_broadcast(&self, room_id: &str, exclude: &ClientId, msg: &ServerMessage) {
        let members: HashSet<ClientId> = self
            .rooms
            .members_except(room_id, exclude)
            .into_iter()
            .collect();
        self.router
            .broadcast(exclude, msg, Some(&|id: &ClientId| !members.contains(id)));
    }

    /// A signal may travel from `from` to `to` only when both share a room
    /// and the target has opened media. Returns the sender's member info
    /// for tagging the forwarded signal.
    fn signal_route(&self, from: &ClientId, to: &ClientId) -> Option<MemberInfo> {
        let sender = self.registry.find(from)?;
        let membership = sender.room.as_ref()?;
        let target = self.registry.find(to)?;
        if !target.media_open || !target.in_room(&membership.room_id) {
            return None;
        }
        Some(sender.member_info())
    }

    fn media_open_members(&self, room_id: &str, exclude: &ClientId) -> Vec<ClientId> {
        self.rooms
            .members_except(room_id, exclude)
            .into_iter()
            .filter(|id| self.registry.find(id).is_some_and(|s| s.media_open))
            .collect()
    }
}
