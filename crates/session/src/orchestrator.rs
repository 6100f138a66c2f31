use std::{collections::HashSet, sync::Arc};

use {
    anyhow::{Context, Result, bail, ensure},
    tokio::sync::mpsc,
    tracing::{debug, info, warn},
};

use {
    plaza_auth::{TokenIssuer, TokenManager},
    plaza_channels::{ChannelKind, ChannelRegistry, PairingMap, classify, is_visible, label},
    plaza_config::PlazaConfig,
    plaza_protocol::{ChannelInfo, Identity},
    plaza_transport::{
        ChannelVisibility, ChatTransport, Connection, TransportEvent, leave_with_farewell,
    },
};

use crate::{
    admin::ChannelAdmin,
    events::{ChannelView, SessionEvent},
};

/// Top-level session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    Authenticating,
    Connecting,
    Bootstrapping,
    Active,
    Disconnected,
}

/// One user's live view over a town's channels.
///
/// All state is mutated from a single cooperative task: callers drive the
/// transport event stream through [`TownSession::process_pending_events`]
/// (or [`TownSession::handle_event`] directly) and invoke user operations
/// between pumps. There are no internal locks by construction.
pub struct TownSession {
    identity: Identity,
    town_id: String,
    town_name: String,
    config: PlazaConfig,
    tokens: TokenManager,
    conn: Box<dyn Connection>,
    admin: Arc<dyn ChannelAdmin>,
    transport_rx: mpsc::UnboundedReceiver<TransportEvent>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,

    state: SessionState,
    registry: ChannelRegistry,
    pairings: PairingMap,
    /// Players a private channel has been requested for but whose channel
    /// has not arrived yet. Blocks duplicate requests in the gap.
    pending_partners: HashSet<String>,
    roster: HashSet<String>,
    town_sid: Option<String>,
    help_sid: Option<String>,
    helped: bool,
    focus: Option<String>,
}

impl TownSession {
    /// Run the login state machine through to `Active`.
    ///
    /// Authentication failure is terminal: it surfaces to the caller and
    /// is never retried here. Event subscription happens before the first
    /// channel operation; an invite delivered in that window would
    /// otherwise be silently lost.
    pub async fn login(
        identity: Identity,
        town_id: impl Into<String>,
        town_name: impl Into<String>,
        config: PlazaConfig,
        issuer: Arc<dyn TokenIssuer>,
        transport: &dyn ChatTransport,
        admin: Arc<dyn ChannelAdmin>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SessionEvent>)> {
        let town_id = town_id.into();
        let town_name = town_name.into();

        debug!(player_id = %identity.player_id, "authenticating");
        let mut tokens = TokenManager::new(issuer);
        let credential = tokens
            .acquire(&identity)
            .await
            .context("authentication failed")?;

        debug!(player_id = %identity.player_id, "connecting");
        let conn = transport
            .connect(credential, &identity)
            .await
            .context("transport connect failed")?;

        // Subscribe before any channel operation (ordering contract).
        let transport_rx = conn.subscribe();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let mut session = Self {
            identity,
            town_id,
            town_name,
            config,
            tokens,
            conn,
            admin,
            transport_rx,
            events_tx,
            state: SessionState::Bootstrapping,
            registry: ChannelRegistry::new(),
            pairings: PairingMap::new(),
            pending_partners: HashSet::new(),
            roster: HashSet::new(),
            town_sid: None,
            help_sid: None,
            helped: false,
            focus: None,
        };
        session.bootstrap().await?;
        session.state = SessionState::Active;
        info!(town_id = %session.town_id, player_id = %session.identity.player_id, "session active");
        Ok((session, events_rx))
    }

    /// Find-or-create the town channel, join it, announce arrival.
    ///
    /// Guarded by registry size so a re-trigger cannot join twice or send
    /// a second arrival announcement.
    async fn bootstrap(&mut self) -> Result<()> {
        if !self.registry.is_empty() {
            debug!(town_id = %self.town_id, "bootstrap already ran, skipping");
            return Ok(());
        }

        let town = match self.conn.channel_by_unique_name(&self.town_id).await {
            Ok(info) => info,
            // Expected on the first session in a town: create, then join.
            Err(e) if e.is_not_found() => {
                info!(town_id = %self.town_id, "town channel does not exist yet, creating");
                self.conn
                    .create_channel(&self.town_name, &self.town_id, ChannelVisibility::Public)
                    .await
                    .context("town channel creation failed")?
            },
            Err(e) => return Err(e).context("town channel lookup failed"),
        };

        let town = if town.is_joined() {
            town
        } else {
            self.conn
                .join(&town.sid)
                .await
                .context("town channel join failed")?
        };

        if self.config.session.announce_joins {
            self.conn
                .send_message(
                    &town.sid,
                    &format!("{} has joined the main chat", self.identity.user_name),
                )
                .await
                .context("arrival announcement failed")?;
        }

        self.town_sid = Some(town.sid.clone());
        self.focus = Some(town.sid.clone());
        self.registry.add(town);
        Ok(())
    }

    // ── Event handling ───────────────────────────────────────────────────

    /// Drain and handle every queued transport event.
    pub async fn process_pending_events(&mut self) {
        while let Ok(event) = self.transport_rx.try_recv() {
            self.handle_event(event).await;
        }
    }

    /// Handle one transport event. Event-driven paths degrade to a safe
    /// state instead of surfacing errors: a failed invite join discards
    /// the channel, a removal resets focus.
    pub async fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::ChannelInvited(info) => self.handle_invite(info).await,
            TransportEvent::ChannelLeft { sid } | TransportEvent::ChannelRemoved { sid } => {
                self.forget_channel(&sid);
            },
            TransportEvent::MessageAdded { sid, message } => {
                self.emit(SessionEvent::MessageAdded { sid, message });
            },
            TransportEvent::TokenExpiring => match self.tokens.refresh(&self.identity).await {
                Ok(_) => self.emit(SessionEvent::TokenRefreshed),
                Err(e) => warn!(error = %e, "credential refresh failed"),
            },
        }
    }

    /// Invite flow: join, announce, recover the pairing, register.
    ///
    /// The channel's first message is the handshake — by convention the
    /// inviter's join announcement. When it is missing or does not decode
    /// to someone else's identity, the pairing is recovered from the
    /// friendly name instead and the channel is kept.
    async fn handle_invite(&mut self, info: ChannelInfo) {
        debug!(sid = %info.sid, "channel invite received, joining");
        let joined = match self.conn.join(&info.sid).await {
            Ok(joined) => joined,
            Err(e) => {
                // Not retried automatically; a user re-invite starts over.
                warn!(sid = %info.sid, error = %e, "invite join failed, discarding channel");
                return;
            },
        };

        if self.config.session.announce_joins
            && let Err(e) = self
                .conn
                .send_message(
                    &joined.sid,
                    &format!("{} joined the chat.", self.identity.user_name),
                )
                .await
        {
            warn!(sid = %joined.sid, error = %e, "join announcement failed");
        }

        match classify(&joined, &self.identity) {
            ChannelKind::Private(pairing) => {
                let (a, b) = match self.inviter_from_history(&joined.sid).await {
                    Some(inviter) => (inviter.player_id, self.identity.player_id.clone()),
                    None => {
                        debug!(sid = %joined.sid, "no usable handshake, pairing from friendly name");
                        let (a, b) = pairing.identities();
                        (a.player_id.clone(), b.player_id.clone())
                    },
                };
                self.pending_partners.remove(&a);
                self.pending_partners.remove(&b);
                self.pairings.insert(joined.sid.clone(), a, b);
            },
            ChannelKind::Help => {
                self.helped = true;
                self.help_sid = Some(joined.sid.clone());
            },
            ChannelKind::Town => {},
        }

        if self.registry.add(joined) {
            self.emit(SessionEvent::ChannelsChanged);
        }
    }

    /// First history message's author, if it decodes to someone other than
    /// the session identity.
    async fn inviter_from_history(&self, sid: &str) -> Option<Identity> {
        let history = self.conn.message_history(sid).await.ok()?;
        history
            .first()?
            .author_identity()
            .filter(|author| author.player_id != self.identity.player_id)
    }

    /// Drop a channel from the session view: registry entry, pairing (both
    /// identities), helped flag, and focus all reset as applicable.
    fn forget_channel(&mut self, sid: &str) {
        if self.registry.remove(sid).is_some() {
            self.emit(SessionEvent::ChannelsChanged);
        }
        if let Some((a, b)) = self.pairings.remove(sid) {
            self.pending_partners.remove(&a);
            self.pending_partners.remove(&b);
        }
        if self.help_sid.as_deref() == Some(sid) {
            self.help_sid = None;
            self.helped = false;
        }
        if self.focus.as_deref() == Some(sid) {
            self.focus = self.town_sid.clone();
            self.emit(SessionEvent::FocusReset);
        }
    }

    // ── User operations ──────────────────────────────────────────────────

    /// Channels in stable tab order, private ones filtered by roster
    /// visibility. Visibility is re-derived on every call, never cached.
    pub fn list_visible_channels(&self) -> Vec<ChannelView> {
        self.registry
            .list()
            .iter()
            .filter_map(|info| {
                let kind = classify(info, &self.identity);
                let tab_label = match &kind {
                    ChannelKind::Private(pairing) => {
                        if !is_visible(pairing, &self.roster) {
                            return None;
                        }
                        label(pairing, &self.identity)
                    },
                    ChannelKind::Help => self.config.session.help_label.clone(),
                    ChannelKind::Town => self.config.session.town_label.clone(),
                };
                Some(ChannelView {
                    sid: info.sid.clone(),
                    label: tab_label,
                    kind,
                })
            })
            .collect()
    }

    pub async fn send_message(&self, sid: &str, body: &str) -> Result<()> {
        self.ensure_active()?;
        let body = body.trim();
        ensure!(!body.is_empty(), "cannot send an empty message");
        self.conn
            .send_message(sid, body)
            .await
            .context("message send rejected")
    }

    /// Leave a channel: best-effort farewell, leave, drop from the view.
    /// Not cancellable once initiated.
    pub async fn leave_channel(&mut self, sid: &str) -> Result<()> {
        self.ensure_active()?;
        ensure!(
            self.town_sid.as_deref() != Some(sid),
            "the town channel cannot be left while the session is active"
        );
        let farewell = format!("{} has left the chat.", self.identity.user_name);
        leave_with_farewell(self.conn.as_ref(), sid, &farewell)
            .await
            .context("channel leave failed")?;
        self.forget_channel(sid);
        Ok(())
    }

    /// Open a bot-assisted help channel. One at a time: rejected while a
    /// help channel is already open or requested.
    pub async fn request_help(&mut self) -> Result<()> {
        self.ensure_active()?;
        if self.helped {
            bail!("help was already requested for this session");
        }
        self.admin
            .create_bot_channel(&self.identity, &self.town_id)
            .await
            .context("help request failed")?;
        self.helped = true;
        Ok(())
    }

    /// Ask the administrative API to open a private channel with `target`.
    /// The channel arrives as an invite for both parties.
    pub async fn request_private_channel(&mut self, target: &Identity) -> Result<()> {
        self.ensure_active()?;
        ensure!(
            target.player_id != self.identity.player_id,
            "cannot open a private channel with yourself"
        );
        if self.pairings.is_engaged(&target.player_id)
            || self.pending_partners.contains(&target.player_id)
        {
            bail!("a private channel with {} is already open", target.user_name);
        }
        self.admin
            .create_private_channel(&self.identity, target, &self.town_id)
            .await
            .context("private channel request failed")?;
        self.pending_partners.insert(target.player_id.clone());
        Ok(())
    }

    /// Full channel history as formatted lines, provider delivery order.
    pub async fn export_history(&self, sid: &str) -> Result<Vec<String>> {
        let history = self
            .conn
            .message_history(sid)
            .await
            .context("history fetch failed")?;
        Ok(history
            .iter()
            .map(|m| {
                format!(
                    "{}: {}: {}",
                    m.created_at.to_rfc3339(),
                    m.author_display(),
                    m.body
                )
            })
            .collect())
    }

    /// Replace the live roster (the external "who is nearby" feed).
    pub fn set_roster(&mut self, roster: impl IntoIterator<Item = Identity>) {
        self.roster = roster.into_iter().map(|i| i.player_id).collect();
    }

    pub fn set_focus(&mut self, sid: &str) -> Result<()> {
        ensure!(self.registry.contains(sid), "unknown channel {sid}");
        self.focus = Some(sid.to_string());
        Ok(())
    }

    /// Connection-loss notification from the lower layer. Best-effort
    /// farewell on the town channel, then leave everything. There is no
    /// reconnection; recovery is a full session restart.
    pub async fn notify_disconnect(&mut self) {
        if self.state == SessionState::Disconnected {
            return;
        }
        self.state = SessionState::Disconnected;
        info!(town_id = %self.town_id, "disconnect notified, tearing down session");

        let farewell = format!("{} has left the chat", self.identity.user_name);
        for info in self.registry.drain() {
            if Some(info.sid.as_str()) == self.town_sid.as_deref() {
                if let Err(e) = leave_with_farewell(self.conn.as_ref(), &info.sid, &farewell).await
                {
                    warn!(sid = %info.sid, error = %e, "town channel teardown failed");
                }
            } else if let Err(e) = self.conn.leave(&info.sid).await {
                warn!(sid = %info.sid, error = %e, "channel teardown failed");
            }
        }

        self.pairings = PairingMap::new();
        self.pending_partners.clear();
        self.helped = false;
        self.help_sid = None;
        self.focus = None;
        self.emit(SessionEvent::Disconnected);
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn town_sid(&self) -> Option<&str> {
        self.town_sid.as_deref()
    }

    pub fn focused(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    pub fn is_helped(&self) -> bool {
        self.helped
    }

    fn ensure_active(&self) -> Result<()> {
        ensure!(
            self.state == SessionState::Active,
            "session is not active (state: {:?})",
            self.state
        );
        Ok(())
    }

    fn emit(&self, event: SessionEvent) {
        // Presentation side may have gone away; that is not our problem.
        let _ = self.events_tx.send(event);
    }
}
