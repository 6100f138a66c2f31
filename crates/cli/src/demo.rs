//! Scripted two-player walkthrough against the in-memory provider.
//!
//! Exercises the full session surface end to end: bootstrap, private
//! channel invite flow, help request, history export and teardown.

use std::sync::Arc;

use anyhow::{Context, Result};

use {
    plaza_auth::{HttpTokenIssuer, StaticTokenIssuer, TokenIssuer},
    plaza_config::discover_and_load,
    plaza_protocol::Identity,
    plaza_session::{ChannelKind, InMemoryAdmin, SessionEvent, TownSession},
    plaza_transport::memory::InMemoryChat,
};

pub async fn run(town_id: &str) -> Result<()> {
    let config = discover_and_load();
    let issuer: Arc<dyn TokenIssuer> = match &config.auth.issuer_url {
        Some(url) => Arc::new(HttpTokenIssuer::new(url)),
        None => Arc::new(StaticTokenIssuer::new("demo", config.auth.token_ttl_secs)),
    };

    let chat = InMemoryChat::new();
    let admin = Arc::new(InMemoryAdmin::new(chat.clone()));

    let alice = Identity::new("p1", "Alice");
    let bob = Identity::new("p2", "Bob");

    let (mut a, _a_events) = TownSession::login(
        alice.clone(),
        town_id,
        "Demo Town",
        config.clone(),
        issuer.clone(),
        &chat,
        admin.clone(),
    )
    .await?;
    let (mut b, mut b_events) =
        TownSession::login(bob.clone(), town_id, "Demo Town", config, issuer, &chat, admin)
            .await?;

    let roster = vec![alice.clone(), bob.clone()];
    a.set_roster(roster.clone());
    b.set_roster(roster);

    let town_sid = a
        .town_sid()
        .map(str::to_string)
        .context("town channel missing after login")?;
    a.send_message(&town_sid, "Hello, town!").await?;

    // Private channel: Alice requests, both sides process the invite.
    a.request_private_channel(&bob).await?;
    a.process_pending_events().await;
    b.process_pending_events().await;

    let pm_sid = a
        .list_visible_channels()
        .into_iter()
        .find(|v| matches!(v.kind, ChannelKind::Private(_)))
        .map(|v| v.sid)
        .context("private channel did not arrive")?;
    a.send_message(&pm_sid, "psst, Bob").await?;
    b.process_pending_events().await;
    b.send_message(&pm_sid, "hey Alice").await?;

    b.request_help().await?;
    b.process_pending_events().await;

    println!("Alice's channels:");
    for view in a.list_visible_channels() {
        println!("  [{}] {}", view.sid, view.label);
    }
    println!("Bob's channels:");
    for view in b.list_visible_channels() {
        println!("  [{}] {}", view.sid, view.label);
    }

    println!("\nTown history:");
    for line in a.export_history(&town_sid).await? {
        println!("  {line}");
    }
    println!("\nPrivate history:");
    for line in a.export_history(&pm_sid).await? {
        println!("  {line}");
    }

    let mut forwarded = 0;
    while let Ok(event) = b_events.try_recv() {
        if matches!(event, SessionEvent::MessageAdded { .. }) {
            forwarded += 1;
        }
    }
    println!("\nBob's session forwarded {forwarded} message events");

    a.notify_disconnect().await;
    b.notify_disconnect().await;
    println!("sessions closed");
    Ok(())
}
