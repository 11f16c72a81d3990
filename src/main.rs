use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use workhub_client::api::notifications::NotificationFilters;
use workhub_client::models::user::{AuthTokens, LoginRequest};
use workhub_client::WorkspaceClient;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "workhub_client=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = cli::Cli::parse();
    let config = workhub_client::config::load();
    let client = WorkspaceClient::new(config).context("failed to build client")?;

    authenticate(&client, &args).await?;

    match args.command {
        cli::Commands::Whoami => {
            let user = client.auth().profile().await?;
            println!("{} <{}> (id {})", user.username, user.email, user.id);
        }

        cli::Commands::Workspaces => {
            for ws in client.workspaces().list().await? {
                println!("{}  {}  ({} members)", ws.id, ws.name, ws.member_count.unwrap_or(0));
            }
        }

        cli::Commands::Documents { workspace } => {
            let docs = client.documents().list(workspace.as_deref(), None).await?;
            for doc in docs {
                println!("{}  {}", doc.id, doc.title);
            }
        }

        cli::Commands::Notifications {
            unread,
            limit,
            follow,
        } => {
            let items = client
                .notifications()
                .list(NotificationFilters { unread, limit })
                .await?;
            for n in &items {
                let mark = if n.is_read { " " } else { "*" };
                println!("{mark} {}  [{}] {}: {}", n.id, n.created_at, n.title, n.message);
            }

            if follow {
                follow_notifications(&client).await?;
            }
        }

        cli::Commands::MarkRead { id } => {
            client.notifications().mark_read(&id).await?;
            println!("marked {id} as read");
        }

        cli::Commands::MarkAllRead => {
            client.notifications().mark_all_read().await?;
            println!("marked all notifications as read");
        }
    }

    Ok(())
}

/// Log in with email/password when provided; otherwise resume a session
/// from WORKHUB_ACCESS_TOKEN / WORKHUB_REFRESH_TOKEN.
async fn authenticate(client: &WorkspaceClient, args: &cli::Cli) -> anyhow::Result<()> {
    if let (Some(email), Some(password)) = (&args.email, &args.password) {
        let user = client
            .auth()
            .login(&LoginRequest {
                email: email.clone(),
                password: password.clone(),
            })
            .await
            .context("login failed")?;
        tracing::info!(username = %user.username, "logged in");
        return Ok(());
    }

    let access = std::env::var("WORKHUB_ACCESS_TOKEN").ok();
    let refresh = std::env::var("WORKHUB_REFRESH_TOKEN").ok();
    match (access, refresh) {
        (Some(access), Some(refresh)) => {
            client.session().resume(AuthTokens { access, refresh });
            Ok(())
        }
        _ => anyhow::bail!(
            "no credentials: pass --email/--password or set WORKHUB_ACCESS_TOKEN and WORKHUB_REFRESH_TOKEN"
        ),
    }
}

/// Keep the socket open and print alerts as they arrive, until Ctrl-C.
async fn follow_notifications(client: &WorkspaceClient) -> anyhow::Result<()> {
    let mut alerts = client.subscribe_alerts();
    let mut logged_out = client.session().watch_authenticated();
    client.realtime().connect();

    println!("following notifications (Ctrl-C to stop)...");
    loop {
        tokio::select! {
            alert = alerts.recv() => match alert {
                Ok(alert) => {
                    match &alert.action_url {
                        Some(url) => println!("! {}: {}  ({url})", alert.title, alert.message),
                        None => println!("! {}: {}", alert.title, alert.message),
                    }
                }
                Err(_) => break,
            },
            changed = logged_out.changed() => {
                if changed.is_err() || !*logged_out.borrow() {
                    eprintln!("session expired, stopping");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    client.realtime().disconnect();
    Ok(())
}
