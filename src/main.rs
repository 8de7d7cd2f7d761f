mod cli;

use anyhow::anyhow;
use clap::Parser;
use futures::{Stream, StreamExt};
use log::{error, info, warn};
use tokio_util::sync::CancellationToken;

#[cfg(unix)]
use tokio::signal::unix::SignalKind;
use tokio::signal::{self};

use fxos8700::sensors::fxos8700::reader::{Data, Reader};

fn afficher(data: &Data, json: bool) {
    if json {
        match serde_json::to_string(data) {
            Ok(ligne) => println!("{}", ligne),
            Err(e) => error!("[FXOS8700] Sérialisation impossible: {}", e),
        }
        return;
    }

    let a = data.accel.data;
    let m = data.mag.data;
    info!(
        "[FXOS8700] t={} ms A: ({:.3}, {:.3}, {:.3}) m/s² M: ({:.1}, {:.1}, {:.1}) µT",
        data.accel.timestamp, a.x, a.y, a.z, m.x, m.y, m.z
    );
}

/// Affiche les mesures jusqu'à l'annulation. Un flux qui se termine avant est une erreur.
async fn acquisition<S>(mut reader: S, token: CancellationToken, json: bool) -> anyhow::Result<()>
where
    S: Stream<Item = anyhow::Result<Data>> + Unpin,
{
    let mut derniere_erreur = None;
    while !token.is_cancelled() {
        match reader.next().await {
            Some(Ok(data)) => {
                derniere_erreur = None;
                afficher(&data, json);
            }
            Some(Err(e)) => {
                warn!("[FXOS8700] {}", e);
                derniere_erreur = Some(e);
            }
            None => break,
        }
    }

    if token.is_cancelled() {
        return Ok(());
    }

    Err(match derniere_erreur {
        Some(e) => e.context("Acquisition interrompue"),
        None => anyhow!("Acquisition interrompue"),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = cli::Cli::parse();
    let config = cli.to_config()?;
    let json = cli.json;
    let token = CancellationToken::new();

    info!(
        "[FXOS8700] Bus {} @ {:#04x}: {}, {}, {}, OSR {}",
        config.bus, config.address, config.range, config.mode, config.rate, config.ratio
    );

    // FXOS8700
    let mut tache = {
        let token = token.child_token();
        let reader = Reader::new(config, token.clone())?;
        tokio::spawn(acquisition(reader, token, json))
    };

    #[cfg(unix)]
    {
        let mut terminate = tokio::signal::unix::signal(SignalKind::terminate())?;
        tokio::select! {
            _ = terminate.recv() => {
                info!("Signal d'arrêt reçu");
            },
            _ = signal::ctrl_c() => {
                info!("Signal de contrôle C reçu");
            },
            fin = &mut tache => {
                error!("[FXOS8700] Fin de l'acquisition.");
                return fin?;
            },
        }
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Signal de contrôle C reçu");
            },
            fin = &mut tache => {
                error!("[FXOS8700] Fin de l'acquisition.");
                return fin?;
            },
        }
    }

    token.cancel();
    tache.await?
}
