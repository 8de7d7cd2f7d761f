use futures::Stream;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[cfg(feature = "real-sensors")]
use rppal::i2c::I2c;

#[cfg(not(feature = "real-sensors"))]
use crate::simulation::SimulatedFxos8700;

use super::{Fxos8700, RawData};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::i2c::I2CBus;
use crate::sensors::unified::SensorEvent;

const CHANNEL_SIZE: usize = 16;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Data {
    pub accel: SensorEvent,
    pub mag: SensorEvent,
    pub accel_raw: RawData,
    pub mag_raw: RawData,
}

pub struct Reader {
    rx: mpsc::Receiver<anyhow::Result<Data>>,
    token: CancellationToken,
}

impl Reader {
    /// Ouvre le bus de la configuration et démarre l'acquisition
    pub fn new(config: Config, token: CancellationToken) -> anyhow::Result<Self> {
        #[cfg(feature = "real-sensors")]
        let bus = I2c::with_bus(config.bus)?;

        #[cfg(not(feature = "real-sensors"))]
        let bus = SimulatedFxos8700::new();
        #[cfg(all(not(feature = "real-sensors"), feature = "fake-sensors"))]
        let bus = bus.with_noise();

        let driver = Fxos8700::from_config(&config, SystemClock::new());
        Ok(Self::spawn(driver, bus, config, token))
    }

    /// Démarre l'acquisition sur un bus déjà ouvert
    pub fn spawn<B, C>(mut driver: Fxos8700<B, C>, bus: B, config: Config, token: CancellationToken) -> Self
    where
        B: I2CBus + Send + 'static,
        C: Clock + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(CHANNEL_SIZE);
        let thread_token = token.clone();

        info!("[READER] Démarrage du thread ...");
        thread::spawn(move || {
            // Prépare le module
            let pret = driver.begin(config.address, bus).and_then(|_| driver.apply(&config));
            if let Err(e) = pret {
                error!("[READER] Capteur indisponible: {}", e);
                let _ = tx.blocking_send(Err(e.into()));
                return;
            }

            let periode = Duration::from_millis(config.period_ms);
            while !thread_token.is_cancelled() {
                let data = match driver.get_events() {
                    Ok((accel, mag)) => Ok(Data {
                        accel,
                        mag,
                        accel_raw: driver.accel_raw(),
                        mag_raw: driver.mag_raw(),
                    }),
                    Err(e) => {
                        warn!("[READER] Erreur de lecture: {}", e);
                        Err(e.into())
                    }
                };

                // Plus personne n'écoute
                if tx.blocking_send(data).is_err() {
                    break;
                }

                thread::sleep(periode);
            }

            driver.release();
            info!("[READER] Fin du thread.");
        });

        Reader { rx, token }
    }
}

// Implémentation pour le passage en async
impl Stream for Reader {
    type Item = anyhow::Result<Data>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.token.is_cancelled() {
            return Poll::Ready(None);
        }

        self.rx.poll_recv(cx)
    }
}
