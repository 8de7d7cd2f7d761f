use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::sensors::fxos8700::registry::FXOS8700_ADDR;
use crate::sensors::fxos8700::{
    AccelRange, MagOversamplingRatio, OutputDataRate, SensorMode, ACCEL_SENSOR_ID, MAG_SENSOR_ID,
    STANDBY_TIMEOUT_MS,
};

/// Configuration de l'acquisition (fichier JSON, champs absents = valeurs par défaut)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    pub bus: u8,
    pub address: u16,
    pub accel_sensor_id: i32,
    pub mag_sensor_id: i32,
    pub range: AccelRange,
    pub mode: SensorMode,
    pub rate: OutputDataRate,
    pub ratio: MagOversamplingRatio,
    pub standby_timeout_ms: u64,
    pub period_ms: u64,
}

impl Config {
    pub fn new() -> Self {
        Config {
            bus: 1,
            address: FXOS8700_ADDR,
            accel_sensor_id: ACCEL_SENSOR_ID,
            mag_sensor_id: MAG_SENSOR_ID,
            range: AccelRange::Range2G,
            mode: SensorMode::Hybrid,
            rate: OutputDataRate::Odr100Hz,
            ratio: MagOversamplingRatio::Osr7,
            standby_timeout_ms: STANDBY_TIMEOUT_MS,
            period_ms: 100,
        }
    }

    /// Charge un fichier JSON
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contenu = fs::read_to_string(path)
            .with_context(|| format!("Lecture de {} impossible", path.display()))?;
        let config: Config = serde_json::from_str(&contenu)
            .with_context(|| format!("Configuration invalide: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Vérifie la cohérence ODR / mode
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.rate.is_available(self.mode) {
            let disponibles: Vec<String> = OutputDataRate::available(self.mode).map(|r| r.to_string()).collect();
            bail!(
                "ODR {} indisponible en mode {} (disponibles: {})",
                self.rate,
                self.mode,
                disponibles.join(", ")
            );
        }
        if self.period_ms == 0 {
            bail!("La période d'acquisition doit être non nulle");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
