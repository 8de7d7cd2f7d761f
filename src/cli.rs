use std::path::PathBuf;

use clap::Parser;

use fxos8700::config::Config;
use fxos8700::sensors::fxos8700::{AccelRange, MagOversamplingRatio, OutputDataRate, SensorMode};

/// Acquisition FXOS8700 (accéléromètre + magnétomètre) sur bus I2C
#[derive(Debug, Parser, Clone)]
#[command(name = "fxos8700", version)]
pub struct Cli {
    /// Fichier de configuration JSON
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Numéro du bus I2C
    #[arg(long)]
    pub bus: Option<u8>,

    /// Adresse du capteur (décimal ou 0x..)
    #[arg(long, value_parser = parse_address)]
    pub address: Option<u16>,

    /// Pleine échelle (2g, 4g, 8g)
    #[arg(long)]
    pub range: Option<AccelRange>,

    /// Mode (accel, mag, hybrid)
    #[arg(long)]
    pub mode: Option<SensorMode>,

    /// Fréquence de sortie en Hz
    #[arg(long)]
    pub odr: Option<OutputDataRate>,

    /// Sur-échantillonnage du magnétomètre (0..=7)
    #[arg(long)]
    pub osr: Option<MagOversamplingRatio>,

    /// Période d'acquisition (ms)
    #[arg(long)]
    pub period: Option<u64>,

    /// Sortie JSON (une mesure par ligne)
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Configuration finale : fichier (ou défauts) puis options de la ligne de commande
    pub fn to_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::new(),
        };

        if let Some(bus) = self.bus {
            config.bus = bus;
        }
        if let Some(address) = self.address {
            config.address = address;
        }
        if let Some(range) = self.range {
            config.range = range;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(rate) = self.odr {
            config.rate = rate;
        }
        if let Some(ratio) = self.osr {
            config.ratio = ratio;
        }
        if let Some(period) = self.period {
            config.period_ms = period;
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_address(s: &str) -> Result<u16, String> {
    let s = s.trim();
    let adresse = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    adresse.map_err(|e| format!("adresse invalide '{}': {}", s, e))
}
