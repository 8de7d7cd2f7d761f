use super::settings::{OutputDataRate, SensorMode};

/// Erreurs du pilote FXOS8700
#[derive(Debug, thiserror::Error)]
pub enum Fxos8700Error {
    #[error("Initialisation impossible: {0}")]
    Init(String),

    #[error("Identifiant inattendu: {found:#04x} (attendu {expected:#04x})")]
    Identity { found: u8, expected: u8 },

    #[error("Capteur non initialisé")]
    NotInitialized,

    #[error("Erreur de bus I2C: {0}")]
    Transport(anyhow::Error),

    #[error("ODR {rate} indisponible en mode {mode}")]
    InvalidConfiguration { rate: OutputDataRate, mode: SensorMode },

    #[error("Lecture simple impossible en mode hybride")]
    HybridSingleRead,

    #[error("Délai dépassé ({waited_ms} ms) en attente du mode {target}")]
    Timeout { target: &'static str, waited_ms: u64 },
}

impl Fxos8700Error {
    /// Erreur d'initialisation (liaison, identité)
    pub fn is_init(&self) -> bool {
        matches!(self, Fxos8700Error::Init(_) | Fxos8700Error::Identity { .. })
    }
}

impl From<anyhow::Error> for Fxos8700Error {
    fn from(e: anyhow::Error) -> Self {
        Fxos8700Error::Transport(e)
    }
}
