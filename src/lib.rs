//! Pilote FXOS8700 (accéléromètre + magnétomètre NXP) sur bus I2C.

pub mod clock;
pub mod config;
pub mod i2c;
pub mod sensors;
pub mod simulation;
