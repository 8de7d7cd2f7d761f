pub mod fxos8700;
pub mod unified;
