// FXOS8700CQ
// https://www.nxp.com/docs/en/data-sheet/FXOS8700CQ.pdf
pub const FXOS8700_ADDR: u16 = 0x1F;
pub const FXOS8700_ID: u8 = 0xC7;

pub const FXOS8700_STATUS: u8 = 0x00;
pub const FXOS8700_OUT_X_MSB: u8 = 0x01;
pub const FXOS8700_OUT_X_LSB: u8 = 0x02;
pub const FXOS8700_OUT_Y_MSB: u8 = 0x03;
pub const FXOS8700_OUT_Y_LSB: u8 = 0x04;
pub const FXOS8700_OUT_Z_MSB: u8 = 0x05;
pub const FXOS8700_OUT_Z_LSB: u8 = 0x06;
pub const FXOS8700_SYSMOD: u8 = 0x0B;
pub const FXOS8700_WHO_AM_I: u8 = 0x0D;
pub const FXOS8700_XYZ_DATA_CFG: u8 = 0x0E;
pub const FXOS8700_CTRL_REG1: u8 = 0x2A;
pub const FXOS8700_CTRL_REG2: u8 = 0x2B;
pub const FXOS8700_CTRL_REG3: u8 = 0x2C;
pub const FXOS8700_CTRL_REG4: u8 = 0x2D;
pub const FXOS8700_CTRL_REG5: u8 = 0x2E;
pub const FXOS8700_M_DR_STATUS: u8 = 0x32;
pub const FXOS8700_M_OUT_X_MSB: u8 = 0x33;
pub const FXOS8700_M_OUT_X_LSB: u8 = 0x34;
pub const FXOS8700_M_OUT_Y_MSB: u8 = 0x35;
pub const FXOS8700_M_OUT_Y_LSB: u8 = 0x36;
pub const FXOS8700_M_OUT_Z_MSB: u8 = 0x37;
pub const FXOS8700_M_OUT_Z_LSB: u8 = 0x38;
pub const FXOS8700_M_CTRL_REG1: u8 = 0x5B;
pub const FXOS8700_M_CTRL_REG2: u8 = 0x5C;
pub const FXOS8700_M_CTRL_REG3: u8 = 0x5D;

// Lecture en rafale : STATUS + 3 axes accel + 3 axes mag
pub const FXOS8700_BURST_LEN: usize = 13;

pub const FXOS8700_SYSMOD_BIT: u8 = 0;
pub const FXOS8700_SYSMOD_LENGTH: u8 = 2;

pub const FXOS8700_XYZ_DATA_CFG_FS_BIT: u8 = 0;
pub const FXOS8700_XYZ_DATA_CFG_FS_LENGTH: u8 = 2;

pub const FXOS8700_CTRL_REG1_ACTIVE_BIT: u8 = 0;
pub const FXOS8700_CTRL_REG1_LNOISE_BIT: u8 = 2;
pub const FXOS8700_CTRL_REG1_DR_BIT: u8 = 3;
pub const FXOS8700_CTRL_REG1_DR_LENGTH: u8 = 3;

pub const FXOS8700_CTRL_REG2_MODS_BIT: u8 = 0;
pub const FXOS8700_CTRL_REG2_MODS_LENGTH: u8 = 2;
pub const FXOS8700_CTRL_REG2_MODS_HIGH_RES: u8 = 0b10;

pub const FXOS8700_M_CTRL_REG1_HMS_BIT: u8 = 0;
pub const FXOS8700_M_CTRL_REG1_HMS_LENGTH: u8 = 2;
pub const FXOS8700_M_CTRL_REG1_OS_BIT: u8 = 2;
pub const FXOS8700_M_CTRL_REG1_OS_LENGTH: u8 = 3;

pub const FXOS8700_M_CTRL_REG2_HYB_AUTOINC_BIT: u8 = 5;

// Registres de configuration : écriture interdite hors veille (hors bit ACTIVE)
pub const FXOS8700_CONFIG_REGISTERS: [u8; 9] = [
    FXOS8700_XYZ_DATA_CFG,
    FXOS8700_CTRL_REG1,
    FXOS8700_CTRL_REG2,
    FXOS8700_CTRL_REG3,
    FXOS8700_CTRL_REG4,
    FXOS8700_CTRL_REG5,
    FXOS8700_M_CTRL_REG1,
    FXOS8700_M_CTRL_REG2,
    FXOS8700_M_CTRL_REG3,
];
