//! Physical constants and numerical guards shared by the atmosphere models

/// Gravitational acceleration used by the barometric formula (m/s²)
pub const GRAVITY: f64 = 9.81;

/// Universal gas constant (J/(mol·K))
pub const GAS_CONSTANT_UNIVERSAL: f64 = 8.31432;

/// Molar mass of dry air (kg/mol)
pub const MOLAR_MASS_AIR: f64 = 28.9644e-3;

/// Specific gas constant of dry air, ≈ 287.05 J/(kg·K)
pub const GAS_CONSTANT_AIR: f64 = GAS_CONSTANT_UNIVERSAL / MOLAR_MASS_AIR;

/// Ratio of specific heats for dry air
pub const HEAT_CAPACITY_RATIO: f64 = 1.4;

/// Base pressure of the lowest layer (Pa)
pub const SEA_LEVEL_PRESSURE: f64 = 101_325.0;

/// Offset between Celsius and Kelvin scales
pub const CELSIUS_TO_KELVIN: f64 = 273.15;

/// Lowest temperature the barometric formula will use (K).
/// Keeps `T / T_b` positive when a layer is extrapolated far past its range.
pub const TEMPERATURE_FLOOR: f64 = 1.0;

/// Bound on the isothermal exponent so `exp` never overflows or underflows to 0
pub const EXPONENT_CLIP: f64 = 500.0;

/// Metres per kilometre
pub const METERS_PER_KILOMETER: f64 = 1000.0;
