//! Switching functions of the ASM2d rate expressions.
//!
//! All functions are pure. Every denominator carries [`EPS`] so that a zero
//! concentration together with a zero half-saturation constant gives 0 instead of NaN.

/// guard added to every denominator
pub const EPS: f64 = 1e-10;
/// biomass below this concentration [g COD/m³] is treated as washed out: storage ratios become 0
pub const BIOMASS_FLOOR: f64 = 0.1;

/// S/(K+S)
pub fn monod(s: f64, k: f64) -> f64 {
    s / (k + s + EPS)
}

/// K/(K+S)
pub fn inhibition(s: f64, k: f64) -> f64 {
    k / (k + s + EPS)
}

/// (K_MAX - ratio)/(K_IPP + K_MAX - ratio), with the bracket cut at zero
///
/// Shuts poly-P storage down when the cell poly-P content approaches `k_max`.
pub fn saturation_inhibition(ratio: f64, k_max: f64, k_ipp: f64) -> f64 {
    let free_capacity = (k_max - ratio).max(0.0);
    free_capacity / (k_ipp + free_capacity + EPS)
}

/// X/biomass, or 0 when the biomass is below [`BIOMASS_FLOOR`]
pub fn biomass_ratio(x: f64, biomass: f64) -> f64 {
    if biomass < BIOMASS_FLOOR {
        0.0
    } else {
        x / biomass
    }
}

/// Monod term applied to a storage ratio: ratio/(K+ratio) with the biomass floor
pub fn ratio_monod(x: f64, biomass: f64, k: f64) -> f64 {
    monod(biomass_ratio(x, biomass), k)
}
