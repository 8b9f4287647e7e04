//! Gas/liquid phase equilibration for one network.
//!
//! Everything in a network is assumed to reach thermal equilibrium
//! instantly: gas and liquid share one temperature. The solver walks toward
//! the matching phase split with a damped fixed-point iteration:
//!
//! 1. Mix both phases to `T = Q / H` using the current heat capacities. When
//!    `H` is zero the temperature is kept and steps 2 and 4 still run.
//! 2. Condense `alpha(k)` of the remaining gas of every species whose boiling
//!    point is above `T`. `alpha` falls linearly from 1 so early steps move a
//!    lot and late steps only correct.
//! 3. Close the energy balance for the step: re-equalize both phases to
//!    `Q / H'` with the post-transfer heat capacities `H'`.
//! 4. Stop once the step changed the temperature by less than `rel_tol`.
//!
//! Transfers only go gas -> liquid. Liquid above its boiling point stays
//! liquid. Hitting `max_iterations` is accepted as best effort.

use pn_chem::{Mixture, Solution, SpeciesCatalog};
use pn_core::numeric::relative_change;
use tracing::{debug, trace};

use crate::error::{NetError, NetResult};
use crate::volume::NetworkVolume;

/// Iteration limits for [`EquilibriumSolver`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverConfig {
    /// Hard cap on iterations per call.
    pub max_iterations: usize,
    /// Relative temperature change below which a call counts as converged.
    pub rel_tol: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            rel_tol: 5e-2,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> NetResult<()> {
        if self.max_iterations == 0 {
            return Err(NetError::InvalidArg {
                what: "max_iterations must be positive",
            });
        }
        if !self.rel_tol.is_finite() || self.rel_tol < 0.0 {
            return Err(NetError::InvalidArg {
                what: "rel_tol must be finite and non-negative",
            });
        }
        Ok(())
    }
}

/// Outcome of one solver call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EquilibriumReport {
    /// Iterations actually run.
    pub iterations: usize,
    /// False when the iteration cap was hit first.
    pub converged: bool,
    /// Temperature of the heat-holding phase before the call (K).
    pub initial_temperature: f64,
    /// Common temperature after the call (K).
    pub final_temperature: f64,
    /// Relative temperature change of each iteration.
    pub deltas: Vec<f64>,
    /// Moles moved from gas to liquid over the whole call.
    pub condensed_moles: f64,
}

/// Damped fixed-point phase equilibrium solver.
#[derive(Clone, Debug, Default)]
pub struct EquilibriumSolver {
    config: SolverConfig,
}

impl EquilibriumSolver {
    pub fn new(config: SolverConfig) -> NetResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Damping weight for iteration `k`: 1, 0.9, 0.8, ... for ten iterations.
    #[inline]
    pub fn alpha(&self, k: usize) -> f64 {
        1.0 - k as f64 / self.config.max_iterations as f64
    }

    /// Equilibrate a network in place and refresh its gas volume.
    pub fn equilibrate(
        &self,
        volume: &mut NetworkVolume,
        catalog: &SpeciesCatalog,
    ) -> NetResult<EquilibriumReport> {
        let network = volume.id();
        let (mixture, solution) = volume.phases_mut();
        let report = self.equilibrate_phases(mixture, solution, catalog)?;
        volume.refresh_gas_volume(catalog)?;

        debug!(
            %network,
            iterations = report.iterations,
            converged = report.converged,
            temperature = report.final_temperature,
            condensed = report.condensed_moles,
            "equilibrated network"
        );
        Ok(report)
    }

    /// Core loop on a bare gas/liquid pair. Gas volume is left to the caller.
    pub fn equilibrate_phases(
        &self,
        mixture: &mut Mixture,
        solution: &mut Solution,
        catalog: &SpeciesCatalog,
    ) -> NetResult<EquilibriumReport> {
        let initial = reference_temperature(mixture, solution, catalog);
        let mut report = EquilibriumReport {
            initial_temperature: initial,
            final_temperature: initial,
            ..Default::default()
        };

        for k in 0..self.config.max_iterations {
            let alpha = self.alpha(k);
            let t_prev = reference_temperature(mixture, solution, catalog);
            report.iterations = k + 1;

            let h_gas = mixture.heat_capacity(catalog);
            let h_liquid = solution.heat_capacity(catalog);
            let h = h_gas + h_liquid;
            // Nothing holds heat: the temperature stays put but transfers still happen.
            let (q, t_mix) = if h > 0.0 {
                let q = h_gas * mixture.temperature() + h_liquid * solution.temperature();
                (q, q / h)
            } else {
                (0.0, t_prev)
            };
            mixture.set_temperature(t_mix)?;
            solution.set_temperature(t_mix)?;

            for (species, props) in catalog.iter() {
                if !props.condensable || t_mix >= props.boiling_point {
                    continue;
                }
                let moles = mixture.moles(species);
                if moles <= 0.0 {
                    continue;
                }
                let moved = mixture.remove_moles(species, moles * alpha)?;
                solution.add_mass(species, moved * props.molar_mass)?;
                report.condensed_moles += moved;
            }

            let h_after = mixture.heat_capacity(catalog) + solution.heat_capacity(catalog);
            let t_new = if h > 0.0 && h_after > 0.0 {
                q / h_after
            } else {
                t_mix
            };
            mixture.set_temperature(t_new)?;
            solution.set_temperature(t_new)?;

            let delta = relative_change(t_prev, t_new);
            report.deltas.push(delta);
            trace!(k, alpha, t_mix, t_new, delta, "equilibrium iteration");

            if delta < self.config.rel_tol {
                report.converged = true;
                break;
            }
        }

        report.final_temperature = mixture.temperature();
        if !report.converged {
            debug!(
                iterations = report.iterations,
                temperature = report.final_temperature,
                "equilibrium not converged; keeping best effort"
            );
        }
        Ok(report)
    }
}

/// Temperature of whichever phase holds heat; the gas wins when both do.
fn reference_temperature(mixture: &Mixture, solution: &Solution, catalog: &SpeciesCatalog) -> f64 {
    if mixture.heat_capacity(catalog) <= 0.0 && solution.heat_capacity(catalog) > 0.0 {
        solution.temperature()
    } else {
        mixture.temperature()
    }
}
