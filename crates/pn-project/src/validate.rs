//! Scenario validation.

use std::collections::HashSet;
use std::str::FromStr;

use pn_chem::{PropsOverride, Species, SpeciesCatalog};
use pn_net::SolverConfig;

use crate::schema::{EventActionDef, NetworkDef, PropsOverrideDef, Scenario, SegmentDef, SolverDef};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Unknown species '{name}' in {context}")]
    UnknownSpecies { name: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: impl Into<String>, value: impl ToString, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version == 0 || scenario.version > crate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }
    if scenario.ticks == 0 {
        return Err(invalid("ticks", scenario.ticks, "must be at least 1"));
    }

    solver_config(&scenario.solver)?;
    catalog_overrides(scenario)?;

    let mut declared: HashSet<u32> = HashSet::new();
    for (idx, network) in scenario.networks.iter().enumerate() {
        validate_network(network, idx)?;
        for segment in &network.segments {
            if !declared.insert(segment.id) {
                return Err(ValidationError::DuplicateId {
                    id: segment.id.to_string(),
                    context: format!("networks[{idx}] segments"),
                });
            }
        }
    }

    for event in &scenario.events {
        if event.tick >= scenario.ticks {
            return Err(invalid(
                "events.tick",
                event.tick,
                format!("scenario only runs {} ticks", scenario.ticks),
            ));
        }
        validate_action(&event.action, event.tick)?;

        let creates = matches!(event.action, EventActionDef::Create { .. });
        for segment in event.action.declared_segments() {
            check_capacity(segment, "events segment capacity_l")?;
            // A segment that moved away may join another network later.
            if !declared.insert(segment.id) && creates {
                return Err(ValidationError::DuplicateId {
                    id: segment.id.to_string(),
                    context: format!("create event at tick {}", event.tick),
                });
            }
        }
    }

    for event in &scenario.events {
        for id in event.action.referenced_segments() {
            if !declared.contains(&id) {
                return Err(ValidationError::MissingReference {
                    id: id.to_string(),
                    context: format!("event at tick {}", event.tick),
                });
            }
        }
    }

    Ok(())
}

fn validate_network(network: &NetworkDef, idx: usize) -> Result<(), ValidationError> {
    if network.segments.is_empty() {
        return Err(invalid(
            format!("networks[{idx}].segments"),
            "[]",
            "a network needs at least one segment",
        ));
    }
    for segment in &network.segments {
        check_capacity(segment, "networks segment capacity_l")?;
    }
    if !(network.temperature_k.is_finite() && network.temperature_k > 0.0) {
        return Err(invalid(
            format!("networks[{idx}].temperature_k"),
            network.temperature_k,
            "must be finite and positive",
        ));
    }
    let context = format!("networks[{idx}]");
    for (name, &amount) in network.gas.iter().chain(network.liquid.iter()) {
        parse_species(name, &context)?;
        if !(amount.is_finite() && amount >= 0.0) {
            return Err(invalid(
                format!("{context}.{name}"),
                amount,
                "quantities must be finite and non-negative",
            ));
        }
    }
    Ok(())
}

fn validate_action(action: &EventActionDef, tick: u32) -> Result<(), ValidationError> {
    match action {
        EventActionDef::Create { segments, .. } if segments.is_empty() => Err(invalid(
            format!("events[tick {tick}].segments"),
            "[]",
            "a network needs at least one segment",
        )),
        EventActionDef::Leave { capacity_l, .. } if !(capacity_l.is_finite() && *capacity_l > 0.0) => {
            Err(invalid(
                format!("events[tick {tick}].capacity_l"),
                capacity_l,
                "must be finite and positive",
            ))
        }
        EventActionDef::Split { groups, .. } => {
            if groups.len() < 2 || groups.iter().any(Vec::is_empty) {
                return Err(invalid(
                    format!("events[tick {tick}].groups"),
                    groups.len(),
                    "a split needs at least two non-empty groups",
                ));
            }
            let mut seen = HashSet::new();
            for &id in groups.iter().flatten() {
                if !seen.insert(id) {
                    return Err(ValidationError::DuplicateId {
                        id: id.to_string(),
                        context: format!("split groups at tick {tick}"),
                    });
                }
            }
            Ok(())
        }
        EventActionDef::Merge { networks_of } if networks_of.len() < 2 => Err(invalid(
            format!("events[tick {tick}].networks_of"),
            networks_of.len(),
            "a merge needs at least two networks",
        )),
        _ => Ok(()),
    }
}

fn check_capacity(segment: &SegmentDef, field: &str) -> Result<(), ValidationError> {
    if segment.capacity_l.is_finite() && segment.capacity_l > 0.0 {
        Ok(())
    } else {
        Err(invalid(
            format!("{field} (segment {})", segment.id),
            segment.capacity_l,
            "must be finite and positive",
        ))
    }
}

pub(crate) fn parse_species(name: &str, context: &str) -> Result<Species, ValidationError> {
    Species::from_str(name).map_err(|_| ValidationError::UnknownSpecies {
        name: name.to_string(),
        context: context.to_string(),
    })
}

/// Solver settings with defaults filled in.
pub fn solver_config(def: &SolverDef) -> Result<SolverConfig, ValidationError> {
    let defaults = SolverConfig::default();
    let config = SolverConfig {
        max_iterations: def.max_iterations.unwrap_or(defaults.max_iterations),
        rel_tol: def.rel_tol.unwrap_or(defaults.rel_tol),
    };
    config
        .validate()
        .map_err(|e| invalid("solver", format!("{config:?}"), e.to_string()))?;
    Ok(config)
}

/// Parsed catalog overrides, checked against the builtin catalog.
pub fn catalog_overrides(
    scenario: &Scenario,
) -> Result<Vec<(Species, PropsOverride)>, ValidationError> {
    let overrides = scenario
        .catalog
        .iter()
        .map(|(name, def)| Ok((parse_species(name, "catalog")?, props_override(def))))
        .collect::<Result<Vec<_>, ValidationError>>()?;
    SpeciesCatalog::builtin()
        .rebuilt(&overrides)
        .map_err(|e| invalid("catalog", scenario.catalog.len(), e.to_string()))?;
    Ok(overrides)
}

fn props_override(def: &PropsOverrideDef) -> PropsOverride {
    PropsOverride {
        molar_mass: def.molar_mass,
        heat_capacity_per_mole: def.heat_capacity_per_mole,
        boiling_point: def.boiling_point_k,
        liquid_density: def.liquid_density,
        liquid_heat_capacity: def.liquid_heat_capacity,
        condensable: def.condensable,
    }
}
