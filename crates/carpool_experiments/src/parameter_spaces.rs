//! Ready-made sweep definitions.
//!
//! Each function returns a [`ParameterSpace`] for one question worth
//! asking of the simulation. Pick one in a driver, or use them as
//! starting points for custom spaces.

use crate::parameters::ParameterSpace;

/// How does fleet size change delivery outcomes under fixed demand?
pub fn fleet_sizing_space() -> ParameterSpace {
    ParameterSpace::grid()
        .car_fleet(vec![(5, 1, 1), (10, 1, 1), (20, 2, 1), (40, 4, 1)])
        .passenger_demand(vec![(60, 2, 1)])
        .replications(3)
}

/// How does a fixed fleet cope with growing demand?
pub fn demand_surge_space() -> ParameterSpace {
    ParameterSpace::grid()
        .car_fleet(vec![(15, 1, 1)])
        .passenger_demand(vec![(20, 1, 1), (40, 2, 1), (80, 4, 1), (120, 4, 1)])
        .replications(3)
}

/// Same totals released at different rhythms: a trickle of single
/// spawns against bursts with long gaps.
pub fn spawn_cadence_space() -> ParameterSpace {
    ParameterSpace::grid()
        .car_fleet(vec![(12, 1, 1), (12, 3, 3), (12, 6, 6), (12, 12, 12)])
        .passenger_demand(vec![(24, 1, 1), (24, 4, 4)])
        .replications(2)
}

/// A single tiny combination for smoke tests.
pub fn minimal_space() -> ParameterSpace {
    ParameterSpace::grid()
        .car_fleet(vec![(2, 1, 1)])
        .passenger_demand(vec![(4, 1, 1)])
}
