/// Allocation problem type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemMode {
    /// Minimize total weighted impedance; facility load is unconstrained.
    MinimizeTotalImpedance,
    /// Cover as much demand as possible with a hard per-facility capacity.
    MaximizeCapacitatedCoverage,
}

/// Immutable solve options, passed to every solve instead of configuring a solver in place.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOptions {
    pub mode: ProblemMode,
    pub facility_count: usize,
    /// Maximum points per facility (capacitated coverage only).
    pub capacity: Option<usize>,
    /// Demand beyond this impedance (minutes) from every chosen facility is unallocated.
    pub impedance_cutoff: Option<f64>,
    /// Distance units per minute.
    pub travel_speed: f64,
}

impl SolverOptions {
    pub fn new(facility_count: usize, travel_speed: f64) -> Self {
        Self {
            mode: ProblemMode::MinimizeTotalImpedance,
            facility_count,
            capacity: None,
            impedance_cutoff: None,
            travel_speed,
        }
    }

    /// Switch to capacitated coverage with `capacity` points per facility.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.mode = ProblemMode::MaximizeCapacitatedCoverage;
        self.capacity = Some(capacity);
        self
    }

    pub fn with_cutoff(mut self, cutoff: Option<f64>) -> Self {
        self.impedance_cutoff = cutoff;
        self
    }

    pub fn with_facility_count(mut self, facility_count: usize) -> Self {
        self.facility_count = facility_count;
        self
    }
}
