//! Energy conservation measures (ECMs) and the stock data read for each of them.
use crate::id::define_id_type;
use crate::state::{BuildingTypeID, StateID};
use crate::year::YearSeries;
use anyhow::{Context, Result};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

define_id_type! {EcmID}

/// A map of [`Ecm`]s, keyed by ECM ID, in the order they appear in the results file
pub type EcmMap = IndexMap<EcmID, Ecm>;

/// Stock of equipment for a state, building type and heating fuel
pub type StateStockMap = IndexMap<(StateID, BuildingTypeID, FuelType), YearSeries>;

/// The heating fuel under which an ECM's equipment stock is counted.
///
/// The `Display` and `FromStr` representations match the fuel keys in the results file. The
/// analysis configuration file uses the snake case names (`electric`, `natural_gas`).
#[derive(
    PartialEq,
    Eq,
    Hash,
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    /// Electric heating equipment (e.g. heat pumps)
    #[default]
    #[strum(serialize = "Electric")]
    Electric,
    /// Natural gas heating equipment (e.g. furnaces)
    #[strum(serialize = "Natural Gas")]
    NaturalGas,
}

/// An ECM along with the stock figures needed for the analysis
#[derive(PartialEq, Debug)]
pub struct Ecm {
    /// The name of the ECM (e.g. "(R) ESTAR HP FS (NG Furnace)")
    pub id: EcmID,
    /// The fuel field from which state-level stock is taken
    pub fuel_type: FuelType,
    /// National measure stock (competed), by year
    pub competed_stock: YearSeries,
    /// National baseline stock (uncompeted), by year
    pub baseline_stock: YearSeries,
    /// The states for which by-category data is present, in file order
    pub states: IndexSet<StateID>,
    /// Measure stock by state, building type and fuel
    pub state_stock: StateStockMap,
}

/// The contents of a results file used by the analysis
#[derive(PartialEq, Debug)]
pub struct ResultsDocument {
    /// All ECMs in the results file apart from excluded ones
    pub ecms: EcmMap,
    /// The states covered by the results, in file order
    pub states: IndexSet<StateID>,
}

impl Ecm {
    /// Get the stock series for a state and building type, taken from this ECM's fuel field
    pub fn stock_for(
        &self,
        state_id: &StateID,
        building_type: &BuildingTypeID,
    ) -> Result<&YearSeries> {
        self.state_stock
            .get(&(state_id.clone(), building_type.clone(), self.fuel_type))
            .with_context(|| {
                format!(
                    "No {} stock for ECM {}, state {state_id}, building type {building_type}",
                    self.fuel_type, self.id
                )
            })
    }
}
