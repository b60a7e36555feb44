//! U.S. states and building types, the categories by which stock is disaggregated.
use crate::id::define_id_type;

define_id_type! {StateID}
define_id_type! {BuildingTypeID}
