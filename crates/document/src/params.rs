//! Path-level and operation-level parameter merging

use indexmap::IndexMap;

use crate::catalog::ParsedEndpoint;
use crate::types::{Parameter, ParameterLocation, RefOr};

/// Parameters an endpoint accepts.
///
/// Path-level parameters come first, keyed by `(in, name)`; operation-level
/// parameters with the same key replace them in place. References are
/// dropped. Order is the first-seen order of each key.
pub fn merge_parameters(endpoint: &ParsedEndpoint) -> Vec<Parameter> {
    merge_parameter_lists(
        &endpoint.path_item.parameters,
        &endpoint.operation.parameters,
    )
}

/// Merge two declaration lists with operation-level entries winning ties
pub fn merge_parameter_lists(
    path_level: &[RefOr<Parameter>],
    operation_level: &[RefOr<Parameter>],
) -> Vec<Parameter> {
    let mut merged: IndexMap<(ParameterLocation, String), Parameter> = IndexMap::new();

    for parameter in path_level
        .iter()
        .chain(operation_level)
        .filter_map(RefOr::as_item)
    {
        merged.insert(
            (parameter.location, parameter.name.clone()),
            parameter.clone(),
        );
    }

    merged.into_values().collect()
}

/// Merged parameters carried in one location
pub fn parameters_in(parameters: &[Parameter], location: ParameterLocation) -> Vec<&Parameter> {
    parameters
        .iter()
        .filter(|parameter| parameter.location == location)
        .collect()
}
