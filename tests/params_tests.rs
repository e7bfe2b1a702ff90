#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use evodash::simulation::params::{Params, ParamsError};
use std::fs;

#[test]
fn test_default_params_are_valid() {
    assert!(Params::default().validate().is_ok());
}

#[test]
fn test_validate_rejects_zero_population() {
    let params = Params {
        population_size: 0,
        ..Params::default()
    };
    assert!(matches!(params.validate(), Err(ParamsError::Invalid(_))));
}

#[test]
fn test_validate_rejects_non_positive_speeds_and_sizes() {
    let params = Params {
        forward_speed: 0.0,
        ..Params::default()
    };
    assert!(params.validate().is_err());

    let params = Params {
        agent_size: -1.0,
        ..Params::default()
    };
    assert!(params.validate().is_err());
}

#[test]
fn test_validate_rejects_mismatched_network_shape() {
    let params = Params {
        layer_sizes: vec![5, 8, 1],
        ..Params::default()
    };
    assert!(params.validate().is_err());

    let params = Params {
        layer_sizes: vec![3, 8, 2],
        ..Params::default()
    };
    assert!(params.validate().is_err());

    let params = Params {
        layer_sizes: vec![3],
        ..Params::default()
    };
    assert!(params.validate().is_err());
}

#[test]
fn test_validate_rejects_bad_breeding_settings() {
    let params = Params {
        parent_fraction: 0.0,
        ..Params::default()
    };
    assert!(params.validate().is_err());

    let params = Params {
        crossover_prob: 1.5,
        ..Params::default()
    };
    assert!(params.validate().is_err());

    let params = Params {
        population_size: 5,
        elite_count: 10,
        ..Params::default()
    };
    assert!(params.validate().is_err());
}

#[test]
fn test_params_save_and_load_roundtrip() {
    let params = Params {
        gravity: 1.25,
        population_size: 17,
        ..Params::default()
    };

    let save_path = "test_params_roundtrip.json";
    params.save_to_file(save_path).expect("Failed to save params");
    let loaded = Params::load_from_file(save_path).expect("Failed to load params");

    assert_eq!(loaded.gravity, 1.25);
    assert_eq!(loaded.population_size, 17);
    assert_eq!(loaded.layer_sizes, params.layer_sizes);

    fs::remove_file(save_path).ok();
}

#[test]
fn test_load_rejects_invalid_values() {
    let params = Params {
        population_size: 0,
        ..Params::default()
    };

    // Saving does not validate, loading does
    let save_path = "test_params_invalid.json";
    params.save_to_file(save_path).expect("Failed to save params");
    let result = Params::load_from_file(save_path);
    assert!(matches!(result, Err(ParamsError::Invalid(_))));

    fs::remove_file(save_path).ok();
}

#[test]
fn test_load_rejects_malformed_json() {
    let save_path = "test_params_malformed.json";
    fs::write(save_path, "{ not json }").expect("Failed to write file");

    let result = Params::load_from_file(save_path);
    assert!(matches!(result, Err(ParamsError::Json(_))));

    fs::remove_file(save_path).ok();
}

#[test]
fn test_load_missing_file_errors() {
    let result = Params::load_from_file("no_such_params.json");
    assert!(matches!(result, Err(ParamsError::Io(_))));
}
