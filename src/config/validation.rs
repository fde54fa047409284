//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::{Config, DeviceKind, StoreBackend};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("exactly one of [device] or [service] must be configured")]
    NoController,
    #[error("[device] and [service] are mutually exclusive")]
    DeviceAndService,
    #[error("device.{0} is required for the hue driver")]
    HueUrlMissing(&'static str),
    #[error("store.path parent directory does not exist: {0}")]
    StorePathInvalid(String),
    #[error("service resource declared twice: {0}")]
    DuplicateResource(String),
    #[error("service action declared twice: {0}")]
    DuplicateAction(String),
    #[error("service action '{action}' references unknown resource '{resource}'")]
    UnknownResource { action: String, resource: String },
    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.name.trim().is_empty() {
        errors.push(ValidationError::MissingServerName);
    }

    match (&config.device, &config.service) {
        (None, None) => errors.push(ValidationError::NoController),
        (Some(_), Some(_)) => errors.push(ValidationError::DeviceAndService),
        _ => {}
    }

    if let Some(device) = &config.device {
        if device.kind == DeviceKind::Hue {
            if device.status_url.is_none() {
                errors.push(ValidationError::HueUrlMissing("status_url"));
            }
            if device.action_url.is_none() {
                errors.push(ValidationError::HueUrlMissing("action_url"));
            }
        }
        if device.timeout_ms == 0 {
            errors.push(ValidationError::ZeroTimeout("device.timeout_ms"));
        }
    }

    if let Some(service) = &config.service {
        let mut names = HashSet::new();
        for resource in &service.resources {
            if !names.insert(resource.name.as_str()) {
                errors.push(ValidationError::DuplicateResource(resource.name.clone()));
            }
        }
        let mut actions = HashSet::new();
        for action in &service.actions {
            if !actions.insert(action.name.as_str()) {
                errors.push(ValidationError::DuplicateAction(action.name.clone()));
            }
            if service.resource(&action.resource).is_none() {
                errors.push(ValidationError::UnknownResource {
                    action: action.name.clone(),
                    resource: action.resource.clone(),
                });
            }
        }
    }

    if config.store.backend == StoreBackend::Redb {
        let path = Path::new(&config.store.path);
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            errors.push(ValidationError::StorePathInvalid(config.store.path.clone()));
        }
    }

    if config.delegation.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("delegation.timeout_ms"));
    }
    if config.delegation.work_timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("delegation.work_timeout_ms"));
    }
    if config.telemetry.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("telemetry.timeout_ms"));
    }
    if config.catalog.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("catalog.timeout_ms"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
