use crate::config::OperatorConfig;
use crate::core::{PeerFact, ServiceLayer};
use crate::domain::model::ServiceSpec;
use std::collections::BTreeMap;

pub const CONFIG_TEMPLATE: &str = "ausf.conf";

/// Variables for the `ausf.conf` template: local settings plus both upstream facts.
pub fn config_bindings(
    config: &OperatorConfig,
    nrf: &PeerFact,
    udm: &PeerFact,
) -> BTreeMap<String, String> {
    let mut bindings = BTreeMap::from([
        ("instance".to_string(), config.ausf.instance.clone()),
        ("pid_directory".to_string(), config.ausf.pid_directory.clone()),
        ("ausf_name".to_string(), config.ausf.name.clone()),
        (
            "sbi_interface_name".to_string(),
            config.sbi.interface_name.clone(),
        ),
        ("sbi_interface_port".to_string(), config.sbi.port.to_string()),
        (
            "sbi_interface_api_version".to_string(),
            config.sbi.api_version.clone(),
        ),
        (
            "sbi_interface_http2_port".to_string(),
            config.sbi.http2_port.to_string(),
        ),
        ("use_fqdn_dns".to_string(), config.use_fqdn_dns()),
        ("use_http2".to_string(), config.use_http2()),
        ("register_nrf".to_string(), config.register_nrf()),
    ]);
    bindings.extend(nrf.to_relation_data(&config.nrf().prefix));
    bindings.extend(udm.to_relation_data(&config.udm().prefix));
    bindings
}

pub fn service_layer(config: &OperatorConfig) -> ServiceLayer {
    let service = &config.workload.service;
    ServiceLayer {
        summary: format!("{} layer", service),
        description: format!("pebble config layer for {}", service),
        services: BTreeMap::from([(
            service.clone(),
            ServiceSpec {
                override_mode: "replace".to_string(),
                summary: service.clone(),
                command: format!("{} -c {} -o", config.workload.binary, config.config_path()),
                startup: "enabled".to_string(),
            },
        )]),
    }
}
