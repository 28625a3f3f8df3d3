use crate::domain::model::Capability;
use crate::utils::error::{OperatorError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorConfig {
    pub unit: UnitConfig,
    pub workload: WorkloadConfig,
    pub ausf: AusfConfig,
    pub sbi: SbiConfig,
    pub relations: RelationsConfig,
    pub templates_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitConfig {
    pub app_name: String,
    pub model_name: String,
    pub leader: bool,
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            app_name: "oai-5g-ausf".to_string(),
            model_name: "default".to_string(),
            leader: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    pub container: String,
    pub service: String,
    pub config_dir: String,
    pub config_file: String,
    pub binary: String,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            container: "ausf".to_string(),
            service: "ausf".to_string(),
            config_dir: "/openair-ausf/etc".to_string(),
            config_file: "ausf.conf".to_string(),
            binary: "/openair-ausf/bin/oai_ausf".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AusfConfig {
    pub instance: String,
    pub pid_directory: String,
    pub name: String,
    pub use_fqdn_dns: bool,
    pub use_http2: bool,
    pub register_nrf: bool,
}

impl Default for AusfConfig {
    fn default() -> Self {
        Self {
            instance: "0".to_string(),
            pid_directory: "/var/run".to_string(),
            name: "OAI_AUSF".to_string(),
            use_fqdn_dns: true,
            use_http2: false,
            register_nrf: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SbiConfig {
    pub interface_name: String,
    pub port: u16,
    pub api_version: String,
    pub http2_port: u16,
}

impl Default for SbiConfig {
    fn default() -> Self {
        Self {
            interface_name: "eth0".to_string(),
            port: 80,
            api_version: "v1".to_string(),
            http2_port: 9090,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationsConfig {
    pub nrf: String,
    pub udm: String,
    pub ausf: String,
}

impl Default for RelationsConfig {
    fn default() -> Self {
        Self {
            nrf: "fiveg-nrf".to_string(),
            udm: "fiveg-udm".to_string(),
            ausf: "fiveg-ausf".to_string(),
        }
    }
}

/// A port the workload should be exposed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServicePort {
    pub name: String,
    pub port: u16,
    pub protocol: String,
    pub target_port: u16,
}

fn yes_no(flag: bool) -> String {
    if flag { "yes" } else { "no" }.to_string()
}

impl OperatorConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(OperatorError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| OperatorError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR}` references with environment values; unknown ones stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| OperatorError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("unit.app_name", &self.unit.app_name)?;
        validation::validate_non_empty_string("unit.model_name", &self.unit.model_name)?;
        validation::validate_domain_name("unit (service fqdn)", &self.service_fqdn())?;

        validation::validate_non_empty_string("workload.container", &self.workload.container)?;
        validation::validate_non_empty_string("workload.service", &self.workload.service)?;
        validation::validate_absolute_path("workload.config_dir", &self.workload.config_dir)?;
        validation::validate_path("workload.config_file", &self.workload.config_file)?;
        validation::validate_absolute_path("workload.config_file", &self.config_path())?;
        validation::validate_absolute_path("workload.binary", &self.workload.binary)?;

        validation::validate_non_empty_string("sbi.interface_name", &self.sbi.interface_name)?;
        validation::validate_non_empty_string("sbi.api_version", &self.sbi.api_version)?;
        validation::validate_range("sbi.port", self.sbi.port, 1, u16::MAX)?;
        validation::validate_range("sbi.http2_port", self.sbi.http2_port, 1, u16::MAX)?;
        if self.sbi.port == self.sbi.http2_port {
            return Err(OperatorError::InvalidConfigValueError {
                field: "sbi.http2_port".to_string(),
                value: self.sbi.http2_port.to_string(),
                reason: "HTTP/2 port must differ from the SBI port".to_string(),
            });
        }

        for (field, name) in [
            ("relations.nrf", &self.relations.nrf),
            ("relations.udm", &self.relations.udm),
            ("relations.ausf", &self.relations.ausf),
        ] {
            validation::validate_non_empty_string(field, name)?;
        }

        if let Some(dir) = &self.templates_dir {
            validation::validate_path("templates_dir", dir)?;
        }

        Ok(())
    }

    /// Cluster-internal DNS name peers use to reach this application.
    pub fn service_fqdn(&self) -> String {
        format!(
            "{}.{}.svc.cluster.local",
            self.unit.app_name, self.unit.model_name
        )
    }

    /// Full path of the rendered configuration inside the workload.
    pub fn config_path(&self) -> String {
        format!(
            "{}/{}",
            self.workload.config_dir.trim_end_matches('/'),
            self.workload.config_file
        )
    }

    pub fn nrf(&self) -> Capability {
        Capability::new("NRF", &self.relations.nrf, "nrf")
    }

    pub fn udm(&self) -> Capability {
        Capability::new("UDM", &self.relations.udm, "udm")
    }

    pub fn ausf_capability(&self) -> Capability {
        Capability::new("AUSF", &self.relations.ausf, "ausf")
    }

    pub fn use_fqdn_dns(&self) -> String {
        yes_no(self.ausf.use_fqdn_dns)
    }

    pub fn use_http2(&self) -> String {
        yes_no(self.ausf.use_http2)
    }

    pub fn register_nrf(&self) -> String {
        yes_no(self.ausf.register_nrf)
    }

    pub fn service_ports(&self) -> Vec<ServicePort> {
        vec![
            ServicePort {
                name: "http1".to_string(),
                port: self.sbi.port,
                protocol: "TCP".to_string(),
                target_port: self.sbi.port,
            },
            ServicePort {
                name: "http2".to_string(),
                port: self.sbi.http2_port,
                protocol: "TCP".to_string(),
                target_port: self.sbi.http2_port,
            },
        ]
    }
}

impl Validate for OperatorConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
