use crate::errors::ToolError;
use crate::managers;
use crate::mcp::catalog::tool_catalog;
use crate::services::logger::Logger;
use crate::services::tool_executor::{ToolExecutor, ToolHandler};
use crate::services::validation::Validation;
use std::collections::HashMap;
use std::sync::Arc;

/// Process-wide wiring. Holds no tenant state; every tool call binds its own
/// Falcon client from the credentials that arrive with it.
pub struct App {
    pub logger: Logger,
    pub tool_executor: Arc<ToolExecutor>,
}

impl App {
    fn validate_tool_wiring(
        handlers: &HashMap<String, Arc<dyn ToolHandler>>,
    ) -> Result<(), ToolError> {
        let mut missing: Vec<String> = tool_catalog()
            .iter()
            .filter(|tool| !handlers.contains_key(&tool.name))
            .map(|tool| tool.name.clone())
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        missing.sort();
        Err(ToolError::internal("Tool wiring is incomplete")
            .with_hint("Every tool in tool_catalog.json must have a registered handler.")
            .with_details(serde_json::json!({ "missing_tools": missing })))
    }

    pub fn initialize() -> Result<Self, ToolError> {
        let logger = Logger::new("falcon-mcp");
        let validation = Validation::new();

        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        handlers.insert(
            "falcon_hosts".to_string(),
            Arc::new(managers::hosts::HostsManager::new(
                logger.clone(),
                validation.clone(),
            )),
        );
        handlers.insert(
            "falcon_detections".to_string(),
            Arc::new(managers::detections::DetectionsManager::new(
                logger.clone(),
                validation.clone(),
            )),
        );
        handlers.insert(
            "falcon_incidents".to_string(),
            Arc::new(managers::incidents::IncidentsManager::new(
                logger.clone(),
                validation.clone(),
            )),
        );
        handlers.insert(
            "falcon_alerts".to_string(),
            Arc::new(managers::alerts::AlertsManager::new(
                logger.clone(),
                validation.clone(),
            )),
        );
        handlers.insert(
            "falcon_iocs".to_string(),
            Arc::new(managers::iocs::IocsManager::new(
                logger.clone(),
                validation.clone(),
            )),
        );
        handlers.insert(
            "falcon_vulnerabilities".to_string(),
            Arc::new(managers::vulnerabilities::VulnerabilitiesManager::new(
                logger.clone(),
                validation.clone(),
            )),
        );
        handlers.insert(
            "falcon_host_groups".to_string(),
            Arc::new(managers::host_groups::HostGroupsManager::new(
                logger.clone(),
                validation.clone(),
            )),
        );
        handlers.insert(
            "falcon_policies".to_string(),
            Arc::new(managers::policies::PoliciesManager::new(
                logger.clone(),
                validation.clone(),
            )),
        );
        handlers.insert(
            "falcon_rtr".to_string(),
            Arc::new(managers::rtr::RtrManager::new(
                logger.clone(),
                validation,
            )),
        );

        Self::validate_tool_wiring(&handlers)?;
        let tool_executor = Arc::new(ToolExecutor::new(logger.clone(), handlers));
        Ok(Self {
            logger,
            tool_executor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_tool_has_a_handler() {
        let app = App::initialize().expect("wiring must be complete");
        for tool in tool_catalog() {
            assert!(app.tool_executor.has_tool(&tool.name), "{}", tool.name);
        }
    }

    #[test]
    fn wiring_check_reports_missing_tools() {
        let err = match App::validate_tool_wiring(&HashMap::new()) {
            Err(err) => err,
            Ok(()) => panic!("empty handler map must fail"),
        };
        assert_eq!(err.code, "INTERNAL");
        let missing = err.details.unwrap()["missing_tools"].as_array().unwrap().len();
        assert_eq!(missing, 9);
    }
}
