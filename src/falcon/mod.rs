//! Falcon API adapter core: per-tenant credentials, token caching, request
//! classification and the typed operation surface.
//!
//! Nothing in this module logs. Errors propagate unmodified to the caller.

mod alerts;
mod client;
mod clock;
mod credentials;
mod detections;
mod host_groups;
mod hosts;
mod incidents;
mod iocs;
mod policies;
mod query;
mod rtr;
mod token;
mod types;
mod vulnerabilities;

pub use alerts::Alert;
pub use client::{create_client, FalconClient, RequestOptions};
pub use clock::{Clock, ManualClock, SystemClock};
pub use credentials::{normalize_base_url, TenantCredentials};
pub use detections::{Detection, DetectionUpdate, DETECTION_STATUSES};
pub use host_groups::{GroupAction, HostGroup, HostGroupUpdate, NewHostGroup, GROUP_TYPES};
pub use hosts::{Host, HostAction, OnlineState};
pub use incidents::{Behavior, CrowdScore, Incident, IncidentStatus};
pub use iocs::{Ioc, IocUpdate, NewIoc, IOC_ACTIONS, IOC_TYPES};
pub use policies::{Policy, PolicyAction, PolicyKind};
pub use query::QueryParams;
pub use rtr::{RtrCommand, RtrCommandResult, RtrSession};
pub use token::AccessToken;
pub use types::{Ack, ActionParameter, Envelope, ErrorEntry, IdPage, Meta, Pagination};
pub use vulnerabilities::Vulnerability;
