// Read-model rows for the query/report layer

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopParticipantRow {
    pub player: String,
    pub transfer_count: i64,
    pub unique_partners: i64,
    pub total_quantity: i64,
}

/// Repeated (from_ip, to_ip) route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpRouteRow {
    pub from_ip: String,
    pub to_ip: String,
    pub transfer_count: i64,
    pub total_quantity: i64,
}

/// Destination receiving cross-IP transfers from several distinct source
/// addresses - the alt-account funneling signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpFunnelRow {
    pub to_player: String,
    pub distinct_source_ips: i64,
    pub transfer_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpCorrelationReport {
    pub routes: Vec<IpRouteRow>,
    pub funnels: Vec<IpFunnelRow>,
}
