//! Mapping of backend machine documents.

use shared::{Machine, MachineStatus, MachineType, RemoteMachine};

use super::to_tokens;

const NEVER_PINGED: &str = "Never";

pub struct MachineMapper;

impl MachineMapper {
    pub fn to_domain(dto: RemoteMachine) -> Machine {
        Machine {
            id: dto.id,
            name: dto.name,
            machine_type: dto
                .machine_type
                .as_deref()
                .map(Self::parse_type)
                .unwrap_or_default(),
            status: dto
                .status
                .as_deref()
                .map(Self::parse_status)
                .unwrap_or_default(),
            price_per_play: to_tokens(dto.cost_per_play),
            revenue_today: dto.revenue_today.map(to_tokens).unwrap_or(0),
            last_ping: dto.last_ping.unwrap_or_else(|| NEVER_PINGED.to_string()),
        }
    }

    pub fn to_domain_list(dtos: Vec<RemoteMachine>) -> Vec<Machine> {
        dtos.into_iter().map(Self::to_domain).collect()
    }

    /// Category labels are free-form on the backend; anything unknown is `Other`
    fn parse_type(label: &str) -> MachineType {
        match label.trim().to_ascii_uppercase().as_str() {
            "ARCADE" => MachineType::Arcade,
            "REDEMPTION" => MachineType::Redemption,
            "PRIZE" => MachineType::Prize,
            "SIMULATOR" => MachineType::Simulator,
            _ => MachineType::Other,
        }
    }

    fn parse_status(label: &str) -> MachineStatus {
        match label.trim().to_ascii_uppercase().as_str() {
            "ONLINE" => MachineStatus::Online,
            "BUSY" => MachineStatus::Busy,
            "MAINTENANCE" => MachineStatus::Maintenance,
            _ => MachineStatus::Offline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_document_maps() {
        let raw = r#"{"id": "M-002", "name": "Mario Kart DX", "status": "BUSY", "type": "Racing",
                      "arcade_id": "ARC_DLH_01", "revenueToday": 2400, "pricePerPlay": 100}"#;
        let dto: RemoteMachine = serde_json::from_str(raw).unwrap();

        let machine = MachineMapper::to_domain(dto);

        assert_eq!(machine.id, "M-002");
        assert_eq!(machine.status, MachineStatus::Busy);
        assert_eq!(machine.machine_type, MachineType::Other);
        assert_eq!(machine.price_per_play, 100);
        assert_eq!(machine.revenue_today, 2400);
        assert_eq!(machine.last_ping, "Never");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let dto: RemoteMachine =
            serde_json::from_str(r#"{"id": "M-9", "name": "Claw", "type": "Prize"}"#).unwrap();

        let machine = MachineMapper::to_domain(dto);

        assert_eq!(machine.machine_type, MachineType::Prize);
        assert_eq!(machine.status, MachineStatus::Offline);
        assert_eq!(machine.revenue_today, 0);
    }
}
