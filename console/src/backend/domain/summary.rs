//! Aggregate figures for the status overview.

use shared::{Card, LogEntry, LogLevel, Machine, MachineStatus, Transaction};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSummary {
    pub total_cards: usize,
    pub active_cards: usize,
    pub blocked_cards: usize,
    /// Tokens held across all cards
    pub total_balance: i64,
    pub total_tickets: i64,
    pub machines_total: usize,
    pub machines_online: usize,
    pub machines_in_maintenance: usize,
    pub revenue_today: i64,
    pub transactions: usize,
    pub error_logs: usize,
}

impl StatusSummary {
    pub fn compute(
        inventory: &[Card],
        machines: &[Machine],
        transactions: &[Transaction],
        logs: &[LogEntry],
    ) -> Self {
        let active_cards = inventory.iter().filter(|c| c.is_active()).count();

        Self {
            total_cards: inventory.len(),
            active_cards,
            blocked_cards: inventory.len() - active_cards,
            total_balance: inventory.iter().map(|c| c.balance).sum(),
            total_tickets: inventory.iter().map(|c| c.tickets).sum(),
            machines_total: machines.len(),
            machines_online: machines
                .iter()
                .filter(|m| matches!(m.status, MachineStatus::Online | MachineStatus::Busy))
                .count(),
            machines_in_maintenance: machines
                .iter()
                .filter(|m| m.status == MachineStatus::Maintenance)
                .count(),
            revenue_today: machines.iter().map(|m| m.revenue_today).sum(),
            transactions: transactions.len(),
            error_logs: logs.iter().filter(|l| l.level == LogLevel::Error).count(),
        }
    }
}

impl fmt::Display for StatusSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cards ({} active, {} blocked, {} tokens), {}/{} machines up, revenue {}, {} transactions, {} errors logged",
            self.total_cards,
            self.active_cards,
            self.blocked_cards,
            self.total_balance,
            self.machines_online,
            self.machines_total,
            self.revenue_today,
            self.transactions,
            self.error_logs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{CardStatus, MachineType};

    fn machine(id: &str, status: MachineStatus, revenue: i64) -> Machine {
        Machine {
            id: id.to_string(),
            name: id.to_string(),
            machine_type: MachineType::Arcade,
            status,
            price_per_play: 50,
            revenue_today: revenue,
            last_ping: "Never".to_string(),
        }
    }

    #[test]
    fn test_compute() {
        let mut blocked = Card::new("C-2", "Ben");
        blocked.status = CardStatus::Blocked;
        blocked.balance = 40;
        let mut active = Card::new("C-1", "Ann");
        active.balance = 60;
        active.tickets = 7;

        let machines = vec![
            machine("M-1", MachineStatus::Online, 100),
            machine("M-2", MachineStatus::Busy, 200),
            machine("M-3", MachineStatus::Maintenance, 0),
        ];

        let summary = StatusSummary::compute(&[active, blocked], &machines, &[], &[]);

        assert_eq!(summary.total_cards, 2);
        assert_eq!(summary.active_cards, 1);
        assert_eq!(summary.blocked_cards, 1);
        assert_eq!(summary.total_balance, 100);
        assert_eq!(summary.total_tickets, 7);
        assert_eq!(summary.machines_online, 2);
        assert_eq!(summary.machines_in_maintenance, 1);
        assert_eq!(summary.revenue_today, 300);
    }
}
