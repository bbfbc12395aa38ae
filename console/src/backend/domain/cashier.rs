//! Point-of-sale catalog used by the cashier console: recharge packs with
//! bonus credits and the prize counter.

/// A recharge pack sold at the counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RechargePack {
    /// Price paid by the customer
    pub price: i64,
    /// Tokens bought
    pub credits: i64,
    /// Free tokens on top
    pub bonus: i64,
}

impl RechargePack {
    pub const fn new(price: i64, credits: i64, bonus: i64) -> Self {
        Self { price, credits, bonus }
    }

    /// Tokens that land on the card
    pub fn total_credits(&self) -> i64 {
        self.credits + self.bonus
    }
}

/// Standard packs, cheapest first
pub const RECHARGE_PACKS: [RechargePack; 4] = [
    RechargePack::new(100, 100, 0),
    RechargePack::new(200, 200, 20),
    RechargePack::new(500, 500, 100),
    RechargePack::new(1000, 1000, 300),
];

/// A prize redeemable for tickets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prize {
    pub name: &'static str,
    /// Ticket cost
    pub cost: i64,
}

pub const PRIZES: [Prize; 5] = [
    Prize { name: "Candy Bar", cost: 50 },
    Prize { name: "Key Chain", cost: 150 },
    Prize { name: "Plush Toy", cost: 500 },
    Prize { name: "Headphones", cost: 2500 },
    Prize { name: "Console", cost: 50000 },
];

/// Prizes a card with `tickets` can afford right now
pub fn affordable_prizes(tickets: i64) -> impl Iterator<Item = &'static Prize> {
    PRIZES.iter().filter(move |prize| prize.cost <= tickets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_bonus_is_added() {
        assert_eq!(RECHARGE_PACKS[0].total_credits(), 100);
        assert_eq!(RECHARGE_PACKS[1].total_credits(), 220);
        assert_eq!(RECHARGE_PACKS[3].total_credits(), 1300);
    }

    #[test]
    fn test_affordable_prizes() {
        let names: Vec<_> = affordable_prizes(500).map(|p| p.name).collect();
        assert_eq!(names, vec!["Candy Bar", "Key Chain", "Plush Toy"]);
        assert_eq!(affordable_prizes(10).count(), 0);
    }
}
