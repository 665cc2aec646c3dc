use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::Shelter;
use crate::services::proximity_service::ProximityHandle;

pub const STATS_TICK: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Critical,
    Warning,
    Info,
}

impl AlertLevel {
    pub fn color(&self) -> &'static str {
        match self {
            AlertLevel::Critical => "#dc3545",
            AlertLevel::Warning => "#ffc107",
            AlertLevel::Info => "#28a745",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub icon: &'static str,
    pub title: &'static str,
    pub message: &'static str,
    pub time: &'static str,
    pub color: &'static str,
}

fn alert(
    level: AlertLevel,
    icon: &'static str,
    title: &'static str,
    message: &'static str,
    time: &'static str,
) -> Alert {
    Alert {
        level,
        icon,
        title,
        message,
        time,
        color: level.color(),
    }
}

/// The alerts tab.
pub fn recent_alerts() -> Vec<Alert> {
    vec![
        alert(
            AlertLevel::Critical,
            "fas fa-exclamation-triangle",
            "Low Food Supply",
            "North District Shelter running low on food supplies",
            "5 minutes ago",
        ),
        alert(
            AlertLevel::Warning,
            "fas fa-tint",
            "Water Level Alert",
            "South Community Center water level below 50%",
            "15 minutes ago",
        ),
        alert(
            AlertLevel::Info,
            "fas fa-check-circle",
            "Supply Restocked",
            "Central Relief Shelter food supplies replenished",
            "1 hour ago",
        ),
    ]
}

/// Banner shown on the overview.
pub fn critical_alerts() -> Vec<Alert> {
    vec![
        alert(
            AlertLevel::Critical,
            "fas fa-exclamation-triangle",
            "URGENT: North District Shelter",
            "Food supplies critically low at 25%. Immediate restock required.",
            "Just now",
        ),
        alert(
            AlertLevel::Warning,
            "fas fa-tint",
            "Water Level Warning",
            "South Community Center water level below 50%. Schedule refill within 24 hours.",
            "15 minutes ago",
        ),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_shelters: usize,
    pub food_stocks: f64,
    pub water_stocks: f64,
    pub total_occupants: u64,
}

impl DashboardStats {
    pub fn from_shelters(shelters: &[Shelter]) -> Self {
        let avg = |f: fn(&Shelter) -> u8| {
            if shelters.is_empty() {
                0.0
            } else {
                shelters.iter().map(|s| f64::from(f(s))).sum::<f64>() / shelters.len() as f64
            }
        };
        Self {
            total_shelters: shelters.len(),
            food_stocks: avg(|s| s.food_level).round(),
            water_stocks: avg(|s| s.water_level).round(),
            total_occupants: shelters.iter().map(|s| u64::from(s.occupancy)).sum(),
        }
    }

    /// Small random drift: food ±1, water ±0.5 (both clamped to 0..=100),
    /// occupants -5..=4.
    pub fn perturb<R: Rng>(&mut self, rng: &mut R) {
        self.food_stocks = (self.food_stocks + (rng.gen::<f64>() - 0.5) * 2.0).clamp(0.0, 100.0);
        self.water_stocks = (self.water_stocks + (rng.gen::<f64>() - 0.5)).clamp(0.0, 100.0);
        let delta = ((rng.gen::<f64>() - 0.5) * 10.0).floor() as i64;
        self.total_occupants = self.total_occupants.saturating_add_signed(delta);
    }
}

pub type SharedStats = Arc<RwLock<DashboardStats>>;

/// Drifts the stats every `STATS_TICK` and keeps the shelter count in step
/// with registrations.
pub fn spawn_stats_ticker(stats: SharedStats, proximity: ProximityHandle) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(STATS_TICK);
        interval.tick().await;
        loop {
            interval.tick().await;
            let total = proximity.shelter_count().await;
            let mut current = stats.write().await;
            current.perturb(&mut rand::thread_rng());
            current.total_shelters = total;
            debug!("📊 Stats tick: {:?}", *current);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::seed_shelters;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn stats_start_from_the_shelter_list() {
        let stats = DashboardStats::from_shelters(&seed_shelters());
        assert_eq!(stats.total_shelters, 4);
        assert_eq!(stats.total_occupants, 500);
        assert_eq!(stats.food_stocks, 64.0);
        assert_eq!(stats.water_stocks, 76.0);
    }

    #[test]
    fn perturbation_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut stats = DashboardStats {
            total_shelters: 1,
            food_stocks: 99.8,
            water_stocks: 0.2,
            total_occupants: 2,
        };
        for _ in 0..500 {
            let before = stats;
            stats.perturb(&mut rng);
            assert!((0.0..=100.0).contains(&stats.food_stocks));
            assert!((0.0..=100.0).contains(&stats.water_stocks));
            assert!((stats.food_stocks - before.food_stocks).abs() <= 1.0);
            assert!((stats.water_stocks - before.water_stocks).abs() <= 0.5);
            assert!(stats.total_occupants as i64 - before.total_occupants as i64 >= -5);
            assert!(stats.total_occupants as i64 - before.total_occupants as i64 <= 4);
        }
    }

    #[test]
    fn alert_lists_match_the_dashboard() {
        assert_eq!(recent_alerts().len(), 3);
        assert_eq!(critical_alerts()[0].color, "#dc3545");
        assert_eq!(recent_alerts()[2].level, AlertLevel::Info);
    }
}
