//! Micro-economics calculators behind the pricing, finance and scoring views.

use serde::{Deserialize, Serialize};

/// Marketplace fee withheld from resale proceeds.
pub const RESALE_FEE_RATE: f64 = 0.15;
/// Share of market value a bulk liquidator pays.
pub const BULK_RATE: f64 = 0.40;
/// Marginal tax rate applied to the cost basis of donated stock.
pub const DEFAULT_TAX_RATE: f64 = 0.25;

const VELOCITY_WEIGHT: f64 = 0.4;
const AGING_WEIGHT: f64 = 0.4;
const MARGIN_WEIGHT: f64 = 0.2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElasticityResult {
    pub new_demand: f64,
    pub revenue: f64,
    pub markdown_percent: f64,
    /// Fractional price change, `-0.25` for a 25% markdown.
    pub price_change_pct: f64,
    /// Fractional demand change implied by the coefficient.
    pub demand_change_pct: f64,
}

/// Projects demand and revenue after moving the price from `base_price` to `new_price`.
///
/// A zero base price has no meaningful percentage change and yields an all-zero result.
pub fn calculate_elasticity(
    base_price: f64,
    base_demand: f64,
    new_price: f64,
    elasticity_coef: f64,
) -> ElasticityResult {
    if base_price == 0.0 {
        return ElasticityResult::default();
    }

    let price_change_pct = (new_price - base_price) / base_price;
    let demand_change_pct = price_change_pct * elasticity_coef;
    let new_demand = (base_demand * (1.0 + demand_change_pct)).max(0.0);

    ElasticityResult {
        new_demand,
        revenue: new_price * new_demand,
        markdown_percent: (base_price - new_price).abs() / base_price * 100.0,
        price_change_pct,
        demand_change_pct,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryChannel {
    Resale,
    Donation,
    Bulk,
}

impl RecoveryChannel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Resale => "Resale",
            Self::Donation => "Donation",
            Self::Bulk => "Bulk liquidation",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathOption {
    pub channel: RecoveryChannel,
    pub value: f64,
    pub recommended: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimalPath {
    pub resale: PathOption,
    pub donation: PathOption,
    pub bulk: PathOption,
}

impl OptimalPath {
    pub fn options(&self) -> [PathOption; 3] {
        [self.resale, self.donation, self.bulk]
    }

    /// The strictly dominant option. `None` when the top values tie.
    pub fn best(&self) -> Option<PathOption> {
        self.options().into_iter().find(|option| option.recommended)
    }
}

/// Channel economics used by [`calculate_optimal_path_with`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathRates {
    pub resale_fee_rate: f64,
    pub bulk_rate: f64,
}

impl Default for PathRates {
    fn default() -> Self {
        Self {
            resale_fee_rate: RESALE_FEE_RATE,
            bulk_rate: BULK_RATE,
        }
    }
}

/// Compares resale, donation and bulk recovery for one unit of stock.
pub fn calculate_optimal_path(
    market_value: f64,
    cost_basis: f64,
    shipping_cost: f64,
    tax_rate: f64,
) -> OptimalPath {
    calculate_optimal_path_with(
        &PathRates::default(),
        market_value,
        cost_basis,
        shipping_cost,
        tax_rate,
    )
}

pub fn calculate_optimal_path_with(
    rates: &PathRates,
    market_value: f64,
    cost_basis: f64,
    shipping_cost: f64,
    tax_rate: f64,
) -> OptimalPath {
    let resale = market_value - market_value * rates.resale_fee_rate - shipping_cost;
    let donation = cost_basis * tax_rate;
    let bulk = market_value * rates.bulk_rate;

    // Strict comparison: ties leave every option unflagged.
    OptimalPath {
        resale: PathOption {
            channel: RecoveryChannel::Resale,
            value: resale,
            recommended: resale > donation && resale > bulk,
        },
        donation: PathOption {
            channel: RecoveryChannel::Donation,
            value: donation,
            recommended: donation > resale && donation > bulk,
        },
        bulk: PathOption {
            channel: RecoveryChannel::Bulk,
            value: bulk,
            recommended: bulk > resale && bulk > donation,
        },
    }
}

/// Weighted 0-100 liquidity score.
///
/// Each term is capped individually but the weighted sum is not; negative
/// velocity or margin, or negative days on hand, can push the result outside
/// `[0, 100]`. See [`crate::util::settings::Settings::apply_score_policy`].
pub fn calculate_liquidity_score(velocity: f64, days_on_hand: f64, margin: f64) -> f64 {
    let velocity_term = (velocity * 10.0).min(100.0);
    let aging_term = (100.0 - days_on_hand / 2.5).max(0.0);
    let margin_term = (margin * 200.0).min(100.0);

    let weighted =
        VELOCITY_WEIGHT * velocity_term + AGING_WEIGHT * aging_term + MARGIN_WEIGHT * margin_term;
    round_half_up(weighted)
}

fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn unchanged_price_keeps_demand() {
        let result = calculate_elasticity(100.0, 50.0, 100.0, -2.0);
        assert_eq!(result.demand_change_pct, 0.0);
        assert_eq!(result.new_demand, 50.0);
        assert_eq!(result.revenue, 5000.0);
        assert_eq!(result.markdown_percent, 0.0);
    }

    #[test]
    fn markdown_raises_demand() {
        let result = calculate_elasticity(100.0, 50.0, 75.0, -2.0);
        assert!(close(result.price_change_pct, -0.25));
        assert!(close(result.demand_change_pct, 0.5));
        assert!(close(result.new_demand, 75.0));
        assert!(close(result.revenue, 5625.0));
        assert!(close(result.markdown_percent, 25.0));
    }

    #[test]
    fn demand_is_floored_at_zero() {
        for new_price in [150.0, 300.0, 1_000.0, 10_000.0] {
            let result = calculate_elasticity(100.0, 50.0, new_price, -2.0);
            assert!(result.new_demand >= 0.0, "price {new_price}");
        }
        let result = calculate_elasticity(100.0, 50.0, 200.0, -3.0);
        assert_eq!(result.new_demand, 0.0);
        assert_eq!(result.revenue, 0.0);
    }

    #[test]
    fn zero_base_price_yields_zero_result() {
        assert_eq!(
            calculate_elasticity(0.0, 50.0, 10.0, -2.0),
            ElasticityResult::default()
        );
    }

    #[test]
    fn resale_wins_for_high_value_stock() {
        let path = calculate_optimal_path(1000.0, 400.0, 50.0, DEFAULT_TAX_RATE);
        assert!(close(path.resale.value, 800.0));
        assert!(close(path.donation.value, 100.0));
        assert!(close(path.bulk.value, 400.0));
        assert!(path.resale.recommended);
        assert!(!path.donation.recommended);
        assert!(!path.bulk.recommended);
        assert_eq!(path.best().map(|o| o.channel), Some(RecoveryChannel::Resale));
    }

    #[test]
    fn donation_wins_when_shipping_eats_resale() {
        let path = calculate_optimal_path(100.0, 400.0, 90.0, 0.35);
        assert!(path.donation.recommended);
        assert_eq!(path.best().map(|o| o.channel), Some(RecoveryChannel::Donation));
    }

    #[test]
    fn tie_recommends_nothing() {
        // resale = 100 - 15 - 45 = 40, bulk = 40
        let path = calculate_optimal_path(100.0, 0.0, 45.0, DEFAULT_TAX_RATE);
        assert!(close(path.resale.value, path.bulk.value));
        assert!(path.options().iter().all(|o| !o.recommended));
        assert!(path.best().is_none());
    }

    #[test]
    fn custom_rates_shift_the_bulk_offer() {
        let rates = PathRates {
            resale_fee_rate: 0.15,
            bulk_rate: 0.9,
        };
        let path = calculate_optimal_path_with(&rates, 1000.0, 400.0, 50.0, 0.25);
        assert!(path.bulk.recommended);
    }

    #[test]
    fn liquidity_score_weights() {
        assert_eq!(calculate_liquidity_score(10.0, 0.0, 0.5), 100.0);
        assert_eq!(calculate_liquidity_score(0.0, 250.0, 0.0), 0.0);
        assert_eq!(calculate_liquidity_score(5.0, 50.0, 0.4), 68.0);
        // 0.4*25 + 0.4*0 + 0.2*5 = 11
        assert_eq!(calculate_liquidity_score(2.5, 400.0, 0.025), 11.0);
    }

    #[test]
    fn liquidity_score_rounds_half_up() {
        // 0.4*12.5 + 0 + 0.2*(-12.5) = 2.5
        assert_eq!(calculate_liquidity_score(1.25, 250.0, -0.0625), 3.0);
    }

    #[test]
    fn rounding_matches_half_up_at_the_edges() {
        assert_eq!(round_half_up(0.49999999999999994), 0.0);
        assert_eq!(round_half_up(0.5), 1.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.6), -3.0);
        assert_eq!(round_half_up(99.5), 100.0);
    }

    #[test]
    fn liquidity_score_is_not_clamped() {
        assert!(calculate_liquidity_score(0.0, -500.0, 0.0) > 100.0);
        assert!(calculate_liquidity_score(-20.0, 300.0, -1.0) < 0.0);
    }
}
