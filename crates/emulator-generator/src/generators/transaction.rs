//! Financial transaction generator with embedded fraud heuristics.
//!
//! Every call rolls a base transaction and then evaluates five fraud rules in a
//! fixed priority order. The first rule that fires rewrites part of the
//! transaction and marks it fraudulent; later rules are not evaluated. A final
//! dampening draw keeps the fraud flag with probability [`FRAUD_KEEP_PROBABILITY`].

use super::round_cents;
use crate::generator::RecordGenerator;
use crate::record::SyntheticRecord;
use chrono::Utc;
use fake::faker::address::en::CountryCode;
use fake::faker::company::en::CompanyName;
use fake::Fake;
use rand::rngs::StdRng;
use rand::seq::{index, IndexedRandom};
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::fmt;
use std::sync::Mutex;
use tracing::trace;

/// Lowest user id that can be generated (inclusive).
pub const USER_ID_MIN: i64 = 1000;
/// Highest user id that can be generated (inclusive).
pub const USER_ID_MAX: i64 = 9999;
/// Number of compromised identities sampled at construction.
pub const COMPROMISED_USER_COUNT: usize = 50;
/// Merchants considered high risk by the fraud rules.
pub const HIGH_RISK_MERCHANTS: [&str; 3] = ["QuickCash", "PaydayLoan", "LoanShark"];
/// Locations used by the geographic anomaly rule.
pub const ANOMALY_LOCATIONS: [&str; 3] = ["CN", "GB", "RU"];
/// Probability that a triggered rule keeps its fraud flag.
pub const FRAUD_KEEP_PROBABILITY: f64 = 0.985;

const ACCOUNT_TAKEOVER_PROBABILITY: f64 = 0.30;
const CARD_TESTING_PROBABILITY: f64 = 0.25;
const MERCHANT_COLLUSION_PROBABILITY: f64 = 0.15;
const GEOGRAPHIC_ANOMALY_PROBABILITY: f64 = 0.10;
const BASELINE_FRAUD_PROBABILITY: f64 = 0.002;

/// The fraud-injection rules, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FraudRule {
    AccountTakeover,
    CardTesting,
    MerchantCollusion,
    GeographicAnomaly,
    Baseline,
}

impl FraudRule {
    pub const ALL: [FraudRule; 5] = [
        FraudRule::AccountTakeover,
        FraudRule::CardTesting,
        FraudRule::MerchantCollusion,
        FraudRule::GeographicAnomaly,
        FraudRule::Baseline,
    ];
}

impl fmt::Display for FraudRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FraudRule::AccountTakeover => "account_takeover",
            FraudRule::CardTesting => "card_testing",
            FraudRule::MerchantCollusion => "merchant_collusion",
            FraudRule::GeographicAnomaly => "geographic_anomaly",
            FraudRule::Baseline => "baseline",
        };
        f.write_str(name)
    }
}

/// A generated transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub user_id: i64,
    pub amount: f64,
    pub currency: String,
    pub merchant: String,
    /// RFC 3339 timestamp, skewed from now by [-300, 3000] seconds.
    pub timestamp: String,
    pub location: String,
    pub is_fraud: u8,
}

impl From<Transaction> for SyntheticRecord {
    fn from(tx: Transaction) -> Self {
        let value = json!({
            "transaction_id": tx.transaction_id,
            "user_id": tx.user_id,
            "amount": tx.amount,
            "currency": tx.currency,
            "merchant": tx.merchant,
            "timestamp": tx.timestamp,
            "location": tx.location,
            "is_fraud": tx.is_fraud,
        });
        match value {
            Value::Object(fields) => SyntheticRecord::new(fields),
            _ => SyntheticRecord::default(),
        }
    }
}

/// Generator for the `transaction` domain.
///
/// The compromised identities and high-risk merchants are fixed at
/// construction and only read afterwards. The RNG sits behind a mutex so one
/// instance can be shared by all workers of a run while keeping a single
/// random stream.
pub struct TransactionGenerator {
    compromised_users: HashSet<i64>,
    high_risk_merchants: Vec<String>,
    rng: Mutex<StdRng>,
}

impl TransactionGenerator {
    pub const DOMAIN: &'static str = "transaction";
    pub const KEY_FIELD: &'static str = "transaction_id";

    /// Create a generator seeded from the operating system.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    /// Create a generator with a fixed seed (same seed = same reference data
    /// and the same sequence of rolls, apart from the wall-clock timestamp).
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(mut rng: StdRng) -> Self {
        let span = (USER_ID_MAX - USER_ID_MIN) as usize;
        let compromised_users = index::sample(&mut rng, span, COMPROMISED_USER_COUNT)
            .into_iter()
            .map(|offset| USER_ID_MIN + offset as i64)
            .collect();

        Self {
            compromised_users,
            high_risk_merchants: HIGH_RISK_MERCHANTS.iter().map(|m| m.to_string()).collect(),
            rng: Mutex::new(rng),
        }
    }

    pub fn compromised_users(&self) -> &HashSet<i64> {
        &self.compromised_users
    }

    pub fn high_risk_merchants(&self) -> &[String] {
        &self.high_risk_merchants
    }

    /// Generate a transaction along with the rule that fired, if any.
    ///
    /// The rule is reported even when dampening cleared the fraud flag.
    pub fn generate_transaction(&self) -> (Transaction, Option<FraudRule>) {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.roll(&mut rng)
    }

    fn roll<R: Rng>(&self, rng: &mut R) -> (Transaction, Option<FraudRule>) {
        let mut tx = base_transaction(rng);
        let amount = tx.amount;
        let user_id = tx.user_id;

        let rule = if self.compromised_users.contains(&user_id)
            && amount > 500.0
            && rng.random_bool(ACCOUNT_TAKEOVER_PROBABILITY)
        {
            tx.amount = rng.random_range(500.0..5000.0);
            if let Some(merchant) = self.high_risk_merchants.choose(rng) {
                tx.merchant = merchant.clone();
            }
            Some(FraudRule::AccountTakeover)
        } else if amount < 2.0
            && user_id % 1000 == 0
            && rng.random_bool(CARD_TESTING_PROBABILITY)
        {
            tx.amount = round_cents(rng.random_range(0.01..=2.0));
            tx.location = "US".to_string();
            Some(FraudRule::CardTesting)
        } else if self.high_risk_merchants.contains(&tx.merchant)
            && amount > 3000.0
            && rng.random_bool(MERCHANT_COLLUSION_PROBABILITY)
        {
            tx.amount = rng.random_range(300.0..1500.0);
            Some(FraudRule::MerchantCollusion)
        } else if user_id % 500 == 0 && rng.random_bool(GEOGRAPHIC_ANOMALY_PROBABILITY) {
            if let Some(location) = ANOMALY_LOCATIONS.choose(rng) {
                tx.location = location.to_string();
            }
            Some(FraudRule::GeographicAnomaly)
        } else if rng.random_bool(BASELINE_FRAUD_PROBABILITY) {
            tx.amount = rng.random_range(100.0..2000.0);
            Some(FraudRule::Baseline)
        } else {
            None
        };

        // Drawn on every call so the random stream does not depend on the outcome.
        let keep = rng.random::<f64>() < FRAUD_KEEP_PROBABILITY;
        tx.is_fraud = u8::from(rule.is_some() && keep);

        if let Some(rule) = rule {
            trace!(
                transaction_id = %tx.transaction_id,
                rule = %rule,
                flagged = tx.is_fraud == 1,
                "Fraud rule fired"
            );
        }

        (tx, rule)
    }
}

impl Default for TransactionGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordGenerator for TransactionGenerator {
    fn domain(&self) -> &str {
        Self::DOMAIN
    }

    fn key_field(&self) -> &str {
        Self::KEY_FIELD
    }

    fn generate(&self) -> SyntheticRecord {
        self.generate_transaction().0.into()
    }
}

fn base_transaction<R: Rng>(rng: &mut R) -> Transaction {
    let transaction_id = uuid::Builder::from_random_bytes(rng.random())
        .into_uuid()
        .to_string();
    let user_id = rng.random_range(USER_ID_MIN..=USER_ID_MAX);
    let amount = round_cents(rng.random_range(0.01..=10000.0));
    let merchant: String = CompanyName().fake_with_rng(rng);
    let skew = chrono::Duration::seconds(rng.random_range(-300..=3000));
    let location: String = CountryCode().fake_with_rng(rng);

    Transaction {
        transaction_id,
        user_id,
        amount,
        currency: "USD".to_string(),
        merchant,
        timestamp: (Utc::now() + skew).to_rfc3339(),
        location,
        is_fraud: 0,
    }
}
