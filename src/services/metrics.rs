use lazy_static::lazy_static;
use prometheus::{register_counter_vec, CounterVec};

use crate::models::decision::Decision;

lazy_static! {
    pub static ref DECISIONS_COUNTER: CounterVec = register_counter_vec!(
        "gate_decisions_total",
        "Access decisions by outcome and redirect target",
        &["outcome", "target"]
    ).unwrap();

    pub static ref TOKEN_REJECTIONS_COUNTER: CounterVec = register_counter_vec!(
        "gate_token_rejections_total",
        "Session tokens treated as absent, by reason",
        &["reason"]
    ).unwrap();
}

pub fn record_decision(decision: &Decision) {
    DECISIONS_COUNTER
        .with_label_values(&[decision.outcome(), decision.target_path().unwrap_or("")])
        .inc();
}
