use super::model::SpeechModel;
use rust_decimal::Decimal;

/// USD per 1,000 characters
pub fn rate_per_1k_chars(model: SpeechModel) -> Decimal {
    match model {
        SpeechModel::Standard => Decimal::new(15, 3),
        SpeechModel::Hd => Decimal::new(30, 3),
    }
}

/// Estimated API cost of synthesizing `char_count` characters
pub fn estimate_cost(char_count: usize, model: SpeechModel) -> Decimal {
    Decimal::from(char_count) / Decimal::from(1000) * rate_per_1k_chars(model)
}
