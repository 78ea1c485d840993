use crate::error::{AppError, AppResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A request field that clients send either as a JSON number or as a
/// numeric string (`3` and `"3"` are both accepted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(serde_json::Number),
    Text(String),
}

impl NumberOrString {
    pub fn to_text(&self) -> String {
        match self {
            NumberOrString::Number(n) => n.to_string(),
            NumberOrString::Text(s) => s.trim().to_string(),
        }
    }

    /// Parses a positive database id.
    pub fn to_id(&self, field: &str) -> AppResult<i32> {
        let id = match self {
            NumberOrString::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
            NumberOrString::Text(s) => s.trim().parse::<i32>().ok(),
        };
        match id {
            Some(v) if v > 0 => Ok(v),
            _ => Err(AppError::ValidationError(format!("{field} must be a positive integer"))),
        }
    }

    pub fn to_int(&self, field: &str) -> AppResult<i32> {
        let value = match self {
            NumberOrString::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
            NumberOrString::Text(s) => s.trim().parse::<i32>().ok(),
        };
        value.ok_or_else(|| AppError::ValidationError(format!("{field} must be an integer")))
    }

    pub fn to_amount(&self) -> AppResult<Decimal> {
        parse_amount(&self.to_text())
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, NumberOrString::Text(s) if s.trim().is_empty())
    }
}

impl From<i32> for NumberOrString {
    fn from(v: i32) -> Self {
        NumberOrString::Number(v.into())
    }
}

impl From<String> for NumberOrString {
    fn from(v: String) -> Self {
        NumberOrString::Text(v)
    }
}

impl From<&str> for NumberOrString {
    fn from(v: &str) -> Self {
        NumberOrString::Text(v.to_string())
    }
}

/// Largest value a `DECIMAL(10,2)` column holds.
fn max_amount() -> Decimal {
    Decimal::new(99_999_999_99, 2)
}

/// Parses a money amount: positive, at most two fraction digits.
pub fn parse_amount(raw: &str) -> AppResult<Decimal> {
    let amount = Decimal::from_str(raw.trim())
        .map_err(|_| AppError::ValidationError("Invalid amount format".to_string()))?;
    if amount <= Decimal::ZERO {
        return Err(AppError::ValidationError(
            "Amount must be greater than zero".to_string(),
        ));
    }
    if amount.normalize().scale() > 2 {
        return Err(AppError::ValidationError(
            "Amount must have at most two decimal places".to_string(),
        ));
    }
    if amount > max_amount() {
        return Err(AppError::ValidationError("Amount is too large".to_string()));
    }
    Ok(amount.round_dp(2))
}

pub fn is_valid_card_number(number: &str) -> bool {
    (13..=19).contains(&number.len()) && number.chars().all(|c| c.is_ascii_digit())
}

/// `MM/YY` with a month between 01 and 12.
pub fn is_valid_card_expiry(expiry: &str) -> bool {
    let Some((mm, yy)) = expiry.split_once('/') else {
        return false;
    };
    mm.len() == 2
        && yy.len() == 2
        && yy.chars().all(|c| c.is_ascii_digit())
        && matches!(mm.parse::<u8>(), Ok(1..=12))
}

/// Keeps the last four digits, masking the rest.
pub fn mask_card_number(number: &str) -> String {
    let visible = number.len().saturating_sub(4);
    number
        .chars()
        .enumerate()
        .map(|(i, c)| if i < visible { '*' } else { c })
        .collect()
}

pub fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Usernames are collected as `@name` but stored without the `@`.
pub fn normalize_username(username: &str) -> &str {
    let trimmed = username.trim();
    trimmed.strip_prefix('@').unwrap_or(trimmed)
}
