use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency every stored amount is kept in
pub const BASE_CURRENCY: Currency = Currency::MYR;

/// Display currencies supported on quotations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Malaysian Ringgit (2 decimal places), the base currency
    #[default]
    MYR,
    /// Japanese Yen (no decimal places), display-only conversion target
    JPY,
}

impl Currency {
    /// Returns the decimal scale for this currency
    /// - MYR: 2 decimal places
    /// - JPY: 0 (no decimals)
    pub fn scale(&self) -> u32 {
        match self {
            Currency::MYR => 2,
            Currency::JPY => 0,
        }
    }

    /// Symbol printed in front of amounts
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::MYR => "RM",
            Currency::JPY => "¥",
        }
    }

    /// Rounds half away from zero to this currency's scale, padding the scale
    /// so `20` becomes `20.00` for MYR.
    pub fn round(&self, amount: Decimal) -> Decimal {
        let mut rounded =
            amount.round_dp_with_strategy(self.scale(), RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(self.scale());
        rounded
    }

    /// Converts an amount held in the base currency into this currency.
    ///
    /// Only JPY is converted; every other currency is displayed as stored.
    /// Saturates at `Decimal::MAX`; callers bound amounts through
    /// `checked_from_base` first.
    pub fn from_base(&self, amount: Decimal, conversion_rate: Decimal) -> Decimal {
        self.checked_from_base(amount, conversion_rate)
            .unwrap_or(Decimal::MAX)
    }

    /// `from_base`, or `None` when the conversion overflows
    pub fn checked_from_base(&self, amount: Decimal, conversion_rate: Decimal) -> Option<Decimal> {
        match self {
            Currency::JPY => amount
                .checked_mul(conversion_rate)
                .map(|converted| self.round(converted)),
            Currency::MYR => Some(self.round(amount)),
        }
    }

    /// Formats an amount with symbol, thousands separators and currency scale
    pub fn format_amount(&self, amount: Decimal) -> String {
        format!("{}{}", self.symbol(), group_thousands(self.round(amount), self.scale()))
    }
}

/// Renders `amount` with `,` grouping and exactly `scale` decimals.
pub fn group_thousands(amount: Decimal, scale: u32) -> String {
    let mut rounded = amount.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(scale);

    let text = rounded.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part.to_string(), Some(frac_part.to_string())),
        None => (text, None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, digit) in digits.iter().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::MYR => write!(f, "MYR"),
            Currency::JPY => write!(f, "JPY"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MYR" => Ok(Currency::MYR),
            "JPY" => Ok(Currency::JPY),
            _ => Err(format!("Invalid currency: {}", s)),
        }
    }
}

impl TryFrom<String> for Currency {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
