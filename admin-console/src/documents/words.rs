//! Amounts in words, Indian numbering (thousand, lakh, crore).

use order_engine::money::round_currency;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

const ONES: [&str; 20] = [
    "Zero", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten",
    "Eleven", "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen",
    "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

fn below_hundred(n: u64) -> String {
    match n {
        0..=19 => ONES[n as usize].to_string(),
        _ if n % 10 == 0 => TENS[(n / 10) as usize].to_string(),
        _ => format!("{} {}", TENS[(n / 10) as usize], ONES[(n % 10) as usize]),
    }
}

fn below_thousand(n: u64) -> String {
    let (hundreds, rest) = (n / 100, n % 100);
    match (hundreds, rest) {
        (0, _) => below_hundred(rest),
        (_, 0) => format!("{} Hundred", ONES[hundreds as usize]),
        _ => format!("{} Hundred {}", ONES[hundreds as usize], below_hundred(rest)),
    }
}

/// `2124` -> "Two Thousand One Hundred Twenty Four".
pub fn number_in_words(n: u64) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }

    let crore = n / 10_000_000;
    let lakh = (n / 100_000) % 100;
    let thousand = (n / 1_000) % 100;
    let rest = n % 1_000;

    let mut parts = Vec::new();
    if crore > 0 {
        parts.push(format!("{} Crore", number_in_words(crore)));
    }
    if lakh > 0 {
        parts.push(format!("{} Lakh", below_hundred(lakh)));
    }
    if thousand > 0 {
        parts.push(format!("{} Thousand", below_hundred(thousand)));
    }
    if rest > 0 {
        parts.push(below_thousand(rest));
    }
    parts.join(" ")
}

/// "Rupees ... and ... Paise Only", rounded to paise first.
pub fn amount_in_words(amount: Decimal) -> String {
    let rounded = round_currency(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "Minus "
    } else {
        ""
    };
    let rounded = rounded.abs();

    let rupees = rounded.trunc().to_u64().unwrap_or(0);
    let paise = (rounded.fract() * Decimal::ONE_HUNDRED)
        .trunc()
        .to_u64()
        .unwrap_or(0);

    if paise == 0 {
        format!("{}Rupees {} Only", sign, number_in_words(rupees))
    } else {
        format!(
            "{}Rupees {} and {} Paise Only",
            sign,
            number_in_words(rupees),
            below_hundred(paise)
        )
    }
}
