use rust_decimal::{Decimal, RoundingStrategy};

/// Format a decimal as a euro amount with thousands separators: 1,234.56 €
pub fn money(val: Decimal) -> String {
    let rounded = val.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let cents = format!("{:.2}", rounded.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((&cents, "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-{with_commas}.{dec_part} €")
    } else {
        format!("{with_commas}.{dec_part} €")
    }
}

/// Percentage with one decimal place: 12.5%
pub fn percent(val: Decimal) -> String {
    format!("{:.1}%", val.round_dp(1))
}
