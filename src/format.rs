use crate::data::DISPLAY_DIGITS;
use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds half away from zero to cents, which for sales (never negative) is the
/// usual round-half-up.
pub(crate) fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(DISPLAY_DIGITS, RoundingStrategy::MidpointAwayFromZero)
}

/// `R$ 1.234,56`: dots between thousands, comma before the cents.
pub(crate) fn format_money(amount: Decimal) -> String {
    let rounded = round_cents(amount);
    let plain = format!("{:.2}", rounded.abs());
    let (units, cents) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, digit) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("R$ {sign}{grouped},{cents}")
}

#[cfg(test)]
mod tests {
    use super::{format_money, round_cents};
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_display() {
        let tests = vec![
            (dec!(0), "R$ 0,00"),
            (dec!(0.5), "R$ 0,50"),
            (dec!(12), "R$ 12,00"),
            (dec!(150.5), "R$ 150,50"),
            (dec!(999.999), "R$ 1.000,00"),
            (dec!(1234.56), "R$ 1.234,56"),
            (dec!(123456.7), "R$ 123.456,70"),
            (dec!(1234567.891), "R$ 1.234.567,89"),
            (dec!(-1234.5), "R$ -1.234,50"),
        ];
        for (amount, want) in tests {
            assert_eq!(format_money(amount), want, "{amount}");
        }
    }

    #[test]
    fn test_rounding_is_half_up() {
        assert_eq!(round_cents(dec!(4.515)), dec!(4.52));
        assert_eq!(round_cents(dec!(4.514)), dec!(4.51));
        assert_eq!(round_cents(dec!(0.005)), dec!(0.01));
        assert_eq!(format_money(dec!(4.515)), "R$ 4,52");
    }
}
