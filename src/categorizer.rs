use rust_decimal::Decimal;

use crate::models::TransactionRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchField {
    Subcategory,
    Description,
}

fn field_value(record: &TransactionRecord, field: MatchField) -> Option<&str> {
    match field {
        MatchField::Subcategory => record.subcategory.as_deref(),
        MatchField::Description => Some(record.description.as_str()),
    }
}

/// The field a label resolves against: the bank subcategory when any record
/// carries it there, otherwise the description.
fn resolve_field(records: &[TransactionRecord], label: &str) -> Option<MatchField> {
    [MatchField::Subcategory, MatchField::Description]
        .into_iter()
        .find(|&field| records.iter().any(|r| field_value(r, field) == Some(label)))
}

/// All records whose resolved field equals `label` exactly.
pub fn match_label<'a>(records: &'a [TransactionRecord], label: &str) -> Vec<&'a TransactionRecord> {
    let Some(field) = resolve_field(records, label) else {
        return Vec::new();
    };
    records
        .iter()
        .filter(|r| field_value(r, field) == Some(label))
        .collect()
}

pub fn sum_label(records: &[TransactionRecord], label: &str) -> Decimal {
    match_label(records, label).iter().map(|r| r.amount).sum()
}

/// Records matching `label` that none of the `excluded` labels also match.
pub fn match_label_excluding<'a>(
    records: &'a [TransactionRecord],
    label: &str,
    excluded: &[&str],
) -> Vec<&'a TransactionRecord> {
    let taken: Vec<&TransactionRecord> = excluded
        .iter()
        .flat_map(|ex| match_label(records, ex))
        .collect();
    match_label(records, label)
        .into_iter()
        .filter(|r| !taken.iter().any(|t| std::ptr::eq(*t, *r)))
        .collect()
}

/// Amounts of matched records equal to `amount` (exact, signed).
pub fn find_amount(records: &[TransactionRecord], label: &str, amount: Decimal) -> Vec<Decimal> {
    match_label(records, label)
        .into_iter()
        .map(|r| r.amount)
        .filter(|a| *a == amount)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record;
    use rust_decimal_macros::dec;

    fn sample() -> Vec<TransactionRecord> {
        vec![
            record("2024-03-20", dec!(-8.40), dec!(900), "Pago en CAFET. IMDEA NANOCIENCIA MADRID ES", "Cafeterías y restaurantes"),
            record("2024-03-18", dec!(-15.00), dec!(908.40), "Bizum a Dystopia", "Transferencia Bizum emitida"),
            record("2024-03-15", dec!(-210.00), dec!(923.40), "Cajero Sol", "Cajeros"),
            record("2024-03-12", dec!(-40.00), dec!(1133.40), "Cajero Sol", "Cajeros"),
            record("2024-03-10", dec!(-22.00), dec!(1173.40), "Pago en UBER *EATS", ""),
            record("2024-03-08", dec!(-12.50), dec!(1195.40), "Pago en UBER *EATS", ""),
        ]
    }

    #[test]
    fn test_matches_by_subcategory() {
        let records = sample();
        let matched = match_label(&records, "Cajeros");
        assert_eq!(matched.len(), 2);
        assert_eq!(sum_label(&records, "Cajeros"), dec!(-250.00));
    }

    #[test]
    fn test_falls_back_to_description() {
        let records = sample();
        let matched = match_label(&records, "Pago en UBER *EATS");
        assert_eq!(matched.len(), 2);
        assert_eq!(sum_label(&records, "Pago en UBER *EATS"), dec!(-34.50));
    }

    #[test]
    fn test_subcategory_wins_over_description() {
        let records = vec![
            record("2024-03-10", dec!(-5), dec!(100), "Taxi y Carsharing", ""),
            record("2024-03-09", dec!(-7), dec!(105), "CABIFY", "Taxi y Carsharing"),
            record("2024-03-08", dec!(-9), dec!(112), "UBER TRIP", "Taxi y Carsharing"),
        ];
        let matched = match_label(&records, "Taxi y Carsharing");
        assert_eq!(matched.len(), 2);
        assert!(matched.iter().all(|r| r.subcategory.as_deref() == Some("Taxi y Carsharing")));
        assert_eq!(sum_label(&records, "Taxi y Carsharing"), dec!(-16));
    }

    #[test]
    fn test_no_match_is_empty() {
        let records = sample();
        assert!(match_label(&records, "Pago en CHATGPT SUBSCRIPTION").is_empty());
        assert_eq!(sum_label(&records, "Pago en CHATGPT SUBSCRIPTION"), Decimal::ZERO);
        assert!(match_label(&[], "Cajeros").is_empty());
    }

    #[test]
    fn test_match_is_exact() {
        let records = sample();
        assert!(match_label(&records, "cajeros").is_empty());
        assert!(match_label(&records, "Pago en UBER").is_empty());
    }

    #[test]
    fn test_excluding_removes_only_overlap() {
        let records = vec![
            record("2024-03-20", dec!(-8.40), dec!(900), "Pago en CAFET. IMDEA NANOCIENCIA MADRID ES", "Cafeterías y restaurantes"),
            record("2024-03-19", dec!(-30.00), dec!(908.40), "Pago en BAR PEPE", "Cafeterías y restaurantes"),
            record("2024-03-18", dec!(-12.50), dec!(938.40), "Pago en UBER *EATS", ""),
        ];
        let kept = match_label_excluding(
            &records,
            "Cafeterías y restaurantes",
            &["Pago en CAFET. IMDEA NANOCIENCIA MADRID ES", "Pago en UBER *EATS"],
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].description, "Pago en BAR PEPE");
    }

    #[test]
    fn test_find_amount_filters_exact_value() {
        let records = sample();
        assert_eq!(find_amount(&records, "Cajeros", dec!(-210.00)), vec![dec!(-210.00)]);
        assert_eq!(find_amount(&records, "Cajeros", dec!(-210)), vec![dec!(-210.00)]);
        assert!(find_amount(&records, "Cajeros", dec!(210.00)).is_empty());
        assert!(find_amount(&records, "Cajeros", dec!(-209.99)).is_empty());
        assert!(find_amount(&records, "Nómina o Pensión", dec!(1500)).is_empty());
    }
}
