//! Category rule table.
//!
//! Each leaf is a closed-form formula over the month's records. Formulas never
//! reference another leaf's result; overlaps are removed by excluding the
//! overlapping records or subtracting an exact subset, so evaluation order does
//! not matter.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::categories::{Income, Leaf, Recreational, Subscription};
use crate::categorizer::{find_amount, match_label_excluding, sum_label};
use crate::models::TransactionRecord;

const CAFETERIA_WORK: &str = "Pago en CAFET. IMDEA NANOCIENCIA MADRID ES";
const ESTACION_WORK: &str = "Pago en LA ESTACION DE MAJADAHONDMAJADAHONDA ES";
const UBER_EATS: &str = "Pago en UBER *EATS";
const TAXI: &str = "Taxi y Carsharing";
const RESTAURANTS: &str = "Cafeterías y restaurantes";
const SUPERMARKETS: &str = "Supermercados y alimentación";
const BIZUM_SENT: &str = "Transferencia Bizum emitida";
const BIZUM_RECEIVED: &str = "Transferencia Bizum recibida";
const ATM: &str = "Cajeros";
const CHATGPT: &str = "Pago en CHATGPT SUBSCRIPTION";
const PAYROLL: &str = "Nómina o Pensión";

/// Labels claimed by other leaves that may also carry a food subcategory.
const CLAIMED_FOOD: &[&str] = &[CAFETERIA_WORK, ESTACION_WORK, UBER_EATS];

const PSYCHOLOGIST_CENTS: i64 = -21_000;
const DYSTOPIA_CENTS: i64 = -1_500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    /// Sum of every record matching the label.
    Label(&'static str),
    /// Sum of records matching `label` that none of `except` match.
    Excluding {
        label: &'static str,
        except: &'static [&'static str],
    },
    /// Sum of matching records whose amount is exactly `cents / 100`.
    Fixed { label: &'static str, cents: i64 },
}

impl Term {
    fn value(&self, records: &[TransactionRecord]) -> Decimal {
        match *self {
            Term::Label(label) => sum_label(records, label),
            Term::Excluding { label, except } => match_label_excluding(records, label, except)
                .iter()
                .map(|r| r.amount)
                .sum(),
            Term::Fixed { label, cents } => find_amount(records, label, Decimal::new(cents, 2))
                .into_iter()
                .sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    Zero,
    Sum(Vec<(Sign, Term)>),
}

impl Formula {
    pub fn evaluate(&self, records: &[TransactionRecord]) -> Decimal {
        match self {
            Formula::Zero => Decimal::ZERO,
            Formula::Sum(terms) => terms
                .iter()
                .map(|(sign, term)| match sign {
                    Sign::Plus => term.value(records),
                    Sign::Minus => -term.value(records),
                })
                .sum(),
        }
    }
}

fn plus(term: Term) -> (Sign, Term) {
    (Sign::Plus, term)
}

fn minus(term: Term) -> (Sign, Term) {
    (Sign::Minus, term)
}

/// The formula for each leaf. Exhaustive, so every new leaf needs a rule.
pub fn formula_for(leaf: Leaf) -> Formula {
    use Term::{Excluding, Fixed, Label};

    let psychologist = Fixed { label: ATM, cents: PSYCHOLOGIST_CENTS };
    let dystopia = Fixed { label: BIZUM_SENT, cents: DYSTOPIA_CENTS };

    match leaf {
        Leaf::Savings => Formula::Zero,
        Leaf::EatingOutWork => Formula::Sum(vec![plus(Label(CAFETERIA_WORK)), plus(Label(ESTACION_WORK))]),
        Leaf::UberToWork => Formula::Sum(vec![plus(Label(TAXI))]),
        Leaf::Recreational(Recreational::UberEats) => Formula::Sum(vec![plus(Label(UBER_EATS))]),
        Leaf::Recreational(Recreational::BarsAndRestaurants) => Formula::Sum(vec![
            plus(Excluding { label: RESTAURANTS, except: CLAIMED_FOOD }),
            plus(Excluding { label: SUPERMARKETS, except: CLAIMED_FOOD }),
        ]),
        Leaf::Recreational(Recreational::Bizum) => {
            Formula::Sum(vec![plus(Label(BIZUM_SENT)), minus(dystopia)])
        }
        Leaf::Subscriptions(Subscription::Psychologist) => Formula::Sum(vec![plus(psychologist)]),
        Leaf::Subscriptions(Subscription::Dystopia) => Formula::Sum(vec![plus(dystopia)]),
        Leaf::Subscriptions(Subscription::ChatGpt) => Formula::Sum(vec![plus(Label(CHATGPT))]),
        Leaf::Income(Income::Salary) => Formula::Sum(vec![plus(Label(PAYROLL))]),
        Leaf::Income(Income::BizumReceived) => Formula::Sum(vec![plus(Label(BIZUM_RECEIVED))]),
    }
}

pub type LeafAmounts = BTreeMap<Leaf, Decimal>;

#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<(Leaf, Formula)>,
}

impl RuleSet {
    pub fn standard() -> Self {
        Self {
            rules: Leaf::ALL.into_iter().map(|l| (l, formula_for(l))).collect(),
        }
    }

    pub fn leaves(&self) -> impl Iterator<Item = Leaf> + '_ {
        self.rules.iter().map(|(l, _)| *l)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

/// One amount per leaf; leaves without matching records evaluate to zero.
pub fn evaluate(records: &[TransactionRecord], rule_set: &RuleSet) -> LeafAmounts {
    rule_set
        .rules
        .iter()
        .map(|(leaf, formula)| (*leaf, formula.evaluate(records)))
        .collect()
}
