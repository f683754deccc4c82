//! Fixed two-level category schema.
//!
//! Every tracked amount belongs to exactly one [`Leaf`]. The leaf order in
//! [`Leaf::ALL`] is the column order of the history table and the stacking
//! order of the trend chart.

use std::fmt;

pub const NO_SUBCATEGORY: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Recreational {
    UberEats,
    BarsAndRestaurants,
    Bizum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Subscription {
    Psychologist,
    Dystopia,
    ChatGpt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Income {
    Salary,
    BizumReceived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Leaf {
    Savings,
    EatingOutWork,
    UberToWork,
    Recreational(Recreational),
    Subscriptions(Subscription),
    Income(Income),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    Expense,
    Income,
}

impl Leaf {
    pub const ALL: [Leaf; 11] = [
        Leaf::Savings,
        Leaf::EatingOutWork,
        Leaf::UberToWork,
        Leaf::Recreational(Recreational::UberEats),
        Leaf::Recreational(Recreational::BarsAndRestaurants),
        Leaf::Recreational(Recreational::Bizum),
        Leaf::Subscriptions(Subscription::Psychologist),
        Leaf::Subscriptions(Subscription::Dystopia),
        Leaf::Subscriptions(Subscription::ChatGpt),
        Leaf::Income(Income::Salary),
        Leaf::Income(Income::BizumReceived),
    ];

    pub fn category(&self) -> &'static str {
        match self {
            Leaf::Savings => "Savings",
            Leaf::EatingOutWork => "Eating Out Work",
            Leaf::UberToWork => "Uber To Work",
            Leaf::Recreational(_) => "Recreational",
            Leaf::Subscriptions(_) => "Subscriptions",
            Leaf::Income(_) => "Income",
        }
    }

    /// Subcategory label, `"/"` when the category has no split.
    pub fn subcategory(&self) -> &'static str {
        match self {
            Leaf::Savings | Leaf::EatingOutWork | Leaf::UberToWork => NO_SUBCATEGORY,
            Leaf::Recreational(Recreational::UberEats) => "Uber Eats",
            Leaf::Recreational(Recreational::BarsAndRestaurants) => "Bars And Restaurants",
            Leaf::Recreational(Recreational::Bizum) => "Bizum",
            Leaf::Subscriptions(Subscription::Psychologist) => "Psychologist",
            Leaf::Subscriptions(Subscription::Dystopia) => "Dystopia",
            Leaf::Subscriptions(Subscription::ChatGpt) => "ChatGPT",
            Leaf::Income(Income::Salary) => "Salary",
            Leaf::Income(Income::BizumReceived) => "Bizum Received",
        }
    }

    /// Short label for charts: the subcategory, or the category when unsplit.
    pub fn label(&self) -> &'static str {
        match self.subcategory() {
            NO_SUBCATEGORY => self.category(),
            sub => sub,
        }
    }

    pub fn kind(&self) -> LeafKind {
        match self {
            Leaf::Income(_) => LeafKind::Income,
            _ => LeafKind::Expense,
        }
    }

    pub fn is_income(&self) -> bool {
        self.kind() == LeafKind::Income
    }

    pub fn expenses() -> impl Iterator<Item = Leaf> {
        Leaf::ALL.into_iter().filter(|l| !l.is_income())
    }

    pub fn incomes() -> impl Iterator<Item = Leaf> {
        Leaf::ALL.into_iter().filter(|l| l.is_income())
    }

    pub fn from_labels(category: &str, subcategory: &str) -> Option<Leaf> {
        Leaf::ALL
            .into_iter()
            .find(|l| l.category() == category && l.subcategory() == subcategory)
    }

    /// Chart colour, fixed by the leaf's position within its category.
    pub fn color(&self) -> LeafColor {
        let siblings: Vec<Leaf> = Leaf::ALL
            .into_iter()
            .filter(|l| l.category() == self.category())
            .collect();
        let index = siblings.iter().position(|l| l == self).unwrap_or(0);
        LeafColor {
            palette: Palette::for_leaf(*self),
            shade: index,
            shades: siblings.len(),
        }
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.subcategory() {
            NO_SUBCATEGORY => write!(f, "{}", self.category()),
            sub => write!(f, "{} / {}", self.category(), sub),
        }
    }
}

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    Oranges,
    Blues,
    Reds,
    Greens,
    Purples,
    Greys,
}

impl Palette {
    pub fn for_leaf(leaf: Leaf) -> Palette {
        match leaf {
            Leaf::Savings => Palette::Oranges,
            Leaf::EatingOutWork => Palette::Blues,
            Leaf::UberToWork => Palette::Reds,
            Leaf::Recreational(_) => Palette::Greens,
            Leaf::Subscriptions(_) => Palette::Purples,
            Leaf::Income(_) => Palette::Greys,
        }
    }

    /// (light, dark) endpoints of the gradient.
    fn endpoints(&self) -> ((u8, u8, u8), (u8, u8, u8)) {
        match self {
            Palette::Oranges => ((253, 174, 107), (217, 72, 1)),
            Palette::Blues => ((158, 202, 225), (33, 113, 181)),
            Palette::Reds => ((252, 146, 114), (203, 24, 29)),
            Palette::Greens => ((161, 217, 155), (35, 139, 69)),
            Palette::Purples => ((188, 189, 220), (106, 81, 163)),
            Palette::Greys => ((204, 204, 204), (99, 99, 99)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafColor {
    pub palette: Palette,
    pub shade: usize,
    pub shades: usize,
}

impl LeafColor {
    pub fn rgb(&self) -> (u8, u8, u8) {
        let (light, dark) = self.palette.endpoints();
        if self.shades <= 1 {
            return dark;
        }
        let t = self.shade as f32 / (self.shades - 1) as f32;
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        (mix(light.0, dark.0), mix(light.1, dark.1), mix(light.2, dark.2))
    }
}
